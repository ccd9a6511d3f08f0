//! Gerrit-style review host client.

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{ChangeLookup, http};
use crate::error::Error;
use crate::model::ChangeSpec;

/// One change as returned by the review host query endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeInfo {
    #[serde(rename = "_number")]
    pub number: u64,
    pub project: String,
    pub status: String,
    /// Commit of the current patchset. Present because queries ask for it.
    #[serde(default)]
    pub current_revision: Option<String>,
    #[serde(default)]
    pub submitted: Option<String>,
}

impl ChangeInfo {
    pub fn is_merged(&self) -> bool {
        self.status == "MERGED"
    }

    /// Human label for resolution errors.
    pub fn state_label(&self) -> &'static str {
        match self.status.as_str() {
            "MERGED" => "merged",
            "ABANDONED" => "abandoned",
            _ => "under review",
        }
    }
}

/// Client for one review host.
#[derive(Debug, Clone)]
pub struct GerritClient {
    http: Client,
    base: String,
}

impl GerritClient {
    pub fn new(url: &str) -> Self {
        Self {
            http: http::client(),
            base: http::base_url(url),
        }
    }

    /// Reachability probe, run before any change lookup.
    pub async fn probe(&self) -> Result<(), Error> {
        let url = format!("{}/config/server/version", self.base);
        let (status, _) = match http::get_text(&self.http, &url).await {
            Ok(answer) => answer,
            Err(Error::Network { source, .. }) => {
                return Err(Error::InvalidHost {
                    host: self.base.clone(),
                    reason: source.to_string(),
                });
            }
            Err(err) => return Err(err),
        };
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::InvalidHost {
                host: self.base.clone(),
                reason: format!("version endpoint answered {status}"),
            })
        }
    }
}

impl ChangeLookup for GerritClient {
    async fn query_change(&self, spec: &ChangeSpec) -> Result<Vec<ChangeInfo>, Error> {
        let url = format!(
            "{}/changes/?q={}&o=CURRENT_REVISION",
            self.base,
            spec.query()
        );
        let (status, body) = http::get_text(&self.http, &url).await?;
        match status {
            s if s.is_success() => {
                serde_json::from_str(http::strip_xssi(&body)).map_err(|err| Error::Malformed {
                    what: format!("change query on {}", self.base),
                    reason: err.to_string(),
                })
            }
            StatusCode::BAD_REQUEST => Err(Error::InvalidChange {
                input: spec.to_string(),
            }),
            status => Err(Error::Http { url, status }),
        }
    }

    fn host(&self) -> &str {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_query_change_parses_guarded_json() {
        let server = MockServer::start().await;
        let body = r#")]}'
[{"_number":3781,"project":"third_party/kernel","status":"MERGED","current_revision":"2222222222222222222222222222222222222222","submitted":"2020-09-01 10:12:34.000000000"}]"#;
        Mock::given(method("GET"))
            .and(path("/changes/"))
            .and(query_param("q", "change:3781"))
            .and(query_param("o", "CURRENT_REVISION"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = GerritClient::new(&server.uri());
        let spec = ChangeSpec::classify("3781").unwrap();
        let changes = client.query_change(&spec).await.unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].number, 3781);
        assert!(changes[0].is_merged());
        assert_eq!(
            changes[0].current_revision.as_deref(),
            Some("2222222222222222222222222222222222222222")
        );
    }

    #[tokio::test]
    async fn test_no_match_is_an_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/changes/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(")]}'\n[]"))
            .mount(&server)
            .await;

        let client = GerritClient::new(&server.uri());
        let spec = ChangeSpec::classify("9999999999").unwrap();
        let changes = client.query_change(&spec).await.unwrap();
        assert!(changes.is_empty());
    }

    #[tokio::test]
    async fn test_probe_rejects_unreachable_host() {
        let client = GerritClient::new("http://127.0.0.1:1");
        let err = client.probe().await.unwrap_err();
        assert!(matches!(err, Error::InvalidHost { .. }));
    }

    #[tokio::test]
    async fn test_probe_accepts_live_host() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/config/server/version"))
            .respond_with(ResponseTemplate::new(200).set_body_string(")]}'\n\"3.9.1\""))
            .mount(&server)
            .await;

        let client = GerritClient::new(&server.uri());
        assert!(client.probe().await.is_ok());
    }

    #[test]
    fn test_state_labels() {
        let abandoned = ChangeInfo {
            status: "ABANDONED".to_string(),
            ..ChangeInfo::default()
        };
        let open = ChangeInfo {
            status: "NEW".to_string(),
            ..ChangeInfo::default()
        };
        assert_eq!(abandoned.state_label(), "abandoned");
        assert_eq!(open.state_label(), "under review");
        assert!(!open.is_merged());
    }
}
