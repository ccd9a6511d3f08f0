//! Fixture hosts for integration tests.
//!
//! Serves the wire dialect the clients expect: XSSI-guarded JSON for log,
//! ref and change endpoints, base64 bodies for file fetches.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const XSSI: &str = ")]}'\n";

fn guarded(value: &Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!("{XSSI}{value}"))
}

/// A fake Gitiles-style instance.
pub struct GobFixture {
    pub server: MockServer,
}

impl GobFixture {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Value for `--gob`; a full URL, so no `https://` gets prepended.
    pub fn instance(&self) -> String {
        self.server.uri()
    }

    /// Make a repository pass the existence probe.
    pub async fn mount_repo_probe(&self, repo: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/{repo}/+refs")))
            .respond_with(guarded(&json!({})))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_manifest(&self, repo: &str, version: &str, xml: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/{repo}/+/refs/tags/{version}/snapshot.xml")))
            .respond_with(ResponseTemplate::new(200).set_body_string(BASE64.encode(xml)))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_missing_manifest(&self, repo: &str, version: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/{repo}/+/refs/tags/{version}/snapshot.xml")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&self.server)
            .await;
    }

    /// Serve a complete log for a range (or a bare tip), newest first.
    pub async fn mount_log(&self, repo: &str, range: &str, commits: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(format!("/{repo}/+log/{range}")))
            .respond_with(guarded(&json!({ "log": commits })))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_tags(&self, repo: &str, tags: &[(&str, &str)]) {
        let mut refs = serde_json::Map::new();
        for (tag, sha) in tags {
            refs.insert(format!("refs/tags/{tag}"), json!({ "value": sha }));
        }
        Mock::given(method("GET"))
            .and(path(format!("/{repo}/+refs/tags")))
            .respond_with(guarded(&Value::Object(refs)))
            .mount(&self.server)
            .await;
    }
}

/// A fake Gerrit-style review host.
pub struct GerritFixture {
    pub server: MockServer,
}

impl GerritFixture {
    pub async fn start() -> Self {
        let fixture = Self {
            server: MockServer::start().await,
        };
        // Reachability probe used before any change lookup
        Mock::given(method("GET"))
            .and(path("/config/server/version"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("{XSSI}\"3.9.1\"")))
            .mount(&fixture.server)
            .await;
        fixture
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    pub async fn mount_query(&self, query: &str, changes: Value) {
        Mock::given(method("GET"))
            .and(path("/changes/"))
            .and(query_param("q", query))
            .respond_with(guarded(&changes))
            .mount(&self.server)
            .await;
    }
}

/// A commit as the log endpoint would serve it.
pub fn commit(sha: &str, parents: &[&str], message: &str) -> Value {
    json!({
        "commit": sha,
        "parents": parents,
        "author": {
            "name": "A Author",
            "email": "a@example.com",
            "time": "Tue Oct 01 11:59:00 2024 +0000",
        },
        "committer": {
            "name": "C Committer",
            "email": "c@example.com",
            "time": "Tue Oct 01 12:00:00 2024 +0000",
        },
        "message": message,
    })
}

/// A change as the review host query endpoint would serve it.
pub fn change(number: u64, project: &str, status: &str, sha: &str) -> Value {
    json!({
        "_number": number,
        "project": project,
        "status": status,
        "current_revision": sha,
        "submitted": "2024-10-01 12:00:00.000000000",
    })
}

/// A snapshot manifest document pinning the given repositories.
pub fn manifest_xml(entries: &[(&str, &str)]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<manifest>\n  \
         <remote fetch=\"https://host.invalid\" name=\"origin\"/>\n  \
         <default remote=\"origin\" revision=\"refs/heads/main\"/>\n",
    );
    for (name, revision) in entries {
        xml.push_str(&format!(
            "  <project name=\"{name}\" path=\"src/{name}\" revision=\"{revision}\"/>\n"
        ));
    }
    xml.push_str("</manifest>\n");
    xml
}
