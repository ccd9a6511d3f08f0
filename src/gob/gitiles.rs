//! Gitiles-style source host client.
//!
//! Speaks the JSON dialect of git web frontends: log endpoints return
//! XSSI-guarded JSON, file contents come back base64-encoded under
//! `?format=TEXT`. One client is bound to one instance; the manifest
//! snapshot repository gets its own wrapper with a per-run cache.

use std::collections::HashMap;
use std::sync::Mutex;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::{CommitSource, ManifestSource, http, parser};
use crate::error::Error;
use crate::model::{BuildVersion, Manifest};

/// File that pins every repository revision of a build.
const MANIFEST_FILE: &str = "snapshot.xml";

/// Branch whose history orders the snapshot tags.
const DEFAULT_SNAPSHOT_BRANCH: &str = "refs/heads/main";

/// Page size for walking the snapshot branch history.
const SNAPSHOT_LOG_PAGE: usize = 1000;

/// One commit as served by the host's log endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitCommit {
    pub commit: String,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub author: Option<Ident>,
    #[serde(default)]
    pub committer: Option<Ident>,
    #[serde(default)]
    pub message: String,
}

/// Author or committer identity line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ident {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub time: String,
}

/// One page of a log walk, newest first. `next` continues the walk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogPage {
    #[serde(default)]
    pub log: Vec<GitCommit>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RefValue {
    value: String,
    #[serde(default)]
    peeled: Option<String>,
}

/// Client for one git-hosting instance.
#[derive(Debug, Clone)]
pub struct GitilesClient {
    http: Client,
    base: String,
}

impl GitilesClient {
    pub fn new(instance: &str) -> Self {
        Self {
            http: http::client(),
            base: http::base_url(instance),
        }
    }

    pub fn host(&self) -> &str {
        &self.base
    }

    /// Existence probe for a repository. Run before any reference-specific
    /// request so configuration mistakes surface as such.
    pub async fn probe_repo(&self, repo: &str) -> Result<(), Error> {
        let url = format!("{}/{}/+refs?format=JSON", self.base, repo);
        let (status, _) = http::get_text(&self.http, &url)
            .await
            .map_err(|err| self.host_error(err))?;
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(Error::InvalidRepo {
                repo: repo.to_string(),
                host: self.base.clone(),
            }),
            status => Err(Error::Http { url, status }),
        }
    }

    /// Fetch a file at a committish, decoding the base64 TEXT payload.
    pub async fn fetch_file(
        &self,
        repo: &str,
        committish: &str,
        path: &str,
    ) -> Result<String, Error> {
        let url = format!("{}/{}/+/{}/{}?format=TEXT", self.base, repo, committish, path);
        let (status, body) = http::get_text(&self.http, &url).await?;
        match status {
            s if s.is_success() => {
                let bytes = BASE64.decode(body.trim().as_bytes()).map_err(|err| {
                    Error::Malformed {
                        what: format!("{path} at {committish}"),
                        reason: err.to_string(),
                    }
                })?;
                String::from_utf8(bytes).map_err(|err| Error::Malformed {
                    what: format!("{path} at {committish}"),
                    reason: err.to_string(),
                })
            }
            StatusCode::NOT_FOUND => Err(Error::NotFound {
                repo: repo.to_string(),
                reference: committish.to_string(),
            }),
            status => Err(Error::Http { url, status }),
        }
    }

    /// All tags of a repository, mapped to the commit they point at.
    /// Annotated tags report the peeled commit.
    pub async fn list_tags(&self, repo: &str) -> Result<HashMap<String, String>, Error> {
        let url = format!("{}/{}/+refs/tags?format=JSON", self.base, repo);
        let (status, body) = http::get_text(&self.http, &url).await?;
        match status {
            s if s.is_success() => {
                let refs: HashMap<String, RefValue> =
                    serde_json::from_str(http::strip_xssi(&body)).map_err(|err| {
                        Error::Malformed {
                            what: format!("tag listing of {repo}"),
                            reason: err.to_string(),
                        }
                    })?;
                Ok(refs
                    .into_iter()
                    .map(|(name, r)| {
                        let tag = name.strip_prefix("refs/tags/").unwrap_or(&name).to_string();
                        (tag, r.peeled.unwrap_or(r.value))
                    })
                    .collect())
            }
            StatusCode::NOT_FOUND => Err(Error::InvalidRepo {
                repo: repo.to_string(),
                host: self.base.clone(),
            }),
            status => Err(Error::Http { url, status }),
        }
    }

    fn host_error(&self, err: Error) -> Error {
        match err {
            Error::Network { source, .. } => Error::InvalidHost {
                host: self.base.clone(),
                reason: source.to_string(),
            },
            other => other,
        }
    }
}

impl CommitSource for GitilesClient {
    async fn log_page(
        &self,
        repo: &str,
        from: Option<&str>,
        to: &str,
        limit: usize,
        token: Option<&str>,
    ) -> Result<LogPage, Error> {
        let range = match from {
            Some(from) => format!("{from}..{to}"),
            None => to.to_string(),
        };
        let mut url = format!("{}/{}/+log/{}?format=JSON&n={}", self.base, repo, range, limit);
        if let Some(token) = token {
            url.push_str("&s=");
            url.push_str(token);
        }
        let (status, body) = http::get_text(&self.http, &url).await?;
        match status {
            s if s.is_success() => serde_json::from_str(http::strip_xssi(&body)).map_err(|err| {
                Error::Malformed {
                    what: format!("log of {repo}"),
                    reason: err.to_string(),
                }
            }),
            StatusCode::NOT_FOUND => Err(Error::NotFound {
                repo: repo.to_string(),
                reference: range,
            }),
            status => Err(Error::Http { url, status }),
        }
    }
}

/// The manifest-snapshot repository of a build host.
///
/// Owns the per-invocation manifest cache; a version is downloaded and
/// parsed at most once per process.
#[derive(Debug)]
pub struct SnapshotRepo {
    client: GitilesClient,
    repo: String,
    branch: String,
    cache: Mutex<HashMap<String, Manifest>>,
}

impl SnapshotRepo {
    pub fn new(client: GitilesClient, repo: &str) -> Self {
        Self {
            client,
            repo: repo.to_string(),
            branch: DEFAULT_SNAPSHOT_BRANCH.to_string(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branch = branch.to_string();
        self
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Structural check: instance reachable, repository present.
    pub async fn validate(&self) -> Result<(), Error> {
        self.client.probe_repo(&self.repo).await
    }

    /// Known builds ordered oldest to newest.
    ///
    /// The order comes from the snapshot branch history joined with the tag
    /// list; version strings themselves are never compared.
    pub async fn ordered_builds(&self) -> Result<Vec<BuildVersion>, Error> {
        let tags = self.client.list_tags(&self.repo).await?;
        let mut tag_by_sha: HashMap<&str, &str> = HashMap::with_capacity(tags.len());
        for (tag, sha) in &tags {
            tag_by_sha.insert(sha.as_str(), tag.as_str());
        }

        let mut builds = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self
                .client
                .log_page(&self.repo, None, &self.branch, SNAPSHOT_LOG_PAGE, token.as_deref())
                .await?;
            for entry in &page.log {
                if let Some(tag) = tag_by_sha.get(entry.commit.as_str()) {
                    builds.push(BuildVersion::parse(tag));
                }
            }
            token = page.next;
            if token.is_none() {
                break;
            }
        }
        debug!("{} tagged builds on {}", builds.len(), self.repo);
        builds.reverse();
        Ok(builds)
    }

    async fn download(&self, version: &BuildVersion) -> Result<Manifest, Error> {
        let committish = format!("refs/tags/{version}");
        let xml = match self
            .client
            .fetch_file(&self.repo, &committish, MANIFEST_FILE)
            .await
        {
            Err(Error::NotFound { .. }) => {
                return Err(Error::InvalidVersion {
                    version: version.to_string(),
                });
            }
            other => other?,
        };
        parser::parse_manifest(&xml)
    }
}

impl ManifestSource for SnapshotRepo {
    async fn fetch_manifest(&self, version: &BuildVersion) -> Result<Manifest, Error> {
        {
            let cache = self.cache.lock().expect("manifest cache lock");
            if let Some(cached) = cache.get(version.as_str()) {
                return Ok(cached.clone());
            }
        }
        let manifest = self.download(version).await?;
        self.cache
            .lock()
            .expect("manifest cache lock")
            .insert(version.to_string(), manifest.clone());
        Ok(manifest)
    }
}
