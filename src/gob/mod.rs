//! Remote host access layer.
//!
//! Two host families are involved: Gitiles-style source hosts serving
//! manifests and commit history, and Gerrit-style review hosts serving
//! change metadata. The engines consume them through small capability
//! traits, so tests can substitute in-memory fakes and production wires in
//! the REST clients below.

pub mod gerrit;
pub mod gitiles;
pub mod http;
pub mod parser;

#[cfg(test)]
pub(crate) mod fake;

pub use gerrit::{ChangeInfo, GerritClient};
pub use gitiles::{GitCommit, GitilesClient, Ident, LogPage, SnapshotRepo};

use crate::error::Error;
use crate::model::{BuildVersion, ChangeSpec, Manifest};

/// Fetches the pinned-revision manifest of a build.
#[allow(async_fn_in_trait)]
pub trait ManifestSource {
    async fn fetch_manifest(&self, version: &BuildVersion) -> Result<Manifest, Error>;
}

/// Serves commit history of component repositories.
#[allow(async_fn_in_trait)]
pub trait CommitSource {
    /// One page of range log for `repo`, newest first: commits reachable
    /// from `to` but not from `from`. `from: None` walks from `to` down to
    /// the root. `token` continues an earlier page.
    async fn log_page(
        &self,
        repo: &str,
        from: Option<&str>,
        to: &str,
        limit: usize,
        token: Option<&str>,
    ) -> Result<LogPage, Error>;

    /// Ancestry containment: true when `commit` is `pinned` itself or one of
    /// its ancestors. Everything reachable from an ancestor is reachable
    /// from the pin, so the range `pinned..commit` is empty exactly then.
    async fn contains(&self, repo: &str, pinned: &str, commit: &str) -> Result<bool, Error> {
        if pinned == commit {
            return Ok(true);
        }
        let page = self.log_page(repo, Some(pinned), commit, 1, None).await?;
        Ok(page.log.is_empty())
    }
}

/// Looks up changes on a code-review host.
#[allow(async_fn_in_trait)]
pub trait ChangeLookup {
    /// Every change matching the identifier. An empty answer means the host
    /// does not know the change at all.
    async fn query_change(&self, spec: &ChangeSpec) -> Result<Vec<ChangeInfo>, Error>;

    /// Host identity for error reporting.
    fn host(&self) -> &str;
}
