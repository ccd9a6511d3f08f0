//! Change-to-build attribution.
//!
//! Maps a change identifier to the earliest build whose manifest contains
//! it: resolve the identifier on the review hosts, derive the ordered build
//! sequence from the snapshot repository, then scan for the first build
//! whose pin contains the resolved commit.

mod locate;
mod resolve;

pub use locate::locate;
pub use resolve::{Fallback, resolve};

use tracing::info;

use crate::error::Error;
use crate::gob::{GerritClient, GitilesClient, SnapshotRepo};
use crate::model::{BuildVersion, ChangeSpec, RepoPrefix, ResolvedChange};

/// Everything one findbuild run needs.
pub struct FindBuildRequest<'a> {
    /// Review host the change is resolved on.
    pub gerrit: &'a str,
    /// Review host tried when the primary does not know the change.
    pub fallback: Option<&'a str>,
    /// Repository prefix carried by mirrored projects on the fallback host.
    pub prefix: Option<&'a str>,
    /// Git-hosting instance serving the manifest snapshots.
    pub gob: &'a str,
    /// Manifest-snapshot repository on that instance.
    pub manifest_repo: &'a str,
    /// Raw change identifier.
    pub change: &'a str,
}

/// A located build together with the change that led there.
#[derive(Debug, Clone)]
pub struct BuildMatch {
    pub build: BuildVersion,
    pub change: ResolvedChange,
}

/// Resolve a change and locate the earliest build containing it.
///
/// Structural configuration (identifier shape, prefix syntax, host and
/// repository reachability) is validated up front; only then does any
/// change- or build-specific work start.
pub async fn find_build(request: &FindBuildRequest<'_>) -> Result<BuildMatch, Error> {
    let spec = ChangeSpec::classify(request.change)?;
    let prefix = request.prefix.map(RepoPrefix::parse).transpose()?;

    let gob = GitilesClient::new(request.gob);
    let snapshots = SnapshotRepo::new(gob.clone(), request.manifest_repo);
    let primary = GerritClient::new(request.gerrit);
    let fallback = request.fallback.map(GerritClient::new);

    primary.probe().await?;
    if let Some(host) = &fallback {
        host.probe().await?;
    }
    snapshots.validate().await?;

    let change = resolve(
        &primary,
        fallback.as_ref().map(|host| Fallback {
            host,
            prefix: prefix.as_ref(),
        }),
        &spec,
    )
    .await?;
    info!(
        "change {} is commit {} in {}",
        change.number, change.sha, change.repo
    );

    let builds = snapshots.ordered_builds().await?;
    let build = locate(&snapshots, &gob, &builds, &change).await?;
    Ok(BuildMatch { build, change })
}
