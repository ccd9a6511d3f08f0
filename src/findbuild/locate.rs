//! Earliest-build search.

use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::error::Error;
use crate::gob::{CommitSource, ManifestSource};
use crate::model::{BuildVersion, ResolvedChange};

/// Candidate probes kept in flight ahead of the scan cursor.
const PROBE_LOOKAHEAD: usize = 4;

/// Scan `builds`, oldest to newest, for the first whose pinned revision of
/// the change's repository contains the resolved commit.
///
/// Probes run a few candidates ahead, but results are consumed strictly in
/// sequence order, so the earliest confirmed match always wins and probes
/// past it are dropped unread.
pub async fn locate<M, S>(
    manifests: &M,
    commits: &S,
    builds: &[BuildVersion],
    change: &ResolvedChange,
) -> Result<BuildVersion, Error>
where
    M: ManifestSource,
    S: CommitSource,
{
    let mut probes = stream::iter(builds.iter().map(|build| async move {
        (build, probe(manifests, commits, build, change).await)
    }))
    .buffered(PROBE_LOOKAHEAD);

    while let Some((build, outcome)) = probes.next().await {
        if outcome? {
            debug!("first build containing {} is {build}", change.sha);
            return Ok(build.clone());
        }
    }
    Err(Error::BuildNotFound {
        repo: change.repo.clone(),
        sha: change.sha.clone(),
    })
}

/// Containment probe for one candidate. Candidates without a snapshot or
/// without the repository simply do not contain the change.
async fn probe<M, S>(
    manifests: &M,
    commits: &S,
    build: &BuildVersion,
    change: &ResolvedChange,
) -> Result<bool, Error>
where
    M: ManifestSource,
    S: CommitSource,
{
    let manifest = match manifests.fetch_manifest(build).await {
        Err(Error::InvalidVersion { .. }) => {
            debug!("build {build} has no snapshot, skipping");
            return Ok(false);
        }
        other => other?,
    };
    let Some(pinned) = manifest.revision(&change.repo) else {
        return Ok(false);
    };
    match commits.contains(&change.repo, pinned, &change.sha).await {
        // The commit may not exist on this host's copy of the repository.
        Err(Error::NotFound { .. }) => Ok(false),
        other => other,
    }
}
