//! Changelog engine.
//!
//! Compares the pinned revisions of two build manifests and expands every
//! difference into per-commit metadata. The two directions are computed
//! independently: commits added to the target that the source lacks, and
//! commits in the source that the target lacks. Repositories are walked
//! concurrently; the artifact keeps manifest order regardless of which walk
//! finishes first.

mod walker;

pub use walker::CommitWalk;

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::error::Error;
use crate::gob::{CommitSource, ManifestSource};
use crate::model::{BuildVersion, Changelog, Manifest, RepoLog};

/// Concurrent per-repository walks per direction.
const WALK_CONCURRENCY: usize = 8;

/// Both directional artifacts for one pair of builds.
#[derive(Debug, Clone, Default)]
pub struct Artifacts {
    /// Commits in the target build that the source build lacks.
    pub forward: Changelog,
    /// Commits in the source build that the target build lacks.
    pub reverse: Changelog,
}

/// Commits present under `target` pins but not under `source` pins, per
/// repository, in `target` manifest order.
///
/// A repository absent from `source` counts as newly introduced and
/// contributes its recent history up to the root-walk bound. A repository
/// whose references the host no longer serves contributes nothing.
pub async fn diff<S: CommitSource>(
    commits: &S,
    source: &Manifest,
    target: &Manifest,
) -> Result<Changelog, Error> {
    let jobs: Vec<(&str, Option<&str>, &str)> = target
        .iter()
        .filter_map(|entry| {
            let from = source.revision(&entry.name);
            if from == Some(entry.revision.as_str()) {
                None
            } else {
                Some((entry.name.as_str(), from, entry.revision.as_str()))
            }
        })
        .collect();

    let mut walks = stream::iter(jobs.into_iter().map(|(name, from, to)| async move {
        (name, walk_repo(commits, name, from, to).await)
    }))
    .buffer_unordered(WALK_CONCURRENCY);

    let mut results: HashMap<&str, RepoLog> = HashMap::new();
    while let Some((name, outcome)) = walks.next().await {
        if let Some(log) = outcome? {
            results.insert(name, log);
        }
    }

    // Single merge point: re-key completion-ordered results into manifest
    // document order.
    let mut artifact = Changelog::new();
    for entry in target.iter() {
        if let Some(log) = results.remove(entry.name.as_str()) {
            artifact.push(entry.name.clone(), log);
        }
    }
    Ok(artifact)
}

async fn walk_repo<S: CommitSource>(
    commits: &S,
    name: &str,
    from: Option<&str>,
    to: &str,
) -> Result<Option<RepoLog>, Error> {
    let mut walk = CommitWalk::new(commits, name, from, to);
    if from.is_none() {
        walk = walk.with_limit(walker::ROOT_WALK_LIMIT);
    }
    let (list, truncated) = match walk.collect().await {
        // A reference the host no longer serves (renamed or pruned
        // repository) contributes nothing instead of failing the run.
        Err(Error::NotFound { repo, reference }) => {
            debug!("skipping {repo}: reference {reference} unknown to host");
            return Ok(None);
        }
        other => other?,
    };
    if list.is_empty() {
        return Ok(None);
    }
    Ok(Some(RepoLog {
        commits: list,
        source_sha: from.unwrap_or_default().to_string(),
        target_sha: to.to_string(),
        has_more_commits: truncated,
    }))
}

/// Fetch both manifests and produce both directional artifacts.
///
/// Nothing is written here; persistence is the caller's concern and only
/// happens once the whole computation has succeeded.
pub async fn assemble<M, S>(
    manifests: &M,
    commits: &S,
    source: &BuildVersion,
    target: &BuildVersion,
) -> Result<Artifacts, Error>
where
    M: ManifestSource,
    S: CommitSource,
{
    info!("building changelog between {source} and {target}");
    let (source_manifest, target_manifest) = futures::try_join!(
        manifests.fetch_manifest(source),
        manifests.fetch_manifest(target),
    )?;
    let (forward, reverse) = futures::try_join!(
        diff(commits, &source_manifest, &target_manifest),
        diff(commits, &target_manifest, &source_manifest),
    )?;
    debug!(
        "changelog done: {} repos forward, {} repos reverse",
        forward.len(),
        reverse.len()
    );
    Ok(Artifacts { forward, reverse })
}
