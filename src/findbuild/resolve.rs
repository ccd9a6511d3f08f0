//! Change resolution against review hosts.
//!
//! A change identifier is resolved on the primary host first. Only a
//! definitive "no such change" moves on to the fallback host, at most once,
//! with the mirror prefix stripped from the resolved repository path.
//! Definitive negative answers (not merged, ambiguous) never fall back: the
//! fallback host would answer for a different change universe.

use tracing::debug;

use crate::error::Error;
use crate::gob::{ChangeInfo, ChangeLookup};
use crate::model::{ChangeSpec, RepoPrefix, ResolvedChange};

/// Fallback lookup target: the host plus an optional repository prefix its
/// mirrored projects carry.
pub struct Fallback<'a, L> {
    pub host: &'a L,
    pub prefix: Option<&'a RepoPrefix>,
}

/// Resolve a change identifier to its repository and canonical commit.
pub async fn resolve<L: ChangeLookup>(
    primary: &L,
    fallback: Option<Fallback<'_, L>>,
    spec: &ChangeSpec,
) -> Result<ResolvedChange, Error> {
    match (resolve_on(primary, None, spec).await, fallback) {
        (Err(Error::ChangeNotFound { .. }), Some(Fallback { host, prefix })) => {
            debug!(
                "{} does not know {spec}, trying {}",
                primary.host(),
                host.host()
            );
            resolve_on(host, prefix, spec).await
        }
        (answer, _) => answer,
    }
}

async fn resolve_on<L: ChangeLookup>(
    host: &L,
    prefix: Option<&RepoPrefix>,
    spec: &ChangeSpec,
) -> Result<ResolvedChange, Error> {
    let changes = host.query_change(spec).await?;
    if changes.is_empty() {
        return Err(Error::ChangeNotFound {
            change: spec.to_string(),
        });
    }
    let merged: Vec<&ChangeInfo> = changes.iter().filter(|c| c.is_merged()).collect();
    match merged.as_slice() {
        [] => Err(Error::ChangeNotMerged {
            change: spec.to_string(),
            state: changes[0].state_label().to_string(),
        }),
        [change] => {
            let sha = change
                .current_revision
                .clone()
                .ok_or_else(|| Error::Malformed {
                    what: format!("change {} on {}", change.number, host.host()),
                    reason: "merged change without a current revision".to_string(),
                })?;
            let repo = match prefix {
                Some(prefix) => prefix.strip(&change.project).to_string(),
                None => change.project.clone(),
            };
            debug!("resolved {spec} to {sha} in {repo}");
            Ok(ResolvedChange {
                repo,
                sha,
                number: change.number,
            })
        }
        many => Err(Error::AmbiguousChange {
            change: spec.to_string(),
            count: many.len(),
        }),
    }
}
