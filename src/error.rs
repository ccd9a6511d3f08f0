//! Error taxonomy shared by the changelog and findbuild engines.
//!
//! Structural configuration problems (host, repository, prefix) are detected
//! before any version- or change-specific lookup and abort immediately. All
//! other variants propagate unchanged to the command boundary, where they
//! decide the process exit code.

use thiserror::Error;

/// Errors produced while building changelogs or attributing changes to builds.
#[derive(Error, Debug)]
pub enum Error {
    /// No snapshot exists for the requested build version.
    #[error("no build snapshot found for version {version}")]
    InvalidVersion { version: String },

    /// The git-hosting or review instance cannot be reached.
    #[error("cannot reach host {host}: {reason}")]
    InvalidHost { host: String, reason: String },

    /// The repository does not exist on the instance.
    #[error("repository {repo} not found on {host}")]
    InvalidRepo { repo: String, host: String },

    /// A commit reference is unknown to the repository.
    #[error("unknown reference {reference} in repository {repo}")]
    NotFound { repo: String, reference: String },

    /// The two references share no common ancestry.
    #[error("{from} and {to} share no common history in repository {repo}")]
    DisjointHistory {
        repo: String,
        from: String,
        to: String,
    },

    /// The input is not a review number, change-id or commit hash.
    #[error("{input} is not a recognized change identifier")]
    InvalidChange { input: String },

    /// No change matched the identifier on the queried host.
    #[error("no change found for {change}")]
    ChangeNotFound { change: String },

    /// The change exists but has not been merged.
    #[error("change {change} is {state}; only merged changes enter a build")]
    ChangeNotMerged { change: String, state: String },

    /// The identifier maps to more than one merged change.
    #[error("{change} matches {count} merged changes, refusing to pick one")]
    AmbiguousChange { change: String, count: usize },

    /// The repository prefix rewrite rule is malformed.
    #[error("invalid repository prefix {prefix:?}")]
    InvalidPrefix { prefix: String },

    /// No known build contains the resolved commit.
    #[error("no build in range contains commit {sha} of {repo}")]
    BuildNotFound { repo: String, sha: String },

    /// Transport-level failure after the retry budget was exhausted.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The host answered with an unexpected HTTP status.
    #[error("{url} answered {status}")]
    Http {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The host answered with a payload we could not interpret.
    #[error("malformed {what}: {reason}")]
    Malformed { what: String, reason: String },
}
