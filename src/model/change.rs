//! Change identifiers and their resolved form.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;

static COMMIT_SHA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{40}$").expect("commit sha regex"));
static CHANGE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^I[0-9a-fA-F]{40}$").expect("change id regex"));
static REVIEW_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("review number regex"));

/// A raw change identifier, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSpec {
    /// Numeric review number, e.g. `3781`.
    ReviewNumber(String),
    /// Gerrit-style change-id, e.g. `I7e549d…` (41 chars).
    ChangeId(String),
    /// Full 40-hex commit hash.
    CommitSha(String),
}

impl ChangeSpec {
    /// Classify a raw identifier. Classification is purely syntactic;
    /// anything that fits none of the three shapes is rejected here, before
    /// any host is contacted.
    pub fn classify(raw: &str) -> Result<Self, Error> {
        let raw = raw.trim();
        if COMMIT_SHA_RE.is_match(raw) {
            Ok(Self::CommitSha(raw.to_lowercase()))
        } else if CHANGE_ID_RE.is_match(raw) {
            Ok(Self::ChangeId(raw.to_string()))
        } else if REVIEW_NUMBER_RE.is_match(raw) {
            Ok(Self::ReviewNumber(raw.to_string()))
        } else {
            Err(Error::InvalidChange {
                input: raw.to_string(),
            })
        }
    }

    /// Review-host query string for this identifier.
    pub fn query(&self) -> String {
        match self {
            Self::CommitSha(sha) => format!("commit:{sha}"),
            Self::ChangeId(id) => format!("change:{id}"),
            Self::ReviewNumber(n) => format!("change:{n}"),
        }
    }
}

impl fmt::Display for ChangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommitSha(sha) => f.write_str(sha),
            Self::ChangeId(id) => f.write_str(id),
            Self::ReviewNumber(n) => f.write_str(n),
        }
    }
}

/// A change pinned to its repository and canonical commit.
///
/// Only merged changes with a single associated commit resolve to this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChange {
    /// Repository name as it appears in build manifests.
    pub repo: String,
    /// Canonical commit hash of the merged change.
    pub sha: String,
    /// Review number on the host that resolved the change.
    pub number: u64,
}

/// Path prefix used to translate repository names of a mirroring host back
/// to the names used by build manifests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPrefix(String);

impl RepoPrefix {
    /// Validate a prefix rule. Rejected shapes (empty, leading/trailing or
    /// doubled slashes, whitespace) would never match a repository path.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let invalid = raw.is_empty()
            || raw.starts_with('/')
            || raw.ends_with('/')
            || raw.contains("//")
            || raw.chars().any(char::is_whitespace);
        if invalid {
            return Err(Error::InvalidPrefix {
                prefix: raw.to_string(),
            });
        }
        Ok(Self(raw.to_string()))
    }

    /// Strip the prefix from a mirrored repository path. Paths outside the
    /// mirror namespace are returned unchanged.
    pub fn strip<'a>(&self, repo: &'a str) -> &'a str {
        repo.strip_prefix(self.0.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(repo)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
