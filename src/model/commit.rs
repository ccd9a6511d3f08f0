//! Changelog commit records and per-repository logs.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// One commit in a changelog artifact.
///
/// All seven fields are always present in the serialized form. `Bugs` may be
/// an empty array and `ReleaseNote` an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(rename = "SHA")]
    pub sha: String,
    #[serde(rename = "AuthorName")]
    pub author_name: String,
    #[serde(rename = "CommitterName")]
    pub committer_name: String,
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Bugs")]
    pub bugs: Vec<String>,
    #[serde(rename = "CommitTime")]
    pub commit_time: String,
    #[serde(rename = "ReleaseNote")]
    pub release_note: String,
}

/// Commit list for one repository, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoLog {
    #[serde(rename = "Commits")]
    pub commits: Vec<Commit>,
    /// Pinned revision on the source side, empty when the repository was
    /// absent from the source manifest.
    #[serde(rename = "SourceSHA", default)]
    pub source_sha: String,
    #[serde(rename = "TargetSHA", default)]
    pub target_sha: String,
    /// True when the walk was cut off by its query limit.
    #[serde(rename = "HasMoreCommits", default)]
    pub has_more_commits: bool,
}

/// One directional changelog artifact: repository name to its commit log.
///
/// Repository order follows the manifest of the direction's target build, so
/// it serializes as a JSON object with stable key order. Empty artifacts
/// serialize as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changelog {
    entries: Vec<(String, RepoLog)>,
}

impl Changelog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, repo: impl Into<String>, log: RepoLog) {
        self.entries.push((repo.into(), log));
    }

    pub fn get(&self, repo: &str) -> Option<&RepoLog> {
        self.entries
            .iter()
            .find(|(name, _)| name == repo)
            .map(|(_, log)| log)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RepoLog)> {
        self.entries.iter().map(|(name, log)| (name.as_str(), log))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no repository differs in this direction.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Changelog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (repo, log) in &self.entries {
            map.serialize_entry(repo, log)?;
        }
        map.end()
    }
}
