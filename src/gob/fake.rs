//! In-memory hosts for engine tests.
//!
//! `FakeHistory` models commit graphs with git range semantics, so walker
//! and locator tests exercise the same ancestry rules the wire clients rely
//! on, without any HTTP.

use std::collections::{HashMap, HashSet};

use super::{ChangeInfo, ChangeLookup, CommitSource, GitCommit, Ident, LogPage, ManifestSource};
use crate::error::Error;
use crate::model::{BuildVersion, ChangeSpec, Manifest};

fn ident(name: &str) -> Option<Ident> {
    Some(Ident {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        time: "Tue Oct 01 12:00:00 2024 +0000".to_string(),
    })
}

/// Commit graphs for any number of repositories.
///
/// Insertion order must be topological (parents before children); log pages
/// come back in reverse insertion order, newest first, like a real host.
#[derive(Debug, Default)]
pub struct FakeHistory {
    repos: HashMap<String, Vec<GitCommit>>,
}

impl FakeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_commit(&mut self, repo: &str, sha: &str, parents: &[&str], message: &str) {
        let commit = GitCommit {
            commit: sha.to_string(),
            parents: parents.iter().map(|p| p.to_string()).collect(),
            author: ident("A Author"),
            committer: ident("C Committer"),
            message: message.to_string(),
        };
        self.repos.entry(repo.to_string()).or_default().push(commit);
    }

    /// Linear chain, oldest first. The first sha becomes a root commit.
    pub fn add_linear(&mut self, repo: &str, shas: &[&str]) {
        for (i, sha) in shas.iter().enumerate() {
            if i == 0 {
                self.add_commit(repo, sha, &[], &format!("commit {sha}\n"));
            } else {
                self.add_commit(repo, sha, &[shas[i - 1]], &format!("commit {sha}\n"));
            }
        }
    }

    fn reachable(&self, repo: &str, tip: &str) -> Option<HashSet<String>> {
        let commits = self.repos.get(repo)?;
        let by_sha: HashMap<&str, &GitCommit> =
            commits.iter().map(|c| (c.commit.as_str(), c)).collect();
        by_sha.get(tip)?;
        let mut seen: HashSet<String> = HashSet::new();
        let mut stack = vec![tip.to_string()];
        while let Some(sha) = stack.pop() {
            if !seen.insert(sha.clone()) {
                continue;
            }
            if let Some(commit) = by_sha.get(sha.as_str()) {
                stack.extend(commit.parents.iter().cloned());
            }
        }
        Some(seen)
    }
}

impl CommitSource for FakeHistory {
    async fn log_page(
        &self,
        repo: &str,
        from: Option<&str>,
        to: &str,
        limit: usize,
        token: Option<&str>,
    ) -> Result<LogPage, Error> {
        let not_found = |reference: &str| Error::NotFound {
            repo: repo.to_string(),
            reference: reference.to_string(),
        };
        let commits = self.repos.get(repo).ok_or_else(|| not_found(to))?;
        let wanted = self.reachable(repo, to).ok_or_else(|| not_found(to))?;
        let excluded = match from {
            Some(from) => self.reachable(repo, from).ok_or_else(|| not_found(from))?,
            None => HashSet::new(),
        };

        let selected: Vec<&GitCommit> = commits
            .iter()
            .rev()
            .filter(|c| wanted.contains(&c.commit) && !excluded.contains(&c.commit))
            .collect();
        let offset: usize = token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let log: Vec<GitCommit> = selected
            .iter()
            .skip(offset)
            .take(limit)
            .map(|c| (*c).clone())
            .collect();
        let consumed = offset + log.len();
        let next = (consumed < selected.len()).then(|| consumed.to_string());
        Ok(LogPage { log, next })
    }
}

/// Snapshot store keyed by version, insertion order oldest to newest.
#[derive(Debug, Default)]
pub struct FakeManifests {
    builds: Vec<(String, Manifest)>,
}

impl FakeManifests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, version: &str, manifest: Manifest) {
        self.builds.push((version.to_string(), manifest));
    }

    /// Build sequence in insertion order.
    pub fn versions(&self) -> Vec<BuildVersion> {
        self.builds
            .iter()
            .map(|(v, _)| BuildVersion::parse(v))
            .collect()
    }
}

impl ManifestSource for FakeManifests {
    async fn fetch_manifest(&self, version: &BuildVersion) -> Result<Manifest, Error> {
        self.builds
            .iter()
            .find(|(v, _)| v == version.as_str())
            .map(|(_, m)| m.clone())
            .ok_or_else(|| Error::InvalidVersion {
                version: version.to_string(),
            })
    }
}

/// Review host answering canned queries.
#[derive(Debug, Default)]
pub struct FakeLookup {
    host: String,
    answers: HashMap<String, Vec<ChangeInfo>>,
}

impl FakeLookup {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            answers: HashMap::new(),
        }
    }

    pub fn answer(&mut self, query: &str, changes: Vec<ChangeInfo>) {
        self.answers.insert(query.to_string(), changes);
    }
}

impl ChangeLookup for FakeLookup {
    async fn query_change(&self, spec: &ChangeSpec) -> Result<Vec<ChangeInfo>, Error> {
        Ok(self.answers.get(&spec.query()).cloned().unwrap_or_default())
    }

    fn host(&self) -> &str {
        &self.host
    }
}

/// Shorthand for a change query result.
pub fn change(number: u64, project: &str, status: &str, sha: &str) -> ChangeInfo {
    ChangeInfo {
        number,
        project: project.to_string(),
        status: status.to_string(),
        current_revision: Some(sha.to_string()),
        submitted: (status == "MERGED").then(|| "2024-10-01 12:00:00.000000000".to_string()),
    }
}

/// Shorthand for a manifest literal.
pub fn manifest(entries: &[(&str, &str)]) -> Manifest {
    entries
        .iter()
        .map(|(name, rev)| (name.to_string(), rev.to_string()))
        .collect()
}
