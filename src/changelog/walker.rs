//! Commit history walker.
//!
//! Walks the commits reachable from `to` but not from `from`, newest first,
//! fetching pages on demand and converting each wire commit into a
//! changelog record. A walk is consumed as it goes and cannot be restarted.

use std::collections::VecDeque;

use crate::error::Error;
use crate::gob::{CommitSource, GitCommit, parser};
use crate::model::Commit;

/// First page size. Pages grow by [`PAGE_GROWTH`] up to [`MAX_PAGE_SIZE`],
/// so short diffs stay cheap and long histories need few round trips.
const FIRST_PAGE_SIZE: usize = 100;
const PAGE_GROWTH: usize = 5;
const MAX_PAGE_SIZE: usize = 10_000;

/// Bound on walks without a `from` boundary, as used for repositories that
/// exist in only one of the two manifests.
pub const ROOT_WALK_LIMIT: usize = 10_000;

pub struct CommitWalk<'a, S: CommitSource> {
    source: &'a S,
    repo: String,
    from: Option<String>,
    to: String,
    limit: Option<usize>,
    buffered: VecDeque<GitCommit>,
    token: Option<String>,
    page_size: usize,
    yielded: usize,
    started: bool,
    finished: bool,
}

impl<'a, S: CommitSource> CommitWalk<'a, S> {
    pub fn new(source: &'a S, repo: impl Into<String>, from: Option<&str>, to: &str) -> Self {
        Self {
            source,
            repo: repo.into(),
            from: from.map(str::to_string),
            to: to.to_string(),
            limit: None,
            buffered: VecDeque::new(),
            token: None,
            page_size: FIRST_PAGE_SIZE,
            yielded: 0,
            started: false,
            finished: false,
        }
    }

    /// Stop after at most `limit` commits. [`Self::collect`] reports whether
    /// the limit actually cut anything off.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Next commit, newest first. `Ok(None)` once the walk is exhausted.
    pub async fn next(&mut self) -> Result<Option<Commit>, Error> {
        if self.finished {
            return Ok(None);
        }
        if let Some(limit) = self.limit
            && self.yielded >= limit
        {
            self.finished = true;
            return Ok(None);
        }
        if self.buffered.is_empty() {
            self.fill().await?;
        }
        let Some(raw) = self.buffered.pop_front() else {
            self.finished = true;
            return Ok(None);
        };
        if raw.parents.is_empty() && self.from.is_some() {
            // A root commit can only show up when the exclusion boundary
            // shares no history with the tip; a shared root is always on the
            // boundary's side of the range.
            self.finished = true;
            return Err(Error::DisjointHistory {
                repo: self.repo.clone(),
                from: self.from.clone().unwrap_or_default(),
                to: self.to.clone(),
            });
        }
        self.yielded += 1;
        Ok(Some(parser::parse_git_commit(&raw)))
    }

    async fn fill(&mut self) -> Result<(), Error> {
        while self.buffered.is_empty() && (!self.started || self.token.is_some()) {
            let page = self
                .source
                .log_page(
                    &self.repo,
                    self.from.as_deref(),
                    &self.to,
                    self.page_size,
                    self.token.as_deref(),
                )
                .await?;
            self.started = true;
            self.token = page.next;
            self.buffered.extend(page.log);
            self.page_size = (self.page_size * PAGE_GROWTH).min(MAX_PAGE_SIZE);
        }
        Ok(())
    }

    /// Drain the walk. Returns the commits newest first and whether a limit
    /// cut the walk short of the full range.
    pub async fn collect(mut self) -> Result<(Vec<Commit>, bool), Error> {
        let mut commits = Vec::new();
        while let Some(commit) = self.next().await? {
            commits.push(commit);
        }
        let truncated = !self.buffered.is_empty() || self.token.is_some();
        Ok((commits, truncated))
    }
}
