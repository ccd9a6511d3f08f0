//! Commit message parsing: subject line and structured trailers.

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;

use crate::gob::gitiles::GitCommit;
use crate::model::Commit;

const BUG_TRAILER: &str = "BUG=";
const RELEASE_NOTE_TRAILER: &str = "RELEASE_NOTE=";

/// Trailer values authors use for "no release note".
const NONE_MARKERS: [&str; 2] = ["none", "n/a"];

/// Timestamps as emitted by git web frontends, e.g.
/// `Tue Oct 01 12:00:00 2024 +0000`.
const GIT_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %Y %z";

/// Fixed output format of the `CommitTime` field.
const COMMIT_TIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Recognized bug trackers and the shorthand each entry is rewritten to.
/// First match wins; entries matching no tracker are dropped.
static BUG_REWRITES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new("^b/").expect("bug pattern"), "b/"),
        (Regex::new("^b:").expect("bug pattern"), "b/"),
        (Regex::new("^chromium.*:").expect("bug pattern"), "crbug/"),
        (Regex::new("^chrome.*:").expect("bug pattern"), "crbug/"),
    ]
});

/// First line of the commit message.
pub fn subject(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

/// Bug references from the first `BUG=` trailer line, in encounter order,
/// duplicates preserved. Absent or empty trailer yields an empty list.
pub fn bugs(message: &str) -> Vec<String> {
    let Some(line) = message
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(BUG_TRAILER))
    else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for entry in line[BUG_TRAILER.len()..].split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        for (pattern, shorthand) in BUG_REWRITES.iter() {
            if let Some(found) = pattern.find(entry) {
                out.push(format!("{shorthand}{}", &entry[found.end()..]));
                break;
            }
        }
    }
    out
}

/// Value of the first `RELEASE_NOTE=` trailer. Absent trailer and explicit
/// none-markers both yield the empty string.
pub fn release_note(message: &str) -> String {
    for line in message.lines().map(str::trim) {
        if let Some(note) = line.strip_prefix(RELEASE_NOTE_TRAILER) {
            let note = note.trim();
            if NONE_MARKERS.iter().any(|m| note.eq_ignore_ascii_case(m)) {
                return String::new();
            }
            return note.to_string();
        }
    }
    String::new()
}

fn commit_time(raw: &str) -> String {
    match DateTime::parse_from_str(raw, GIT_TIME_FORMAT) {
        Ok(time) => time.format(COMMIT_TIME_FORMAT).to_string(),
        // Keep unrecognized timestamps verbatim rather than dropping them.
        Err(_) => raw.to_string(),
    }
}

/// Convert a wire commit into a changelog record.
pub fn parse_git_commit(raw: &GitCommit) -> Commit {
    Commit {
        sha: raw.commit.clone(),
        author_name: raw
            .author
            .as_ref()
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "None".to_string()),
        committer_name: raw
            .committer
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "None".to_string()),
        subject: subject(&raw.message).to_string(),
        bugs: bugs(&raw.message),
        commit_time: raw
            .committer
            .as_ref()
            .map(|c| commit_time(&c.time))
            .unwrap_or_else(|| "None".to_string()),
        release_note: release_note(&raw.message),
    }
}
