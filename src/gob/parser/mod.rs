//! Parsers for host payloads: manifest XML and commit messages.

mod commit;
mod manifest;

pub use commit::{bugs, parse_git_commit, release_note, subject};
pub use manifest::parse_manifest;
