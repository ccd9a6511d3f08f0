//! Data models for Relog
//!
//! This module contains host-independent data structures representing
//! builds, manifests, changelog commits and change identifiers.

mod build;
mod change;
mod commit;
mod manifest;

pub use build::BuildVersion;
pub use change::{ChangeSpec, RepoPrefix, ResolvedChange};
pub use commit::{Changelog, Commit, RepoLog};
pub use manifest::{Manifest, ManifestEntry};
