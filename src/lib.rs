//! Relog - release changelogs and build provenance for manifest-pinned builds
//!
//! A release-engineering tool for build systems that pin every component
//! repository to an exact revision through a manifest-snapshot repository.
//!
//! This library provides:
//! - [`changelog`]: commits that differ between two build manifests
//! - [`findbuild`]: earliest build containing a given change
//! - [`gob`]: Gitiles-style and Gerrit-style host clients
//! - [`model`]: domain models
//! - [`cli`], [`logging`], [`error`]: the command-line surface

pub mod changelog;
pub mod cli;
pub mod error;
pub mod findbuild;
pub mod gob;
pub mod logging;
pub mod model;
