//! Command line definition.

use clap::{Parser, Subcommand};

/// Review host changes are resolved on by default.
pub const DEFAULT_GERRIT_URL: &str = "https://cos-review.googlesource.com";

/// Review host tried when the primary does not know a change.
pub const DEFAULT_FALLBACK_GERRIT_URL: &str = "https://chromium-review.googlesource.com";

/// Git-hosting instance the manifest snapshots live on.
pub const DEFAULT_GOB_INSTANCE: &str = "cos.googlesource.com";

/// Manifest-snapshot repository on that instance.
pub const DEFAULT_MANIFEST_REPO: &str = "cos/manifest-snapshots";

#[derive(Debug, Parser)]
#[command(
    name = "relog",
    version,
    about = "Changelogs between manifest-pinned builds, and first-build lookup for changes"
)]
pub struct Cli {
    /// Log debug messages
    #[arg(long, short = 'd', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write both directional changelogs between two builds as JSON files
    Changelog {
        /// Git-hosting instance serving the manifest snapshots
        #[arg(long, default_value = DEFAULT_GOB_INSTANCE)]
        gob: String,

        /// Manifest-snapshot repository
        #[arg(long, short = 'r', default_value = DEFAULT_MANIFEST_REPO)]
        repo: String,

        /// Source build number or image name
        source: String,

        /// Target build number or image name
        target: String,
    },

    /// Locate the earliest build that contains a change
    Findbuild {
        /// Git-hosting instance serving the manifest snapshots
        #[arg(long, default_value = DEFAULT_GOB_INSTANCE)]
        gob: String,

        /// Review host to resolve the change on
        #[arg(long, default_value = DEFAULT_GERRIT_URL)]
        gerrit: String,

        /// Review host tried when the primary does not know the change
        #[arg(long, default_value = DEFAULT_FALLBACK_GERRIT_URL)]
        fallback: String,

        /// Repository path prefix of mirrored projects on the fallback host
        #[arg(long)]
        prefix: Option<String>,

        /// Manifest-snapshot repository
        #[arg(long, short = 'r', default_value = DEFAULT_MANIFEST_REPO)]
        repo: String,

        /// Review number, change-id or commit hash
        change: String,
    },
}
