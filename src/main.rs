//! Relog - release changelogs and build provenance
//!
//! Binary entry point: flag parsing, log setup and artifact writing. All
//! engine work lives in the library.

use std::fs;

use clap::Parser;
use tracing::{error, info};

use relog::changelog;
use relog::cli::{Cli, Command};
use relog::findbuild::{self, FindBuildRequest};
use relog::gob::{GitilesClient, SnapshotRepo};
use relog::logging;
use relog::model::{BuildVersion, Changelog};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    logging::init(cli.debug);

    if let Err(err) = run(cli).await {
        error!("{err:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> color_eyre::Result<()> {
    match cli.command {
        Command::Changelog {
            gob,
            repo,
            source,
            target,
        } => generate_changelog(&gob, &repo, &source, &target).await,
        Command::Findbuild {
            gob,
            gerrit,
            fallback,
            prefix,
            repo,
            change,
        } => {
            let request = FindBuildRequest {
                gerrit: &gerrit,
                fallback: Some(fallback.as_str()),
                prefix: prefix.as_deref(),
                gob: &gob,
                manifest_repo: &repo,
                change: &change,
            };
            let found = findbuild::find_build(&request).await?;
            info!("Build: {}", found.build);
            Ok(())
        }
    }
}

async fn generate_changelog(
    gob: &str,
    repo: &str,
    source: &str,
    target: &str,
) -> color_eyre::Result<()> {
    let client = GitilesClient::new(gob);
    let snapshots = SnapshotRepo::new(client.clone(), repo);
    snapshots.validate().await?;

    let source = BuildVersion::parse(source);
    let target = BuildVersion::parse(target);
    let artifacts = changelog::assemble(&snapshots, &client, &source, &target).await?;

    // Both artifacts exist before either file is written, so a failed run
    // leaves nothing behind.
    write_artifact(&source, &target, &artifacts.forward)?;
    write_artifact(&target, &source, &artifacts.reverse)?;
    Ok(())
}

fn write_artifact(
    source: &BuildVersion,
    target: &BuildVersion,
    artifact: &Changelog,
) -> color_eyre::Result<()> {
    let name = format!("{source} -> {target}.json");
    fs::write(&name, serde_json::to_string_pretty(artifact)?)?;
    info!("wrote {name}");
    Ok(())
}
