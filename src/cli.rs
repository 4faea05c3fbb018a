use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{self, CommandReport};

#[derive(Debug, Parser)]
#[command(
    name = "reelgrid",
    version,
    about = "Reconcile a movie watch history into one deduplicated timeline and project it onto a calendar grid"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ingest an export folder (diary.json, reviews.json, ratings.json),
    /// deduplicate it, and write the historical snapshot
    Import {
        export_dir: PathBuf,
        /// Report what would happen without writing the snapshot
        #[arg(long)]
        dry_run: bool,
    },
    /// Re-run deduplication over the existing snapshot in place
    Dedupe {
        #[arg(long)]
        dry_run: bool,
    },
    /// Merge the snapshot with the live feed and write the calendar artifact
    Build {
        /// Read the live feed from a local file instead of fetching it
        #[arg(long)]
        feed_file: Option<PathBuf>,
        /// Build from historical data only
        #[arg(long)]
        skip_feed: bool,
        /// Skip automatic backdrop lookup (custom overrides still apply)
        #[arg(long)]
        skip_enrich: bool,
        #[arg(long)]
        dry_run: bool,
    },
    /// Report snapshot and calendar statistics
    Status,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let report = match cli.command {
        Command::Import {
            export_dir,
            dry_run,
        } => commands::import::run(&commands::import::ImportOptions {
            export_dir,
            dry_run,
        })?,
        Command::Dedupe { dry_run } => {
            commands::dedupe::run(&commands::dedupe::DedupeOptions { dry_run })?
        }
        Command::Build {
            feed_file,
            skip_feed,
            skip_enrich,
            dry_run,
        } => commands::build::run(&commands::build::BuildOptions {
            feed_file,
            skip_feed,
            skip_enrich,
            dry_run,
        })?,
        Command::Status => commands::status::run()?,
    };

    render(&report);
    if !report.ok {
        anyhow::bail!("{} failed", report.command);
    }
    Ok(())
}

fn render(report: &CommandReport) {
    println!("{}: {}", report.command, if report.ok { "ok" } else { "failed" });
    for detail in &report.details {
        println!("  {detail}");
    }
    for issue in &report.issues {
        eprintln!("  issue: {issue}");
    }
}
