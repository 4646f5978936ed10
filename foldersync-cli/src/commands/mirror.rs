//! `foldersync <SOURCE> <REPLICA> <LOG_FILE> <INTERVAL>` — mirror forever, or once.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use foldersync_core::{MirrorConfig, SyncInterval};
use foldersync_daemon::{
    log_rotation::DEFAULT_MAX_LOG_BYTES, run_once_blocking, start_blocking, SinkOptions,
};
use foldersync_sync::{PassReport, PassStatus};

/// Positional arguments plus run-mode flags.
#[derive(Args, Debug)]
pub struct MirrorArgs {
    /// Directory to mirror. Never modified.
    pub source: PathBuf,

    /// Directory made identical to SOURCE on every pass.
    pub replica: PathBuf,

    /// File receiving the timestamped audit log (appended to).
    pub log_file: PathBuf,

    /// Seconds between passes; a positive integer.
    pub interval: SyncInterval,

    /// Run a single pass and exit.
    #[arg(long)]
    pub once: bool,

    /// Report what a pass would change without changing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the pass report as JSON (requires --once).
    #[arg(long, requires = "once")]
    pub json: bool,

    /// Do not echo log lines to the terminal.
    #[arg(long)]
    pub quiet: bool,

    /// Rotate the log file once it reaches this many bytes; 0 disables rotation.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_LOG_BYTES)]
    pub max_log_bytes: u64,
}

impl MirrorArgs {
    pub fn run(self) -> Result<()> {
        let config = MirrorConfig::new(&self.source, &self.replica, &self.log_file, self.interval)
            .with_dry_run(self.dry_run);
        let sink = SinkOptions {
            // JSON on stdout must stay parseable.
            console: !(self.quiet || self.json),
            max_bytes: (self.max_log_bytes > 0).then_some(self.max_log_bytes),
        };

        if !self.once {
            start_blocking(&config, sink).context("mirror daemon exited with error")?;
            return Ok(());
        }

        let report = run_once_blocking(&config, sink).context("mirror pass failed")?;
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report)
                    .context("failed to render pass report JSON")?
            );
        } else if !self.quiet {
            print_summary(&report);
        }
        Ok(())
    }
}

fn print_summary(report: &PassReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    match report.status {
        PassStatus::Completed => println!(
            "{prefix}{} pass completed in {} ms ({})",
            "✓".green(),
            report.duration_ms,
            report.counts()
        ),
        PassStatus::SourceMissing => println!(
            "{prefix}{} source folder missing; replica left untouched",
            "✗".red()
        ),
        PassStatus::ReplicaUnavailable => {
            println!("{prefix}{} replica folder unavailable", "✗".red())
        }
    }
}
