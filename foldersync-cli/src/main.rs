//! foldersync — one-way directory mirroring daemon.
//!
//! # Usage
//!
//! ```text
//! foldersync <SOURCE> <REPLICA> <LOG_FILE> <INTERVAL> [--once] [--dry-run] [--json]
//!            [--quiet] [--max-log-bytes <BYTES>]
//! ```

mod commands;

use anyhow::Result;
use clap::Parser;

use commands::mirror::MirrorArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "foldersync",
    version,
    about = "Keep a replica directory byte-identical to a source directory",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    mirror: MirrorArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.mirror.run()
}
