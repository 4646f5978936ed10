use std::future::Future;
use std::io;

use tokio::sync::broadcast;

use foldersync_core::MirrorConfig;
use foldersync_sync::{MirrorEngine, MirrorLog, PassReport};

use crate::error::{io_err, DaemonError};
use crate::log_sink::{FileLog, SinkOptions};
use crate::scheduler::Scheduler;

/// Validate `config`, open its log file and wire up the engine.
pub fn build_scheduler(
    config: &MirrorConfig,
    sink: SinkOptions,
) -> Result<Scheduler<FileLog>, DaemonError> {
    config.validate()?;
    let log = FileLog::open(&config.log_file, sink)?;
    let engine = MirrorEngine::new(&config.source, &config.replica, log).with_dry_run(config.dry_run);
    Ok(Scheduler::new(engine, config.interval.as_duration()))
}

/// Start the daemon and block the current thread until it is interrupted.
///
/// Returns the number of passes run.
pub fn start_blocking(config: &MirrorConfig, sink: SinkOptions) -> Result<u64, DaemonError> {
    init_tracing();
    let scheduler = build_scheduler(config, sink)?;
    tracing::info!(
        source = %config.source.display(),
        replica = %config.replica.display(),
        interval = %config.interval,
        dry_run = config.dry_run,
        "starting mirror daemon",
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(scheduler))
}

/// Run a single pass and return its report.
pub fn run_once_blocking(config: &MirrorConfig, sink: SinkOptions) -> Result<PassReport, DaemonError> {
    init_tracing();
    let scheduler = build_scheduler(config, sink)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(scheduler.run_once())
}

/// Drive `scheduler` until Ctrl-C.
pub async fn run<L>(scheduler: Scheduler<L>) -> Result<u64, DaemonError>
where
    L: MirrorLog + Send + Sync + 'static,
{
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(4);

    let signal_handle = tokio::spawn(watch_interrupts(
        tokio::signal::ctrl_c,
        shutdown_tx.clone(),
    ));

    let result = scheduler.run(shutdown_rx).await;
    signal_handle.abort();
    drop(shutdown_tx);
    result
}

/// Exit code of a process stopped by a forced interrupt.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// A second interrupt arrived before the in-flight pass finished.
    Forced,
    /// The signal handler could not be installed or failed.
    Unavailable,
}

/// Turn the first interrupt into a graceful shutdown request. A second one
/// exits the process without waiting for the pass.
async fn watch_interrupts<F, Fut>(signal: F, shutdown: broadcast::Sender<()>)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if next_interrupt(signal, shutdown).await == Interrupt::Forced {
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }
}

async fn next_interrupt<F, Fut>(mut signal: F, shutdown: broadcast::Sender<()>) -> Interrupt
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if let Err(err) = signal().await {
        tracing::warn!(error = %err, "ctrl-c handler unavailable");
        return Interrupt::Unavailable;
    }
    tracing::info!("received ctrl-c, stopping after the current pass (press again to force)");
    let _ = shutdown.send(());

    match signal().await {
        Ok(()) => {
            tracing::warn!("received second ctrl-c, exiting immediately");
            Interrupt::Forced
        }
        Err(err) => {
            tracing::warn!(error = %err, "ctrl-c handler unavailable");
            Interrupt::Unavailable
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
