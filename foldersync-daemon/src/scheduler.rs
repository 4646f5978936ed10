//! Fixed-interval scheduler driving the mirror engine.
//!
//! One pass at a time: a pass runs on the blocking pool, the loop awaits it,
//! then waits `interval` or until shutdown is signalled, whichever comes
//! first. A shutdown that arrives mid-pass takes effect once the pass ends.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use foldersync_sync::{MirrorEngine, MirrorLog, PassReport};

use crate::error::DaemonError;

pub struct Scheduler<L> {
    engine: Arc<MirrorEngine<L>>,
    interval: Duration,
}

impl<L> Scheduler<L>
where
    L: MirrorLog + Send + Sync + 'static,
{
    pub fn new(engine: MirrorEngine<L>, interval: Duration) -> Self {
        Self {
            engine: Arc::new(engine),
            interval,
        }
    }

    /// Run exactly one pass.
    pub async fn run_once(&self) -> Result<PassReport, DaemonError> {
        let engine = Arc::clone(&self.engine);
        let report = tokio::task::spawn_blocking(move || engine.run_pass())
            .await
            .map_err(|err| DaemonError::Join(err.to_string()))??;

        tracing::debug!(
            status = ?report.status,
            actions = report.actions.len(),
            duration_ms = report.duration_ms as u64,
            "mirror pass finished",
        );
        Ok(report)
    }

    /// Loop until `shutdown` fires (or its sender is dropped).
    ///
    /// Returns the number of passes run. A log sink failure ends the loop
    /// with an error.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<u64, DaemonError> {
        let mut passes = 0u64;
        loop {
            self.run_once().await?;
            passes += 1;

            tokio::select! {
                _ = shutdown.recv() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        tracing::info!(passes, "scheduler stopped");
        Ok(passes)
    }
}
