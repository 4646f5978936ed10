//! foldersync daemon runtime: scheduler loop, file log sink, log rotation.

mod error;
pub mod log_rotation;
pub mod log_sink;
mod runtime;
pub mod scheduler;

pub use error::DaemonError;
pub use log_sink::{FileLog, SinkOptions};
pub use runtime::{build_scheduler, run, run_once_blocking, start_blocking};
pub use scheduler::Scheduler;
