//! foldersync core library — domain types, run configuration, errors.
//!
//! Public API surface:
//! - [`types`] — [`SyncInterval`] and [`LogLevel`]
//! - [`config`] — [`MirrorConfig`] and root validation
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::MirrorConfig;
pub use error::ConfigError;
pub use types::{LogLevel, SyncInterval};
