//! Cortex infrastructure layer
//!
//! Everything around the indexing core that touches the host system:
//! configuration loading, logging setup, the per-project cache layout,
//! source-control introspection, branch-store preparation, and the
//! debounced filesystem watcher.

pub mod branch;
pub mod cache;
pub mod config;
pub mod git;
pub mod logging;
pub mod watcher;

pub use branch::BranchSynchronizer;
pub use cache::CacheLayout;
pub use config::{AppConfig, ConfigLoader};
pub use git::GitSourceControl;
pub use watcher::FileWatcher;
