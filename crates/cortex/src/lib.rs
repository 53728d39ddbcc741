//! # Cortex
//!
//! The indexing core of a code-intelligence service: discovery, change
//! detection, tree-sitter extraction, chunking, embedding, and per-branch
//! sqlite persistence, with branch-store synchronization and a debounced
//! filesystem watcher on top.
//!
//! This facade crate wires the layer crates together for the `cortex`
//! binary and re-exports the public surface.

pub use cortex_application as application;
pub use cortex_domain as domain;
pub use cortex_infrastructure as infrastructure;
pub use cortex_providers as providers;

pub mod bootstrap;
