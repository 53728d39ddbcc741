//! Unit test suite for cortex-providers
//!
//! Run with: `cargo test -p cortex-providers --test unit`

#[path = "unit/extractor_tests.rs"]
mod extractor_tests;

#[path = "unit/store_tests.rs"]
mod store_tests;
