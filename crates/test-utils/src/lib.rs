//! Shared test utilities for the raster pipeline workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic index grids with predictable values
//! - In-memory GeoTIFF encoding of those grids
//! - A temporary on-disk raster archive laid out like the upstream output
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
