//! # Murmur Library
//!
//! This library exposes the Murmur modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod cli;

// Re-export murmur_core for convenience
pub use murmur_core;
