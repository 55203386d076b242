//! cordprep-common — Shared error type used across the cordprep crates.

pub mod error;

pub use error::{CordPrepError, Result};
