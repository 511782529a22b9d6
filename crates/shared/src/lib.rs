//! # restdb Shared
//!
//! Common types used across all restdb crates: the error taxonomy,
//! connection configuration and the JSON row aliases.

pub mod config;
pub mod error;
pub mod row;

// Re-exports
pub use config::*;
pub use error::*;
pub use row::*;
