//! # restdb CLI
//!
//! Command implementations behind the `restdb` binary.

pub mod commands;
pub mod context;
pub mod output;
