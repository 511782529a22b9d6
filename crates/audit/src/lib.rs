//! # restdb Audit
//!
//! Operation logging and batch pacing for restdb.

mod operation_log;
mod pacer;

pub use operation_log::{OperationEntry, OperationLog, OperationStats};
pub use pacer::{Pacer, DEFAULT_PAUSE};
