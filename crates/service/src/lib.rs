//! # restdb Service
//!
//! Integration layer: table operations with batching, paging and an
//! operation log, generic over any [`gateway::TableGateway`].

mod batch;
mod table_service;

pub use batch::{BatchFailure, BatchOutcome, BatchReport};
pub use table_service::{ServiceConfig, TableService, TableSummary};

// Re-export dependencies
pub use audit::{OperationLog, OperationStats, Pacer};
pub use gateway::{HttpGateway, MemoryGateway, TableGateway};
pub use query::{Filter, Order, QueryParams};
