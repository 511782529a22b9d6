//! # restdb Gateway
//!
//! Outbound access to remote tables.
//!
//! ```text
//! TableGateway (port)
//!   ├── HttpGateway    - PostgREST over reqwest
//!   └── MemoryGateway  - in-process tables for tests and dry runs
//! ```

mod http;
mod in_memory;
mod table_gateway;

pub use http::HttpGateway;
pub use in_memory::MemoryGateway;
pub use table_gateway::{ensure_filtered, Page, TableGateway};
