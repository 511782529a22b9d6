//! # restdb Query
//!
//! PostgREST query-string building: filters (`eq.`, `is.null`,
//! `ilike.*x*`, `in.(...)`), select/order/limit/offset parameters and
//! `Range`/`Content-Range` handling.

mod filter;
mod params;
mod range;

pub use filter::{Filter, IsValue, Operator};
pub use params::{Order, QueryParams};
pub use range::{range_header, ContentRange};
