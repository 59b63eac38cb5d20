//! Database layer for the quill blog.
//!
//! Provides SQLite connection pooling (via `r2d2`) and the embedded static
//! schema. The blog keeps everything in one database file; a request handler
//! checks out at most one pooled connection and the pool guard returns it
//! when the handler finishes, on the success and failure paths alike.

mod pool;
mod schema;

pub use pool::{create_pool, DbPool, PoolError, PoolSettings};
pub use schema::{init_schema, SchemaError};
