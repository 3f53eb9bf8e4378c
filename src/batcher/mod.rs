//! Request-scoped batched loading of foreign-key edges.
//!
//! A loader gathers the keys its callers ask for during one scheduling
//! window, issues a single `= any($1)` query for the distinct keys and hands
//! each caller the rows of its key.

pub mod cardinality;
pub mod loader;
pub mod scope;
pub mod table_query;

pub use cardinality::{Cardinality, ToMany, ToOne};
pub use loader::{BatchFn, BatchState, LoadResult, Loader, ManyLoader, OneLoader};
pub use scope::{LoaderConfig, RequestScope};
pub use table_query::TableQuery;
