//! Generates a GraphQL API crate from a PostgreSQL schema, and provides the
//! runtime that crate links against: batched foreign-key loaders and the
//! filter compiler.

pub mod batcher;
pub mod column_mapping;
pub mod config;
pub mod database_schema;
pub mod error;
pub mod filter;
pub mod graphql;
pub mod schema;
pub mod sql;
pub mod toml_generator;
pub mod types;

pub use error::{Error, Result};
