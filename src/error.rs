use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("scan {what} for {table:?}: {source}")]
    Introspection {
        what: &'static str,
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("duplicate table {0:?} in the scanned schema")]
    DuplicateTable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("decode column {column:?}: {source}")]
    Decode {
        column: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("batch load cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("write manifest: {0}")]
    Manifest(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub fn introspection_error(what: &'static str, table: impl Into<String>) -> impl FnOnce(sqlx::Error) -> Error {
    let table = table.into();
    move |source| Error::Introspection {
        what,
        table,
        source,
    }
}
