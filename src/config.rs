use crate::error::{Error, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pg_graphql_generator", version, about = "Generate a GraphQL API from a PostgreSQL schema")]
pub struct Args {
    /// Name of the generated package.
    #[arg(long, default_value = "turboql")]
    pub package_name: String,

    /// The schema name of postgres tables.
    #[arg(long, default_value = "public")]
    pub pg_schema: String,

    /// Connection string of the database to introspect.
    #[arg(long, env = "PG_URI", hide_env_values = true)]
    pub database_url: String,

    /// Write a complete crate into this directory instead of printing the
    /// generated module to stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Run the generated source through rustfmt.
    #[arg(long)]
    pub format: bool,

    /// Version of this crate the generated code depends on.
    #[arg(long, default_value = env!("CARGO_PKG_VERSION"))]
    pub runtime_version: String,
}

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub package_name: String,
    pub pg_schema: String,
    pub database_url: String,
    pub out: Option<PathBuf>,
    pub format: bool,
    pub runtime_version: String,
}

impl TryFrom<Args> for GeneratorConfig {
    type Error = Error;

    fn try_from(args: Args) -> Result<Self> {
        if args.database_url.trim().is_empty() {
            return Err(Error::Config("PG_URI is empty".into()));
        }

        let valid_package = !args.package_name.is_empty()
            && args
                .package_name
                .chars()
                .all(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid_package {
            return Err(Error::Config(format!("invalid package name {:?}", args.package_name)));
        }

        Ok(Self {
            package_name: args.package_name,
            pg_schema: args.pg_schema,
            database_url: args.database_url,
            out: args.out,
            format: args.format,
            runtime_version: args.runtime_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<GeneratorConfig> {
        let args = Args::try_parse_from(args).unwrap();
        GeneratorConfig::try_from(args)
    }

    #[test]
    fn defaults() {
        let config = parse(&["pg_graphql_generator", "--database-url", "postgres://localhost/db"]).unwrap();

        assert_eq!(config.package_name, "turboql");
        assert_eq!(config.pg_schema, "public");
        assert!(config.out.is_none());
        assert!(!config.format);
    }

    #[test]
    fn rejects_bad_package_name() {
        let err = parse(&[
            "pg_graphql_generator",
            "--database-url",
            "postgres://localhost/db",
            "--package-name",
            "my package",
        ])
        .unwrap_err();

        assert!(matches!(err, Error::Config(_)));
    }
}
