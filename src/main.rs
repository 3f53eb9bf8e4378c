use anyhow::Context;
use clap::Parser;
use pg_graphql_generator::{
    config::{Args, GeneratorConfig},
    database_schema::scan_database_schema,
    graphql::{generate_source, write_graphql, GeneratorParams},
    schema::Schema,
};
use sqlx::PgPool;
use std::io::Write;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = GeneratorConfig::try_from(Args::parse())?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("connect to database")?;

    let tables = scan_database_schema(&pool, &config.pg_schema).await?;
    let schema = Schema::new(tables)?;

    match &config.out {
        Some(dir) => {
            let params = GeneratorParams {
                package_name: &config.package_name,
                runtime_version: &config.runtime_version,
                format: config.format,
            };
            write_graphql(dir, &schema, &params)?;
        }
        None => {
            let source = generate_source(&schema, config.format);
            std::io::stdout()
                .write_all(source.as_bytes())
                .context("write generated source")?;
        }
    }

    Ok(())
}
