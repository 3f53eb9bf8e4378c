pub mod entities;
pub mod loaders;
pub mod naming;
pub mod plan;
pub mod root_node;
pub mod server;
pub mod type_filter;

use crate::error::Result;
use crate::schema::Schema;
use crate::toml_generator::write_toml;
use proc_macro2::TokenStream;
use quote::quote;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

use entities::generate_graphql_entities;
use loaders::generate_loaders;
use plan::{plan_entities, EntityParams};
use root_node::generate_root;
use server::generate_server;
use type_filter::generate_type_filter;

/// The whole GraphQL module of a schema: records, object types, filters,
/// loaders and the query root. Output depends only on the schema.
pub fn generate_module(schema: &Schema) -> TokenStream {
    let entities: Vec<EntityParams> = plan_entities(schema);

    let type_filter = generate_type_filter();
    let entity_tokens: Vec<TokenStream> = generate_graphql_entities(&entities);
    let loaders = generate_loaders(&entities);
    let root = generate_root(&entities);

    debug!(entities = entities.len(), "generated module");

    quote! {
        fn graphql_error<E: std::fmt::Display>(err: E) -> async_graphql::Error {
            async_graphql::Error::new(err.to_string())
        }

        #type_filter

        #(#entity_tokens)*

        #loaders

        #root
    }
}

pub fn generate_source(schema: &Schema, format: bool) -> String {
    render(generate_module(schema), format)
}

fn render(tokens: TokenStream, format: bool) -> String {
    let source = tokens.to_string();
    if format {
        format_source(&source)
    } else {
        source
    }
}

/// Pipes `source` through rustfmt, falling back to the unformatted text.
pub fn format_source(source: &str) -> String {
    match run_rustfmt(source) {
        Ok(formatted) => formatted,
        Err(err) => {
            warn!(error = %err, "rustfmt failed, keeping unformatted source");
            source.to_string()
        }
    }
}

fn run_rustfmt(source: &str) -> std::io::Result<String> {
    let mut child = Command::new("rustfmt")
        .args(["--edition", "2021", "--emit", "stdout"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(source.as_bytes())?;
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ));
    }

    String::from_utf8(output.stdout).map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
}

pub struct GeneratorParams<'a> {
    pub package_name: &'a str,
    pub runtime_version: &'a str,
    pub format: bool,
}

/// Writes a runnable crate into `dir`: `Cargo.toml`, the module as
/// `src/lib.rs` and the server as `src/main.rs`.
pub fn write_graphql(dir: &Path, schema: &Schema, params: &GeneratorParams) -> Result<()> {
    let src = dir.join("src");
    fs::create_dir_all(&src)?;

    write_toml(dir, params.package_name, params.runtime_version)?;

    fs::write(src.join("lib.rs"), generate_source(schema, params.format))?;
    fs::write(
        src.join("main.rs"),
        render(generate_server(params.package_name), params.format),
    )?;

    info!(dir = %dir.display(), tables = schema.tables().count(), "wrote crate");

    Ok(())
}
