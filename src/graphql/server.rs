use super::naming::runtime_crate;
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};

/// `main.rs` of a generated crate: a poem server exposing the schema at `/`
/// with a fresh `Loaders` per request.
pub fn generate_server(package_name: &str) -> TokenStream {
    let rt = runtime_crate();
    let lib: Ident = format_ident!("{}", package_name.replace('-', "_"));

    quote! {
        use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
        use async_graphql_poem::{GraphQLRequest, GraphQLResponse};
        use poem::web::{Data, Html};
        use poem::{get, handler, listener::TcpListener, EndpointExt, IntoResponse, Route, Server};
        use #rt::batcher::RequestScope;
        use #lib::{build_schema, AppSchema, Loaders};

        #[handler]
        async fn graphql_playground() -> impl IntoResponse {
            Html(playground_source(GraphQLPlaygroundConfig::new("/")))
        }

        #[handler]
        async fn graphql(schema: Data<&AppSchema>, pool: Data<&sqlx::PgPool>, req: GraphQLRequest) -> GraphQLResponse {
            let scope = RequestScope::default();
            let _guard = scope.drop_guard();
            let loaders = Loaders::new(pool.0, &scope);

            schema.execute(req.0.data(loaders)).await.into()
        }

        #[tokio::main]
        async fn main() -> Result<(), Box<dyn std::error::Error>> {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
                )
                .init();

            let uri = std::env::var("PG_URI")?;
            let pool = sqlx::PgPool::connect(&uri).await?;
            let schema = build_schema(pool.clone());

            let app = Route::new()
                .at("/", get(graphql_playground).post(graphql))
                .data(schema)
                .data(pool);

            tracing::info!("Playground: http://localhost:8000");

            Server::new(TcpListener::bind("0.0.0.0:8000")).run(app).await?;

            Ok(())
        }
    }
}
