use super::entities::edge_key_type;
use super::naming::{field_ident, runtime_crate};
use super::plan::{Direction, EdgeParams, EntityParams};
use proc_macro2::{Ident, TokenStream};
use quote::quote;

/// The per-request `Loaders` context object: one loader per edge, built
/// against the request's scope.
pub fn generate_loaders(entities: &[EntityParams]) -> TokenStream {
    let rt = runtime_crate();

    let edges: Vec<&EdgeParams> = entities
        .iter()
        .flat_map(|entity| entity.edges.iter())
        .collect();

    let fields: Vec<TokenStream> = edges
        .iter()
        .map(|edge: &&EdgeParams| {
            let loader = &edge.loader_field;
            let key_type = edge_key_type(edge);
            let target: &Ident = &edge.target_type;

            match edge.direction {
                Direction::ToOne => quote! {
                    pub #loader: #rt::batcher::OneLoader<#key_type, #target>
                },
                Direction::ToMany => quote! {
                    pub #loader: #rt::batcher::ManyLoader<#key_type, #target>
                },
            }
        })
        .collect();

    let constructors: Vec<TokenStream> = edges
        .iter()
        .map(|edge: &&EdgeParams| {
            let loader = &edge.loader_field;
            let target: &Ident = &edge.target_type;
            let sql = edge.load_sql();
            let key = edge.key_column();
            let key_field = field_ident(&key.column_name);

            let indexer: TokenStream = if key.not_null {
                quote! { |row: &#target| Some(row.#key_field.clone()) }
            } else {
                quote! { |row: &#target| row.#key_field.clone() }
            };

            quote! {
                #loader: #rt::batcher::Loader::new(
                    #rt::batcher::TableQuery::new(pool.clone(), #sql, #indexer),
                    scope,
                )
            }
        })
        .collect();

    let unused: Option<TokenStream> = edges.is_empty().then(|| {
        quote! {
            let _ = (pool, scope);
        }
    });

    quote! {
        pub struct Loaders {
            #(#fields),*
        }

        impl Loaders {
            /// Build one per request; loaders cache for their whole lifetime.
            pub fn new(pool: &sqlx::PgPool, scope: &#rt::batcher::RequestScope) -> Self {
                #unused
                Self {
                    #(#constructors),*
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::plan::plan_entities;
    use crate::schema::Schema;
    use crate::types::{ColumnMeta, ForeignKeyMeta, TableMeta};

    #[test]
    fn one_loader_per_edge() {
        let schema = Schema::new(vec![
            TableMeta::new("public", "publisher").with_column(ColumnMeta::new("publisher_id", "bigint", 1).not_null()),
            TableMeta::new("public", "book")
                .with_column(ColumnMeta::new("book_id", "integer", 1).not_null())
                .with_column(ColumnMeta::new("publisher_id", "bigint", 2))
                .with_foreign_key(ForeignKeyMeta::new("fk_book_pub", "publisher", vec![2], vec![1])),
        ])
        .unwrap();
        let entities = plan_entities(&schema);

        let tokens = generate_loaders(&entities).to_string();

        assert!(tokens.contains("pub book_fk_book_pub_many : :: pg_graphql_generator :: batcher :: ManyLoader < i64 , Book >"));
        assert!(tokens.contains("pub book_fk_book_pub_one : :: pg_graphql_generator :: batcher :: OneLoader < i64 , Publisher >"));
        assert!(tokens.contains(
            r#""select \"publisher_id\" from \"public\".\"publisher\" where 1=1 and \"publisher_id\" = any($1)""#
        ));
        assert!(tokens.contains("| row : & Publisher | Some (row . publisher_id . clone ())"));
        assert!(tokens.contains("| row : & Book | row . publisher_id . clone ()"));
        assert!(!tokens.contains("let _ = (pool , scope)"));
    }

    #[test]
    fn no_edges() {
        let schema = Schema::new(vec![TableMeta::new("public", "tag").with_column(ColumnMeta::new("id", "integer", 1))])
            .unwrap();
        let entities = plan_entities(&schema);

        let tokens = generate_loaders(&entities).to_string();

        assert!(tokens.contains("pub struct Loaders { }"));
        assert!(tokens.contains("let _ = (pool , scope) ;"));
    }
}
