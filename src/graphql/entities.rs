use super::naming::{field_ident, runtime_crate};
use super::plan::{Direction, EdgeParams, EntityParams};
use crate::column_mapping::{column_base_type, column_filter_type, column_type, quote_ident};
use crate::types::{ColumnMeta, TableMeta};
use proc_macro2::{Ident, Literal, TokenStream};
use quote::quote;

pub fn generate_graphql_entities(entities: &[EntityParams]) -> Vec<TokenStream> {
    entities
        .iter()
        .map(|entity: &EntityParams| {
            let record = generate_record(entity);
            let object = generate_entity_object(entity);
            let filter = generate_entity_filters(entity);

            quote! {
                #record
                #object
                #filter
            }
        })
        .collect()
}

/// Record struct, its SQL constants and positional row mapping.
pub fn generate_record(entity: &EntityParams) -> TokenStream {
    let rt = runtime_crate();
    let table: &TableMeta = entity.table;
    let entity_name: &Ident = &entity.type_name;
    let table_name = table.qualified_name();
    let select_sql = table.select_sql(None);

    let fields: Vec<TokenStream> = table
        .columns
        .iter()
        .map(|column: &ColumnMeta| {
            let field = field_ident(&column.column_name);
            let field_type = column_type(column);

            quote! {
                pub #field: #field_type
            }
        })
        .collect();

    let decoders: Vec<TokenStream> = table
        .columns
        .iter()
        .enumerate()
        .map(|(index, column): (usize, &ColumnMeta)| {
            let field = field_ident(&column.column_name);
            let index = Literal::usize_unsuffixed(index);
            let column_name = &column.column_name;

            quote! {
                #field: #rt::sql::decode(row, #index, #column_name)?
            }
        })
        .collect();

    let column_names: Vec<&String> = table
        .columns
        .iter()
        .map(|column| &column.column_name)
        .collect();

    let by_pk_sql: Option<TokenStream> = entity.primary_key().map(|column: &ColumnMeta| {
        let sql = format!("{} and {} = $1", select_sql, quote_ident(&column.column_name));
        quote! {
            pub const BY_PK_SQL: &'static str = #sql;
        }
    });

    quote! {
        #[derive(Clone, Debug, PartialEq)]
        pub struct #entity_name {
            #(#fields),*
        }

        impl #entity_name {
            pub const TABLE: &'static str = #table_name;
            pub const COLUMNS: &'static [&'static str] = &[#(#column_names),*];
            pub const SELECT_SQL: &'static str = #select_sql;
            #by_pk_sql
        }

        impl #rt::sql::FromRow<sqlx::postgres::PgRow> for #entity_name {
            fn from_row(row: &sqlx::postgres::PgRow) -> #rt::Result<Self> {
                Ok(Self {
                    #(#decoders),*
                })
            }
        }
    }
}

pub fn generate_entity_object(entity: &EntityParams) -> TokenStream {
    let entity_name: &Ident = &entity.type_name;
    let graphql_name = entity_name.to_string();

    let getters: Vec<TokenStream> = generate_entity_getters(entity.table);
    let relations: Vec<TokenStream> = generate_entity_relations(entity);

    quote! {
        #[async_graphql::Object(name = #graphql_name)]
        impl #entity_name {
            #(#getters)*
            #(#relations)*
        }
    }
}

pub fn generate_entity_getters(table: &TableMeta) -> Vec<TokenStream> {
    table
        .columns
        .iter()
        .map(|column: &ColumnMeta| {
            let field = field_ident(&column.column_name);
            let field_type = column_type(column);
            let column_name = &column.column_name;

            quote! {
                #[graphql(name = #column_name)]
                pub async fn #field(&self) -> &#field_type {
                    &self.#field
                }
            }
        })
        .collect()
}

pub fn generate_entity_relations(entity: &EntityParams) -> Vec<TokenStream> {
    entity.edges.iter().map(generate_edge_resolver).collect()
}

/// Forward edges resolve to at most one row, reverse edges to every owning
/// row. A NULL key short-circuits without touching the loader.
pub fn generate_edge_resolver(edge: &EdgeParams) -> TokenStream {
    let method = field_ident(&edge.field_name);
    let field_name = &edge.field_name;
    let target: &Ident = &edge.target_type;
    let loader = &edge.loader_field;
    let source = edge.source_column();
    let source_field = field_ident(&source.column_name);

    let (return_type, empty) = match edge.direction {
        Direction::ToOne => (quote! { Option<#target> }, quote! { None }),
        Direction::ToMany => (quote! { Vec<#target> }, quote! { Vec::new() }),
    };

    let key: TokenStream = if source.not_null {
        quote! {
            let key = self.#source_field.clone();
        }
    } else {
        quote! {
            let Some(key) = self.#source_field.clone() else {
                return Ok(#empty);
            };
        }
    };

    quote! {
        #[graphql(name = #field_name)]
        pub async fn #method(&self, ctx: &async_graphql::Context<'_>) -> async_graphql::Result<#return_type> {
            let loaders = ctx.data::<Loaders>()?;
            #key
            loaders.#loader.load(key).await.map_err(graphql_error)
        }
    }
}

/// `<Table>Filter` input object, for tables with at least one filterable
/// column. Column names are fixed and quoted here, never taken from the request.
pub fn generate_entity_filters(entity: &EntityParams) -> TokenStream {
    if !entity.has_filter() {
        return quote! {};
    }

    let rt = runtime_crate();
    let filter_name: &Ident = &entity.filter_name;
    let graphql_name = filter_name.to_string();

    let columns: Vec<(&ColumnMeta, TokenStream)> = entity
        .filter_columns()
        .filter_map(|column| column_filter_type(column).map(|filter_type| (column, filter_type)))
        .collect();

    let fields: Vec<TokenStream> = columns
        .iter()
        .map(|(column, filter_type)| {
            let field = field_ident(&column.column_name);
            let column_name = &column.column_name;

            quote! {
                #[graphql(name = #column_name)]
                pub #field: Option<TypeFilter<#filter_type>>
            }
        })
        .collect();

    let inserts: Vec<TokenStream> = columns
        .iter()
        .map(|(column, _)| {
            let field = field_ident(&column.column_name);
            let column_name = quote_ident(&column.column_name);

            quote! {
                if let Some(column) = self.#field {
                    filter.insert(#column_name.to_string(), column.into_column_filter());
                }
            }
        })
        .collect();

    quote! {
        #[derive(async_graphql::InputObject, Clone, Debug, Default)]
        #[graphql(name = #graphql_name)]
        pub struct #filter_name {
            #(#fields),*
        }

        impl #filter_name {
            pub fn into_filter(self) -> #rt::filter::Filter {
                let mut filter = #rt::filter::Filter::new();
                #(#inserts)*
                filter
            }
        }
    }
}

/// Key type shared by both ends of an edge.
pub fn edge_key_type(edge: &EdgeParams) -> TokenStream {
    column_base_type(edge.key_column())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::plan::plan_entities;
    use crate::schema::Schema;
    use crate::types::{ForeignKeyMeta, PrimaryKeyMeta};

    fn schema() -> Schema {
        Schema::new(vec![
            TableMeta::new("public", "author")
                .with_column(ColumnMeta::new("author_id", "integer", 1).not_null())
                .with_column(ColumnMeta::new("name", "text", 2))
                .with_primary_key(PrimaryKeyMeta {
                    constraint_name: "author_pkey".into(),
                    column_positions: vec![1],
                }),
            TableMeta::new("public", "book")
                .with_column(ColumnMeta::new("book_id", "integer", 1).not_null())
                .with_column(ColumnMeta::new("author_id", "integer", 2))
                .with_column(ColumnMeta::new("cover", "bytea", 3))
                .with_foreign_key(ForeignKeyMeta::new("fk_book_author", "author", vec![2], vec![1])),
        ])
        .unwrap()
    }

    #[test]
    fn record_maps_columns_by_position() {
        let schema = schema();
        let entities = plan_entities(&schema);
        let tokens = generate_record(&entities[1]).to_string();

        assert!(tokens.contains("pub struct Book"));
        assert!(tokens.contains("pub author_id : Option < i32 >"));
        assert!(tokens.contains("decode (row , 2 , \"cover\")"));
        assert!(tokens.contains(r#"pub const TABLE : & 'static str = "\"public\".\"book\"""#));
        assert!(tokens.contains(r#""select \"book_id\",\"author_id\",\"cover\" from \"public\".\"book\" where 1=1""#));
        assert!(!tokens.contains("BY_PK_SQL"));
    }

    #[test]
    fn primary_key_lookup_sql() {
        let schema = schema();
        let entities = plan_entities(&schema);
        let tokens = generate_record(&entities[0]).to_string();

        assert!(tokens.contains(
            r#""select \"author_id\",\"name\" from \"public\".\"author\" where 1=1 and \"author_id\" = $1""#
        ));
    }

    #[test]
    fn nullable_key_short_circuits() {
        let schema = schema();
        let entities = plan_entities(&schema);
        let tokens = generate_edge_resolver(&entities[1].edges[0]).to_string();

        assert!(tokens.contains("name = \"author\""));
        assert!(tokens.contains("let Some (key) = self . author_id . clone () else"));
        assert!(tokens.contains("Option < Author >"));
        assert!(tokens.contains("loaders . book_fk_book_author_one . load (key)"));
    }

    #[test]
    fn reverse_edge_returns_list() {
        let schema = schema();
        let entities = plan_entities(&schema);
        let tokens = generate_edge_resolver(&entities[0].edges[0]).to_string();

        assert!(tokens.contains("name = \"fk_book_author\""));
        assert!(tokens.contains("Vec < Book >"));
        assert!(tokens.contains("let key = self . author_id . clone () ;"));
    }

    #[test]
    fn filter_skips_unfilterable_columns() {
        let schema = schema();
        let entities = plan_entities(&schema);
        let tokens = generate_entity_filters(&entities[1]).to_string();

        assert!(tokens.contains("pub struct BookFilter"));
        assert!(tokens.contains("TypeFilter < i32 >"));
        assert!(tokens.contains(r#"filter . insert ("\"author_id\"" . to_string ()"#));
        assert!(!tokens.contains("cover"));
    }
}
