use super::naming::{field_ident, runtime_crate, unique_name};
use super::plan::EntityParams;
use crate::column_mapping::column_filter_type;
use crate::types::ColumnMeta;
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use std::collections::HashSet;

pub fn generate_root(entities: &[EntityParams]) -> TokenStream {
    let mut used: HashSet<String> = HashSet::new();

    let list_queries: Vec<TokenStream> = entities
        .iter()
        .map(|entity: &EntityParams| {
            let name = unique_name(&mut used, &entity.table.name, "table");
            generate_list_query(entity, &name)
        })
        .collect();

    let single_queries: Vec<TokenStream> = entities
        .iter()
        .filter_map(|entity: &EntityParams| {
            let column = entity.primary_key()?;
            let name = unique_name(&mut used, &format!("{}_by_pk", entity.table.name), "key");
            Some(generate_single_query(entity, column, &name))
        })
        .collect();

    quote! {
        pub struct QueryRoot;

        #[async_graphql::Object]
        impl QueryRoot {
            #(#list_queries)*
            #(#single_queries)*
        }

        pub type AppSchema = async_graphql::Schema<QueryRoot, async_graphql::EmptyMutation, async_graphql::EmptySubscription>;

        /// The pool is shared schema data; `Loaders` must be added per request.
        pub fn build_schema(pool: sqlx::PgPool) -> AppSchema {
            async_graphql::Schema::build(QueryRoot, async_graphql::EmptyMutation, async_graphql::EmptySubscription)
                .data(pool)
                .finish()
        }
    }
}

/// `<table>(filter, limit)` listing rows of one table.
pub fn generate_list_query(entity: &EntityParams, name: &str) -> TokenStream {
    let rt = runtime_crate();
    let method = field_ident(name);
    let entity_name: &Ident = &entity.type_name;

    let (filter_arg, filter_value) = if entity.has_filter() {
        let filter_name: &Ident = &entity.filter_name;
        (
            quote! { filter: Option<#filter_name>, },
            quote! { filter.map(#filter_name::into_filter) },
        )
    } else {
        (quote! {}, quote! { None })
    };

    quote! {
        #[graphql(name = #name)]
        pub async fn #method(
            &self,
            ctx: &async_graphql::Context<'_>,
            #filter_arg
            limit: Option<i32>,
        ) -> async_graphql::Result<Vec<#entity_name>> {
            let pool = ctx.data::<sqlx::PgPool>()?;
            let query = #rt::filter::QueryArgs::new(#filter_value, limit.map(|limit: i32| limit.max(0) as u64));
            let (sql, args) = #rt::filter::sql(#entity_name::SELECT_SQL, Vec::new(), &query);
            #rt::sql::fetch_all(pool, &sql, &args).await.map_err(graphql_error)
        }
    }
}

/// `<table>_by_pk(<pk>)` for tables with a single-column primary key.
pub fn generate_single_query(entity: &EntityParams, column: &ColumnMeta, name: &str) -> TokenStream {
    let rt = runtime_crate();
    let method = field_ident(name);
    let entity_name: &Ident = &entity.type_name;
    let key = field_ident(&column.column_name);
    let key_name = &column.column_name;
    let key_type = column_filter_type(column);

    quote! {
        #[graphql(name = #name)]
        pub async fn #method(
            &self,
            ctx: &async_graphql::Context<'_>,
            #[graphql(name = #key_name)] #key: #key_type,
        ) -> async_graphql::Result<Option<#entity_name>> {
            let pool = ctx.data::<sqlx::PgPool>()?;
            let args = [#rt::sql::Value::from(#key)];
            #rt::sql::fetch_optional(pool, #entity_name::BY_PK_SQL, &args).await.map_err(graphql_error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::plan::plan_entities;
    use crate::schema::Schema;
    use crate::types::{PrimaryKeyMeta, TableMeta};

    #[test]
    fn list_and_single_queries() {
        let schema = Schema::new(vec![
            TableMeta::new("public", "book")
                .with_column(ColumnMeta::new("book_id", "integer", 1).not_null())
                .with_primary_key(PrimaryKeyMeta {
                    constraint_name: "book_pkey".into(),
                    column_positions: vec![1],
                }),
            TableMeta::new("public", "blob").with_column(ColumnMeta::new("data", "bytea", 1)),
        ])
        .unwrap();
        let entities = plan_entities(&schema);

        let tokens = generate_root(&entities).to_string();

        assert!(tokens.contains("pub async fn book (& self , ctx : & async_graphql :: Context < '_ > , filter : Option < BookFilter > , limit : Option < i32 > ,)"));
        assert!(tokens.contains("pub async fn blob (& self , ctx : & async_graphql :: Context < '_ > , limit : Option < i32 > ,)"));
        assert!(tokens.contains("pub async fn book_by_pk"));
        assert!(tokens.contains("Book :: BY_PK_SQL"));
        assert!(!tokens.contains("blob_by_pk"));
    }
}
