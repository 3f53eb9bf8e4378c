use crate::types::ColumnMeta;
use proc_macro2::TokenStream;
use quote::quote;

/// Rust type of a column as decoded by sqlx, without nullability.
/// Unknown types are read as text, see [`select_expr`].
pub fn column_base_type(column: &ColumnMeta) -> TokenStream {
    match column.column_type.as_str() {
        "smallint" => quote! { i16 },
        "integer" => quote! { i32 },
        "bigint" => quote! { i64 },
        "real" => quote! { f32 },
        "double precision" => quote! { f64 },
        "numeric" => quote! { rust_decimal::Decimal },
        "boolean" => quote! { bool },
        "text" | "character" | "character varying" | "name" => quote! { String },
        "uuid" => quote! { uuid::Uuid },
        "uuid[]" => quote! { Vec<uuid::Uuid> },
        "integer[]" => quote! { Vec<i32> },
        "text[]" => quote! { Vec<String> },
        "bytea" => quote! { Vec<u8> },
        "date" => quote! { chrono::NaiveDate },
        "timestamp without time zone" => quote! { chrono::NaiveDateTime },
        "timestamp with time zone" => quote! { chrono::DateTime<chrono::Utc> },
        "json" | "jsonb" => quote! { serde_json::Value },
        _ => quote! { String },
    }
}

pub fn column_type(column: &ColumnMeta) -> TokenStream {
    let base = column_base_type(column);

    if column.not_null {
        base
    } else {
        quote! { Option<#base> }
    }
}

/// Whether sqlx can decode the column natively; other columns are selected
/// with a `::text` cast.
pub fn is_native_type(column: &ColumnMeta) -> bool {
    matches!(
        column.column_type.as_str(),
        "smallint"
            | "integer"
            | "bigint"
            | "real"
            | "double precision"
            | "numeric"
            | "boolean"
            | "text"
            | "character"
            | "character varying"
            | "name"
            | "uuid"
            | "uuid[]"
            | "integer[]"
            | "text[]"
            | "bytea"
            | "date"
            | "timestamp without time zone"
            | "timestamp with time zone"
            | "json"
            | "jsonb"
    )
}

/// Double-quoted SQL identifier. Embedded quotes are doubled, so any
/// catalog name is safe to splice, reserved words included.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn select_expr(column: &ColumnMeta) -> String {
    let name = quote_ident(&column.column_name);
    if is_native_type(column) {
        name
    } else {
        format!("{}::text as {}", name, name)
    }
}

/// Value type of the column's `TypeFilter`, for columns that can be filtered.
pub fn column_filter_type(column: &ColumnMeta) -> Option<TokenStream> {
    match column.column_type.as_str() {
        "smallint" | "integer" => Some(quote! { i32 }),
        "bigint" => Some(quote! { i64 }),
        "real" | "double precision" => Some(quote! { f64 }),
        "boolean" => Some(quote! { bool }),
        "text" | "character" | "character varying" | "name" => Some(quote! { String }),
        "uuid" => Some(quote! { uuid::Uuid }),
        _ => None,
    }
}

/// Whether the column can key a batched loader (`LoaderKey`).
pub fn is_key_type(column: &ColumnMeta) -> bool {
    matches!(
        column.column_type.as_str(),
        "smallint" | "integer" | "bigint" | "text" | "character" | "character varying" | "name" | "uuid"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_columns_are_optional() {
        let id = ColumnMeta::new("id", "integer", 1).not_null();
        let title = ColumnMeta::new("title", "character varying", 2);

        assert_eq!(column_type(&id).to_string(), "i32");
        assert_eq!(column_type(&title).to_string(), "Option < String >");
    }

    #[test]
    fn unknown_types_are_read_as_text() {
        let point = ColumnMeta::new("location", "point", 3);

        assert_eq!(column_base_type(&point).to_string(), "String");
        assert_eq!(select_expr(&point), r#""location"::text as "location""#);
        assert_eq!(column_filter_type(&point).map(|t| t.to_string()), None);
        assert!(!is_key_type(&point));
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("order"), r#""order""#);
        assert_eq!(quote_ident("Mixed Case"), r#""Mixed Case""#);
        assert_eq!(quote_ident(r#"say "hi""#), r#""say ""hi""""#);
        assert_eq!(select_expr(&ColumnMeta::new("user", "integer", 1)), r#""user""#);
    }

    #[test]
    fn filter_types() {
        let pages = ColumnMeta::new("num_pages", "smallint", 5);
        let cost = ColumnMeta::new("cost", "numeric", 6);

        assert_eq!(column_filter_type(&pages).map(|t| t.to_string()), Some("i32".into()));
        assert_eq!(column_filter_type(&cost).map(|t| t.to_string()), None);
    }
}
