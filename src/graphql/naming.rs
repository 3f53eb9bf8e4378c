use heck::{ToSnakeCase, ToUpperCamelCase};
use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};
use std::collections::HashSet;

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static", "struct",
    "trait", "true", "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "gen",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

// Keywords that cannot be raw identifiers.
const RESERVED: &[&str] = &["self", "super", "crate", "_"];

/// Type names a table must not take: the fixed items of the generated module,
/// prelude types it refers to unqualified, and GraphQL built-in scalars.
pub const RESERVED_TYPES: &[&str] = &[
    "Loaders", "QueryRoot", "TypeFilter", "AppSchema", "IntFilter", "BigIntFilter", "FloatFilter",
    "BooleanFilter", "StringFilter", "UuidFilter", "Option", "Some", "None", "Result", "Ok", "Err", "Vec",
    "String", "Box", "Int", "Float", "Boolean", "ID", "Query",
];

/// Path of this crate as seen from generated code.
pub fn runtime_crate() -> TokenStream {
    let name = format_ident!("{}", env!("CARGO_CRATE_NAME"));
    quote! { ::#name }
}

/// snake_case identifier for a field or method.
pub fn field_ident(name: &str) -> Ident {
    let snake = name.to_snake_case();
    let snake = if snake.is_empty() || snake.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", snake)
    } else {
        snake
    };

    if RESERVED.contains(&snake.as_str()) {
        format_ident!("{}_", snake)
    } else if KEYWORDS.contains(&snake.as_str()) {
        Ident::new_raw(&snake, Span::call_site())
    } else {
        format_ident!("{}", snake)
    }
}

/// UpperCamelCase identifier for a table type.
pub fn type_ident(name: &str) -> Ident {
    let camel = name.to_upper_camel_case();
    if camel.is_empty() || camel.starts_with(|c: char| c.is_ascii_digit()) || camel == "Self" {
        format_ident!("T{}", camel)
    } else {
        format_ident!("{}", camel)
    }
}

/// Claims `preferred` in `used`, appending the first free number from 2 on.
pub fn unique_type_name(used: &mut HashSet<String>, preferred: &str) -> String {
    let mut candidate = preferred.to_string();
    let mut n = 2;
    while used.contains(&candidate) {
        candidate = format!("{}{}", preferred, n);
        n += 1;
    }

    used.insert(candidate.clone());
    candidate
}

/// Claims `preferred` in `used`, falling back to `<preferred>_by_<qualifier>`
/// and then a numeric suffix.
pub fn unique_name(used: &mut HashSet<String>, preferred: &str, qualifier: &str) -> String {
    let mut candidate = preferred.to_string();

    if used.contains(&candidate) {
        candidate = format!("{}_by_{}", preferred, qualifier);
    }

    let base = candidate.clone();
    let mut n = 2;
    while used.contains(&candidate) {
        candidate = format!("{}_{}", base, n);
        n += 1;
    }

    used.insert(candidate.clone());
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idents() {
        assert_eq!(field_ident("BookId").to_string(), "book_id");
        assert_eq!(field_ident("type").to_string(), "r#type");
        assert_eq!(field_ident("self").to_string(), "self_");
        assert_eq!(field_ident("2fa").to_string(), "_2fa");
        assert_eq!(type_ident("book_language").to_string(), "BookLanguage");
        assert_eq!(type_ident("2fa").to_string(), "T2fa");
    }

    #[test]
    fn unique_names() {
        let mut used: HashSet<String> = ["country".to_string()].into_iter().collect();

        assert_eq!(unique_name(&mut used, "country", "fk_a"), "country_by_fk_a");
        assert_eq!(unique_name(&mut used, "publisher", "fk_b"), "publisher");
        assert_eq!(unique_name(&mut used, "publisher", "fk_b"), "publisher_by_fk_b");
        assert_eq!(unique_name(&mut used, "publisher", "fk_b"), "publisher_by_fk_b_2");
    }

    #[test]
    fn unique_type_names() {
        let mut used: HashSet<String> = RESERVED_TYPES.iter().map(|name| name.to_string()).collect();

        assert_eq!(unique_type_name(&mut used, "Book"), "Book");
        assert_eq!(unique_type_name(&mut used, "Book"), "Book2");
        assert_eq!(unique_type_name(&mut used, "Book"), "Book3");
        assert_eq!(unique_type_name(&mut used, "QueryRoot"), "QueryRoot2");
    }
}
