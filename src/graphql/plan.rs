use super::naming::{field_ident, type_ident, unique_name, unique_type_name, RESERVED_TYPES};
use crate::column_mapping::{column_base_type, column_filter_type, is_key_type};
use crate::schema::Schema;
use crate::types::{ColumnMeta, ReferenceMeta, TableMeta};
use proc_macro2::Ident;
use quote::format_ident;
use std::collections::{HashMap, HashSet};
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Follows the foreign key from the owning row to the referenced row.
    ToOne,
    /// Follows it backwards, from the referenced row to every owning row.
    ToMany,
}

/// One relation field and the loader backing it.
#[derive(Clone, Debug)]
pub struct EdgeParams<'a> {
    pub reference: &'a ReferenceMeta,
    pub direction: Direction,
    pub target: &'a TableMeta,
    pub target_type: Ident,
    pub field_name: String,
    pub loader_field: Ident,
}

impl<'a> EdgeParams<'a> {
    /// Column of the resolving row whose value keys the load.
    pub fn source_column(&self) -> &'a ColumnMeta {
        match self.direction {
            Direction::ToOne => &self.reference.local_column,
            Direction::ToMany => &self.reference.foreign_column,
        }
    }

    /// Column of the target table the loader is keyed by.
    pub fn key_column(&self) -> &'a ColumnMeta {
        match self.direction {
            Direction::ToOne => &self.reference.foreign_column,
            Direction::ToMany => &self.reference.local_column,
        }
    }

    pub fn load_sql(&self) -> String {
        self.target.select_sql(Some(&self.key_column().column_name))
    }
}

#[derive(Clone, Debug)]
pub struct EntityParams<'a> {
    pub table: &'a TableMeta,
    /// Rust and GraphQL name of the object type.
    pub type_name: Ident,
    /// Rust and GraphQL name of the filter input.
    pub filter_name: Ident,
    pub edges: Vec<EdgeParams<'a>>,
}

impl<'a> EntityParams<'a> {
    pub fn filter_columns(&self) -> impl Iterator<Item = &'a ColumnMeta> {
        self.table
            .columns
            .iter()
            .filter(|column: &&ColumnMeta| column_filter_type(column).is_some())
    }

    pub fn has_filter(&self) -> bool {
        self.filter_columns().next().is_some()
    }

    /// Primary key column usable as a `<table>_by_pk` argument.
    pub fn primary_key(&self) -> Option<&'a ColumnMeta> {
        self.table
            .primary_key_column()
            .filter(|column: &&ColumnMeta| column_filter_type(column).is_some())
    }
}

/// Both ends of a reference must share a loader key type.
fn supports_loader(reference: &ReferenceMeta) -> bool {
    is_key_type(&reference.local_column)
        && is_key_type(&reference.foreign_column)
        && column_base_type(&reference.local_column).to_string()
            == column_base_type(&reference.foreign_column).to_string()
}

fn loader_field(reference: &ReferenceMeta, direction: Direction) -> Ident {
    let suffix = match direction {
        Direction::ToOne => "one",
        Direction::ToMany => "many",
    };
    let base = field_ident(&format!("{}_{}", reference.owning_table.name, reference.name));
    format_ident!("{}_{}", base.to_string().trim_start_matches("r#"), suffix)
}

/// Object and filter type names per table, in schema order. Names already
/// taken by the fixed items of the module get a numeric suffix.
fn type_names(schema: &Schema) -> HashMap<&str, (Ident, Ident)> {
    let mut used: HashSet<String> = RESERVED_TYPES.iter().map(|name| name.to_string()).collect();

    schema
        .tables()
        .map(|table| {
            let type_name = unique_type_name(&mut used, &type_ident(&table.name).to_string());
            let filter_name = unique_type_name(&mut used, &format!("{}Filter", type_name));

            (
                table.name.as_str(),
                (format_ident!("{}", type_name), format_ident!("{}", filter_name)),
            )
        })
        .collect()
}

/// Walks tables in schema order and, for each, its forward then reverse
/// references in index order. Relation names that clash with a column or an
/// earlier relation of the same type are qualified with the constraint name.
pub fn plan_entities(schema: &Schema) -> Vec<EntityParams<'_>> {
    let names = type_names(schema);

    schema
        .tables()
        .filter_map(|table| {
            let (type_name, filter_name) = names.get(table.name.as_str())?.clone();

            let mut used: HashSet<String> = table
                .columns
                .iter()
                .map(|column: &ColumnMeta| column.column_name.clone())
                .collect();

            let mut edges: Vec<EdgeParams> = Vec::new();

            for reference in schema.references_from(&table.name) {
                if !supports_loader(reference) {
                    warn!(constraint = %reference.name, table = %table.name, "key type cannot be batched, skipping relation");
                    continue;
                }
                let (Some(target), Some((target_type, _))) = (
                    schema.table(&reference.foreign_table),
                    names.get(reference.foreign_table.as_str()),
                ) else {
                    continue;
                };

                edges.push(EdgeParams {
                    reference,
                    direction: Direction::ToOne,
                    target,
                    target_type: target_type.clone(),
                    field_name: unique_name(&mut used, &reference.foreign_table, &reference.name),
                    loader_field: loader_field(reference, Direction::ToOne),
                });
            }

            for reference in schema.references_to(&table.name) {
                if !supports_loader(reference) {
                    continue;
                }
                let Some((target_type, _)) = names.get(reference.owning_table.name.as_str()) else {
                    continue;
                };

                edges.push(EdgeParams {
                    reference,
                    direction: Direction::ToMany,
                    target: &reference.owning_table,
                    target_type: target_type.clone(),
                    field_name: unique_name(&mut used, &reference.name, &reference.owning_table.name),
                    loader_field: loader_field(reference, Direction::ToMany),
                });
            }

            Some(EntityParams {
                table,
                type_name,
                filter_name,
                edges,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ForeignKeyMeta;
    use pretty_assertions::assert_eq;

    fn field_names(entity: &EntityParams) -> Vec<(String, Direction)> {
        entity
            .edges
            .iter()
            .map(|edge| (edge.field_name.clone(), edge.direction))
            .collect()
    }

    #[test]
    fn forward_and_reverse_names() {
        let schema = Schema::new(vec![
            TableMeta::new("public", "foobar")
                .with_column(ColumnMeta::new("foo", "integer", 1))
                .with_column(ColumnMeta::new("baz_ref", "integer", 3))
                .with_foreign_key(ForeignKeyMeta::new("bazquux_fk", "bazquux", vec![3], vec![1])),
            TableMeta::new("public", "bazquux").with_column(ColumnMeta::new("baz", "integer", 1)),
        ])
        .unwrap();

        let entities = plan_entities(&schema);

        assert_eq!(field_names(&entities[0]), vec![("bazquux".to_string(), Direction::ToOne)]);
        assert_eq!(field_names(&entities[1]), vec![("bazquux_fk".to_string(), Direction::ToMany)]);

        let forward = &entities[0].edges[0];
        assert_eq!(forward.source_column().column_name, "baz_ref");
        assert_eq!(forward.key_column().column_name, "baz");
        assert_eq!(
            forward.load_sql(),
            r#"select "baz" from "public"."bazquux" where 1=1 and "baz" = any($1)"#
        );
        assert_eq!(forward.loader_field.to_string(), "foobar_bazquux_fk_one");

        let reverse = &entities[1].edges[0];
        assert_eq!(reverse.source_column().column_name, "baz");
        assert_eq!(
            reverse.load_sql(),
            r#"select "foo","baz_ref" from "public"."foobar" where 1=1 and "baz_ref" = any($1)"#
        );
        assert_eq!(reverse.loader_field.to_string(), "foobar_bazquux_fk_many");
    }

    #[test]
    fn self_reference_gets_both_edges() {
        let schema = Schema::new(vec![TableMeta::new("public", "employee")
            .with_column(ColumnMeta::new("employee_id", "integer", 1))
            .with_column(ColumnMeta::new("manager_id", "integer", 2))
            .with_foreign_key(ForeignKeyMeta::new("fk_manager", "employee", vec![2], vec![1]))])
        .unwrap();

        let entities = plan_entities(&schema);

        assert_eq!(
            field_names(&entities[0]),
            vec![
                ("employee".to_string(), Direction::ToOne),
                ("fk_manager".to_string(), Direction::ToMany),
            ]
        );
        assert_ne!(entities[0].edges[0].loader_field, entities[0].edges[1].loader_field);
    }

    #[test]
    fn clashing_names_are_qualified() {
        let schema = Schema::new(vec![
            TableMeta::new("public", "country").with_column(ColumnMeta::new("id", "integer", 1)),
            TableMeta::new("public", "route")
                .with_column(ColumnMeta::new("country", "integer", 1))
                .with_column(ColumnMeta::new("destination", "integer", 2))
                .with_foreign_key(ForeignKeyMeta::new("fk_origin", "country", vec![1], vec![1]))
                .with_foreign_key(ForeignKeyMeta::new("fk_destination", "country", vec![2], vec![1])),
        ])
        .unwrap();

        let entities = plan_entities(&schema);

        assert_eq!(
            field_names(&entities[1]),
            vec![
                ("country_by_fk_origin".to_string(), Direction::ToOne),
                ("country_by_fk_destination".to_string(), Direction::ToOne),
            ]
        );
    }

    #[test]
    fn type_names_avoid_each_other_and_fixed_items() {
        let schema = Schema::new(vec![
            TableMeta::new("public", "book").with_column(ColumnMeta::new("id", "integer", 1)),
            TableMeta::new("public", "book_filter").with_column(ColumnMeta::new("id", "integer", 1)),
            TableMeta::new("public", "loaders").with_column(ColumnMeta::new("id", "integer", 1)),
            TableMeta::new("public", "int").with_column(ColumnMeta::new("id", "integer", 1)),
        ])
        .unwrap();

        let names: Vec<(String, String)> = plan_entities(&schema)
            .iter()
            .map(|entity| (entity.type_name.to_string(), entity.filter_name.to_string()))
            .collect();

        assert_eq!(
            names,
            vec![
                ("Book".to_string(), "BookFilter".to_string()),
                ("BookFilter2".to_string(), "BookFilter2Filter".to_string()),
                ("Loaders2".to_string(), "Loaders2Filter".to_string()),
                ("Int2".to_string(), "Int2Filter".to_string()),
            ]
        );
    }

    #[test]
    fn mismatched_key_types_are_skipped() {
        let schema = Schema::new(vec![
            TableMeta::new("public", "account").with_column(ColumnMeta::new("id", "bigint", 1)),
            TableMeta::new("public", "login")
                .with_column(ColumnMeta::new("account_id", "integer", 1))
                .with_foreign_key(ForeignKeyMeta::new("fk_account", "account", vec![1], vec![1])),
        ])
        .unwrap();

        let entities = plan_entities(&schema);

        assert!(entities.iter().all(|entity| entity.edges.is_empty()));
    }
}
