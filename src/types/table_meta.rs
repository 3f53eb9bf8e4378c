use super::column_meta::ColumnMeta;
use super::foreign_key_meta::ForeignKeyMeta;
use super::primary_key_meta::PrimaryKeyMeta;
use crate::column_mapping::{quote_ident, select_expr};

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TableMeta {
    pub schema: String,
    pub name: String,
    pub columns: Vec<ColumnMeta>, // ordered by ordinal position
    pub primary_keys: Vec<PrimaryKeyMeta>,
    pub foreign_keys: Vec<ForeignKeyMeta>,
}

impl TableMeta {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_column(mut self, column: ColumnMeta) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_foreign_key(mut self, foreign_key: ForeignKeyMeta) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn with_primary_key(mut self, primary_key: PrimaryKeyMeta) -> Self {
        self.primary_keys.push(primary_key);
        self.mark_primary_keys();
        self
    }

    pub fn column_at(&self, position: i32) -> Option<&ColumnMeta> {
        self.columns
            .iter()
            .find(|column: &&ColumnMeta| column.ordinal_position == position)
    }

    /// The column of a single-column primary key, if the table has one.
    pub fn primary_key_column(&self) -> Option<&ColumnMeta> {
        self.primary_keys
            .iter()
            .find(|pk: &&PrimaryKeyMeta| pk.is_single_column())
            .and_then(|pk: &PrimaryKeyMeta| self.column_at(pk.column_positions[0]))
    }

    pub fn mark_primary_keys(&mut self) {
        let positions: Vec<i32> = self
            .primary_keys
            .iter()
            .flat_map(|pk: &PrimaryKeyMeta| pk.column_positions.iter().copied())
            .collect();

        for column in self.columns.iter_mut() {
            column.is_primary_key = positions.contains(&column.ordinal_position);
        }
    }

    /// `"<schema>"."<table>"`, independent of the connection's search path.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.name))
    }

    pub fn columns_sql(&self) -> String {
        self.columns
            .iter()
            .map(select_expr)
            .collect::<Vec<String>>()
            .join(",")
    }

    /// `select <columns> from <schema>.<table> where 1=1`, optionally narrowed
    /// to `<key> = any($1)` for batched loads.
    pub fn select_sql(&self, key: Option<&str>) -> String {
        let mut sql = format!("select {} from {} where 1=1", self.columns_sql(), self.qualified_name());
        if let Some(key) = key {
            sql.push_str(" and ");
            sql.push_str(&quote_ident(key));
            sql.push_str(" = any($1)");
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn book() -> TableMeta {
        TableMeta::new("public", "book")
            .with_column(ColumnMeta::new("book_id", "integer", 1).not_null())
            .with_column(ColumnMeta::new("title", "text", 2))
            .with_column(ColumnMeta::new("language_id", "integer", 4))
            .with_primary_key(PrimaryKeyMeta {
                constraint_name: "book_pkey".into(),
                column_positions: vec![1],
            })
    }

    #[test]
    fn column_at_matches_catalog_position_not_index() {
        let table = book();

        assert_eq!(table.column_at(4).map(|c| c.column_name.as_str()), Some("language_id"));
        assert_eq!(table.column_at(3), None);
        assert_eq!(table.column_at(0), None);
    }

    #[test]
    fn select_sql() {
        let table = book();

        assert_eq!(
            table.select_sql(None),
            r#"select "book_id","title","language_id" from "public"."book" where 1=1"#
        );
        assert_eq!(
            table.select_sql(Some("language_id")),
            r#"select "book_id","title","language_id" from "public"."book" where 1=1 and "language_id" = any($1)"#
        );
    }

    #[test]
    fn reserved_names_outside_public() {
        let table = TableMeta::new("inventory", "user")
            .with_column(ColumnMeta::new("id", "integer", 1))
            .with_column(ColumnMeta::new("order", "text", 2));

        assert_eq!(table.qualified_name(), r#""inventory"."user""#);
        assert_eq!(
            table.select_sql(Some("id")),
            r#"select "id","order" from "inventory"."user" where 1=1 and "id" = any($1)"#
        );
    }

    #[test]
    fn primary_key_marks_columns() {
        let table = book();

        assert!(table.columns[0].is_primary_key);
        assert!(!table.columns[1].is_primary_key);
        assert_eq!(table.primary_key_column().map(|c| c.column_name.as_str()), Some("book_id"));
    }
}
