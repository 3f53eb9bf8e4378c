use crate::error::{Error, Result};
use crate::types::{
    ColumnMeta, ForeignKeyMeta, ReferenceMeta, TableMeta, UnresolvedReason, UnresolvedReference,
};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

/// Scanned tables plus the reference index built from their foreign keys.
///
/// Tables keep the order they were scanned in and references keep the order
/// their foreign keys were discovered in, so the same input always produces
/// the same generated source.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    tables: IndexMap<String, TableMeta>,
    references_by_foreign_table: IndexMap<String, Vec<ReferenceMeta>>,
    unresolved: Vec<UnresolvedReference>,
}

impl Schema {
    pub fn new(tables: Vec<TableMeta>) -> Result<Self> {
        let mut schema = Schema {
            tables: IndexMap::with_capacity(tables.len()),
            ..Default::default()
        };

        for table in tables {
            if schema.tables.contains_key(&table.name) {
                return Err(Error::DuplicateTable(table.name));
            }
            schema.tables.insert(table.name.clone(), table);
        }

        for table in schema.tables.values() {
            for fk in table.foreign_keys.iter() {
                match resolve_reference(&schema.tables, table, fk) {
                    Ok(reference) => schema
                        .references_by_foreign_table
                        .entry(fk.foreign_table_name.clone())
                        .or_default()
                        .push(reference),
                    Err(reason) => {
                        warn!(
                            constraint = %fk.constraint_name,
                            table = %table.name,
                            foreign_table = %fk.foreign_table_name,
                            %reason,
                            "skipping unresolved foreign key"
                        );
                        schema.unresolved.push(UnresolvedReference {
                            name: fk.constraint_name.clone(),
                            owning_table: table.name.clone(),
                            foreign_table: fk.foreign_table_name.clone(),
                            reason,
                        });
                    }
                }
            }
        }

        info!(
            tables = schema.tables.len(),
            references = schema.references_by_foreign_table.values().map(Vec::len).sum::<usize>(),
            unresolved = schema.unresolved.len(),
            "built schema graph"
        );

        Ok(schema)
    }

    pub fn table(&self, name: &str) -> Option<&TableMeta> {
        self.tables.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableMeta> {
        self.tables.values()
    }

    pub fn references(&self) -> impl Iterator<Item = &ReferenceMeta> {
        self.references_by_foreign_table.values().flatten()
    }

    /// Tables pointing at `table` (the to-many direction).
    pub fn references_to(&self, table: &str) -> &[ReferenceMeta] {
        self.references_by_foreign_table
            .get(table)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// References owned by `table` (the to-one direction), in index order.
    pub fn references_from<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a ReferenceMeta> + 'a {
        self.references()
            .filter(move |reference: &&ReferenceMeta| reference.owning_table.name == table)
    }

    pub fn unresolved(&self) -> &[UnresolvedReference] {
        &self.unresolved
    }
}

fn resolve_reference(
    tables: &IndexMap<String, TableMeta>,
    table: &TableMeta,
    fk: &ForeignKeyMeta,
) -> std::result::Result<ReferenceMeta, UnresolvedReason> {
    if fk.is_composite() {
        debug!(
            constraint = %fk.constraint_name,
            columns = fk.local_column_positions.len(),
            "composite foreign key, only the first column pair is followed"
        );
    }

    let foreign_table = tables
        .get(&fk.foreign_table_name)
        .ok_or(UnresolvedReason::MissingForeignTable)?;

    let foreign_column: &ColumnMeta = fk
        .foreign_position()
        .and_then(|position: i32| foreign_table.column_at(position))
        .ok_or(UnresolvedReason::MissingForeignColumn)?;

    let local_column: &ColumnMeta = fk
        .local_position()
        .and_then(|position: i32| table.column_at(position))
        .ok_or(UnresolvedReason::MissingLocalColumn)?;

    Ok(ReferenceMeta {
        name: fk.constraint_name.clone(),
        owning_table: table.clone(),
        local_column: local_column.clone(),
        foreign_table: fk.foreign_table_name.clone(),
        foreign_column: foreign_column.clone(),
    })
}
