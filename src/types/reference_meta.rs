use super::column_meta::ColumnMeta;
use super::table_meta::TableMeta;

/// Resolved view of a foreign key, stored under the table it points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceMeta {
    pub name: String, // constraint name
    pub owning_table: TableMeta,
    pub local_column: ColumnMeta,
    pub foreign_table: String,
    pub foreign_column: ColumnMeta,
}

impl ReferenceMeta {
    pub fn is_self_reference(&self) -> bool {
        self.owning_table.name == self.foreign_table
    }
}

/// A foreign key whose columns could not be resolved against the scanned tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub name: String,
    pub owning_table: String,
    pub foreign_table: String,
    pub reason: UnresolvedReason,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnresolvedReason {
    MissingForeignTable,
    MissingForeignColumn,
    MissingLocalColumn,
}

impl std::fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnresolvedReason::MissingForeignTable => write!(f, "foreign table is not in the scanned schema"),
            UnresolvedReason::MissingForeignColumn => write!(f, "foreign column position not found"),
            UnresolvedReason::MissingLocalColumn => write!(f, "local column position not found"),
        }
    }
}
