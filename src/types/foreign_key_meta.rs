#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForeignKeyMeta {
    pub constraint_name: String,
    pub foreign_table_name: String,
    pub local_column_positions: Vec<i32>,   // conkey
    pub foreign_column_positions: Vec<i32>, // confkey
}

impl ForeignKeyMeta {
    pub fn new(
        constraint_name: impl Into<String>,
        foreign_table_name: impl Into<String>,
        local_column_positions: Vec<i32>,
        foreign_column_positions: Vec<i32>,
    ) -> Self {
        Self {
            constraint_name: constraint_name.into(),
            foreign_table_name: foreign_table_name.into(),
            local_column_positions,
            foreign_column_positions,
        }
    }

    // Traversal only ever follows the first column pair of a composite key.
    pub fn local_position(&self) -> Option<i32> {
        self.local_column_positions.first().copied()
    }

    pub fn foreign_position(&self) -> Option<i32> {
        self.foreign_column_positions.first().copied()
    }

    pub fn is_composite(&self) -> bool {
        self.local_column_positions.len() > 1 || self.foreign_column_positions.len() > 1
    }
}
