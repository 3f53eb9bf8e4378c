#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ColumnMeta {
    pub column_name: String,   // as declared in the catalog
    pub column_type: String,   // atttypid::regtype, e.g. "integer"
    pub ordinal_position: i32, // attnum, 1-based
    pub not_null: bool,
    pub is_primary_key: bool,
}

impl ColumnMeta {
    pub fn new(column_name: impl Into<String>, column_type: impl Into<String>, ordinal_position: i32) -> Self {
        Self {
            column_name: column_name.into(),
            column_type: column_type.into(),
            ordinal_position,
            not_null: false,
            is_primary_key: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }
}
