#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimaryKeyMeta {
    pub constraint_name: String,
    pub column_positions: Vec<i32>,
}

impl PrimaryKeyMeta {
    pub fn is_single_column(&self) -> bool {
        self.column_positions.len() == 1
    }
}
