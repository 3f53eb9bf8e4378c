pub mod column_meta;
pub mod table_meta;
pub mod foreign_key_meta;
pub mod primary_key_meta;
pub mod reference_meta;

pub use column_meta::ColumnMeta;
pub use table_meta::TableMeta;
pub use foreign_key_meta::ForeignKeyMeta;
pub use primary_key_meta::PrimaryKeyMeta;
pub use reference_meta::{ReferenceMeta, UnresolvedReason, UnresolvedReference};
