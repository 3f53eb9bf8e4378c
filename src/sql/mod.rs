pub mod queryer;
pub mod value;

pub use queryer::{decode, fetch_all, fetch_optional, FromRow, LoaderKey, Queryer};
pub use value::Value;
