//! SQL for the Postgres backend: table mapping, statement builder, bind values.

pub mod builder;
pub mod mapping;
pub mod params;

pub use builder::{delete, insert, select_by_id, select_list, update, QueryBuf};
pub use mapping::{ColumnMapping, TableMapping};
pub use params::PgBindValue;
