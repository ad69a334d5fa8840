pub mod loader;
pub mod record;

pub use loader::{load_table, load_table_from_reader};
pub use record::{Cell, Column, Record, Table};
