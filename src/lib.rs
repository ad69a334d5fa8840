//! Read-only service over a per-country population dataset: name and threshold
//! lookups over an in-memory table, plus bar and pie charts rendered to PNG.

pub mod chart;
pub mod cli;
pub mod config;
pub mod context;
pub mod data;
pub mod error;
pub mod query;
pub mod server;

pub use context::AppContext;
pub use data::{Record, Table};
pub use error::{ChartError, DataSourceError, QueryError};
