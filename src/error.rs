use std::path::PathBuf;

use crate::chart::ChartKind;

/// Errors raised while loading the population dataset. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("failed to open dataset '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset has no header row")]
    MissingHeader,

    #[error("dataset is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: column '{column}' has invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("no population column for year {0}")]
    UnknownYear(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("no data found for {kind} chart entity {name}")]
    NotFound { kind: ChartKind, name: String },

    #[error("nothing to plot for {0}")]
    EmptySeries(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("drawing failed: {0}")]
    Drawing(String),
}
