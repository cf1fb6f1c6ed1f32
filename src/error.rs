use std::path::PathBuf;

use thiserror::Error;

/// Failure to bring a dataset into memory. Fatal: the dashboard never starts.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{table}: file not found: {}", path.display())]
    NotFound { table: &'static str, path: PathBuf },

    #[error("{table}: failed to read {}: {source}", path.display())]
    Io {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{table}: {} is not valid delimited data: {source}", path.display())]
    Parse {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{table}: {} has no header row", path.display())]
    MissingHeader { table: &'static str, path: PathBuf },
}

/// A panel cannot be built from its bound table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    #[error("column `{column}` not found in table `{table}`")]
    Missing {
        table: &'static str,
        column: &'static str,
    },

    #[error("table `{table}` row {row}, column `{column}`: {message}")]
    InvalidValue {
        table: &'static str,
        row: usize,
        column: &'static str,
        message: String,
    },
}
