//! Error types for coinshell.

use thiserror::Error;

/// Result type alias for coinshell operations.
pub type Result<T> = std::result::Result<T, CoinshellError>;

/// Errors raised while building or reshaping tabular results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoinshellError {
    /// A sort or projection referenced a column the table does not have.
    #[error("Unknown column '{column}'. Available columns: {}", available.join(", "))]
    UnknownColumn {
        /// The requested column name.
        column: String,
        /// Columns present in the table.
        available: Vec<String>,
    },

    /// Invalid history window.
    #[error(transparent)]
    Window(#[from] WindowError),
}

/// Error for invalid history windows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// Zero days of history were requested.
    #[error("Number of days must be a positive integer")]
    Empty,
}
