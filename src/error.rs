use thiserror::Error;

#[derive(Error, Debug)]
pub enum SahgaError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Allocation Error: cannot size table to {rows}x{cols}")]
    Allocation { rows: usize, cols: usize },

    #[error("Degenerate Column: column {column} has zero standard deviation")]
    DegenerateColumn { column: usize },

    #[error("Insufficient Rows: statistics need at least 2 rows, got {rows}")]
    InsufficientRows { rows: usize },

    #[error("Malformed Input: {0}")]
    MalformedInput(String),

    #[error("Empty Population: population size must be positive")]
    EmptyPopulation,

    #[error("Configuration Error: {0}")]
    Config(String),
}

pub type SahgaResult<T> = Result<T, SahgaError>;
