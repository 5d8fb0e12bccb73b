use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Requested {requested} records exceeds the limit of {limit}")]
    CapacityExceeded { requested: u64, limit: u64 },

    #[error("Cannot allocate buffer for {records} records")]
    Allocation { records: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GenResult<T> = Result<T, GenError>;
