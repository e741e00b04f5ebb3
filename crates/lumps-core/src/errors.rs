use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum LumpsError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Unrecognized {key}: {value}")]
    UnrecognizedConfiguration { key: String, value: String },
    #[error("Column '{0}' is not present in the energy balance series")]
    MissingColumn(String),
    #[error("Column '{name}' has {actual} values but the time axis has {expected}")]
    ColumnLengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Could not parse configuration: {0}")]
    ConfigParse(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience type for `Result<T, LumpsError>`.
pub type LumpsResult<T> = Result<T, LumpsError>;
