use thiserror::Error;

#[derive(Error, Debug)]
pub enum FactResolverError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid month {0}: must be between 1 and 12")]
    InvalidMonth(u32),

    #[error("Unknown project scope: {0}")]
    UnknownProject(String),

    #[error("Preference store unavailable: {0}")]
    PreferenceBackend(String),

    #[error("Invalid fact row {row}: {details}")]
    InvalidRow { row: usize, details: String },

    #[error("Could not open workbook {path}: {details}")]
    WorkbookOpen { path: String, details: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FactResolverError>;
