//! Record ingestion for the grant browser
//!
//! This is the boundary where input shape is validated: a record without an
//! identity is rejected here, so the core pipeline can assume well-typed,
//! if sparsely populated, records.

pub mod config;
pub mod schema;
pub mod sources;

use thiserror::Error;
use tokio::task::JoinError;

use gb_core::data::RecordSource;

// Re-exports
pub use config::{BrowserConfig, NullConfig, SourceConfig, SourceFormat};
pub use schema::ColumnMapping;
pub use sources::{CsvRecordSource, JsonRecordSource};

/// Errors that can occur while loading records
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("Record {row} has no identity")]
    MissingIdentity { row: usize },

    #[error("Record {row}: invalid value '{value}' in column '{column}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Required column '{0}' not found")]
    MissingColumn(String),

    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Join error: {0}")]
    Join(#[from] JoinError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}

/// Open a record source, choosing the reader by format or file extension
pub fn open_source(source: &SourceConfig, null_config: NullConfig) -> Result<Box<dyn RecordSource>, DataError> {
    let path = source.path.as_path();
    let format = match source.format {
        Some(format) => format,
        None => SourceFormat::from_path(path)?,
    };

    tracing::debug!("Opening {:?} source at {}", format, path.display());

    Ok(match format {
        SourceFormat::Json => Box::new(JsonRecordSource::new(path.to_path_buf())),
        SourceFormat::Csv => Box::new(
            CsvRecordSource::new(path.to_path_buf())
                .with_delimiter(source.delimiter_byte()?)
                .with_null_config(null_config),
        ),
    })
}
