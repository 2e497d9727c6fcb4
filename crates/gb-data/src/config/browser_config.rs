//! Browser configuration file

use std::path::{Path, PathBuf};

use gb_core::{Coordinate, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};

use super::null_handling::NullConfig;
use crate::DataError;

/// Half-width of the display jitter, in degrees
pub const DEFAULT_JITTER: f64 = 0.005;

/// Administrative center used for unresolved regions (Moscow)
pub const DEFAULT_COORDINATE: Coordinate = Coordinate::new(55.7558, 37.6173);

/// Record file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Json,
    Csv,
}

impl SourceFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(SourceFormat::Json),
            "csv" => Ok(SourceFormat::Csv),
            _ => Err(DataError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Where records come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the record file
    pub path: PathBuf,

    /// Explicit format; detected from the extension when absent
    #[serde(default)]
    pub format: Option<SourceFormat>,

    /// CSV field delimiter, a single ASCII character
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_delimiter() -> char {
    ','
}

impl SourceConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
            delimiter: default_delimiter(),
        }
    }

    /// The delimiter as the byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Result<u8, DataError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(DataError::Config(format!(
                "delimiter must be an ASCII character (got '{}')",
                self.delimiter
            )))
        }
    }
}

/// Configuration for a browse session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Rows per table page
    pub page_size: usize,

    /// Display jitter half-width for overlapping map markers
    pub jitter: f64,

    /// Fallback coordinate for regions the gazetteer cannot place
    pub default_coordinate: Coordinate,

    /// Null handling for CSV cells
    pub null_config: NullConfig,

    /// Optional record source
    pub source: Option<SourceConfig>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            jitter: DEFAULT_JITTER,
            default_coordinate: DEFAULT_COORDINATE,
            null_config: NullConfig::default(),
            source: None,
        }
    }
}

impl BrowserConfig {
    /// Read and validate a JSON configuration file
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path)?;
        let config: BrowserConfig = serde_json::from_str(&text)?;
        config.validate()?;

        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), DataError> {
        if self.page_size == 0 {
            return Err(DataError::Config("page_size must be greater than 0".to_string()));
        }
        if !self.jitter.is_finite() || self.jitter < 0.0 {
            return Err(DataError::Config(format!(
                "jitter must be a finite, non-negative number (got {})",
                self.jitter
            )));
        }
        if let Some(source) = &self.source {
            source.delimiter_byte()?;
        }
        let Coordinate { lat, lng } = self.default_coordinate;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(DataError::Config(format!(
                "default_coordinate out of range: {}",
                self.default_coordinate
            )));
        }
        Ok(())
    }
}
