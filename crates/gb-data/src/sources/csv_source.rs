use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use csv::ReaderBuilder;

use gb_core::data::RecordSource;
use gb_core::GrantRecord;

use crate::config::NullConfig;
use crate::schema::ColumnMapping;
use crate::DataError;

/// CSV record source with header-based column mapping
pub struct CsvRecordSource {
    /// Path to the CSV file
    path: PathBuf,
    /// Field delimiter
    delimiter: u8,
    /// Cell values treated as absent
    null_config: NullConfig,
}

impl CsvRecordSource {
    /// Create a new CSV source from a file path
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            delimiter: b',',
            null_config: NullConfig::default(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_null_config(mut self, null_config: NullConfig) -> Self {
        self.null_config = null_config;
        self
    }

    /// Load and validate every row
    pub async fn read_records(&self) -> Result<Vec<GrantRecord>, DataError> {
        tokio::task::spawn_blocking({
            let path = self.path.clone();
            let delimiter = self.delimiter;
            let nulls = self.null_config.clone();
            move || -> Result<Vec<GrantRecord>, DataError> {
                let file = File::open(&path)?;
                let records = Self::read_from(BufReader::new(file), delimiter, &nulls)?;
                tracing::info!("Read {} records from {}", records.len(), path.display());
                Ok(records)
            }
        })
        .await?
    }

    /// Parse CSV from any reader. Row numbers in errors are 1-based and
    /// exclude the header.
    pub fn read_from<R: std::io::Read>(
        reader: R,
        delimiter: u8,
        nulls: &NullConfig,
    ) -> Result<Vec<GrantRecord>, DataError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let mapping = ColumnMapping::detect(headers.iter())?;

        let mut records = Vec::new();
        for (idx, result) in csv_reader.records().enumerate() {
            let row = result?;
            records.push(mapping.parse_row(idx + 1, &row, nulls)?);
        }

        Ok(records)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSource for CsvRecordSource {
    async fn load(&self) -> anyhow::Result<Vec<GrantRecord>> {
        Ok(self.read_records().await?)
    }

    fn source_name(&self) -> &str {
        self.path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.csv")
    }
}
