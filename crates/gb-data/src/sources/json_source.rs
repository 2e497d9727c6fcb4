//! JSON record source

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use gb_core::data::RecordSource;
use gb_core::GrantRecord;

use crate::DataError;

/// Reads a JSON array of records using the wire field names
/// (`id`, `name`, `region`, `org`, `direction`, `contest`, `year`, `winner`,
/// `money_req_grant`, `coordinates`).
pub struct JsonRecordSource {
    path: PathBuf,
}

impl JsonRecordSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load and validate every record
    pub async fn read_records(&self) -> Result<Vec<GrantRecord>, DataError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::read_file(&path)).await?
    }

    fn read_file(path: &Path) -> Result<Vec<GrantRecord>, DataError> {
        let text = std::fs::read_to_string(path)?;
        let records = parse_records(&text)?;
        tracing::info!("Read {} records from {}", records.len(), path.display());
        Ok(records)
    }
}

/// Parse a JSON array of record objects.
///
/// Entries are checked for an identity before typed decoding so that a
/// missing id is reported as such rather than as a generic decode error.
pub fn parse_records(text: &str) -> Result<Vec<GrantRecord>, DataError> {
    let entries: Vec<Value> = serde_json::from_str(text)?;
    let mut records = Vec::with_capacity(entries.len());

    for (idx, entry) in entries.into_iter().enumerate() {
        let row = idx + 1;
        let has_id = entry
            .get("id")
            .map_or(false, |id| !id.is_null() && id.as_str() != Some(""));
        if !has_id {
            return Err(DataError::MissingIdentity { row });
        }
        records.push(serde_json::from_value(entry)?);
    }

    Ok(records)
}

#[async_trait]
impl RecordSource for JsonRecordSource {
    async fn load(&self) -> anyhow::Result<Vec<GrantRecord>> {
        Ok(self.read_records().await?)
    }

    fn source_name(&self) -> &str {
        self.path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.json")
    }
}
