//! Column mapping and cell parsing for tabular record files

use ahash::AHashMap;

use gb_core::{Coordinate, GrantId, GrantRecord};

use crate::config::NullConfig;
use crate::DataError;

/// A record field that a column can feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Id,
    Name,
    Region,
    Organization,
    Direction,
    Contest,
    Year,
    Winner,
    Amount,
    Latitude,
    Longitude,
    Description,
    Goal,
    Tasks,
    Address,
    Website,
    Link,
}

impl RecordField {
    /// Canonical column name
    pub fn column_name(&self) -> &'static str {
        match self {
            RecordField::Id => "id",
            RecordField::Name => "name",
            RecordField::Region => "region",
            RecordField::Organization => "org",
            RecordField::Direction => "direction",
            RecordField::Contest => "contest",
            RecordField::Year => "year",
            RecordField::Winner => "winner",
            RecordField::Amount => "money_req_grant",
            RecordField::Latitude => "lat",
            RecordField::Longitude => "lng",
            RecordField::Description => "description",
            RecordField::Goal => "goal",
            RecordField::Tasks => "tasks",
            RecordField::Address => "address",
            RecordField::Website => "web_site",
            RecordField::Link => "link",
        }
    }

    /// Match a header (already lower-cased and trimmed) to a field
    fn from_header(header: &str) -> Option<Self> {
        let field = match header {
            "id" | "grant_id" | "grant_code" | "code" => RecordField::Id,
            "name" | "title" | "project_name" => RecordField::Name,
            "region" => RecordField::Region,
            "org" | "organization" | "organisation" => RecordField::Organization,
            "direction" | "category" => RecordField::Direction,
            "contest" | "contest_name" => RecordField::Contest,
            "year" => RecordField::Year,
            "winner" | "is_winner" => RecordField::Winner,
            "money_req_grant" | "requested_grant_amount" | "amount" => RecordField::Amount,
            "lat" | "latitude" => RecordField::Latitude,
            "lng" | "lon" | "longitude" => RecordField::Longitude,
            "description" => RecordField::Description,
            "goal" => RecordField::Goal,
            "tasks" => RecordField::Tasks,
            "address" => RecordField::Address,
            "web_site" | "website" | "site" => RecordField::Website,
            "link" | "url" => RecordField::Link,
            _ => return None,
        };
        Some(field)
    }
}

/// Maps header positions to record fields
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    columns: AHashMap<RecordField, usize>,
    unmapped: Vec<String>,
}

impl ColumnMapping {
    /// Detect the mapping from a header row.
    ///
    /// The first column matching a field wins. An identity column is required.
    pub fn detect<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<Self, DataError> {
        let mut columns = AHashMap::new();
        let mut unmapped = Vec::new();

        for (idx, header) in headers.into_iter().enumerate() {
            let normalized = header.trim().trim_start_matches('\u{feff}').to_lowercase();
            match RecordField::from_header(&normalized) {
                Some(field) => {
                    columns.entry(field).or_insert(idx);
                }
                None => unmapped.push(header.to_string()),
            }
        }

        if !columns.contains_key(&RecordField::Id) {
            return Err(DataError::MissingColumn(RecordField::Id.column_name().to_string()));
        }

        if !unmapped.is_empty() {
            tracing::debug!("Ignoring unmapped columns: {:?}", unmapped);
        }

        Ok(Self { columns, unmapped })
    }

    /// Column index for a field, if mapped
    pub fn index_of(&self, field: RecordField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// Headers that did not map to any field
    pub fn unmapped(&self) -> &[String] {
        &self.unmapped
    }

    /// Build a record from one row. `row` is 1-based for error messages.
    pub fn parse_row(
        &self,
        row: usize,
        cells: &csv::StringRecord,
        nulls: &NullConfig,
    ) -> Result<GrantRecord, DataError> {
        let cell = |field: RecordField| -> Option<String> {
            self.index_of(field)
                .and_then(|idx| cells.get(idx))
                .and_then(|value| nulls.clean(value))
        };
        let invalid = |field: RecordField, value: &str| DataError::InvalidValue {
            row,
            column: field.column_name().to_string(),
            value: value.to_string(),
        };

        let id = cell(RecordField::Id)
            .map(|raw| parse_id(&raw))
            .ok_or(DataError::MissingIdentity { row })?;

        let year = match cell(RecordField::Year) {
            Some(raw) => Some(parse_year(&raw).ok_or_else(|| invalid(RecordField::Year, &raw))?),
            None => None,
        };

        let winner = match cell(RecordField::Winner) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| invalid(RecordField::Winner, &raw))?,
            None => false,
        };

        let requested_grant_amount = match cell(RecordField::Amount) {
            Some(raw) => parse_amount(&raw).ok_or_else(|| invalid(RecordField::Amount, &raw))?,
            None => 0,
        };

        let lat = cell(RecordField::Latitude).and_then(|raw| raw.parse::<f64>().ok());
        let lng = cell(RecordField::Longitude).and_then(|raw| raw.parse::<f64>().ok());
        let coordinates = match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        };

        Ok(GrantRecord {
            id,
            name: cell(RecordField::Name),
            region: cell(RecordField::Region),
            organization: cell(RecordField::Organization),
            direction: cell(RecordField::Direction),
            contest: cell(RecordField::Contest),
            year,
            winner,
            requested_grant_amount,
            coordinates,
            description: cell(RecordField::Description),
            goal: cell(RecordField::Goal),
            tasks: cell(RecordField::Tasks),
            address: cell(RecordField::Address),
            website: cell(RecordField::Website),
            link: cell(RecordField::Link),
        })
    }
}

/// Integer ids stay numeric, anything else is a grant code
pub fn parse_id(raw: &str) -> GrantId {
    raw.parse::<i64>()
        .map(GrantId::Number)
        .unwrap_or_else(|_| GrantId::Code(raw.to_string()))
}

/// Year as an integer; spreadsheet exports sometimes write `2023.0`
pub fn parse_year(raw: &str) -> Option<i32> {
    if let Ok(year) = raw.parse::<i32>() {
        return Some(year);
    }
    let value = raw.parse::<f64>().ok()?;
    (value.fract() == 0.0 && value.abs() < i32::MAX as f64).then_some(value as i32)
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "да" => Some(true),
        "false" | "0" | "no" | "n" | "нет" => Some(false),
        _ => None,
    }
}

/// Non-negative amount; decimals are rounded, spaces used as separators are dropped
pub fn parse_amount(raw: &str) -> Option<u64> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if let Ok(amount) = compact.parse::<u64>() {
        return Some(amount);
    }
    let value = compact.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0 && value < u64::MAX as f64).then(|| value.round() as u64)
}
