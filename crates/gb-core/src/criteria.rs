//! Filter criteria for the browse pipeline

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Winner-status selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Only records with `winner == true`
    Winner,
    /// Only records with `winner == false`
    Participant,
}

impl StatusFilter {
    pub fn matches(self, winner: bool) -> bool {
        match self {
            StatusFilter::Winner => winner,
            StatusFilter::Participant => !winner,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::Winner => f.write_str("winner"),
            StatusFilter::Participant => f.write_str("participant"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown status selector '{0}' (expected 'winner' or 'participant')")]
pub struct ParseStatusError(pub String);

impl FromStr for StatusFilter {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "winner" => Ok(StatusFilter::Winner),
            "participant" => Ok(StatusFilter::Participant),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Search text plus conjunctive equality constraints.
///
/// A `None` constraint places no restriction on its field. Empty strings are
/// treated the same as `None` (see [`FilterCriteria::normalized`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub status: Option<StatusFilter>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = Some(status);
        self
    }

    /// Map empty string constraints to `None`. The query is kept as typed.
    pub fn normalized(mut self) -> Self {
        let drop_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        self.direction = drop_empty(self.direction);
        self.region = drop_empty(self.region);
        self
    }

    /// True when no constraint is active
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
            && self.direction.as_deref().map_or(true, str::is_empty)
            && self.region.as_deref().map_or(true, str::is_empty)
            && self.year.is_none()
            && self.status.is_none()
    }
}
