//! Grant application records
//!
//! A [`GrantRecord`] is one application submitted to a grant contest. Records
//! are immutable once loaded: every stage of the browse pipeline derives views
//! over a collection of records and never rewrites one in place.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identity of a grant record: a numeric id or an opaque grant code
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GrantId {
    Number(i64),
    Code(String),
}

impl fmt::Display for GrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantId::Number(n) => write!(f, "{}", n),
            GrantId::Code(code) => f.write_str(code),
        }
    }
}

impl From<i64> for GrantId {
    fn from(value: i64) -> Self {
        GrantId::Number(value)
    }
}

impl From<&str> for GrantId {
    fn from(value: &str) -> Self {
        GrantId::Code(value.to_string())
    }
}

impl From<String> for GrantId {
    fn from(value: String) -> Self {
        GrantId::Code(value)
    }
}

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Shift the coordinate by the given deltas
    pub fn offset(self, d_lat: f64, d_lng: f64) -> Self {
        Self {
            lat: self.lat + d_lat,
            lng: self.lng + d_lng,
        }
    }

    /// Bit-exact key used to group coordinates by numeric equality
    pub fn key(&self) -> (u64, u64) {
        // -0.0 and 0.0 compare equal, so they must share a key
        let norm = |v: f64| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() };
        (norm(self.lat), norm(self.lng))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// A single grant application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantRecord {
    /// Unique identity
    pub id: GrantId,

    /// Project title
    #[serde(default)]
    pub name: Option<String>,

    /// Free-text region as submitted, not normalized
    #[serde(default)]
    pub region: Option<String>,

    /// Applicant organization
    #[serde(default, rename = "org", alias = "organization")]
    pub organization: Option<String>,

    /// Grant direction (category)
    #[serde(default)]
    pub direction: Option<String>,

    /// Contest name
    #[serde(default)]
    pub contest: Option<String>,

    /// Contest year
    #[serde(default)]
    pub year: Option<i32>,

    /// Whether the application won
    #[serde(default, deserialize_with = "null_as_default")]
    pub winner: bool,

    /// Requested amount in the smallest currency unit
    #[serde(
        default,
        rename = "money_req_grant",
        alias = "requested_grant_amount",
        deserialize_with = "null_as_default"
    )]
    pub requested_grant_amount: u64,

    /// Precomputed coordinate, if the source supplied one
    #[serde(default)]
    pub coordinates: Option<Coordinate>,

    /// Project description
    #[serde(default)]
    pub description: Option<String>,

    /// Stated project goal
    #[serde(default)]
    pub goal: Option<String>,

    /// Project tasks, free text
    #[serde(default)]
    pub tasks: Option<String>,

    /// Applicant postal address
    #[serde(default)]
    pub address: Option<String>,

    /// Applicant web site
    #[serde(default, rename = "web_site", alias = "website")]
    pub website: Option<String>,

    /// Link to the application on the contest site
    #[serde(default)]
    pub link: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl GrantRecord {
    /// Create a record with only its identity set
    pub fn new(id: impl Into<GrantId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            region: None,
            organization: None,
            direction: None,
            contest: None,
            year: None,
            winner: false,
            requested_grant_amount: 0,
            coordinates: None,
            description: None,
            goal: None,
            tasks: None,
            address: None,
            website: None,
            link: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    pub fn with_contest(mut self, contest: impl Into<String>) -> Self {
        self.contest = Some(contest.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_winner(mut self, winner: bool) -> Self {
        self.winner = winner;
        self
    }

    pub fn with_amount(mut self, amount: u64) -> Self {
        self.requested_grant_amount = amount;
        self
    }

    pub fn with_coordinates(mut self, coordinates: Coordinate) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    pub fn with_tasks(mut self, tasks: impl Into<String>) -> Self {
        self.tasks = Some(tasks.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    pub fn direction(&self) -> Option<&str> {
        self.direction.as_deref()
    }

    /// Region text, or an empty string when absent
    pub fn region_or_empty(&self) -> &str {
        self.region.as_deref().unwrap_or("")
    }
}
