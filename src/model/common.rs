use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Server-assigned identifier shared by clients and vehicles
pub type Id = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Client,
    Vehicle,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Client => write!(f, "client"),
            Entity::Vehicle => write!(f, "vehicle"),
        }
    }
}

/// Body of `POST /vehicles/associate`. A `None` client clears ownership and is
/// sent as an explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub vehicle_id: Id,
    #[serde(default)]
    pub client_id: Option<Id>,
}

impl Association {
    pub fn new(vehicle_id: Id, client_id: Option<Id>) -> Self {
        Self {
            vehicle_id,
            client_id,
        }
    }
}

/// Forms submit `0` for "no client selected"
pub fn normalize_client_id(client_id: Option<Id>) -> Option<Id> {
    client_id.filter(|id| *id != 0)
}

/// Distinguishes a missing field (`None`) from an explicit `null` (`Some(None)`)
pub fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Timestamps are informational only. RFC 3339 and naive `YYYY-MM-DD HH:MM:SS`
/// (read as UTC) are accepted; anything else becomes `None` instead of failing
/// the whole collection read.
pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(raw)) => parse_timestamp(&raw),
        Some(Raw::Other(_)) | None => None,
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
