use crate::model::common::lenient_timestamp;
use crate::model::{Id, Vehicle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A customer. `vehicles` is only populated by the `?include=vehicles`
/// representation of the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Id,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicles: Option<Vec<Vehicle>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Client {
    /// Nested vehicles, empty when the plain representation was fetched
    pub fn nested_vehicles(&self) -> &[Vehicle] {
        self.vehicles.as_deref().unwrap_or(&[])
    }

    /// Drop the nested vehicle list, giving the plain representation
    pub fn without_vehicles(mut self) -> Self {
        self.vehicles = None;
        self
    }
}

/// Input model for creating a new client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewClient {
    #[validate(length(min = 2, message = "name must have at least 2 characters"))]
    pub name: String,
    #[validate(length(min = 10, message = "phone must have at least 10 digits"))]
    pub phone: String,
}

/// Partial update; absent fields are left unchanged by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ClientUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "name must have at least 2 characters"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 10, message = "phone must have at least 10 digits"))]
    pub phone: Option<String>,
}

/// A client together with the number of vehicles it owns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientSummary {
    #[serde(flatten)]
    pub client: Client,
    pub vehicle_count: usize,
}

impl ClientSummary {
    pub fn can_be_deleted(&self) -> bool {
        self.vehicle_count == 0
    }
}
