use crate::model::common::{explicit_null, lenient_timestamp, normalize_client_id};
use crate::model::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A vehicle. The flat `/vehicles` collection never fills `client_id`; it is
/// only known after reconciliation against the nested client representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Id,
    pub plate: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Id>,
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

impl Vehicle {
    pub fn display_plate(&self) -> String {
        self.plate.to_uppercase()
    }

    pub fn is_owned(&self) -> bool {
        self.client_id.is_some()
    }

    pub fn with_owner(mut self, client_id: Option<Id>) -> Self {
        self.client_id = client_id;
        self
    }
}

/// Core fields sent to `POST /vehicles`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleFields {
    pub plate: String,
    pub model: String,
}

/// Core fields sent to `PUT /vehicles/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehiclePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl VehiclePatch {
    pub fn is_empty(&self) -> bool {
        self.plate.is_none() && self.model.is_none()
    }
}

/// Input model for creating a vehicle, optionally with an owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewVehicle {
    #[validate(length(min = 7, message = "plate must have at least 7 characters"))]
    pub plate: String,
    #[validate(length(min = 2, message = "model must have at least 2 characters"))]
    pub model: String,
    #[serde(default)]
    pub client_id: Option<Id>,
}

impl NewVehicle {
    pub fn new(plate: impl Into<String>, model: impl Into<String>, client_id: Option<Id>) -> Self {
        Self {
            plate: plate.into(),
            model: model.into(),
            client_id,
        }
    }

    /// Split into the core fields and the requested owner
    pub fn into_parts(self) -> (VehicleFields, Option<Id>) {
        (
            VehicleFields {
                plate: self.plate,
                model: self.model,
            },
            normalize_client_id(self.client_id),
        )
    }
}

/// Partial vehicle update.
///
/// `client_id` is tri-state: absent leaves ownership untouched, `null`
/// clears it and a value re-assigns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct VehicleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 7, message = "plate must have at least 7 characters"))]
    pub plate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "model must have at least 2 characters"))]
    pub model: Option<String>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_id: Option<Option<Id>>,
}

impl VehicleUpdate {
    pub fn clear_owner() -> Self {
        Self {
            client_id: Some(None),
            ..Default::default()
        }
    }

    pub fn assign_owner(client_id: Id) -> Self {
        Self {
            client_id: Some(Some(client_id)),
            ..Default::default()
        }
    }

    pub fn into_parts(self) -> (VehiclePatch, Option<Option<Id>>) {
        (
            VehiclePatch {
                plate: self.plate,
                model: self.model,
            },
            self.client_id.map(normalize_client_id),
        )
    }
}
