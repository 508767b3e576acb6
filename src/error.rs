use crate::model::{Entity, Id, Vehicle};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Coarse classification surfaced to callers alongside every failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    ValidationFailed,
    NetworkFailure,
    PartialAssociationFailure,
    ClientHasVehicles,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: Entity, id: Id },

    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("backend call `{operation}` failed: {message}")]
    Network {
        operation: &'static str,
        status: Option<u16>,
        message: String,
    },

    /// The vehicle's core fields were persisted but the follow-up association
    /// call failed. Nothing was rolled back.
    #[error("vehicle {} was saved but associating it with client {} failed: {source}", vehicle.id, display_owner(*client_id))]
    PartialAssociation {
        vehicle: Vehicle,
        client_id: Option<Id>,
        #[source]
        source: Box<RegistryError>,
    },

    #[error("client {id} still owns {count} vehicle(s)")]
    ClientHasVehicles { id: Id, count: usize },
}

fn display_owner(client_id: Option<Id>) -> String {
    match client_id {
        Some(id) => id.to_string(),
        None => "<none>".to_string(),
    }
}

impl RegistryError {
    pub fn not_found(entity: Entity, id: Id) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn network(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Network {
            operation,
            status: None,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::ValidationFailed,
            Self::Network { .. } => ErrorKind::NetworkFailure,
            Self::PartialAssociation { .. } => ErrorKind::PartialAssociationFailure,
            Self::ClientHasVehicles { .. } => ErrorKind::ClientHasVehicles,
        }
    }

    /// Partial association failures are a network failure too
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::PartialAssociation { .. })
    }

    /// The vehicle as persisted when only the association step failed
    pub fn persisted_vehicle(&self) -> Option<&Vehicle> {
        match self {
            Self::PartialAssociation { vehicle, .. } => Some(vehicle),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_association_is_a_network_failure() {
        let vehicle = Vehicle {
            id: 12,
            plate: "DEF4567".to_string(),
            model: "Onix".to_string(),
            client_id: None,
            created_at: None,
            updated_at: None,
        };
        let err = RegistryError::PartialAssociation {
            vehicle,
            client_id: Some(1),
            source: Box::new(RegistryError::network("associate", "connection reset")),
        };

        assert_eq!(err.kind(), ErrorKind::PartialAssociationFailure);
        assert!(err.is_network_failure());
        assert_eq!(err.persisted_vehicle().map(|v| v.id), Some(12));
        assert!(err.to_string().contains("client 1"));
    }

    #[test]
    fn test_not_found_message() {
        let err = RegistryError::not_found(Entity::Vehicle, 99);
        assert_eq!(err.to_string(), "vehicle with id 99 not found");
        assert!(!err.is_network_failure());
    }
}
