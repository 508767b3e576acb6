use crate::error::{RegistryError, Result};
use crate::model::{Association, Id, NewVehicle, Vehicle, VehicleUpdate};
use crate::store::VehicleGateway;
use std::sync::Arc;

/// Outcome of a vehicle write made of a core-field call followed by an
/// optional association call.
#[derive(Debug)]
pub enum WriteOutcome {
    /// Every issued call succeeded
    Success(Vehicle),
    /// The core fields were persisted, the association was not. `vehicle`
    /// holds the server's copy, whose ownership is stale or missing.
    PartialFailure {
        vehicle: Vehicle,
        requested_owner: Option<Id>,
        error: RegistryError,
    },
    /// The core-field call failed; nothing changed
    Failure(RegistryError),
}

impl WriteOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WriteOutcome::Success(_))
    }

    /// The vehicle as the backend holds it, if the core-field call went through
    pub fn vehicle(&self) -> Option<&Vehicle> {
        match self {
            WriteOutcome::Success(vehicle) | WriteOutcome::PartialFailure { vehicle, .. } => {
                Some(vehicle)
            }
            WriteOutcome::Failure(_) => None,
        }
    }

    pub fn into_result(self) -> Result<Vehicle> {
        match self {
            WriteOutcome::Success(vehicle) => Ok(vehicle),
            WriteOutcome::PartialFailure {
                vehicle,
                requested_owner,
                error,
            } => Err(RegistryError::PartialAssociation {
                vehicle,
                client_id: requested_owner,
                source: Box::new(error),
            }),
            WriteOutcome::Failure(error) => Err(error),
        }
    }
}

/// Sequences vehicle writes against the backend.
///
/// The association call is only issued once the core-field response has been
/// observed, and a failed association never rolls the core fields back.
pub struct VehicleCoordinator<G> {
    gateway: Arc<G>,
}

impl<G> Clone for VehicleCoordinator<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G: VehicleGateway> VehicleCoordinator<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn create_vehicle(&self, new_vehicle: NewVehicle) -> WriteOutcome {
        let (fields, owner) = new_vehicle.into_parts();

        let created = match self.gateway.create_vehicle(&fields).await {
            Ok(vehicle) => vehicle,
            Err(error) => return WriteOutcome::Failure(error),
        };
        log::info!("created vehicle {} ({})", created.id, created.display_plate());

        match owner {
            Some(client_id) => self.link(created, Some(client_id)).await,
            None => WriteOutcome::Success(created),
        }
    }

    pub async fn update_vehicle(&self, id: Id, update: VehicleUpdate) -> WriteOutcome {
        let (patch, owner_change) = update.into_parts();

        let updated = match self.gateway.update_vehicle(id, &patch).await {
            Ok(vehicle) => vehicle,
            Err(error) => return WriteOutcome::Failure(error),
        };
        log::info!("updated vehicle {}", updated.id);

        match owner_change {
            Some(owner) => self.link(updated, owner).await,
            None => WriteOutcome::Success(updated),
        }
    }

    pub async fn delete_vehicle(&self, id: Id) -> Result<()> {
        self.gateway.delete_vehicle(id).await?;
        log::info!("deleted vehicle {}", id);
        Ok(())
    }

    /// Link a vehicle to a client, or unlink it with `None`
    pub async fn associate(&self, vehicle_id: Id, client_id: Option<Id>) -> Result<()> {
        self.gateway
            .associate(&Association::new(vehicle_id, client_id))
            .await?;
        log::info!("vehicle {} now owned by {:?}", vehicle_id, client_id);
        Ok(())
    }

    async fn link(&self, vehicle: Vehicle, client_id: Option<Id>) -> WriteOutcome {
        match self.associate(vehicle.id, client_id).await {
            Ok(()) => WriteOutcome::Success(vehicle.with_owner(client_id)),
            Err(error) => {
                log::error!(
                    "vehicle {} saved but association with {:?} failed: {}",
                    vehicle.id,
                    client_id,
                    error
                );
                WriteOutcome::PartialFailure {
                    vehicle,
                    requested_owner: client_id,
                    error,
                }
            }
        }
    }
}
