//! Ownership reconciliation.
//!
//! The backend exposes vehicles twice: flat under `/vehicles` (without
//! `client_id`) and nested under each client of `/clients?include=vehicles`.
//! Everything here merges those two read-only views into one.

use crate::error::{RegistryError, Result};
use crate::model::{Client, Entity, Id, Vehicle};
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;

/// A vehicle listed under more than one client. The first client in
/// iteration order is kept as the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipConflict {
    pub vehicle_id: Id,
    pub owner: Id,
    pub ignored: Id,
}

/// Vehicle id → owning client id, built once per read
#[derive(Debug, Clone, Default)]
pub struct OwnershipIndex {
    owners: HashMap<Id, Id>,
    counts: HashMap<Id, usize>,
    conflicts: Vec<OwnershipConflict>,
}

impl OwnershipIndex {
    pub fn build(clients_with_vehicles: &[Client]) -> Self {
        let mut index = Self::default();

        for client in clients_with_vehicles {
            let vehicle_ids = client
                .nested_vehicles()
                .iter()
                .map(|v| v.id)
                .unique()
                .collect::<Vec<_>>();
            index.counts.insert(client.id, vehicle_ids.len());

            for vehicle_id in vehicle_ids {
                match index.owners.get(&vehicle_id) {
                    Some(&owner) => {
                        log::warn!(
                            "vehicle {} is listed under clients {} and {}; keeping {}",
                            vehicle_id,
                            owner,
                            client.id,
                            owner
                        );
                        index.conflicts.push(OwnershipConflict {
                            vehicle_id,
                            owner,
                            ignored: client.id,
                        });
                    }
                    None => {
                        index.owners.insert(vehicle_id, client.id);
                    }
                }
            }
        }

        index
    }

    pub fn owner_of(&self, vehicle_id: Id) -> Option<Id> {
        self.owners.get(&vehicle_id).copied()
    }

    /// Number of distinct vehicles nested under the client, conflicting
    /// entries included. This is what blocks a client's deletion.
    pub fn vehicle_count(&self, client_id: Id) -> usize {
        self.counts.get(&client_id).copied().unwrap_or(0)
    }

    pub fn conflicts(&self) -> &[OwnershipConflict] {
        &self.conflicts
    }

    pub fn is_ambiguous(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Copy `vehicles` with their resolved owner; unlisted ones come out unowned
    pub fn apply(&self, vehicles: &[Vehicle]) -> Vec<Vehicle> {
        vehicles
            .iter()
            .map(|v| v.clone().with_owner(self.owner_of(v.id)))
            .collect()
    }
}

/// Enrich every flat vehicle with the id of the client listing it
pub fn reconcile(clients_with_vehicles: &[Client], flat_vehicles: &[Vehicle]) -> Vec<Vehicle> {
    OwnershipIndex::build(clients_with_vehicles).apply(flat_vehicles)
}

/// Owner of a single vehicle. Scans in client order and stops at the first hit.
pub fn resolve_owner(vehicle_id: Id, clients_with_vehicles: &[Client]) -> Option<Id> {
    clients_with_vehicles
        .iter()
        .find(|c| c.nested_vehicles().iter().any(|v| v.id == vehicle_id))
        .map(|c| c.id)
}

/// Nested vehicles of a client, verbatim. An unknown client yields an empty
/// list just like a client without vehicles.
pub fn vehicles_of_client(client_id: Id, clients_with_vehicles: &[Client]) -> Vec<Vehicle> {
    clients_with_vehicles
        .iter()
        .find(|c| c.id == client_id)
        .map(|c| c.nested_vehicles().to_vec())
        .unwrap_or_default()
}

/// Single-vehicle read. Unowned is a valid answer; only a vehicle missing
/// from the flat collection is `NotFound`.
pub fn find_vehicle(
    vehicle_id: Id,
    clients_with_vehicles: &[Client],
    flat_vehicles: &[Vehicle],
) -> Result<Vehicle> {
    let vehicle = flat_vehicles
        .iter()
        .find(|v| v.id == vehicle_id)
        .ok_or_else(|| RegistryError::not_found(Entity::Vehicle, vehicle_id))?;
    Ok(vehicle
        .clone()
        .with_owner(resolve_owner(vehicle_id, clients_with_vehicles)))
}
