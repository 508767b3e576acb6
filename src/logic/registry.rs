use crate::error::{RegistryError, Result};
use crate::logic::coordinator::VehicleCoordinator;
use crate::logic::directory::ClientDirectory;
use crate::logic::reconcile::{self, OwnershipConflict, OwnershipIndex};
use crate::model::{Client, ClientSummary, Id, NewVehicle, Vehicle, VehicleUpdate};
use crate::store::Gateway;
use serde::Serialize;
use std::sync::Arc;

/// Both backend collections as read by one `refresh`
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    /// Clients in their nested representation
    pub clients: Vec<Client>,
    /// Flat vehicles enriched with their owner
    pub vehicles: Vec<Vehicle>,
    pub ownership: OwnershipIndex,
}

impl RegistrySnapshot {
    pub fn from_parts(clients: Vec<Client>, flat_vehicles: Vec<Vehicle>) -> Self {
        let ownership = OwnershipIndex::build(&clients);
        let vehicles = ownership.apply(&flat_vehicles);
        Self {
            clients,
            vehicles,
            ownership,
        }
    }

    pub fn client_summaries(&self) -> Vec<ClientSummary> {
        self.clients
            .iter()
            .map(|c| ClientSummary {
                client: c.clone().without_vehicles(),
                vehicle_count: self.ownership.vehicle_count(c.id),
            })
            .collect()
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats {
            total_clients: self.clients.len(),
            total_vehicles: self.vehicles.len(),
            unowned_vehicles: self.vehicles.iter().filter(|v| !v.is_owned()).count(),
            conflicts: self.ownership.conflicts().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_clients: usize,
    pub total_vehicles: usize,
    /// Vehicles no client lists; views assuming an owner must cope with these
    pub unowned_vehicles: usize,
    pub conflicts: Vec<OwnershipConflict>,
}

/// Entry point for the presentation layer: reads go through reconciliation,
/// vehicle writes through the coordinator.
pub struct RegistryService<G> {
    gateway: Arc<G>,
    clients: ClientDirectory<G>,
    vehicles: VehicleCoordinator<G>,
}

impl<G: Gateway> RegistryService<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            clients: ClientDirectory::new(Arc::clone(&gateway)),
            vehicles: VehicleCoordinator::new(Arc::clone(&gateway)),
            gateway,
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn clients(&self) -> &ClientDirectory<G> {
        &self.clients
    }

    pub fn vehicles(&self) -> &VehicleCoordinator<G> {
        &self.vehicles
    }

    /// Fetch both collections concurrently and reconcile them
    /// Nested clients and the flat vehicle collection, fetched concurrently
    async fn fetch_both(&self) -> Result<(Vec<Client>, Vec<Vehicle>)> {
        tokio::try_join!(
            self.gateway.list_clients_with_vehicles(),
            self.gateway.list_vehicles()
        )
    }

    pub async fn refresh(&self) -> Result<RegistrySnapshot> {
        let (clients, flat_vehicles) = self.fetch_both().await?;
        log::debug!(
            "refreshed {} clients and {} vehicles",
            clients.len(),
            flat_vehicles.len()
        );
        Ok(RegistrySnapshot::from_parts(clients, flat_vehicles))
    }

    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        Ok(self.refresh().await?.vehicles)
    }

    pub async fn get_vehicle(&self, id: Id) -> Result<Vehicle> {
        let (clients, flat_vehicles) = self.fetch_both().await?;
        reconcile::find_vehicle(id, &clients, &flat_vehicles)
    }

    pub async fn vehicles_of_client(&self, client_id: Id) -> Result<Vec<Vehicle>> {
        let clients = self.clients.list_with_vehicles().await?;
        Ok(reconcile::vehicles_of_client(client_id, &clients))
    }

    pub async fn client_summaries(&self) -> Result<Vec<ClientSummary>> {
        Ok(self.refresh().await?.client_summaries())
    }

    pub async fn dashboard(&self) -> Result<DashboardStats> {
        Ok(self.refresh().await?.stats())
    }

    pub async fn create_vehicle(&self, new_vehicle: NewVehicle) -> Result<Vehicle> {
        self.vehicles.create_vehicle(new_vehicle).await.into_result()
    }

    pub async fn update_vehicle(&self, id: Id, update: VehicleUpdate) -> Result<Vehicle> {
        self.vehicles.update_vehicle(id, update).await.into_result()
    }

    pub async fn delete_vehicle(&self, id: Id) -> Result<()> {
        self.vehicles.delete_vehicle(id).await
    }

    pub async fn associate(&self, vehicle_id: Id, client_id: Option<Id>) -> Result<()> {
        self.vehicles.associate(vehicle_id, client_id).await
    }

    /// Delete a client unless it still owns vehicles. The backend would
    /// accept the delete and orphan them, so the check happens here.
    pub async fn delete_client(&self, id: Id) -> Result<()> {
        let snapshot = self.refresh().await?;
        if !snapshot.clients.iter().any(|c| c.id == id) {
            return Err(RegistryError::not_found(crate::model::Entity::Client, id));
        }
        let count = snapshot.ownership.vehicle_count(id);
        if count > 0 {
            return Err(RegistryError::ClientHasVehicles { id, count });
        }
        self.clients.delete(id).await
    }
}
