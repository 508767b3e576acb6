use crate::error::{RegistryError, Result};
use crate::model::{
    Association, Client, ClientUpdate, Entity, Id, NewClient, Vehicle, VehicleFields, VehiclePatch,
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct ClientRow {
    name: String,
    phone: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct VehicleRow {
    plate: String,
    model: String,
    owner: Option<Id>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    next_id: Id,
    clients: BTreeMap<Id, ClientRow>,
    vehicles: BTreeMap<Id, VehicleRow>,
}

impl State {
    fn allocate_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    fn vehicle(&self, id: Id, row: &VehicleRow, with_owner: bool) -> Vehicle {
        Vehicle {
            id,
            plate: row.plate.clone(),
            model: row.model.clone(),
            client_id: if with_owner { row.owner } else { None },
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }

    fn client(&self, id: Id, row: &ClientRow, with_vehicles: bool) -> Client {
        let vehicles = with_vehicles.then(|| {
            self.vehicles
                .iter()
                .filter(|(_, v)| v.owner == Some(id))
                .map(|(vid, v)| self.vehicle(*vid, v, true))
                .collect()
        });
        Client {
            id,
            name: row.name.clone(),
            phone: row.phone.clone(),
            vehicles,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// In-process backend with the same representation rules as the real one:
/// ownership is stored on the vehicle, but only exposed through the nested
/// client listing. Ids are shared across both collections and never reused.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: RwLock<State>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client_count(&self) -> usize {
        self.state.read().clients.len()
    }

    pub fn vehicle_count(&self) -> usize {
        self.state.read().vehicles.len()
    }
}

#[async_trait::async_trait]
impl crate::store::ClientGateway for InMemoryGateway {
    async fn list_clients(&self) -> Result<Vec<Client>> {
        let state = self.state.read();
        Ok(state
            .clients
            .iter()
            .map(|(id, row)| state.client(*id, row, false))
            .collect())
    }

    async fn list_clients_with_vehicles(&self) -> Result<Vec<Client>> {
        let state = self.state.read();
        Ok(state
            .clients
            .iter()
            .map(|(id, row)| state.client(*id, row, true))
            .collect())
    }

    async fn create_client(&self, client: &NewClient) -> Result<Client> {
        let mut state = self.state.write();
        let id = state.allocate_id();
        let now = Utc::now();
        let row = ClientRow {
            name: client.name.clone(),
            phone: client.phone.clone(),
            created_at: now,
            updated_at: now,
        };
        let created = state.client(id, &row, false);
        state.clients.insert(id, row);
        Ok(created)
    }

    async fn update_client(&self, id: Id, update: &ClientUpdate) -> Result<Client> {
        let mut state = self.state.write();
        let row = state
            .clients
            .get_mut(&id)
            .ok_or_else(|| RegistryError::not_found(Entity::Client, id))?;
        if let Some(name) = &update.name {
            row.name = name.clone();
        }
        if let Some(phone) = &update.phone {
            row.phone = phone.clone();
        }
        row.updated_at = Utc::now();
        let row = row.clone();
        Ok(state.client(id, &row, false))
    }

    async fn delete_client(&self, id: Id) -> Result<()> {
        let mut state = self.state.write();
        if state.clients.remove(&id).is_none() {
            return Err(RegistryError::not_found(Entity::Client, id));
        }
        // The backend does not refuse deleting an owner; its vehicles become unowned
        for vehicle in state.vehicles.values_mut() {
            if vehicle.owner == Some(id) {
                vehicle.owner = None;
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl crate::store::VehicleGateway for InMemoryGateway {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        let state = self.state.read();
        Ok(state
            .vehicles
            .iter()
            .map(|(id, row)| state.vehicle(*id, row, false))
            .collect())
    }

    async fn create_vehicle(&self, fields: &VehicleFields) -> Result<Vehicle> {
        let mut state = self.state.write();
        let id = state.allocate_id();
        let now = Utc::now();
        let row = VehicleRow {
            plate: fields.plate.clone(),
            model: fields.model.clone(),
            owner: None,
            created_at: now,
            updated_at: now,
        };
        let created = state.vehicle(id, &row, false);
        state.vehicles.insert(id, row);
        Ok(created)
    }

    async fn update_vehicle(&self, id: Id, patch: &VehiclePatch) -> Result<Vehicle> {
        let mut state = self.state.write();
        let row = state
            .vehicles
            .get_mut(&id)
            .ok_or_else(|| RegistryError::not_found(Entity::Vehicle, id))?;
        if let Some(plate) = &patch.plate {
            row.plate = plate.clone();
        }
        if let Some(model) = &patch.model {
            row.model = model.clone();
        }
        row.updated_at = Utc::now();
        let row = row.clone();
        Ok(state.vehicle(id, &row, false))
    }

    async fn delete_vehicle(&self, id: Id) -> Result<()> {
        let mut state = self.state.write();
        match state.vehicles.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RegistryError::not_found(Entity::Vehicle, id)),
        }
    }

    async fn associate(&self, association: &Association) -> Result<()> {
        let mut state = self.state.write();
        if let Some(client_id) = association.client_id {
            if !state.clients.contains_key(&client_id) {
                return Err(RegistryError::not_found(Entity::Client, client_id));
            }
        }
        let row = state
            .vehicles
            .get_mut(&association.vehicle_id)
            .ok_or_else(|| RegistryError::not_found(Entity::Vehicle, association.vehicle_id))?;
        row.owner = association.client_id;
        row.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ClientGateway, VehicleGateway};

    async fn seeded() -> (InMemoryGateway, Id, Id) {
        let gateway = InMemoryGateway::new();
        let client = gateway
            .create_client(&NewClient {
                name: "Ana".to_string(),
                phone: "11999990000".to_string(),
            })
            .await
            .unwrap();
        let vehicle = gateway
            .create_vehicle(&VehicleFields {
                plate: "ABC1234".to_string(),
                model: "Civic".to_string(),
            })
            .await
            .unwrap();
        (gateway, client.id, vehicle.id)
    }

    #[tokio::test]
    async fn test_ownership_only_visible_in_nested_listing() {
        let (gateway, client_id, vehicle_id) = seeded().await;
        gateway
            .associate(&Association::new(vehicle_id, Some(client_id)))
            .await
            .unwrap();

        let flat = gateway.list_vehicles().await.unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].client_id, None);

        let plain = gateway.list_clients().await.unwrap();
        assert!(plain[0].vehicles.is_none());

        let nested = gateway.list_clients_with_vehicles().await.unwrap();
        let vehicles = nested[0].nested_vehicles();
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].id, vehicle_id);
    }

    #[tokio::test]
    async fn test_null_association_clears_owner() {
        let (gateway, client_id, vehicle_id) = seeded().await;
        gateway
            .associate(&Association::new(vehicle_id, Some(client_id)))
            .await
            .unwrap();
        gateway
            .associate(&Association::new(vehicle_id, None))
            .await
            .unwrap();

        let nested = gateway.list_clients_with_vehicles().await.unwrap();
        assert!(nested[0].nested_vehicles().is_empty());
    }

    #[tokio::test]
    async fn test_associate_unknown_ids() {
        let (gateway, client_id, vehicle_id) = seeded().await;
        let err = gateway
            .associate(&Association::new(999, Some(client_id)))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { entity: Entity::Vehicle, id: 999 }));

        let err = gateway
            .associate(&Association::new(vehicle_id, Some(999)))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { entity: Entity::Client, id: 999 }));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_missing_fields() {
        let (gateway, _, vehicle_id) = seeded().await;
        let updated = gateway
            .update_vehicle(
                vehicle_id,
                &VehiclePatch {
                    plate: None,
                    model: Some("City".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.plate, "ABC1234");
        assert_eq!(updated.model, "City");
    }

    #[tokio::test]
    async fn test_deleting_owner_orphans_vehicles() {
        let (gateway, client_id, vehicle_id) = seeded().await;
        gateway
            .associate(&Association::new(vehicle_id, Some(client_id)))
            .await
            .unwrap();
        gateway.delete_client(client_id).await.unwrap();

        assert_eq!(gateway.client_count(), 0);
        assert_eq!(gateway.vehicle_count(), 1);
        assert!(gateway.list_clients_with_vehicles().await.unwrap().is_empty());
    }
}
