use crate::error::{RegistryError, Result};
use crate::model::{Client, ClientUpdate, Entity, Id, NewClient};
use crate::store::ClientGateway;
use std::sync::Arc;

/// Pass-through access to the client collection
pub struct ClientDirectory<G> {
    gateway: Arc<G>,
}

impl<G> Clone for ClientDirectory<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G: ClientGateway> ClientDirectory<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Client>> {
        self.gateway.list_clients().await
    }

    pub async fn list_with_vehicles(&self) -> Result<Vec<Client>> {
        self.gateway.list_clients_with_vehicles().await
    }

    /// The backend has no single-client read, so this filters the full list
    pub async fn get_by_id(&self, id: Id) -> Result<Client> {
        self.list()
            .await?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| RegistryError::not_found(Entity::Client, id))
    }

    pub async fn create(&self, client: NewClient) -> Result<Client> {
        let created = self.gateway.create_client(&client).await?;
        log::info!("created client {} ({})", created.id, created.name);
        Ok(created)
    }

    pub async fn update(&self, id: Id, update: ClientUpdate) -> Result<Client> {
        self.gateway.update_client(id, &update).await
    }

    /// Deletes unconditionally. Ownership checks belong to the caller.
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.gateway.delete_client(id).await?;
        log::info!("deleted client {}", id);
        Ok(())
    }
}
