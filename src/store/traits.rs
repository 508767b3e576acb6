use crate::error::Result;
use crate::model::{Association, Client, ClientUpdate, Id, NewClient, Vehicle, VehicleFields, VehiclePatch};

/// Client collection of the backend
#[async_trait::async_trait]
pub trait ClientGateway: Send + Sync {
    /// `GET /clients`, plain representation
    async fn list_clients(&self) -> Result<Vec<Client>>;
    /// `GET /clients?include=vehicles`, each client with its nested vehicles
    async fn list_clients_with_vehicles(&self) -> Result<Vec<Client>>;
    async fn create_client(&self, client: &NewClient) -> Result<Client>;
    async fn update_client(&self, id: Id, update: &ClientUpdate) -> Result<Client>;
    async fn delete_client(&self, id: Id) -> Result<()>;
}

/// Vehicle collection of the backend. Vehicles returned here never carry
/// `client_id`; ownership only changes through [`VehicleGateway::associate`].
#[async_trait::async_trait]
pub trait VehicleGateway: Send + Sync {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>>;
    async fn create_vehicle(&self, fields: &VehicleFields) -> Result<Vehicle>;
    async fn update_vehicle(&self, id: Id, patch: &VehiclePatch) -> Result<Vehicle>;
    async fn delete_vehicle(&self, id: Id) -> Result<()>;
    /// `POST /vehicles/associate`
    async fn associate(&self, association: &Association) -> Result<()>;
}

pub trait Gateway: ClientGateway + VehicleGateway + Send + Sync {}
impl<T: ClientGateway + VehicleGateway> Gateway for T {}
