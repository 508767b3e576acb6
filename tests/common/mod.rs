#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::net::TcpListener;
use vehicle_registry::api::backend_router;
use vehicle_registry::store::{ClientGateway, VehicleGateway};
use vehicle_registry::{
    Association, Client, ClientUpdate, Id, InMemoryGateway, NewClient, RegistryError, Result,
    Vehicle, VehicleFields, VehiclePatch,
};

/// Wraps the in-memory backend, recording every call in order and
/// optionally failing the association endpoint.
#[derive(Default)]
pub struct RecordingGateway {
    pub inner: InMemoryGateway,
    calls: Mutex<Vec<String>>,
    fail_associate: AtomicBool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_associations(&self, fail: bool) {
        self.fail_associate.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }
}

#[async_trait::async_trait]
impl ClientGateway for RecordingGateway {
    async fn list_clients(&self) -> Result<Vec<Client>> {
        self.record("list_clients");
        self.inner.list_clients().await
    }

    async fn list_clients_with_vehicles(&self) -> Result<Vec<Client>> {
        self.record("list_clients_with_vehicles");
        self.inner.list_clients_with_vehicles().await
    }

    async fn create_client(&self, client: &NewClient) -> Result<Client> {
        self.record("create_client");
        self.inner.create_client(client).await
    }

    async fn update_client(&self, id: Id, update: &ClientUpdate) -> Result<Client> {
        self.record(format!("update_client {}", id));
        self.inner.update_client(id, update).await
    }

    async fn delete_client(&self, id: Id) -> Result<()> {
        self.record(format!("delete_client {}", id));
        self.inner.delete_client(id).await
    }
}

#[async_trait::async_trait]
impl VehicleGateway for RecordingGateway {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        self.record("list_vehicles");
        self.inner.list_vehicles().await
    }

    async fn create_vehicle(&self, fields: &VehicleFields) -> Result<Vehicle> {
        self.record("create_vehicle");
        self.inner.create_vehicle(fields).await
    }

    async fn update_vehicle(&self, id: Id, patch: &VehiclePatch) -> Result<Vehicle> {
        self.record(format!("update_vehicle {}", id));
        self.inner.update_vehicle(id, patch).await
    }

    async fn delete_vehicle(&self, id: Id) -> Result<()> {
        self.record(format!("delete_vehicle {}", id));
        self.inner.delete_vehicle(id).await
    }

    async fn associate(&self, association: &Association) -> Result<()> {
        self.record(format!(
            "associate {} -> {:?}",
            association.vehicle_id, association.client_id
        ));
        if self.fail_associate.load(Ordering::SeqCst) {
            return Err(RegistryError::network("associate", "connection reset by peer"));
        }
        self.inner.associate(association).await
    }
}

pub fn new_client(name: &str) -> NewClient {
    NewClient {
        name: name.to_string(),
        phone: "11999990000".to_string(),
    }
}

/// Serve the backend protocol for `gateway` on an ephemeral port and return
/// its base URL
pub async fn spawn_backend(gateway: Arc<InMemoryGateway>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = listener.local_addr().expect("Failed to read local address");
    let app: axum::Router = backend_router().with_state(gateway);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Backend server failed");
    });
    format!("http://{}", address)
}
