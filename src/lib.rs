pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export the core: reconciliation, vehicle writes, client directory
pub use logic::{
    find_vehicle, reconcile, resolve_owner, vehicles_of_client, ClientDirectory, DashboardStats,
    OwnershipConflict, OwnershipIndex, RegistryService, RegistrySnapshot, VehicleCoordinator,
    WriteOutcome,
};

pub use error::{ErrorKind, RegistryError, Result};

// Export all model types
pub use model::*;

// Export store types
pub use store::{Gateway, HttpGateway, InMemoryGateway};

/// Build the application router for the configured backend.
///
/// With a backend URL the service talks to it over HTTP. Without one it runs
/// on the in-memory backend, which is also exposed under `/backend`.
pub async fn build_app(config: &crate::config::AppConfig) -> anyhow::Result<axum::Router> {
    use std::sync::Arc;

    match config.backend_url() {
        Some(url) => {
            log::info!("using backend at {}", url);
            let gateway = HttpGateway::with_timeout(url, config.backend_timeout())?;
            let service = Arc::new(RegistryService::new(Arc::new(gateway)));
            Ok(crate::api::routes::create_router().with_state(service))
        }
        None => {
            log::info!("no backend configured, using the in-memory backend");
            let gateway = Arc::new(InMemoryGateway::new());
            if config.seed_demo_data() {
                crate::seed::load_seed_data(gateway.as_ref()).await?;
            }
            let backend = crate::api::backend::backend_router().with_state(Arc::clone(&gateway));
            let service = Arc::new(RegistryService::new(gateway));
            Ok(crate::api::routes::create_router()
                .with_state(service)
                .nest("/backend", backend))
        }
    }
}
