use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::api::handlers::{self, AppState};
use crate::store::Gateway;

pub fn create_router<G: Gateway + 'static>() -> Router<AppState<G>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Dashboard and full reload
        .route("/api/dashboard", get(handlers::get_dashboard::<G>))
        .route("/api/refresh", get(handlers::refresh::<G>))
        // Clients
        .route(
            "/api/clients",
            get(handlers::list_clients::<G>).post(handlers::create_client::<G>),
        )
        .route(
            "/api/clients/summary",
            get(handlers::list_client_summaries::<G>),
        )
        .route(
            "/api/clients/:id",
            get(handlers::get_client::<G>)
                .put(handlers::update_client::<G>)
                .delete(handlers::delete_client::<G>),
        )
        .route(
            "/api/clients/:id/vehicles",
            get(handlers::list_client_vehicles::<G>),
        )
        // Vehicles
        .route(
            "/api/vehicles",
            get(handlers::list_vehicles::<G>).post(handlers::create_vehicle::<G>),
        )
        .route(
            "/api/vehicles/associate",
            post(handlers::associate_vehicle::<G>),
        )
        .route(
            "/api/vehicles/:id",
            get(handlers::get_vehicle::<G>)
                .put(handlers::update_vehicle::<G>)
                .delete(handlers::delete_vehicle::<G>),
        )
        .layer(CorsLayer::permissive())
}
