//! The backend REST protocol served on top of any [`Gateway`].
//!
//! Paired with [`crate::store::InMemoryGateway`] this is a stand-in for the
//! real backend; [`crate::store::HttpGateway`] speaks exactly this protocol.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Json as RequestJson, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::handlers::{error_response, ErrorResponse};
use crate::model::{Association, Client, ClientUpdate, Id, NewClient, Vehicle, VehicleFields, VehiclePatch};
use crate::store::Gateway;

type BackendResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

#[derive(Debug, Deserialize)]
pub struct ClientListQuery {
    pub include: Option<String>,
}

pub fn backend_router<G: Gateway + 'static>() -> Router<Arc<G>> {
    Router::new()
        .route("/clients", get(list_clients::<G>).post(create_client::<G>))
        .route(
            "/clients/:id",
            put(update_client::<G>).delete(delete_client::<G>),
        )
        .route("/vehicles", get(list_vehicles::<G>).post(create_vehicle::<G>))
        .route("/vehicles/associate", post(associate::<G>))
        .route(
            "/vehicles/:id",
            put(update_vehicle::<G>).delete(delete_vehicle::<G>),
        )
}

async fn list_clients<G: Gateway>(
    State(gateway): State<Arc<G>>,
    Query(query): Query<ClientListQuery>,
) -> BackendResult<Json<Vec<Client>>> {
    let clients = match query.include.as_deref() {
        Some("vehicles") => gateway.list_clients_with_vehicles().await,
        _ => gateway.list_clients().await,
    };
    clients.map(Json).map_err(error_response)
}

async fn create_client<G: Gateway>(
    State(gateway): State<Arc<G>>,
    RequestJson(payload): RequestJson<NewClient>,
) -> BackendResult<(StatusCode, Json<Client>)> {
    let client = gateway.create_client(&payload).await.map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(client)))
}

async fn update_client<G: Gateway>(
    State(gateway): State<Arc<G>>,
    Path(id): Path<Id>,
    RequestJson(payload): RequestJson<ClientUpdate>,
) -> BackendResult<Json<Client>> {
    gateway
        .update_client(id, &payload)
        .await
        .map(Json)
        .map_err(error_response)
}

async fn delete_client<G: Gateway>(
    State(gateway): State<Arc<G>>,
    Path(id): Path<Id>,
) -> BackendResult<StatusCode> {
    gateway.delete_client(id).await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_vehicles<G: Gateway>(
    State(gateway): State<Arc<G>>,
) -> BackendResult<Json<Vec<Vehicle>>> {
    gateway.list_vehicles().await.map(Json).map_err(error_response)
}

async fn create_vehicle<G: Gateway>(
    State(gateway): State<Arc<G>>,
    RequestJson(payload): RequestJson<VehicleFields>,
) -> BackendResult<(StatusCode, Json<Vehicle>)> {
    let vehicle = gateway.create_vehicle(&payload).await.map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

async fn update_vehicle<G: Gateway>(
    State(gateway): State<Arc<G>>,
    Path(id): Path<Id>,
    RequestJson(payload): RequestJson<VehiclePatch>,
) -> BackendResult<Json<Vehicle>> {
    gateway
        .update_vehicle(id, &payload)
        .await
        .map(Json)
        .map_err(error_response)
}

async fn delete_vehicle<G: Gateway>(
    State(gateway): State<Arc<G>>,
    Path(id): Path<Id>,
) -> BackendResult<StatusCode> {
    gateway.delete_vehicle(id).await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn associate<G: Gateway>(
    State(gateway): State<Arc<G>>,
    RequestJson(payload): RequestJson<Association>,
) -> BackendResult<StatusCode> {
    gateway.associate(&payload).await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
