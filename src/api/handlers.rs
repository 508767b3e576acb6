use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{ErrorKind, RegistryError};
use crate::logic::{DashboardStats, OwnershipConflict, RegistryService};
use crate::model::{
    normalize_client_id, Client, ClientSummary, ClientUpdate, Id, NewClient, NewVehicle, Vehicle,
    VehicleUpdate,
};
use crate::store::Gateway;

pub type AppState<G> = Arc<RegistryService<G>>;

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> ListResponse<T> {
    fn new(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
    /// Present for partial association failures: the vehicle as persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Vehicle>,
}

impl ErrorResponse {
    pub fn new(err: &RegistryError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind(),
            vehicle: err.persisted_vehicle().cloned(),
        }
    }
}

/// Map a registry error onto a status code and JSON body
pub fn error_response(err: RegistryError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::ClientHasVehicles => StatusCode::CONFLICT,
        ErrorKind::NetworkFailure | ErrorKind::PartialAssociationFailure => {
            StatusCode::BAD_GATEWAY
        }
    };
    (status, Json(ErrorResponse::new(&err)))
}

fn validate<T: Validate>(payload: &T) -> ApiResult<()> {
    payload
        .validate()
        .map_err(|e| error_response(RegistryError::from(e)))
}

/// Everything a list page needs after the UI regains focus
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub clients: Vec<ClientSummary>,
    pub vehicles: Vec<Vehicle>,
    pub conflicts: Vec<OwnershipConflict>,
}

#[derive(Debug, Deserialize)]
pub struct AssociateRequest {
    pub vehicle_id: Id,
    /// Required; `null` (or `0`) unlinks the vehicle
    #[serde(deserialize_with = "Option::deserialize")]
    pub client_id: Option<Id>,
}

pub async fn get_dashboard<G: Gateway>(
    State(service): State<AppState<G>>,
) -> ApiResult<Json<DashboardStats>> {
    service.dashboard().await.map(Json).map_err(error_response)
}

pub async fn refresh<G: Gateway>(
    State(service): State<AppState<G>>,
) -> ApiResult<Json<RefreshResponse>> {
    let snapshot = service.refresh().await.map_err(error_response)?;
    Ok(Json(RefreshResponse {
        clients: snapshot.client_summaries(),
        conflicts: snapshot.ownership.conflicts().to_vec(),
        vehicles: snapshot.vehicles,
    }))
}

// Client handlers

pub async fn list_clients<G: Gateway>(
    State(service): State<AppState<G>>,
) -> ApiResult<Json<ListResponse<Client>>> {
    let clients = service.clients().list().await.map_err(error_response)?;
    Ok(Json(ListResponse::new(clients)))
}

pub async fn list_client_summaries<G: Gateway>(
    State(service): State<AppState<G>>,
) -> ApiResult<Json<ListResponse<ClientSummary>>> {
    let summaries = service.client_summaries().await.map_err(error_response)?;
    Ok(Json(ListResponse::new(summaries)))
}

pub async fn get_client<G: Gateway>(
    State(service): State<AppState<G>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<Client>> {
    service
        .clients()
        .get_by_id(id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn create_client<G: Gateway>(
    State(service): State<AppState<G>>,
    RequestJson(payload): RequestJson<NewClient>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    validate(&payload)?;
    let client = service
        .clients()
        .create(payload)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update_client<G: Gateway>(
    State(service): State<AppState<G>>,
    Path(id): Path<Id>,
    RequestJson(payload): RequestJson<ClientUpdate>,
) -> ApiResult<Json<Client>> {
    validate(&payload)?;
    service
        .clients()
        .update(id, payload)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_client<G: Gateway>(
    State(service): State<AppState<G>>,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    service.delete_client(id).await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_client_vehicles<G: Gateway>(
    State(service): State<AppState<G>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<ListResponse<Vehicle>>> {
    let vehicles = service
        .vehicles_of_client(id)
        .await
        .map_err(error_response)?;
    Ok(Json(ListResponse::new(vehicles)))
}

// Vehicle handlers

pub async fn list_vehicles<G: Gateway>(
    State(service): State<AppState<G>>,
) -> ApiResult<Json<ListResponse<Vehicle>>> {
    let vehicles = service.list_vehicles().await.map_err(error_response)?;
    Ok(Json(ListResponse::new(vehicles)))
}

pub async fn get_vehicle<G: Gateway>(
    State(service): State<AppState<G>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<Vehicle>> {
    service
        .get_vehicle(id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn create_vehicle<G: Gateway>(
    State(service): State<AppState<G>>,
    RequestJson(payload): RequestJson<NewVehicle>,
) -> ApiResult<(StatusCode, Json<Vehicle>)> {
    validate(&payload)?;
    let vehicle = service
        .create_vehicle(payload)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

pub async fn update_vehicle<G: Gateway>(
    State(service): State<AppState<G>>,
    Path(id): Path<Id>,
    RequestJson(payload): RequestJson<VehicleUpdate>,
) -> ApiResult<Json<Vehicle>> {
    validate(&payload)?;
    service
        .update_vehicle(id, payload)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_vehicle<G: Gateway>(
    State(service): State<AppState<G>>,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    service.delete_vehicle(id).await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn associate_vehicle<G: Gateway>(
    State(service): State<AppState<G>>,
    RequestJson(payload): RequestJson<AssociateRequest>,
) -> ApiResult<StatusCode> {
    service
        .associate(payload.vehicle_id, normalize_client_id(payload.client_id))
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
