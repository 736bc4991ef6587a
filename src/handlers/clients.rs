use super::common::{created, paginated, today, Created, ListParams};
use crate::{
    auth::{roles, AuthRouterExt},
    offline::{SyncEntity, SyncOperation, SyncReport},
    services::clients::{ClientInput, ClientResponse, ExpiringClient},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpiringQuery {
    /// Notice window in days; defaults to the configured value
    pub within_days: Option<i64>,
}

pub fn client_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/client", get(list_clients))
        .route("/client/expiring", get(expiring_clients))
        .route("/client/:id", get(get_client))
        .with_auth();

    let write = Router::new()
        .route("/client", post(create_client))
        .route("/client/sync", post(sync_clients))
        .route("/client/:id", axum::routing::put(update_client).delete(delete_client))
        .with_roles(roles::OFFICE_WRITE);

    read.merge(write)
}

#[utoipa::path(
    get,
    path = "/api/client",
    params(ListParams),
    responses(
        (status = 200, description = "Clients listed", body = ApiResponse<PaginatedResponse<ClientResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "clients"
)]
pub async fn list_clients(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<PaginatedResponse<ClientResponse>> {
    let (page, limit) = params.resolve(&state);
    let (items, total) = state
        .services
        .clients
        .list(page, limit, params.search.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(paginated(items, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/client/:id",
    params(("id" = i32, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client fetched", body = ApiResponse<ClientResponse>),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse)
    ),
    tag = "clients"
)]
pub async fn get_client(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<ClientResponse> {
    let client = state.services.clients.get(id).await?;
    Ok(Json(ApiResponse::success(client)))
}

#[utoipa::path(
    post,
    path = "/api/client",
    request_body = ClientInput,
    responses(
        (status = 201, description = "Client created", body = ApiResponse<ClientResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "clients"
)]
pub async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<ClientInput>,
) -> Created<ClientResponse> {
    let client = state.services.clients.create(payload).await?;
    Ok(created(client))
}

#[utoipa::path(
    put,
    path = "/api/client/:id",
    params(("id" = i32, Path, description = "Client ID")),
    request_body = ClientInput,
    responses(
        (status = 200, description = "Client updated", body = ApiResponse<ClientResponse>),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse)
    ),
    tag = "clients"
)]
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ClientInput>,
) -> ApiResult<ClientResponse> {
    let client = state.services.clients.update(id, payload).await?;
    Ok(Json(ApiResponse::success(client)))
}

#[utoipa::path(
    delete,
    path = "/api/client/:id",
    params(("id" = i32, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client and its models deleted"),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse)
    ),
    tag = "clients"
)]
pub async fn delete_client(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<()> {
    state.services.clients.delete(id).await?;
    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    get,
    path = "/api/client/expiring",
    params(ExpiringQuery),
    responses(
        (status = 200, description = "Clients whose submission window closes soon or has closed", body = ApiResponse<Vec<ExpiringClient>>)
    ),
    tag = "clients"
)]
pub async fn expiring_clients(
    State(state): State<AppState>,
    Query(query): Query<ExpiringQuery>,
) -> ApiResult<Vec<ExpiringClient>> {
    let within = query
        .within_days
        .unwrap_or(state.config.client_expiry_notice_days);
    let clients = state.services.clients.expiring(today(), within).await?;
    Ok(Json(ApiResponse::success(clients)))
}

#[utoipa::path(
    post,
    path = "/api/client/sync",
    request_body = Vec<SyncOperation>,
    responses(
        (status = 200, description = "Queued operations applied in order", body = ApiResponse<SyncReport>)
    ),
    tag = "sync"
)]
pub async fn sync_clients(
    State(state): State<AppState>,
    Json(ops): Json<Vec<SyncOperation>>,
) -> ApiResult<SyncReport> {
    let report = state.services.sync.apply_batch(SyncEntity::Client, ops).await?;
    Ok(Json(ApiResponse::success(report)))
}
