use super::common::{created, paginated, Created, ListParams};
use crate::{
    auth::{roles, AuthRouterExt},
    services::client_models::{ClientModelInput, ClientModelResponse, ModelReconciliation},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientModelQuery {
    pub client_id: Option<i32>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

impl ClientModelQuery {
    fn list(&self) -> ListParams {
        ListParams {
            page: self.page,
            limit: self.limit,
            search: self.search.clone(),
        }
    }
}

pub fn client_model_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/client-model", get(list_client_models))
        .route("/client-model/:id", get(get_client_model))
        .route("/client-model/:id/reconciliation", get(client_model_reconciliation))
        .with_auth();

    let write = Router::new()
        .route("/client-model", post(create_client_model))
        .route(
            "/client-model/:id",
            put(update_client_model).delete(delete_client_model),
        )
        .with_roles(roles::OFFICE_WRITE);

    read.merge(write)
}

#[utoipa::path(
    get,
    path = "/api/client-model",
    params(ClientModelQuery),
    responses(
        (status = 200, description = "Client models listed", body = ApiResponse<PaginatedResponse<ClientModelResponse>>)
    ),
    tag = "client-models"
)]
pub async fn list_client_models(
    State(state): State<AppState>,
    Query(query): Query<ClientModelQuery>,
) -> ApiResult<PaginatedResponse<ClientModelResponse>> {
    let (page, limit) = query.list().resolve(&state);
    let (items, total) = state
        .services
        .client_models
        .list(page, limit, query.client_id, query.search.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(paginated(items, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/client-model/:id",
    params(("id" = i32, Path, description = "Client model ID")),
    responses(
        (status = 200, description = "Client model fetched", body = ApiResponse<ClientModelResponse>),
        (status = 404, description = "Client model not found", body = crate::errors::ErrorResponse)
    ),
    tag = "client-models"
)]
pub async fn get_client_model(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<ClientModelResponse> {
    let model = state.services.client_models.get(id).await?;
    Ok(Json(ApiResponse::success(model)))
}

#[utoipa::path(
    post,
    path = "/api/client-model",
    request_body = ClientModelInput,
    responses(
        (status = 201, description = "Client model created", body = ApiResponse<ClientModelResponse>),
        (status = 400, description = "Invalid orders or variants", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse)
    ),
    tag = "client-models"
)]
pub async fn create_client_model(
    State(state): State<AppState>,
    Json(payload): Json<ClientModelInput>,
) -> Created<ClientModelResponse> {
    let model = state.services.client_models.create(payload).await?;
    Ok(created(model))
}

#[utoipa::path(
    put,
    path = "/api/client-model/:id",
    params(("id" = i32, Path, description = "Client model ID")),
    request_body = ClientModelInput,
    responses(
        (status = 200, description = "Client model updated", body = ApiResponse<ClientModelResponse>),
        (status = 404, description = "Client model not found", body = crate::errors::ErrorResponse)
    ),
    tag = "client-models"
)]
pub async fn update_client_model(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ClientModelInput>,
) -> ApiResult<ClientModelResponse> {
    let model = state.services.client_models.update(id, payload).await?;
    Ok(Json(ApiResponse::success(model)))
}

#[utoipa::path(
    delete,
    path = "/api/client-model/:id",
    params(("id" = i32, Path, description = "Client model ID")),
    responses(
        (status = 200, description = "Client model deleted"),
        (status = 404, description = "Client model not found", body = crate::errors::ErrorResponse)
    ),
    tag = "client-models"
)]
pub async fn delete_client_model(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<()> {
    state.services.client_models.delete(id).await?;
    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    get,
    path = "/api/client-model/:id/reconciliation",
    params(("id" = i32, Path, description = "Client model ID")),
    responses(
        (status = 200, description = "Ordered, received and delivered quantities per order", body = ApiResponse<ModelReconciliation>),
        (status = 404, description = "Client model not found", body = crate::errors::ErrorResponse)
    ),
    tag = "client-models"
)]
pub async fn client_model_reconciliation(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<ModelReconciliation> {
    let report = state.services.client_models.reconciliation(id).await?;
    Ok(Json(ApiResponse::success(report)))
}
