//! Export declarations (`/exporte`) and outbound deliveries (`/livraisons`).

use super::common::{created, paginated, today, Created, ListParams};
use crate::{
    auth::{roles, AuthRouterExt},
    entities::outbound_document::OutboundKind,
    services::outbound::{OutboundDocumentInput, OutboundDocumentResponse},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};

pub fn outbound_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/exporte", get(list_exports))
        .route("/exporte/:id", get(get_export))
        .route("/livraisons", get(list_livraisons))
        .route("/livraisons/:id", get(get_livraison))
        .with_auth();

    let write = Router::new()
        .route("/exporte", post(create_export))
        .route("/exporte/:id", put(update_export).delete(delete_export))
        .route("/livraisons", post(create_livraison))
        .route("/livraisons/:id", put(update_livraison).delete(delete_livraison))
        .with_roles(roles::OFFICE_WRITE);

    read.merge(write)
}

async fn list_kind(
    state: &AppState,
    kind: OutboundKind,
    params: &ListParams,
) -> ApiResult<PaginatedResponse<OutboundDocumentResponse>> {
    let (page, limit) = params.resolve(state);
    let (items, total) = state
        .services
        .outbound
        .list(kind, page, limit, params.search.as_deref(), today())
        .await?;
    Ok(Json(ApiResponse::success(paginated(items, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/exporte",
    params(ListParams),
    responses(
        (status = 200, description = "Export declarations listed, overdue ones marked unpaid", body = ApiResponse<PaginatedResponse<OutboundDocumentResponse>>)
    ),
    tag = "outbound"
)]
pub async fn list_exports(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<PaginatedResponse<OutboundDocumentResponse>> {
    list_kind(&state, OutboundKind::DeclarationExport, &params).await
}

#[utoipa::path(
    get,
    path = "/api/exporte/:id",
    params(("id" = i32, Path, description = "Declaration ID")),
    responses(
        (status = 200, description = "Export declaration with lines and totals", body = ApiResponse<OutboundDocumentResponse>),
        (status = 404, description = "Declaration not found", body = crate::errors::ErrorResponse)
    ),
    tag = "outbound"
)]
pub async fn get_export(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<OutboundDocumentResponse> {
    let doc = state
        .services
        .outbound
        .get(OutboundKind::DeclarationExport, id, today())
        .await?;
    Ok(Json(ApiResponse::success(doc)))
}

#[utoipa::path(
    post,
    path = "/api/exporte",
    request_body = OutboundDocumentInput,
    responses(
        (status = 201, description = "Export declaration created", body = ApiResponse<OutboundDocumentResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "outbound"
)]
pub async fn create_export(
    State(state): State<AppState>,
    Json(payload): Json<OutboundDocumentInput>,
) -> Created<OutboundDocumentResponse> {
    let doc = state
        .services
        .outbound
        .create(OutboundKind::DeclarationExport, payload)
        .await?;
    Ok(created(doc))
}

#[utoipa::path(
    put,
    path = "/api/exporte/:id",
    params(("id" = i32, Path, description = "Declaration ID")),
    request_body = OutboundDocumentInput,
    responses(
        (status = 200, description = "Header replaced and lines reconciled", body = ApiResponse<OutboundDocumentResponse>),
        (status = 404, description = "Declaration not found", body = crate::errors::ErrorResponse)
    ),
    tag = "outbound"
)]
pub async fn update_export(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<OutboundDocumentInput>,
) -> ApiResult<OutboundDocumentResponse> {
    let doc = state
        .services
        .outbound
        .update(OutboundKind::DeclarationExport, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(doc)))
}

#[utoipa::path(
    delete,
    path = "/api/exporte/:id",
    params(("id" = i32, Path, description = "Declaration ID")),
    responses(
        (status = 200, description = "Declaration and its lines deleted"),
        (status = 404, description = "Declaration not found", body = crate::errors::ErrorResponse)
    ),
    tag = "outbound"
)]
pub async fn delete_export(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<()> {
    state
        .services
        .outbound
        .delete(OutboundKind::DeclarationExport, id)
        .await?;
    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    get,
    path = "/api/livraisons",
    params(ListParams),
    responses(
        (status = 200, description = "Outbound deliveries listed", body = ApiResponse<PaginatedResponse<OutboundDocumentResponse>>)
    ),
    tag = "outbound"
)]
pub async fn list_livraisons(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<PaginatedResponse<OutboundDocumentResponse>> {
    list_kind(&state, OutboundKind::Livraison, &params).await
}

#[utoipa::path(
    get,
    path = "/api/livraisons/:id",
    params(("id" = i32, Path, description = "Delivery ID")),
    responses(
        (status = 200, description = "Outbound delivery with lines and totals", body = ApiResponse<OutboundDocumentResponse>),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    tag = "outbound"
)]
pub async fn get_livraison(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<OutboundDocumentResponse> {
    let doc = state
        .services
        .outbound
        .get(OutboundKind::Livraison, id, today())
        .await?;
    Ok(Json(ApiResponse::success(doc)))
}

#[utoipa::path(
    post,
    path = "/api/livraisons",
    request_body = OutboundDocumentInput,
    responses(
        (status = 201, description = "Outbound delivery created", body = ApiResponse<OutboundDocumentResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "outbound"
)]
pub async fn create_livraison(
    State(state): State<AppState>,
    Json(payload): Json<OutboundDocumentInput>,
) -> Created<OutboundDocumentResponse> {
    let doc = state
        .services
        .outbound
        .create(OutboundKind::Livraison, payload)
        .await?;
    Ok(created(doc))
}

#[utoipa::path(
    put,
    path = "/api/livraisons/:id",
    params(("id" = i32, Path, description = "Delivery ID")),
    request_body = OutboundDocumentInput,
    responses(
        (status = 200, description = "Header replaced and lines reconciled", body = ApiResponse<OutboundDocumentResponse>),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    tag = "outbound"
)]
pub async fn update_livraison(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<OutboundDocumentInput>,
) -> ApiResult<OutboundDocumentResponse> {
    let doc = state
        .services
        .outbound
        .update(OutboundKind::Livraison, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(doc)))
}

#[utoipa::path(
    delete,
    path = "/api/livraisons/:id",
    params(("id" = i32, Path, description = "Delivery ID")),
    responses(
        (status = 200, description = "Delivery and its lines deleted"),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    tag = "outbound"
)]
pub async fn delete_livraison(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<()> {
    state
        .services
        .outbound
        .delete(OutboundKind::Livraison, id)
        .await?;
    Ok(Json(ApiResponse::success(())))
}
