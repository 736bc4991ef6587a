//! Import declarations (`/import`) and inbound deliveries (`/livraisonEntree`).
//!
//! Both kinds share one service; each route only pins the kind.

use super::common::{created, paginated, Created, ListParams};
use crate::{
    auth::{roles, AuthRouterExt},
    entities::inbound_document::InboundKind,
    services::inbound::{InboundDocumentInput, InboundDocumentResponse},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};

pub fn inbound_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/import", get(list_imports))
        .route("/import/:id", get(get_import))
        .route("/livraisonEntree", get(list_livraisons_entree))
        .route("/livraisonEntree/:id", get(get_livraison_entree))
        .with_auth();

    let write = Router::new()
        .route("/import", post(create_import))
        .route("/import/:id", put(update_import).delete(delete_import))
        .route("/livraisonEntree", post(create_livraison_entree))
        .route(
            "/livraisonEntree/:id",
            put(update_livraison_entree).delete(delete_livraison_entree),
        )
        .with_roles(roles::OFFICE_WRITE);

    read.merge(write)
}

async fn list_kind(
    state: &AppState,
    kind: InboundKind,
    params: &ListParams,
) -> ApiResult<PaginatedResponse<InboundDocumentResponse>> {
    let (page, limit) = params.resolve(state);
    let (items, total) = state
        .services
        .inbound
        .list(kind, page, limit, params.search.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(paginated(items, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/import",
    params(ListParams),
    responses(
        (status = 200, description = "Import declarations listed", body = ApiResponse<PaginatedResponse<InboundDocumentResponse>>)
    ),
    tag = "inbound"
)]
pub async fn list_imports(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<PaginatedResponse<InboundDocumentResponse>> {
    list_kind(&state, InboundKind::DeclarationImport, &params).await
}

#[utoipa::path(
    get,
    path = "/api/import/:id",
    params(("id" = i32, Path, description = "Declaration ID")),
    responses(
        (status = 200, description = "Import declaration with lines and accessories", body = ApiResponse<InboundDocumentResponse>),
        (status = 404, description = "Declaration not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inbound"
)]
pub async fn get_import(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<InboundDocumentResponse> {
    let doc = state
        .services
        .inbound
        .get(InboundKind::DeclarationImport, id)
        .await?;
    Ok(Json(ApiResponse::success(doc)))
}

#[utoipa::path(
    post,
    path = "/api/import",
    request_body = InboundDocumentInput,
    responses(
        (status = 201, description = "Import declaration created", body = ApiResponse<InboundDocumentResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "inbound"
)]
pub async fn create_import(
    State(state): State<AppState>,
    Json(payload): Json<InboundDocumentInput>,
) -> Created<InboundDocumentResponse> {
    let doc = state
        .services
        .inbound
        .create(InboundKind::DeclarationImport, payload)
        .await?;
    Ok(created(doc))
}

#[utoipa::path(
    put,
    path = "/api/import/:id",
    params(("id" = i32, Path, description = "Declaration ID")),
    request_body = InboundDocumentInput,
    responses(
        (status = 200, description = "Header replaced and lines reconciled", body = ApiResponse<InboundDocumentResponse>),
        (status = 404, description = "Declaration not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inbound"
)]
pub async fn update_import(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<InboundDocumentInput>,
) -> ApiResult<InboundDocumentResponse> {
    let doc = state
        .services
        .inbound
        .update(InboundKind::DeclarationImport, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(doc)))
}

#[utoipa::path(
    delete,
    path = "/api/import/:id",
    params(("id" = i32, Path, description = "Declaration ID")),
    responses(
        (status = 200, description = "Declaration and its lines deleted"),
        (status = 404, description = "Declaration not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inbound"
)]
pub async fn delete_import(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<()> {
    state
        .services
        .inbound
        .delete(InboundKind::DeclarationImport, id)
        .await?;
    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    get,
    path = "/api/livraisonEntree",
    params(ListParams),
    responses(
        (status = 200, description = "Inbound deliveries listed", body = ApiResponse<PaginatedResponse<InboundDocumentResponse>>)
    ),
    tag = "inbound"
)]
pub async fn list_livraisons_entree(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<PaginatedResponse<InboundDocumentResponse>> {
    list_kind(&state, InboundKind::LivraisonEntree, &params).await
}

#[utoipa::path(
    get,
    path = "/api/livraisonEntree/:id",
    params(("id" = i32, Path, description = "Delivery ID")),
    responses(
        (status = 200, description = "Inbound delivery with lines", body = ApiResponse<InboundDocumentResponse>),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inbound"
)]
pub async fn get_livraison_entree(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<InboundDocumentResponse> {
    let doc = state
        .services
        .inbound
        .get(InboundKind::LivraisonEntree, id)
        .await?;
    Ok(Json(ApiResponse::success(doc)))
}

#[utoipa::path(
    post,
    path = "/api/livraisonEntree",
    request_body = InboundDocumentInput,
    responses(
        (status = 201, description = "Inbound delivery created", body = ApiResponse<InboundDocumentResponse>),
        (status = 400, description = "Invalid request or accessories supplied", body = crate::errors::ErrorResponse)
    ),
    tag = "inbound"
)]
pub async fn create_livraison_entree(
    State(state): State<AppState>,
    Json(payload): Json<InboundDocumentInput>,
) -> Created<InboundDocumentResponse> {
    let doc = state
        .services
        .inbound
        .create(InboundKind::LivraisonEntree, payload)
        .await?;
    Ok(created(doc))
}

#[utoipa::path(
    put,
    path = "/api/livraisonEntree/:id",
    params(("id" = i32, Path, description = "Delivery ID")),
    request_body = InboundDocumentInput,
    responses(
        (status = 200, description = "Header replaced and lines reconciled", body = ApiResponse<InboundDocumentResponse>),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inbound"
)]
pub async fn update_livraison_entree(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<InboundDocumentInput>,
) -> ApiResult<InboundDocumentResponse> {
    let doc = state
        .services
        .inbound
        .update(InboundKind::LivraisonEntree, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(doc)))
}

#[utoipa::path(
    delete,
    path = "/api/livraisonEntree/:id",
    params(("id" = i32, Path, description = "Delivery ID")),
    responses(
        (status = 200, description = "Delivery and its lines deleted"),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inbound"
)]
pub async fn delete_livraison_entree(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    state
        .services
        .inbound
        .delete(InboundKind::LivraisonEntree, id)
        .await?;
    Ok(Json(ApiResponse::success(())))
}
