//! Cutting sheets, sewing sheets and production follow-up.

use super::common::{created, paginated, Created};
use crate::{
    auth::{roles, AuthRouterExt},
    offline::{SyncEntity, SyncOperation, SyncReport},
    services::production::{
        FicheCoupeInput, FicheCoupeResponse, FicheProductionInput, FicheProductionResponse,
        SheetFilter, SuiviProductionInput, SuiviProductionResponse,
    },
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
pub struct SheetQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Substring of the client name
    pub client: Option<String>,
    /// Substring of the model name
    pub model: Option<String>,
    /// Substring of the order code
    pub commande: Option<String>,
}

impl SheetQuery {
    fn split(self, state: &AppState) -> (u64, u64, SheetFilter) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = state.config.page_size(self.limit);
        let filter = SheetFilter {
            client: self.client.filter(|s| !s.trim().is_empty()),
            model: self.model.filter(|s| !s.trim().is_empty()),
            commande: self.commande.filter(|s| !s.trim().is_empty()),
        };
        (page, limit, filter)
    }
}

pub fn production_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/fiche-coupe", get(list_fiches_coupe))
        .route("/fiche-coupe/:id", get(get_fiche_coupe))
        .route("/fiche-production", get(list_fiches_production))
        .route("/fiche-production/:id", get(get_fiche_production))
        .route("/suivi-production", get(list_suivis_production))
        .route("/suivi-production/:id", get(get_suivi_production))
        .with_auth();

    let cutting = Router::new()
        .route("/fiche-coupe", post(create_fiche_coupe))
        .route("/fiche-coupe/sync", post(sync_fiches_coupe))
        .route(
            "/fiche-coupe/:id",
            put(update_fiche_coupe).delete(delete_fiche_coupe),
        )
        .with_roles(roles::CUTTING_WRITE);

    let workshop = Router::new()
        .route("/fiche-production", post(create_fiche_production))
        .route("/fiche-production/sync", post(sync_fiches_production))
        .route(
            "/fiche-production/:id",
            put(update_fiche_production).delete(delete_fiche_production),
        )
        .route("/suivi-production", post(create_suivi_production))
        .route(
            "/suivi-production/:id",
            put(update_suivi_production).delete(delete_suivi_production),
        )
        .with_roles(roles::WORKSHOP_WRITE);

    read.merge(cutting).merge(workshop)
}

// ---- cutting sheets ----

#[utoipa::path(
    get,
    path = "/api/fiche-coupe",
    params(SheetQuery),
    responses(
        (status = 200, description = "Cutting sheets listed", body = ApiResponse<PaginatedResponse<FicheCoupeResponse>>)
    ),
    tag = "production"
)]
pub async fn list_fiches_coupe(
    State(state): State<AppState>,
    Query(query): Query<SheetQuery>,
) -> ApiResult<PaginatedResponse<FicheCoupeResponse>> {
    let (page, limit, filter) = query.split(&state);
    let (items, total) = state
        .services
        .production
        .list_coupes(page, limit, &filter)
        .await?;
    Ok(Json(ApiResponse::success(paginated(items, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/fiche-coupe/:id",
    params(("id" = i32, Path, description = "Cutting sheet ID")),
    responses(
        (status = 200, description = "Cutting sheet with per-category totals", body = ApiResponse<FicheCoupeResponse>),
        (status = 404, description = "Cutting sheet not found", body = crate::errors::ErrorResponse)
    ),
    tag = "production"
)]
pub async fn get_fiche_coupe(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<FicheCoupeResponse> {
    let sheet = state.services.production.get_coupe(id).await?;
    Ok(Json(ApiResponse::success(sheet)))
}

#[utoipa::path(
    post,
    path = "/api/fiche-coupe",
    request_body = FicheCoupeInput,
    responses(
        (status = 201, description = "Cutting sheet created", body = ApiResponse<FicheCoupeResponse>),
        (status = 400, description = "Grid exceeds the ordered quantity", body = crate::errors::ErrorResponse)
    ),
    tag = "production"
)]
pub async fn create_fiche_coupe(
    State(state): State<AppState>,
    Json(payload): Json<FicheCoupeInput>,
) -> Created<FicheCoupeResponse> {
    let sheet = state.services.production.create_coupe(payload).await?;
    Ok(created(sheet))
}

#[utoipa::path(
    put,
    path = "/api/fiche-coupe/:id",
    params(("id" = i32, Path, description = "Cutting sheet ID")),
    request_body = FicheCoupeInput,
    responses(
        (status = 200, description = "Cutting sheet updated", body = ApiResponse<FicheCoupeResponse>),
        (status = 404, description = "Cutting sheet not found", body = crate::errors::ErrorResponse)
    ),
    tag = "production"
)]
pub async fn update_fiche_coupe(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<FicheCoupeInput>,
) -> ApiResult<FicheCoupeResponse> {
    let sheet = state.services.production.update_coupe(id, payload).await?;
    Ok(Json(ApiResponse::success(sheet)))
}

#[utoipa::path(
    delete,
    path = "/api/fiche-coupe/:id",
    params(("id" = i32, Path, description = "Cutting sheet ID")),
    responses(
        (status = 200, description = "Cutting sheet deleted"),
        (status = 404, description = "Cutting sheet not found", body = crate::errors::ErrorResponse)
    ),
    tag = "production"
)]
pub async fn delete_fiche_coupe(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<()> {
    state.services.production.delete_coupe(id).await?;
    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    post,
    path = "/api/fiche-coupe/sync",
    request_body = Vec<SyncOperation>,
    responses(
        (status = 200, description = "Queued operations applied in order", body = ApiResponse<SyncReport>)
    ),
    tag = "sync"
)]
pub async fn sync_fiches_coupe(
    State(state): State<AppState>,
    Json(ops): Json<Vec<SyncOperation>>,
) -> ApiResult<SyncReport> {
    let report = state
        .services
        .sync
        .apply_batch(SyncEntity::FicheCoupe, ops)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

// ---- sewing sheets ----

#[utoipa::path(
    get,
    path = "/api/fiche-production",
    params(SheetQuery),
    responses(
        (status = 200, description = "Sewing sheets listed", body = ApiResponse<PaginatedResponse<FicheProductionResponse>>)
    ),
    tag = "production"
)]
pub async fn list_fiches_production(
    State(state): State<AppState>,
    Query(query): Query<SheetQuery>,
) -> ApiResult<PaginatedResponse<FicheProductionResponse>> {
    let (page, limit, filter) = query.split(&state);
    let (items, total) = state
        .services
        .production
        .list_productions(page, limit, &filter)
        .await?;
    Ok(Json(ApiResponse::success(paginated(items, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/fiche-production/:id",
    params(("id" = i32, Path, description = "Sewing sheet ID")),
    responses(
        (status = 200, description = "Sewing sheet with per-day totals", body = ApiResponse<FicheProductionResponse>),
        (status = 404, description = "Sewing sheet not found", body = crate::errors::ErrorResponse)
    ),
    tag = "production"
)]
pub async fn get_fiche_production(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<FicheProductionResponse> {
    let sheet = state.services.production.get_production(id).await?;
    Ok(Json(ApiResponse::success(sheet)))
}

#[utoipa::path(
    post,
    path = "/api/fiche-production",
    request_body = FicheProductionInput,
    responses(
        (status = 201, description = "Sewing sheet created", body = ApiResponse<FicheProductionResponse>),
        (status = 400, description = "Grid exceeds the ordered quantity", body = crate::errors::ErrorResponse)
    ),
    tag = "production"
)]
pub async fn create_fiche_production(
    State(state): State<AppState>,
    Json(payload): Json<FicheProductionInput>,
) -> Created<FicheProductionResponse> {
    let sheet = state.services.production.create_production(payload).await?;
    Ok(created(sheet))
}

#[utoipa::path(
    put,
    path = "/api/fiche-production/:id",
    params(("id" = i32, Path, description = "Sewing sheet ID")),
    request_body = FicheProductionInput,
    responses(
        (status = 200, description = "Sewing sheet updated", body = ApiResponse<FicheProductionResponse>),
        (status = 404, description = "Sewing sheet not found", body = crate::errors::ErrorResponse)
    ),
    tag = "production"
)]
pub async fn update_fiche_production(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<FicheProductionInput>,
) -> ApiResult<FicheProductionResponse> {
    let sheet = state
        .services
        .production
        .update_production(id, payload)
        .await?;
    Ok(Json(ApiResponse::success(sheet)))
}

#[utoipa::path(
    delete,
    path = "/api/fiche-production/:id",
    params(("id" = i32, Path, description = "Sewing sheet ID")),
    responses(
        (status = 200, description = "Sewing sheet deleted, logged time detached"),
        (status = 404, description = "Sewing sheet not found", body = crate::errors::ErrorResponse)
    ),
    tag = "production"
)]
pub async fn delete_fiche_production(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    state.services.production.delete_production(id).await?;
    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    post,
    path = "/api/fiche-production/sync",
    request_body = Vec<SyncOperation>,
    responses(
        (status = 200, description = "Queued operations applied in order", body = ApiResponse<SyncReport>)
    ),
    tag = "sync"
)]
pub async fn sync_fiches_production(
    State(state): State<AppState>,
    Json(ops): Json<Vec<SyncOperation>>,
) -> ApiResult<SyncReport> {
    let report = state
        .services
        .sync
        .apply_batch(SyncEntity::FicheProduction, ops)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

// ---- production follow-up ----

#[utoipa::path(
    get,
    path = "/api/suivi-production",
    params(SheetQuery),
    responses(
        (status = 200, description = "Follow-up documents listed", body = ApiResponse<PaginatedResponse<SuiviProductionResponse>>)
    ),
    tag = "production"
)]
pub async fn list_suivis_production(
    State(state): State<AppState>,
    Query(query): Query<SheetQuery>,
) -> ApiResult<PaginatedResponse<SuiviProductionResponse>> {
    let (page, limit, filter) = query.split(&state);
    let (items, total) = state
        .services
        .production
        .list_suivis(page, limit, &filter)
        .await?;
    Ok(Json(ApiResponse::success(paginated(items, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/suivi-production/:id",
    params(("id" = i32, Path, description = "Follow-up ID")),
    responses(
        (status = 200, description = "Follow-up document", body = ApiResponse<SuiviProductionResponse>),
        (status = 404, description = "Follow-up not found", body = crate::errors::ErrorResponse)
    ),
    tag = "production"
)]
pub async fn get_suivi_production(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<SuiviProductionResponse> {
    let suivi = state.services.production.get_suivi(id).await?;
    Ok(Json(ApiResponse::success(suivi)))
}

#[utoipa::path(
    post,
    path = "/api/suivi-production",
    request_body = SuiviProductionInput,
    responses(
        (status = 201, description = "Follow-up created", body = ApiResponse<SuiviProductionResponse>)
    ),
    tag = "production"
)]
pub async fn create_suivi_production(
    State(state): State<AppState>,
    Json(payload): Json<SuiviProductionInput>,
) -> Created<SuiviProductionResponse> {
    let suivi = state.services.production.create_suivi(payload).await?;
    Ok(created(suivi))
}

#[utoipa::path(
    put,
    path = "/api/suivi-production/:id",
    params(("id" = i32, Path, description = "Follow-up ID")),
    request_body = SuiviProductionInput,
    responses(
        (status = 200, description = "Follow-up updated", body = ApiResponse<SuiviProductionResponse>),
        (status = 404, description = "Follow-up not found", body = crate::errors::ErrorResponse)
    ),
    tag = "production"
)]
pub async fn update_suivi_production(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<SuiviProductionInput>,
) -> ApiResult<SuiviProductionResponse> {
    let suivi = state.services.production.update_suivi(id, payload).await?;
    Ok(Json(ApiResponse::success(suivi)))
}

#[utoipa::path(
    delete,
    path = "/api/suivi-production/:id",
    params(("id" = i32, Path, description = "Follow-up ID")),
    responses(
        (status = 200, description = "Follow-up deleted"),
        (status = 404, description = "Follow-up not found", body = crate::errors::ErrorResponse)
    ),
    tag = "production"
)]
pub async fn delete_suivi_production(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    state.services.production.delete_suivi(id).await?;
    Ok(Json(ApiResponse::success(())))
}
