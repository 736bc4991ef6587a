use super::common::today;
use crate::{
    auth::{roles, AuthRouterExt},
    reconciliation::{InboundReportRow, OutboundReportRow, PlanningFilter, PlanningRow},
    services::reports::Dashboard,
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PlanningQuery {
    /// Client name, compared case- and whitespace-insensitively
    pub client: Option<String>,
    /// Model name, compared case- and whitespace-insensitively
    pub model: Option<String>,
}

pub fn report_routes() -> Router<AppState> {
    let reports = Router::new()
        .route("/planning", get(planning))
        .route("/etat/import", get(etat_import))
        .route("/etat/export", get(etat_export))
        .with_auth();

    let dashboard = Router::new()
        .route("/dashboard", get(dashboard))
        .with_roles(roles::ADMIN_ONLY);

    reports.merge(dashboard)
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Counts, reconciliation totals, invoices by status and expiring clients", body = ApiResponse<Dashboard>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Dashboard> {
    let dashboard = state
        .services
        .reports
        .dashboard(today(), state.config.client_expiry_notice_days)
        .await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

#[utoipa::path(
    get,
    path = "/api/planning",
    params(PlanningQuery),
    responses(
        (status = 200, description = "One row per client, model and order", body = ApiResponse<Vec<PlanningRow>>)
    ),
    tag = "reports"
)]
pub async fn planning(
    State(state): State<AppState>,
    Query(query): Query<PlanningQuery>,
) -> ApiResult<Vec<PlanningRow>> {
    let filter = PlanningFilter {
        client: query.client,
        model: query.model,
    };
    let rows = state.services.reports.planning(filter).await?;
    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(
    get,
    path = "/api/etat/import",
    responses(
        (status = 200, description = "Inbound lines with missing quantities", body = ApiResponse<Vec<InboundReportRow>>)
    ),
    tag = "reports"
)]
pub async fn etat_import(State(state): State<AppState>) -> ApiResult<Vec<InboundReportRow>> {
    let rows = state.services.reports.etat_import().await?;
    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(
    get,
    path = "/api/etat/export",
    responses(
        (status = 200, description = "Deliveries grouped by order against ordered quantities", body = ApiResponse<Vec<OutboundReportRow>>)
    ),
    tag = "reports"
)]
pub async fn etat_export(State(state): State<AppState>) -> ApiResult<Vec<OutboundReportRow>> {
    let rows = state.services.reports.etat_export().await?;
    Ok(Json(ApiResponse::success(rows)))
}
