use super::common::{created, paginated, today, Created};
use crate::{
    auth::{roles, AuthRouterExt},
    entities::document_status::DocumentStatus,
    services::invoices::{InvoiceInput, InvoiceResponse, StatusUpdate},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvoiceQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Status code: 1 draft, 2 pending, 3 paid, 4 cancelled, 5 unpaid
    #[param(value_type = Option<i32>)]
    pub status: Option<DocumentStatus>,
    /// Matches the invoice number or client name
    pub search: Option<String>,
}

/// Billing is restricted to administrators, reads included.
pub fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route(
            "/invoices/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/invoices/:id/status", put(update_invoice_status))
        .with_roles(roles::ADMIN_ONLY)
}

#[utoipa::path(
    get,
    path = "/api/invoices",
    params(InvoiceQuery),
    responses(
        (status = 200, description = "Invoices listed, overdue ones marked unpaid", body = ApiResponse<PaginatedResponse<InvoiceResponse>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<InvoiceQuery>,
) -> ApiResult<PaginatedResponse<InvoiceResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = state.config.page_size(query.limit);
    let (items, total) = state
        .services
        .invoices
        .list(page, limit, query.status, query.search.as_deref(), today())
        .await?;
    Ok(Json(ApiResponse::success(paginated(items, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/invoices/:id",
    params(("id" = i32, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice with lines and totals", body = ApiResponse<InvoiceResponse>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn get_invoice(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<InvoiceResponse> {
    let invoice = state.services.invoices.get(id, today()).await?;
    Ok(Json(ApiResponse::success(invoice)))
}

#[utoipa::path(
    post,
    path = "/api/invoices",
    request_body = InvoiceInput,
    responses(
        (status = 201, description = "Invoice created", body = ApiResponse<InvoiceResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Invoice number already used", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<InvoiceInput>,
) -> Created<InvoiceResponse> {
    let invoice = state.services.invoices.create(payload).await?;
    Ok(created(invoice))
}

#[utoipa::path(
    put,
    path = "/api/invoices/:id",
    params(("id" = i32, Path, description = "Invoice ID")),
    request_body = InvoiceInput,
    responses(
        (status = 200, description = "Invoice updated, lines reconciled", body = ApiResponse<InvoiceResponse>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Invoice number already used", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<InvoiceInput>,
) -> ApiResult<InvoiceResponse> {
    let invoice = state.services.invoices.update(id, payload).await?;
    Ok(Json(ApiResponse::success(invoice)))
}

#[utoipa::path(
    put,
    path = "/api/invoices/:id/status",
    params(("id" = i32, Path, description = "Invoice ID")),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<InvoiceResponse>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn update_invoice_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<StatusUpdate>,
) -> ApiResult<InvoiceResponse> {
    let invoice = state
        .services
        .invoices
        .update_status(id, payload.status)
        .await?;
    Ok(Json(ApiResponse::success(invoice)))
}

#[utoipa::path(
    delete,
    path = "/api/invoices/:id",
    params(("id" = i32, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice and its lines deleted"),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse)
    ),
    tag = "invoices"
)]
pub async fn delete_invoice(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<()> {
    state.services.invoices.delete(id).await?;
    Ok(Json(ApiResponse::success(())))
}
