use super::common::{created, paginated, Created};
use crate::{
    auth::{roles, AuthRouterExt},
    services::staff::{
        EmployeeInput, EmployeeResponse, ProductionTimeFilter, ProductionTimeInput,
        ProductionTimeResponse,
    },
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Only employees still marked active
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductionTimeQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub employee_id: Option<i32>,
    pub fiche_production_id: Option<i32>,
    /// Inclusive lower bound on the work date
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the work date
    pub to: Option<NaiveDate>,
}

pub fn staff_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/employee", get(list_employees))
        .route("/employee/:id", get(get_employee))
        .route("/production-time", get(list_production_times))
        .route("/production-time/:id", get(get_production_time))
        .with_auth();

    let office = Router::new()
        .route("/employee", post(create_employee))
        .route("/employee/:id", put(update_employee).delete(delete_employee))
        .with_roles(roles::OFFICE_WRITE);

    let workshop = Router::new()
        .route("/production-time", post(create_production_time))
        .route(
            "/production-time/:id",
            put(update_production_time).delete(delete_production_time),
        )
        .with_roles(roles::WORKSHOP_WRITE);

    read.merge(office).merge(workshop)
}

#[utoipa::path(
    get,
    path = "/api/employee",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Employees listed", body = ApiResponse<PaginatedResponse<EmployeeResponse>>)
    ),
    tag = "staff"
)]
pub async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<EmployeeQuery>,
) -> ApiResult<PaginatedResponse<EmployeeResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = state.config.page_size(query.limit);
    let (items, total) = state
        .services
        .staff
        .list_employees(page, limit, query.active_only)
        .await?;
    Ok(Json(ApiResponse::success(paginated(items, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/employee/:id",
    params(("id" = i32, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee fetched", body = ApiResponse<EmployeeResponse>),
        (status = 404, description = "Employee not found", body = crate::errors::ErrorResponse)
    ),
    tag = "staff"
)]
pub async fn get_employee(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<EmployeeResponse> {
    let employee = state.services.staff.get_employee(id).await?;
    Ok(Json(ApiResponse::success(employee)))
}

#[utoipa::path(
    post,
    path = "/api/employee",
    request_body = EmployeeInput,
    responses(
        (status = 201, description = "Employee created", body = ApiResponse<EmployeeResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "staff"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    Json(payload): Json<EmployeeInput>,
) -> Created<EmployeeResponse> {
    let employee = state.services.staff.create_employee(payload).await?;
    Ok(created(employee))
}

#[utoipa::path(
    put,
    path = "/api/employee/:id",
    params(("id" = i32, Path, description = "Employee ID")),
    request_body = EmployeeInput,
    responses(
        (status = 200, description = "Employee updated", body = ApiResponse<EmployeeResponse>),
        (status = 404, description = "Employee not found", body = crate::errors::ErrorResponse)
    ),
    tag = "staff"
)]
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<EmployeeInput>,
) -> ApiResult<EmployeeResponse> {
    let employee = state.services.staff.update_employee(id, payload).await?;
    Ok(Json(ApiResponse::success(employee)))
}

#[utoipa::path(
    delete,
    path = "/api/employee/:id",
    params(("id" = i32, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee and their time entries deleted"),
        (status = 404, description = "Employee not found", body = crate::errors::ErrorResponse)
    ),
    tag = "staff"
)]
pub async fn delete_employee(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<()> {
    state.services.staff.delete_employee(id).await?;
    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    get,
    path = "/api/production-time",
    params(ProductionTimeQuery),
    responses(
        (status = 200, description = "Time entries listed", body = ApiResponse<PaginatedResponse<ProductionTimeResponse>>)
    ),
    tag = "staff"
)]
pub async fn list_production_times(
    State(state): State<AppState>,
    Query(query): Query<ProductionTimeQuery>,
) -> ApiResult<PaginatedResponse<ProductionTimeResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = state.config.page_size(query.limit);
    let filter = ProductionTimeFilter {
        employee_id: query.employee_id,
        fiche_production_id: query.fiche_production_id,
        from: query.from,
        to: query.to,
    };
    let (items, total) = state.services.staff.list_times(page, limit, &filter).await?;
    Ok(Json(ApiResponse::success(paginated(items, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/production-time/:id",
    params(("id" = i32, Path, description = "Time entry ID")),
    responses(
        (status = 200, description = "Time entry with throughput", body = ApiResponse<ProductionTimeResponse>),
        (status = 404, description = "Time entry not found", body = crate::errors::ErrorResponse)
    ),
    tag = "staff"
)]
pub async fn get_production_time(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<ProductionTimeResponse> {
    let entry = state.services.staff.get_time(id).await?;
    Ok(Json(ApiResponse::success(entry)))
}

#[utoipa::path(
    post,
    path = "/api/production-time",
    request_body = ProductionTimeInput,
    responses(
        (status = 201, description = "Time entry logged", body = ApiResponse<ProductionTimeResponse>),
        (status = 404, description = "Employee or sewing sheet not found", body = crate::errors::ErrorResponse)
    ),
    tag = "staff"
)]
pub async fn create_production_time(
    State(state): State<AppState>,
    Json(payload): Json<ProductionTimeInput>,
) -> Created<ProductionTimeResponse> {
    let entry = state.services.staff.create_time(payload).await?;
    Ok(created(entry))
}

#[utoipa::path(
    put,
    path = "/api/production-time/:id",
    params(("id" = i32, Path, description = "Time entry ID")),
    request_body = ProductionTimeInput,
    responses(
        (status = 200, description = "Time entry updated", body = ApiResponse<ProductionTimeResponse>),
        (status = 404, description = "Time entry not found", body = crate::errors::ErrorResponse)
    ),
    tag = "staff"
)]
pub async fn update_production_time(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ProductionTimeInput>,
) -> ApiResult<ProductionTimeResponse> {
    let entry = state.services.staff.update_time(id, payload).await?;
    Ok(Json(ApiResponse::success(entry)))
}

#[utoipa::path(
    delete,
    path = "/api/production-time/:id",
    params(("id" = i32, Path, description = "Time entry ID")),
    responses(
        (status = 200, description = "Time entry deleted"),
        (status = 404, description = "Time entry not found", body = crate::errors::ErrorResponse)
    ),
    tag = "staff"
)]
pub async fn delete_production_time(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    state.services.staff.delete_time(id).await?;
    Ok(Json(ApiResponse::success(())))
}
