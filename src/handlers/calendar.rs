use super::common::{created, Created};
use crate::{
    auth::{roles, AuthRouterExt},
    services::calendar::{CalendarEventInput, CalendarEventResponse, CalendarRange},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeQuery {
    /// RFC 3339 start of the window
    pub from: Option<DateTime<Utc>>,
    /// RFC 3339 end of the window
    pub to: Option<DateTime<Utc>>,
}

pub fn calendar_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/events", get(list_events))
        .route("/events/:id", get(get_event))
        .with_auth();

    let write = Router::new()
        .route("/events", post(create_event))
        .route("/events/:id", put(update_event).delete(delete_event))
        .with_roles(roles::OFFICE_WRITE);

    read.merge(write)
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(RangeQuery),
    responses(
        (status = 200, description = "Events overlapping the window, by start time", body = ApiResponse<Vec<CalendarEventResponse>>)
    ),
    tag = "calendar"
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Vec<CalendarEventResponse>> {
    let range = CalendarRange {
        from: query.from,
        to: query.to,
    };
    let events = state.services.calendar.list(&range).await?;
    Ok(Json(ApiResponse::success(events)))
}

#[utoipa::path(
    get,
    path = "/api/events/:id",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event fetched", body = ApiResponse<CalendarEventResponse>),
        (status = 404, description = "Event not found", body = crate::errors::ErrorResponse)
    ),
    tag = "calendar"
)]
pub async fn get_event(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<CalendarEventResponse> {
    let event = state.services.calendar.get(id).await?;
    Ok(Json(ApiResponse::success(event)))
}

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CalendarEventInput,
    responses(
        (status = 201, description = "Event created", body = ApiResponse<CalendarEventResponse>),
        (status = 400, description = "End precedes start", body = crate::errors::ErrorResponse)
    ),
    tag = "calendar"
)]
pub async fn create_event(
    State(state): State<AppState>,
    Json(payload): Json<CalendarEventInput>,
) -> Created<CalendarEventResponse> {
    let event = state.services.calendar.create(payload).await?;
    Ok(created(event))
}

#[utoipa::path(
    put,
    path = "/api/events/:id",
    params(("id" = i32, Path, description = "Event ID")),
    request_body = CalendarEventInput,
    responses(
        (status = 200, description = "Event updated", body = ApiResponse<CalendarEventResponse>),
        (status = 404, description = "Event not found", body = crate::errors::ErrorResponse)
    ),
    tag = "calendar"
)]
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<CalendarEventInput>,
) -> ApiResult<CalendarEventResponse> {
    let event = state.services.calendar.update(id, payload).await?;
    Ok(Json(ApiResponse::success(event)))
}

#[utoipa::path(
    delete,
    path = "/api/events/:id",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deleted"),
        (status = 404, description = "Event not found", body = crate::errors::ErrorResponse)
    ),
    tag = "calendar"
)]
pub async fn delete_event(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<()> {
    state.services.calendar.delete(id).await?;
    Ok(Json(ApiResponse::success(())))
}
