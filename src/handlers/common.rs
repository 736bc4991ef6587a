use crate::{errors::ServiceError, ApiResponse, AppState, PaginatedResponse};
use axum::{http::StatusCode, Json};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

/// `201 Created` with the usual envelope.
pub type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ServiceError>;

pub fn created<T>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

/// Pagination and free-text search for list endpoints
#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size, capped by configuration
    pub limit: Option<u64>,
    pub search: Option<String>,
}

impl ListParams {
    /// Page and limit after defaults and caps.
    pub fn resolve(&self, state: &AppState) -> (u64, u64) {
        (
            self.page.unwrap_or(1).max(1),
            state.config.page_size(self.limit),
        )
    }
}

pub fn paginated<T>(items: Vec<T>, total: u64, page: u64, limit: u64) -> PaginatedResponse<T> {
    let total_pages = if total == 0 {
        0
    } else {
        (total + limit - 1) / limit
    };
    PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages,
    }
}

/// Date used for due-date transitions and expiry windows.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_round_up() {
        let page = paginated(vec![1, 2], 21, 1, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(paginated::<u8>(vec![], 0, 1, 10).total_pages, 0);
    }
}
