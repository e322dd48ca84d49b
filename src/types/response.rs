//! Response envelopes shared by all endpoints.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::pagination::Page;

/// Envelope for single-item responses
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Envelope for list responses with pagination metadata
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub data: Vec<T>,
    /// Zero-indexed page number
    pub current_page: u64,
    pub total_elements: u64,
    pub total_pages: u64,
    pub size: u64,
}

impl<T: Serialize> From<Page<T>> for ListResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            data: page.items,
            current_page: page.page,
            total_elements: page.total_elements,
            total_pages: page.total_pages,
            size: page.size,
        }
    }
}

/// Created response helper (common pattern for POST endpoints)
pub struct Created<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::CREATED, Json(DataResponse::new(self.0))).into_response()
    }
}

/// No content response helper (common pattern for DELETE endpoints)
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> axum::response::Response {
        StatusCode::NO_CONTENT.into_response()
    }
}
