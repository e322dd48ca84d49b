//! User management handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentActor;
use crate::api::validation::{
    birth_date_rules, non_blank, optional_email, optional_first_name, optional_last_name,
    optional_phone_number, PHONE_NUMBER_RE,
};
use crate::api::AppState;
use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
use crate::domain::{UserDraft, UserPatch, UserResponse};
use crate::errors::{AppError, AppResult};
use crate::types::{Created, DataResponse, ListResponse, NoContent, PaginationParams};

/// User payload for create and full update (full validation profile)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    /// User email address
    #[validate(email(message = "invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User first name
    #[validate(length(min = 3, max = 30, message = "first name must be 3-30 characters"))]
    #[schema(example = "John")]
    pub first_name: String,
    /// User last name
    #[validate(custom(function = non_blank))]
    #[schema(example = "Doe")]
    pub last_name: String,
    /// Birth date; must lie in the past and satisfy the minimum age
    #[validate(custom(function = birth_date_rules))]
    #[schema(example = "1990-01-01")]
    pub birth_date: NaiveDate,
    /// Postal address
    #[schema(example = "123 Street, City")]
    pub address: Option<String>,
    /// Phone number, exactly 10 digits when present
    #[validate(regex(path = *PHONE_NUMBER_RE, message = "phone number must be exactly 10 digits"))]
    #[schema(example = "1234567890")]
    pub phone_number: Option<String>,
}

impl From<UserRequest> for UserDraft {
    fn from(request: UserRequest) -> Self {
        Self {
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            birth_date: request.birth_date,
            address: request.address,
            phone_number: request.phone_number,
        }
    }
}

/// User payload for partial update (partial validation profile).
///
/// Rules apply only to supplied fields; a supplied empty string counts as
/// "not supplied" because the merge treats it as no change.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatchUserRequest {
    /// User email address
    #[validate(custom(function = optional_email))]
    #[schema(example = "user@example.com")]
    pub email: Option<String>,
    /// User first name
    #[validate(custom(function = optional_first_name))]
    #[schema(example = "John")]
    pub first_name: Option<String>,
    /// User last name
    #[validate(custom(function = optional_last_name))]
    #[schema(example = "Doe")]
    pub last_name: Option<String>,
    /// Birth date; must lie in the past and satisfy the minimum age
    #[validate(custom(function = birth_date_rules))]
    #[schema(example = "1990-01-01")]
    pub birth_date: Option<NaiveDate>,
    /// Postal address
    #[schema(example = "123 Street, City")]
    pub address: Option<String>,
    /// Phone number, exactly 10 digits when present
    #[validate(custom(function = optional_phone_number))]
    #[schema(example = "1234567890")]
    pub phone_number: Option<String>,
}

impl From<PatchUserRequest> for UserPatch {
    fn from(request: PatchUserRequest) -> Self {
        Self {
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            birth_date: request.birth_date,
            address: request.address,
            phone_number: request.phone_number,
        }
    }
}

/// Query parameters for the birth-date range search
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Range start as epoch milliseconds
    pub from: i64,
    /// Range end as epoch milliseconds (inclusive)
    pub to: i64,
    /// Zero-indexed page number
    #[serde(default = "default_page")]
    pub page: u64,
    /// Page size
    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl SearchQuery {
    /// Convert the epoch-millisecond bounds to an inclusive date range.
    ///
    /// Fails when a bound is not a representable timestamp or when the
    /// range is inverted.
    pub fn date_range(&self) -> AppResult<(NaiveDate, NaiveDate)> {
        let from = date_from_millis(self.from)?;
        let to = date_from_millis(self.to)?;
        if from > to {
            return Err(AppError::bad_request("'from' must not be after 'to'"));
        }
        Ok((from, to))
    }

    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.size)
    }
}

fn date_from_millis(millis: i64) -> AppResult<NaiveDate> {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| AppError::bad_request("timestamp out of range"))
}

/// Create user management routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/search", get(search_users))
        .route(
            "/:user_id",
            put(update_user).patch(patch_user).delete(delete_user),
        )
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error or email conflict", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentActor>,
    ValidatedJson(payload): ValidatedJson<UserRequest>,
) -> AppResult<Created<UserResponse>> {
    let user = state
        .user_service
        .create(payload.into(), &actor.username)
        .await?;

    Ok(Created(UserResponse::from(user)))
}

/// Update all fields of an existing user
#[utoipa::path(
    put,
    path = "/users/{user_id}",
    tag = "Users",
    params(("user_id" = Uuid, Path, description = "ID of the user to update")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error or email conflict", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentActor>,
    Path(user_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = state
        .user_service
        .update(user_id, payload.into(), &actor.username)
        .await?;

    Ok(Json(DataResponse::new(UserResponse::from(user))))
}

/// Update some fields of an existing user
#[utoipa::path(
    patch,
    path = "/users/{user_id}",
    tag = "Users",
    params(("user_id" = Uuid, Path, description = "ID of the user to update")),
    request_body = PatchUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error or email conflict", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn patch_user(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentActor>,
    Path(user_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PatchUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = state
        .user_service
        .update_partial(user_id, payload.into(), &actor.username)
        .await?;

    Ok(Json(DataResponse::new(UserResponse::from(user))))
}

/// Delete a user by ID
#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    tag = "Users",
    params(("user_id" = Uuid, Path, description = "ID of the user to delete")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.user_service.delete(user_id).await?;

    Ok(NoContent)
}

/// Get users by birth date range
#[utoipa::path(
    get,
    path = "/users/search",
    tag = "Users",
    params(SearchQuery),
    responses(
        (status = 200, description = "Page of users", body = [UserResponse]),
        (status = 400, description = "Invalid range", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ListResponse<UserResponse>>> {
    let (from, to) = query.date_range()?;

    let page = state
        .user_service
        .search_by_birth_date(from, to, query.pagination())
        .await?;

    Ok(Json(page.map(UserResponse::from).into()))
}
