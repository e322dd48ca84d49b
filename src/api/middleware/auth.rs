//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::{ACTOR_ANONYMOUS, BEARER_TOKEN_PREFIX};
use crate::errors::AppError;
use crate::services::Claims;

/// Authenticated actor extracted from the bearer token.
///
/// `username` is the audit identity: the `preferred_username` claim when
/// present, `"anonymous"` otherwise. It travels as an explicit request
/// extension from here into the store-write path.
#[derive(Clone, Debug)]
pub struct CurrentActor {
    pub subject: String,
    pub username: String,
}

impl From<Claims> for CurrentActor {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            username: claims
                .preferred_username
                .unwrap_or_else(|| ACTOR_ANONYMOUS.to_string()),
        }
    }
}

/// JWT authentication middleware.
///
/// Extracts and validates the token from the Authorization header, then
/// injects the CurrentActor into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AppError::Unauthorized)?;

    let claims = state.auth_service.verify_token(token)?;

    request.extensions_mut().insert(CurrentActor::from(claims));

    Ok(next.run(request).await)
}
