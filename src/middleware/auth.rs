use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::error::ApiError;

/// JWT authentication middleware: verifies the bearer token and stores the
/// caller identity in request extensions for the task handlers.
///
/// Rejected requests never reach a handler, so no store call is made for them.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str())
        .transpose()
        .map_err(|_| ApiError::from(crate::auth::AuthError::WrongScheme))?;

    let caller = state.verifier.verify(header)?;
    tracing::debug!(caller = %caller, "authenticated request");

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}
