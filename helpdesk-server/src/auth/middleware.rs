//! Authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppError;
use crate::auth::extractor::authenticate;
use crate::core::ServerState;

/// Routes under `/api/` reachable without a token
const PUBLIC_API_ROUTES: &[&str] = &["/api/auth/login", "/api/auth/register"];

/// Authentication middleware - requires a logged-in user
///
/// Runs the authorization gate on `Authorization: Bearer <token>` and puts
/// the resolved [`CurrentUser`](crate::auth::CurrentUser) into the request
/// extensions.
///
/// # Skipped
///
/// - `OPTIONS *` (CORS preflight)
/// - paths outside `/api/` (health, uploads, 404s)
/// - `/api/auth/login`, `/api/auth/register`
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS
        || !path.starts_with("/api/")
        || PUBLIC_API_ROUTES.contains(&path)
    {
        return Ok(next.run(req).await);
    }

    let user = authenticate(&state, req.headers(), req.uri()).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
