//! Authorization gate and `CurrentUser` extractor

use axum::{extract::FromRequestParts, http::request::Parts};
use http::{HeaderMap, Uri};
use shared::models::{Role, UserProfile, UserRef};

use crate::AppError;
use crate::auth::{JwtError, JwtService};
use crate::core::ServerState;
use crate::db::models::User;
use crate::security_log;

/// Caller identity resolved by the authorization gate
///
/// Role comes from the stored user record, not from the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Resolve the bearer token in `headers` to a stored user
///
/// | Failure | Error |
/// |---------|-------|
/// | no `Authorization: Bearer` header | NotAuthenticated |
/// | bad signature / malformed / expired | TokenInvalid |
/// | user no longer exists | NotAuthenticated |
///
/// Runs before any business logic and has no side effects.
pub async fn authenticate(
    state: &ServerState,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<CurrentUser, AppError> {
    let token = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(JwtService::extract_from_header);

    let Some(token) = token else {
        security_log!("WARN", "auth_missing", uri = uri);
        return Err(AppError::not_authenticated());
    };

    let claims = match state.get_jwt_service().validate_token(token) {
        Ok(claims) => claims,
        Err(JwtError::ExpiredToken) => {
            security_log!("WARN", "token_expired", uri = uri);
            return Err(AppError::invalid_token());
        }
        Err(e) => {
            security_log!("WARN", "auth_failed", error = e, uri = uri);
            return Err(AppError::invalid_token());
        }
    };

    match state.users().find_by_id(&claims.sub).await? {
        Some(user) => Ok(CurrentUser::from(user)),
        None => {
            security_log!("WARN", "auth_unknown_user", user_id = claims.sub, uri = uri);
            Err(AppError::not_authenticated())
        }
    }
}

/// Use `CurrentUser` as a handler argument in protected handlers
///
/// Reuses the identity placed in request extensions by `require_auth`
/// and falls back to running the gate itself.
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let user = authenticate(state, &parts.headers, &parts.uri).await?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use chrono::Utc;
    use http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use shared::ErrorCode;
    use shared::client::RegisterRequest;
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{Claims, JwtConfig};
    use crate::core::Config;
    use crate::services::build_router;

    async fn state_with_user() -> (tempfile::TempDir, ServerState, String) {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::with_work_dir(
            tmp.path().to_string_lossy().to_string(),
            JwtConfig::with_secret("gate-test-secret-0123456789abcdefghij"),
        );
        let state = ServerState::initialize(&config).await.unwrap();
        let auth = state
            .identity()
            .register(RegisterRequest {
                name: "Dana".into(),
                email: "dana@example.com".into(),
                password: "secret123".into(),
                role: None,
            })
            .await
            .unwrap();
        (tmp, state, auth.id)
    }

    fn expired_token(state: &ServerState, user_id: &str) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: now - 3600,
            iat: now - 7200,
            iss: state.config.jwt.issuer.clone(),
            aud: state.config.jwt.audience.clone(),
        };
        state.get_jwt_service().encode_claims(&claims).unwrap()
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_valid_token_resolves_stored_user() {
        let (_tmp, state, id) = state_with_user().await;
        let token = state.get_jwt_service().generate_token(&id).unwrap();
        let uri: Uri = "/api/tickets".parse().unwrap();

        let user = authenticate(&state, &bearer(&token), &uri).await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.name, "Dana");
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn test_expired_token_is_invalid() {
        let (_tmp, state, id) = state_with_user().await;
        let token = expired_token(&state, &id);
        let uri: Uri = "/api/tickets".parse().unwrap();

        let err = authenticate(&state, &bearer(&token), &uri)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[tokio::test]
    async fn test_expired_token_over_http() {
        let (_tmp, state, id) = state_with_user().await;
        let token = expired_token(&state, &id);

        let req = Request::builder()
            .uri("/api/tickets")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let res = build_router(state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], 1004);
    }
}
