use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, AppState};
use crate::db::User;
use crate::domain::UserId;

/// Session key holding the signed-in user's id.
pub const SESSION_USER_KEY: &str = "user_id";

/// Who is making the request, resolved once per request by
/// [`identify_middleware`].
#[derive(Debug, Clone, Default)]
pub struct Identity(pub Option<User>);

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the caller and stores an [`Identity`] in the request extensions.
///
/// Checks, in order:
/// 1. `Authorization: Token <token>` or `Authorization: Bearer <token>`
/// 2. Session cookie (from login)
///
/// Never rejects; handlers decide whether they need a user through the
/// [`CurrentUser`] and [`MaybeUser`] extractors.
pub async fn identify_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let user = resolve_user(&state, &headers, &session).await;

    if let Some(user) = &user {
        tracing::Span::current().record("user_id", user.id);
    }

    request.extensions_mut().insert(Identity(user));
    next.run(request).await
}

async fn resolve_user(state: &AppState, headers: &HeaderMap, session: &Session) -> Option<User> {
    if let Some(token) = extract_token(headers) {
        match state.auth_service().authenticate(&token).await {
            Ok(Some(user)) => return Some(user),
            Ok(None) => tracing::debug!("Unknown bearer token"),
            Err(e) => tracing::warn!(error = %e, "Token lookup failed"),
        }
    }

    let id = match session.get::<i32>(SESSION_USER_KEY).await {
        Ok(Some(id)) => id,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(error = %e, "Session read failed");
            return None;
        }
    };

    match state.auth_service().find_user(UserId::new(id)).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Session user lookup failed");
            None
        }
    }
}

/// Extract the token from `Authorization: Token ..` or `Authorization: Bearer ..`
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;

    let token = value
        .strip_prefix("Token ")
        .or_else(|| value.strip_prefix("Bearer "))?
        .trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// The authenticated caller; rejects with `Unauthenticated` (10003) otherwise.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    #[must_use]
    pub const fn id(&self) -> UserId {
        UserId::new(self.0.id)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .and_then(|identity| identity.0.clone())
            .map(Self)
            .ok_or(ApiError::Unauthenticated)
    }
}

/// The caller if authenticated; never rejects.
#[derive(Debug, Clone, Default)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    #[must_use]
    pub fn id(&self) -> Option<UserId> {
        self.0.as_ref().map(|u| UserId::new(u.id))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<Identity>()
                .and_then(|identity| identity.0.clone()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn token_schemes() {
        assert_eq!(extract_token(&headers("Token abc")).as_deref(), Some("abc"));
        assert_eq!(extract_token(&headers("Bearer xyz ")).as_deref(), Some("xyz"));
        assert_eq!(extract_token(&headers("Basic dXNlcg==")), None);
        assert_eq!(extract_token(&headers("Token ")), None);
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }
}
