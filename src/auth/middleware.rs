use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::{from_fn_with_state, Next},
    response::Response,
    Router,
};
use tracing::warn;

use super::claims::Claims;
use crate::{db::models::Role, error::ApiError, state::AppState};

fn bearer_token(header: &str) -> Result<&str, ApiError> {
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Authentication("invalid auth scheme".into()))?;
    Ok(token)
}

/// Validates the bearer token and stores its [`Claims`] in the request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Authentication("missing Authorization header".into()))?
        .to_str()
        .map_err(|_| ApiError::Authentication("invalid auth scheme".into()))?;
    let token = bearer_token(header)?;

    let claims = state.tokens.validate(token).map_err(|e| {
        warn!(uri = %req.uri(), "invalid or expired token");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Second stage: lets the request through only when the authenticated role matches.
pub async fn require_role(
    State(role): State<Role>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| ApiError::Authentication("authentication required".into()))?;
    if claims.role != role {
        warn!(user_id = %claims.sub, role = %claims.role, required = %role, "forbidden role");
        return Err(ApiError::Authorization(format!("{role} role required")));
    }
    Ok(next.run(req).await)
}

/// Requires a valid token on every route of `router`.
pub fn protect(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route_layer(from_fn_with_state(state.clone(), authenticate))
}

/// Requires a valid token carrying `role`. Authentication runs first.
pub fn restrict(router: Router<AppState>, state: &AppState, role: Role) -> Router<AppState> {
    protect(router.route_layer(from_fn_with_state(role, require_role)), state)
}

/// The caller's identity, taken out of the request once authentication has passed.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .remove::<Claims>()
            .map(AuthUser)
            .ok_or_else(|| ApiError::Authentication("authentication required".into()))
    }
}
