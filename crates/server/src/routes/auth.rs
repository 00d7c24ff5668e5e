use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::WithRejection;
use sea_orm::DatabaseConnection;
use tracing::warn;

use service::auth::domain::{AuthResponse, LoginInput, Principal, RegisterInput};
use service::auth::repo::SeaOrmAuthRepository;
use service::auth::{AuthService, SecurityContext};

use crate::errors::ApiError;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub cookie_secure: bool,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub cookie: ServerAuthConfig,
}

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest,
    responses((status = 201, description = "Registered", body = crate::openapi::AuthResponseDoc),
              (status = 400, description = "Bad Request", body = crate::openapi::ErrorDoc),
              (status = 409, description = "Conflict", body = crate::openapi::ErrorDoc)))]
pub async fn register(
    State(state): State<ServerState>,
    WithRejection(Json(input), _): WithRejection<Json<RegisterInput>, ApiError>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let res = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest,
    responses((status = 200, description = "Logged In", body = crate::openapi::AuthResponseDoc),
              (status = 401, description = "Unauthorized", body = crate::openapi::ErrorDoc)))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    WithRejection(Json(input), _): WithRejection<Json<LoginInput>, ApiError>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let mut ctx = SecurityContext::anonymous();
    let res = state.auth.login(&mut ctx, input).await?;

    let mut cookie = Cookie::new(AUTH_COOKIE, res.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(state.cookie.cookie_secure);
    cookie.set_same_site(SameSite::Lax);
    Ok((jar.add(cookie), Json(res)))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 204, description = "Cookie cleared")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    (jar, StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/auth/me", tag = "auth", security(("bearer" = [])),
    responses((status = 200, description = "Current identity", body = crate::openapi::PrincipalDoc),
              (status = 401, description = "Unauthorized", body = crate::openapi::ErrorDoc)))]
pub async fn me(Extension(ctx): Extension<SecurityContext>) -> Result<Json<Principal>, ApiError> {
    ctx.principal()
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::bare(StatusCode::UNAUTHORIZED, "unauthorized"))
}

/// Read the token from `Authorization: Bearer <token>`, falling back to the
/// `auth_token` cookie. Missing token is 400, invalid or expired is 401. The
/// verified [`SecurityContext`] is handed to handlers as a request extension.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_string();
    let token = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => {
            let value = value.to_str().unwrap_or_default();
            match value.strip_prefix("Bearer ") {
                Some(t) if !t.trim().is_empty() => t.trim().to_string(),
                _ => {
                    warn!(path = %path, "invalid Authorization format (expect Bearer)");
                    return Err(ApiError::bare(StatusCode::UNAUTHORIZED, "unauthorized"));
                }
            }
        }
        None => match CookieJar::from_headers(req.headers()).get(AUTH_COOKIE) {
            Some(c) if !c.value().is_empty() => c.value().to_string(),
            _ => {
                warn!(path = %path, "missing Authorization header and auth_token cookie");
                return Err(ApiError::new(StatusCode::BAD_REQUEST, "bad_request", "missing bearer token"));
            }
        },
    };

    let ctx = state.auth.verify_token(&token).map_err(|e| {
        warn!(path = %path, err = %e, "token validation failed");
        ApiError::from(e)
    })?;
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}
