use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub name: String, pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

/// Roles are `USER`, `ADMIN` or `MODERATOR`.
#[derive(ToSchema)]
pub struct AuthResponseDoc {
    pub token: String,
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
}

#[derive(ToSchema)]
pub struct PrincipalDoc { pub id: Uuid, pub name: String, pub email: String, pub roles: Vec<String> }

#[derive(ToSchema)]
pub struct UserSummaryDoc {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// RFC 3339
    pub created_at: String,
}

#[derive(ToSchema)]
pub struct UserPageDoc {
    pub content: Vec<UserSummaryDoc>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String, pub message: Option<String> }

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::users::list,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            AuthResponseDoc,
            PrincipalDoc,
            UserSummaryDoc,
            UserPageDoc,
            ErrorDoc,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "users")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
