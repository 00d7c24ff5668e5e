use axum::{extract::State, Json};
use axum_extra::extract::{Query, WithRejection};

use service::pagination::{Page, PageParams};
use service::user_service::{self, UserSummary};

use super::auth::ServerState;
use crate::errors::ApiError;

#[utoipa::path(get, path = "/users", tag = "users", security(("bearer" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Zero-based page index, default 0"),
        ("size" = Option<i64>, Query, description = "Page size in [1,100], default 10"),
        ("sort" = Option<Vec<String>>, Query, description = "Repeatable `property[,asc|desc]`, default `id`"),
    ),
    responses((status = 200, description = "One page of users", body = crate::openapi::UserPageDoc),
              (status = 400, description = "Invalid pagination", body = crate::openapi::ErrorDoc)))]
pub async fn list(
    State(state): State<ServerState>,
    WithRejection(Query(params), _): WithRejection<Query<PageParams>, ApiError>,
) -> Result<Json<Page<UserSummary>>, ApiError> {
    let req = params.to_page_request()?;
    let page = user_service::list_users(&state.db, &req).await?;
    Ok(Json(page))
}
