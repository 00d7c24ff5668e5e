use chrono::{DateTime, FixedOffset};
use sea_orm::{DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryOrder};
use serde::Serialize;
use uuid::Uuid;

use models::user;
use crate::errors::ServiceError;
use crate::pagination::{Direction, Page, PageRequest, SortOrder};

/// Public view of a user row; never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<FixedOffset>,
}

impl From<user::Model> for UserSummary {
    fn from(m: user::Model) -> Self {
        Self { id: m.id, name: m.name, email: m.email, created_at: m.created_at }
    }
}

fn column_for(property: &str) -> Option<user::Column> {
    match property {
        "id" => Some(user::Column::Id),
        "name" => Some(user::Column::Name),
        "email" => Some(user::Column::Email),
        "created_at" | "createdAt" => Some(user::Column::CreatedAt),
        _ => None,
    }
}

/// Map sort keys onto user columns; unknown properties are a validation error.
pub fn resolve_orders(sort: &[SortOrder]) -> Result<Vec<(user::Column, Order)>, ServiceError> {
    sort.iter()
        .map(|s| {
            let column = column_for(&s.property)
                .ok_or_else(|| ServiceError::Validation(format!("cannot sort by '{}'", s.property)))?;
            let order = match s.direction {
                Direction::Asc => Order::Asc,
                Direction::Desc => Order::Desc,
            };
            Ok((column, order))
        })
        .collect()
}

/// One page of users ordered as requested.
pub async fn list_users(db: &DatabaseConnection, req: &PageRequest) -> Result<Page<UserSummary>, ServiceError> {
    let mut query = user::Entity::find();
    for (column, order) in resolve_orders(req.sort())? {
        query = query.order_by(column, order);
    }
    let paginator = query.paginate(db, req.size());
    let total = paginator.num_items().await?;
    // Past the end (or beyond u64 rows): nothing to fetch.
    if req.offset().map_or(true, |offset| offset >= total) {
        return Ok(Page::new(Vec::new(), req, total));
    }
    let rows = paginator.fetch_page(req.page()).await?;
    Ok(Page::new(rows.into_iter().map(UserSummary::from).collect(), req, total))
}
