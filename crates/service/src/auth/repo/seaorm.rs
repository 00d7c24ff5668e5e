use std::collections::BTreeSet;

use sea_orm::{DatabaseConnection, DbErr, EntityTrait, QueryOrder, SqlErr, TransactionTrait};
use tracing::warn;

use models::errors::ModelError;
use models::{role, user, user_credentials, user_role};

use crate::auth::domain::{Account, NewAccount, Role, RoleName};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_err(e: DbErr) -> AuthError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AuthError::Conflict,
        _ => AuthError::Repository(e.to_string()),
    }
}

fn model_err(e: ModelError) -> AuthError {
    match e {
        ModelError::Validation(msg) => AuthError::Validation(msg),
        ModelError::Db(e) => db_err(e),
    }
}

fn to_role(model: role::Model) -> Result<Role, AuthError> {
    let name = model
        .name
        .parse::<RoleName>()
        .map_err(|e| AuthError::Repository(e.to_string()))?;
    Ok(Role { id: model.id, name, description: model.description })
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let Some(u) = user::find_by_email(&self.db, email).await.map_err(model_err)? else {
            return Ok(None);
        };
        let Some(cred) = user_credentials::find_by_user(&self.db, u.id).await.map_err(model_err)? else {
            warn!(user_id = %u.id, "user has no credentials");
            return Ok(None);
        };
        let mut roles = BTreeSet::new();
        for r in user_role::roles_of(&self.db, u.id).await.map_err(model_err)? {
            match r.name.parse::<RoleName>() {
                Ok(name) => {
                    roles.insert(name);
                }
                Err(e) => warn!(user_id = %u.id, err = %e, "skipping unknown role"),
            }
        }
        Ok(Some(Account { id: u.id, name: u.name, email: u.email, password_hash: cred.password_hash, roles }))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
        Ok(user::find_by_email(&self.db, email).await.map_err(model_err)?.is_some())
    }

    async fn save(&self, account: NewAccount) -> Result<Account, AuthError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        // Re-checked inside the transaction; the unique index on `user.email`
        // catches whatever slips between this read and the insert.
        if user::find_by_email(&txn, &account.email).await.map_err(model_err)?.is_some() {
            return Err(AuthError::Conflict);
        }
        let u = user::create(&txn, &account.email, &account.name).await.map_err(model_err)?;
        user_credentials::upsert_password(&txn, u.id, account.password_hash.clone(), &account.password_algorithm)
            .await
            .map_err(model_err)?;
        for r in &account.roles {
            user_role::assign(&txn, u.id, r.id).await.map_err(model_err)?;
        }
        txn.commit().await.map_err(db_err)?;

        Ok(Account {
            id: u.id,
            name: u.name,
            email: u.email,
            password_hash: account.password_hash,
            roles: account.roles.iter().map(|r| r.name).collect(),
        })
    }

    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, AuthError> {
        role::find_by_name(&self.db, name.as_str())
            .await
            .map_err(model_err)?
            .map(to_role)
            .transpose()
    }

    async fn save_role(&self, name: RoleName, description: &str) -> Result<Role, AuthError> {
        let created = role::create(&self.db, name.as_str(), description).await.map_err(model_err)?;
        to_role(created)
    }

    async fn list_roles(&self) -> Result<Vec<Role>, AuthError> {
        role::Entity::find()
            .order_by_asc(role::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(to_role)
            .collect()
    }
}
