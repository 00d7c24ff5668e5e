//! Entity helper tests against an in-memory SQLite database.

use migration::MigratorTrait;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use crate::{db, errors::ModelError, role, user, user_credentials, user_role};

async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let db = db::connect_in_memory().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::test]
async fn user_create_and_find_by_email() -> anyhow::Result<()> {
    let db = setup_test_db().await?;

    let created = user::create(&db, "bob@example.com", "Bob").await?;
    let found = user::find_by_email(&db, "bob@example.com").await?;
    assert_eq!(found.map(|u| u.id), Some(created.id));
    assert!(user::find_by_email(&db, "nobody@example.com").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn user_email_is_unique() -> anyhow::Result<()> {
    let db = setup_test_db().await?;

    user::create(&db, "dup@example.com", "First").await?;
    let second = user::create(&db, "dup@example.com", "Second").await;
    assert!(matches!(second, Err(ModelError::Db(_))));
    assert_eq!(user::Entity::find().count(&db).await?, 1);
    Ok(())
}

#[tokio::test]
async fn user_create_validates_input() -> anyhow::Result<()> {
    let db = setup_test_db().await?;

    assert!(matches!(user::create(&db, "not-an-email", "X").await, Err(ModelError::Validation(_))));
    assert!(matches!(user::create(&db, "a@b.com", "   ").await, Err(ModelError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn role_names_are_unique() -> anyhow::Result<()> {
    let db = setup_test_db().await?;

    role::create(&db, "USER", "Standard user").await?;
    assert!(role::create(&db, "USER", "again").await.is_err());
    let found = role::find_by_name(&db, "USER").await?.expect("role present");
    assert_eq!(found.description, "Standard user");
    Ok(())
}

#[tokio::test]
async fn credentials_upsert_replaces_hash() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let u = user::create(&db, "cred@example.com", "Cred").await?;

    let first = user_credentials::upsert_password(&db, u.id, "hash-1".into(), "argon2").await?;
    let second = user_credentials::upsert_password(&db, u.id, "hash-2".into(), "argon2").await?;
    assert_eq!(first.id, second.id);
    let stored = user_credentials::find_by_user(&db, u.id).await?.expect("credentials");
    assert_eq!(stored.password_hash, "hash-2");
    Ok(())
}

#[tokio::test]
async fn user_roles_resolve_through_join_table() -> anyhow::Result<()> {
    let db = setup_test_db().await?;
    let u = user::create(&db, "roles@example.com", "Roles").await?;
    let user_role_row = role::create(&db, "USER", "Standard user").await?;
    let admin = role::create(&db, "ADMIN", "Administrator").await?;

    user_role::assign(&db, u.id, user_role_row.id).await?;
    user_role::assign(&db, u.id, admin.id).await?;

    let mut names: Vec<String> = user_role::roles_of(&db, u.id).await?.into_iter().map(|r| r.name).collect();
    names.sort();
    assert_eq!(names, vec!["ADMIN".to_string(), "USER".to_string()]);

    user::Entity::delete_by_id(u.id).exec(&db).await?;
    assert_eq!(user_role::Entity::find().count(&db).await?, 0);
    Ok(())
}
