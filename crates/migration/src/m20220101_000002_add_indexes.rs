use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Users: listing with sort=created_at
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_created_at")
                    .table(User::Table)
                    .col(User::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // UserRole: reverse lookup by role
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_role_role")
                    .table(UserRole::Table)
                    .col(UserRole::RoleId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_user_role_role").table(UserRole::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_user_created_at").table(User::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum User { Table, CreatedAt }

#[derive(DeriveIden)]
enum UserRole { Table, RoleId }
