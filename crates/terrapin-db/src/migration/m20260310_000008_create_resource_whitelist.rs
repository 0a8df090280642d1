//! create resource_whitelist table migration

use sea_orm_migration::prelude::*;

use super::m20260310_000004_create_resources::Resources;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ResourceWhitelist::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResourceWhitelist::ResourceId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ResourceWhitelist::Email).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(ResourceWhitelist::ResourceId)
                            .col(ResourceWhitelist::Email),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_whitelist_resource")
                            .from(ResourceWhitelist::Table, ResourceWhitelist::ResourceId)
                            .to(Resources::Table, Resources::ResourceId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResourceWhitelist::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ResourceWhitelist {
    Table,
    ResourceId,
    Email,
}
