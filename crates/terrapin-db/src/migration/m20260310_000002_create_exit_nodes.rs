//! create exit_nodes table migration

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExitNodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExitNodes::ExitNodeId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExitNodes::PublicKey).string().not_null())
                    .col(ColumnDef::new(ExitNodes::Endpoint).string().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExitNodes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ExitNodes {
    Table,
    ExitNodeId,
    PublicKey,
    Endpoint,
}
