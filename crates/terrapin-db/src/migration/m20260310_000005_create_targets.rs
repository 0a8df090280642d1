//! create targets and target_health tables migration
//!
//! the two tables share a lifecycle: a health row is inserted with its
//! target and cascades away with it.

use sea_orm_migration::prelude::*;

use super::m20260310_000003_create_sites::Sites;
use super::m20260310_000004_create_resources::Resources;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Targets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Targets::TargetId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Targets::ResourceId).big_integer().not_null())
                    .col(ColumnDef::new(Targets::SiteId).big_integer().not_null())
                    .col(ColumnDef::new(Targets::Ip).string().not_null())
                    .col(ColumnDef::new(Targets::Port).integer().not_null())
                    .col(
                        ColumnDef::new(Targets::Method)
                            .string()
                            .not_null()
                            .default("http"),
                    )
                    .col(
                        ColumnDef::new(Targets::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Targets::Priority)
                            .integer()
                            .not_null()
                            .default(100),
                    )
                    .col(
                        ColumnDef::new(Targets::Ssl)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_targets_resource")
                            .from(Targets::Table, Targets::ResourceId)
                            .to(Resources::Table, Resources::ResourceId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_targets_site")
                            .from(Targets::Table, Targets::SiteId)
                            .to(Sites::Table, Sites::SiteId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // index on resource_id for zone-config builds
        manager
            .create_index(
                Index::create()
                    .name("idx_targets_resource_id")
                    .table(Targets::Table)
                    .col(Targets::ResourceId)
                    .to_owned(),
            )
            .await?;

        // index on site_id for auth-proxy builds
        manager
            .create_index(
                Index::create()
                    .name("idx_targets_site_id")
                    .table(Targets::Table)
                    .col(Targets::SiteId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TargetHealth::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TargetHealth::TargetId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TargetHealth::HcEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TargetHealth::HcHealth)
                            .string()
                            .not_null()
                            .default("unknown"),
                    )
                    .col(ColumnDef::new(TargetHealth::HcPath).string())
                    .col(ColumnDef::new(TargetHealth::HcScheme).string())
                    .col(ColumnDef::new(TargetHealth::HcMode).string())
                    .col(ColumnDef::new(TargetHealth::HcPort).integer())
                    .col(ColumnDef::new(TargetHealth::HcInterval).integer())
                    .col(ColumnDef::new(TargetHealth::HcTimeout).integer())
                    .col(ColumnDef::new(TargetHealth::HcHeaders).text())
                    .col(ColumnDef::new(TargetHealth::HcMethod).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_target_health_target")
                            .from(TargetHealth::Table, TargetHealth::TargetId)
                            .to(Targets::Table, Targets::TargetId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TargetHealth::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Targets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Targets {
    Table,
    TargetId,
    ResourceId,
    SiteId,
    Ip,
    Port,
    Method,
    Enabled,
    Priority,
    Ssl,
}

#[derive(DeriveIden)]
enum TargetHealth {
    Table,
    TargetId,
    HcEnabled,
    HcHealth,
    HcPath,
    HcScheme,
    HcMode,
    HcPort,
    HcInterval,
    HcTimeout,
    HcHeaders,
    HcMethod,
}
