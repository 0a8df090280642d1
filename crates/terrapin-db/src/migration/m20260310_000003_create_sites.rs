//! create sites table migration

use sea_orm_migration::prelude::*;

use super::m20260310_000001_create_orgs::Orgs;
use super::m20260310_000002_create_exit_nodes::ExitNodes;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sites::SiteId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sites::OrgId).string().not_null())
                    .col(ColumnDef::new(Sites::NiceId).string().not_null())
                    .col(ColumnDef::new(Sites::Name).string().not_null())
                    .col(
                        ColumnDef::new(Sites::SiteType)
                            .string()
                            .not_null()
                            .default("newt"),
                    )
                    .col(ColumnDef::new(Sites::PublicIp).string())
                    .col(ColumnDef::new(Sites::ServerPublicIp).string())
                    .col(
                        ColumnDef::new(Sites::DockerSocketEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Sites::DnsAuthorityEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Sites::ExitNodeId).big_integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sites_org")
                            .from(Sites::Table, Sites::OrgId)
                            .to(Orgs::Table, Orgs::OrgId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sites_exit_node")
                            .from(Sites::Table, Sites::ExitNodeId)
                            .to(ExitNodes::Table, ExitNodes::ExitNodeId)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // nice_id is unique within an org
        manager
            .create_index(
                Index::create()
                    .name("idx_sites_org_nice_id")
                    .table(Sites::Table)
                    .col(Sites::OrgId)
                    .col(Sites::NiceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sites::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Sites {
    Table,
    SiteId,
    OrgId,
    NiceId,
    Name,
    SiteType,
    PublicIp,
    ServerPublicIp,
    DockerSocketEnabled,
    DnsAuthorityEnabled,
    ExitNodeId,
}
