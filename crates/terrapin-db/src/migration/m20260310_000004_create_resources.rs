//! create resources table migration

use sea_orm_migration::prelude::*;

use super::m20260310_000001_create_orgs::Orgs;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Resources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Resources::ResourceId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Resources::OrgId).string().not_null())
                    .col(ColumnDef::new(Resources::Name).string().not_null())
                    .col(ColumnDef::new(Resources::FullDomain).string())
                    .col(
                        ColumnDef::new(Resources::Ssl)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Resources::Http)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Resources::Sso)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Resources::BlockAccess)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Resources::EmailWhitelistEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Resources::DnsAuthorityEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Resources::DnsAuthorityTtl)
                            .integer()
                            .not_null()
                            .default(60),
                    )
                    .col(
                        ColumnDef::new(Resources::DnsAuthorityRoutingPolicy)
                            .string()
                            .not_null()
                            .default("failover"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_resources_org")
                            .from(Resources::Table, Resources::OrgId)
                            .to(Orgs::Table, Orgs::OrgId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // index on full_domain for zone lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_resources_full_domain")
                    .table(Resources::Table)
                    .col(Resources::FullDomain)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Resources::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Resources {
    Table,
    ResourceId,
    OrgId,
    Name,
    FullDomain,
    Ssl,
    Http,
    Sso,
    BlockAccess,
    EmailWhitelistEnabled,
    DnsAuthorityEnabled,
    DnsAuthorityTtl,
    DnsAuthorityRoutingPolicy,
}
