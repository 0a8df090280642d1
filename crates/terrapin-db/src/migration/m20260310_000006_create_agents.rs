//! create agent tables migration: newts, olms, clients and the
//! client-site association cache.

use sea_orm_migration::prelude::*;

use super::m20260310_000003_create_sites::Sites;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Newts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Newts::NewtId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Newts::SiteId).big_integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_newts_site")
                            .from(Newts::Table, Newts::SiteId)
                            .to(Sites::Table, Sites::SiteId)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // one newt per site
        manager
            .create_index(
                Index::create()
                    .name("idx_newts_site_id")
                    .table(Newts::Table)
                    .col(Newts::SiteId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Olms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Olms::OlmId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clients::ClientId)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clients::OlmId).string().not_null())
                    .col(ColumnDef::new(Clients::PubKey).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clients_olm")
                            .from(Clients::Table, Clients::OlmId)
                            .to(Olms::Table, Olms::OlmId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clients_olm_id")
                    .table(Clients::Table)
                    .col(Clients::OlmId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClientSiteAssociations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientSiteAssociations::ClientId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClientSiteAssociations::SiteId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ClientSiteAssociations::ClientId)
                            .col(ClientSiteAssociations::SiteId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_csa_client")
                            .from(
                                ClientSiteAssociations::Table,
                                ClientSiteAssociations::ClientId,
                            )
                            .to(Clients::Table, Clients::ClientId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_csa_site")
                            .from(
                                ClientSiteAssociations::Table,
                                ClientSiteAssociations::SiteId,
                            )
                            .to(Sites::Table, Sites::SiteId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // recipient computation walks associations by site
        manager
            .create_index(
                Index::create()
                    .name("idx_csa_site_id")
                    .table(ClientSiteAssociations::Table)
                    .col(ClientSiteAssociations::SiteId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(ClientSiteAssociations::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Olms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Newts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Newts {
    Table,
    NewtId,
    SiteId,
}

#[derive(DeriveIden)]
enum Olms {
    Table,
    OlmId,
}

#[derive(DeriveIden)]
enum Clients {
    Table,
    ClientId,
    OlmId,
    PubKey,
}

#[derive(DeriveIden)]
enum ClientSiteAssociations {
    Table,
    ClientId,
    SiteId,
}
