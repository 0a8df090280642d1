//! database migrations for terrapin.

pub use sea_orm_migration::prelude::*;

mod m20260310_000001_create_orgs;
mod m20260310_000002_create_exit_nodes;
mod m20260310_000003_create_sites;
mod m20260310_000004_create_resources;
mod m20260310_000005_create_targets;
mod m20260310_000006_create_agents;
mod m20260310_000007_create_users_and_sessions;
mod m20260310_000008_create_resource_whitelist;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260310_000001_create_orgs::Migration),
            Box::new(m20260310_000002_create_exit_nodes::Migration),
            Box::new(m20260310_000003_create_sites::Migration),
            Box::new(m20260310_000004_create_resources::Migration),
            Box::new(m20260310_000005_create_targets::Migration),
            Box::new(m20260310_000006_create_agents::Migration),
            Box::new(m20260310_000007_create_users_and_sessions::Migration),
            Box::new(m20260310_000008_create_resource_whitelist::Migration),
        ]
    }
}
