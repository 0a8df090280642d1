//! database layer for terrapin.
//!
//! this crate provides persistent storage for the relational state the
//! reconcilers read:
//! - Orgs, Sites, Resources, Targets and per-target health
//! - Newt / Olm agents, clients and client-site associations
//! - Exit nodes, sessions, users and resource allowlists
//!
//! reconciliation views are derived from these rows; every multi-row read
//! backing a view tolerates snapshot skew because the resulting message is
//! advisory.

#![warn(missing_docs)]

mod entity;
mod error;
mod migration;

pub use error::Error;

use std::collections::HashSet;
use std::future::Future;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database as SeaOrmDatabase, DatabaseConnection, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

use terrapin_types::{
    Client, ClientId, Config, ExitNode, ExitNodeId, HealthStatus, Newt, NewtId, Olm, OlmId, Org,
    OrgId, Resource, ResourceId, Session, Site, SiteId, Target, TargetHealth, TargetId, User,
    UserId,
};

/// result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// database trait for terrapin storage operations.
///
/// this trait abstracts over different database backends (sqlite,
/// postgresql). it is the only mutation path for persistent state; the
/// reconcilers and handlers consume it read-mostly.
pub trait Database: Send + Sync {
    // ─── Health Check ─────────────────────────────────────────────────────────

    /// ping the database to verify connectivity.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    // ─── Org Operations ──────────────────────────────────────────────────────

    /// create a new org.
    fn create_org(&self, org: &Org) -> impl Future<Output = Result<Org>> + Send;

    /// get an org by id.
    fn get_org(&self, id: &OrgId) -> impl Future<Output = Result<Option<Org>>> + Send;

    // ─── Site Operations ─────────────────────────────────────────────────────

    /// create a new site. returns the created site with its assigned id.
    fn create_site(&self, site: &Site) -> impl Future<Output = Result<Site>> + Send;

    /// get a site by id.
    fn get_site(&self, id: SiteId) -> impl Future<Output = Result<Option<Site>>> + Send;

    /// update an existing site.
    fn update_site(&self, site: &Site) -> impl Future<Output = Result<Site>> + Send;

    // ─── Resource Operations ─────────────────────────────────────────────────

    /// create a new resource. returns the created resource with its id.
    fn create_resource(&self, resource: &Resource)
    -> impl Future<Output = Result<Resource>> + Send;

    /// get a resource by id.
    fn get_resource(&self, id: ResourceId)
    -> impl Future<Output = Result<Option<Resource>>> + Send;

    /// update an existing resource.
    fn update_resource(&self, resource: &Resource)
    -> impl Future<Output = Result<Resource>> + Send;

    // ─── Target Operations ───────────────────────────────────────────────────

    /// create a new target together with its health row, in one
    /// transaction. returns the created target with its assigned id.
    fn create_target(&self, target: &Target) -> impl Future<Output = Result<Target>> + Send;

    /// get a target by id.
    fn get_target(&self, id: TargetId) -> impl Future<Output = Result<Option<Target>>> + Send;

    /// update an existing target.
    fn update_target(&self, target: &Target) -> impl Future<Output = Result<Target>> + Send;

    /// delete a target. the health row cascades away with it.
    fn delete_target(&self, id: TargetId) -> impl Future<Output = Result<()>> + Send;

    /// list all targets of a resource, enabled or not.
    fn list_targets_for_resource(
        &self,
        resource_id: ResourceId,
    ) -> impl Future<Output = Result<Vec<Target>>> + Send;

    /// get a target joined with its hosting site. used by the tenancy check.
    fn get_target_with_site(
        &self,
        id: TargetId,
    ) -> impl Future<Output = Result<Option<(Target, Site)>>> + Send;

    /// list enabled targets on a site joined with their resources.
    fn list_enabled_targets_with_resources_for_site(
        &self,
        site_id: SiteId,
    ) -> impl Future<Output = Result<Vec<(Target, Resource)>>> + Send;

    /// collapse a set of target ids to the distinct resources they serve.
    fn list_resource_ids_for_targets(
        &self,
        target_ids: &[TargetId],
    ) -> impl Future<Output = Result<Vec<ResourceId>>> + Send;

    // ─── Target Health Operations ────────────────────────────────────────────

    /// get the health row of a target.
    fn get_target_health(
        &self,
        id: TargetId,
    ) -> impl Future<Output = Result<Option<TargetHealth>>> + Send;

    /// replace the health-check knobs of a target.
    fn update_target_health(
        &self,
        health: &TargetHealth,
    ) -> impl Future<Output = Result<TargetHealth>> + Send;

    /// set only the observed health of a target. this is the single
    /// mutation the health ingestor performs.
    fn set_target_health_status(
        &self,
        id: TargetId,
        status: HealthStatus,
    ) -> impl Future<Output = Result<()>> + Send;

    // ─── Agent Operations ────────────────────────────────────────────────────

    /// create a newt agent row.
    fn create_newt(&self, newt: &Newt) -> impl Future<Output = Result<Newt>> + Send;

    /// get a newt by id.
    fn get_newt(&self, id: &NewtId) -> impl Future<Output = Result<Option<Newt>>> + Send;

    /// get the newt bound to a site, if any.
    fn get_newt_for_site(
        &self,
        site_id: SiteId,
    ) -> impl Future<Output = Result<Option<Newt>>> + Send;

    /// create an olm agent row.
    fn create_olm(&self, olm: &Olm) -> impl Future<Output = Result<Olm>> + Send;

    /// get an olm by id.
    fn get_olm(&self, id: &OlmId) -> impl Future<Output = Result<Option<Olm>>> + Send;

    /// create a client owned by an olm.
    fn create_client(&self, client: &Client) -> impl Future<Output = Result<Client>> + Send;

    /// get a client by id.
    fn get_client(&self, id: ClientId) -> impl Future<Output = Result<Option<Client>>> + Send;

    /// list the clients owned by an olm.
    fn list_clients_for_olm(
        &self,
        olm_id: &OlmId,
    ) -> impl Future<Output = Result<Vec<Client>>> + Send;

    /// record that a client peers with a site. idempotent.
    fn associate_client_with_site(
        &self,
        client_id: ClientId,
        site_id: SiteId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// list the sites a client peers with.
    fn list_site_ids_for_client(
        &self,
        client_id: ClientId,
    ) -> impl Future<Output = Result<Vec<SiteId>>> + Send;

    /// list the clients associated with a site.
    fn list_client_ids_for_site(
        &self,
        site_id: SiteId,
    ) -> impl Future<Output = Result<Vec<ClientId>>> + Send;

    // ─── Exit Node Operations ────────────────────────────────────────────────

    /// create an exit node.
    fn create_exit_node(&self, node: &ExitNode)
    -> impl Future<Output = Result<ExitNode>> + Send;

    /// get an exit node by id.
    fn get_exit_node(
        &self,
        id: ExitNodeId,
    ) -> impl Future<Output = Result<Option<ExitNode>>> + Send;

    // ─── Allowlist Operations ────────────────────────────────────────────────

    /// add an e-mail to a resource's allowlist. idempotent.
    fn add_whitelist_email(
        &self,
        resource_id: ResourceId,
        email: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// list the allowlisted e-mails of a resource.
    fn list_whitelist_emails(
        &self,
        resource_id: ResourceId,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;

    // ─── Session / User Operations ───────────────────────────────────────────

    /// create a user.
    fn create_user(&self, user: &User) -> impl Future<Output = Result<User>> + Send;

    /// get a user by id.
    fn get_user(&self, id: &UserId) -> impl Future<Output = Result<Option<User>>> + Send;

    /// create a session.
    fn create_session(&self, session: &Session) -> impl Future<Output = Result<Session>> + Send;

    /// get a session by its bearer token. expiry is the caller's concern.
    fn get_session_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<Session>>> + Send;
}

/// the main database implementation using sea-orm.
#[derive(Clone)]
pub struct TerrapinDb {
    conn: DatabaseConnection,
}

impl TerrapinDb {
    /// create a new database connection from config and run migrations.
    pub async fn new(config: &Config) -> Result<Self> {
        let url = Self::connection_url(&config.database);
        let conn: DatabaseConnection = SeaOrmDatabase::connect(&url)
            .await
            .map_err(|e| Error::Unreachable(e.to_string()))?;

        let db = Self { conn };
        db.migrate().await?;
        Ok(db)
    }

    /// sea-orm connection url for the configured backend. sqlite gets
    /// `mode=rwc` so the file is created on first start.
    fn connection_url(config: &terrapin_types::DatabaseConfig) -> String {
        match config {
            terrapin_types::DatabaseConfig::Sqlite { path } => {
                format!("sqlite:{}?mode=rwc", path.display())
            }
            terrapin_types::DatabaseConfig::Postgres { url } => url.clone(),
        }
    }

    /// create an in-memory sqlite database for testing.
    pub async fn new_in_memory() -> Result<Self> {
        let conn: DatabaseConnection = SeaOrmDatabase::connect("sqlite::memory:")
            .await
            .map_err(|e| Error::Unreachable(e.to_string()))?;

        let db = Self { conn };
        db.migrate().await?;
        Ok(db)
    }

    /// run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        migration::Migrator::up(&self.conn, None)
            .await
            .map_err(|e| Error::Migration(e.to_string()))?;
        Ok(())
    }
}

impl Database for TerrapinDb {
    // health check

    async fn ping(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| Error::Unreachable(e.to_string()))?;
        Ok(())
    }

    // org operations

    async fn create_org(&self, org: &Org) -> Result<Org> {
        let model: entity::org::ActiveModel = org.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_org(&self, id: &OrgId) -> Result<Option<Org>> {
        let result = entity::org::Entity::find_by_id(id.0.clone())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    // site operations

    async fn create_site(&self, site: &Site) -> Result<Site> {
        let model: entity::site::ActiveModel = site.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_site(&self, id: SiteId) -> Result<Option<Site>> {
        let result = entity::site::Entity::find_by_id(id.0).one(&self.conn).await?;
        Ok(result.map(Into::into))
    }

    async fn update_site(&self, site: &Site) -> Result<Site> {
        let model: entity::site::ActiveModel = site.into();
        let result = model.update(&self.conn).await?;
        Ok(result.into())
    }

    // resource operations

    async fn create_resource(&self, resource: &Resource) -> Result<Resource> {
        let model: entity::resource::ActiveModel = resource.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_resource(&self, id: ResourceId) -> Result<Option<Resource>> {
        let result = entity::resource::Entity::find_by_id(id.0)
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn update_resource(&self, resource: &Resource) -> Result<Resource> {
        let model: entity::resource::ActiveModel = resource.into();
        let result = model.update(&self.conn).await?;
        Ok(result.into())
    }

    // target operations

    async fn create_target(&self, target: &Target) -> Result<Target> {
        let txn = self.conn.begin().await?;

        let model: entity::target::ActiveModel = target.into();
        let created = model.insert(&txn).await?;

        // health rows share the target's lifecycle
        let health = TargetHealth::new(TargetId(created.target_id));
        let health_model: entity::target_health::ActiveModel = (&health).into();
        health_model.insert(&txn).await?;

        txn.commit().await?;
        Ok(created.into())
    }

    async fn get_target(&self, id: TargetId) -> Result<Option<Target>> {
        let result = entity::target::Entity::find_by_id(id.0)
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn update_target(&self, target: &Target) -> Result<Target> {
        let model: entity::target::ActiveModel = target.into();
        let result = model.update(&self.conn).await?;
        Ok(result.into())
    }

    async fn delete_target(&self, id: TargetId) -> Result<()> {
        entity::target::Entity::delete_by_id(id.0)
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    async fn list_targets_for_resource(&self, resource_id: ResourceId) -> Result<Vec<Target>> {
        let results = entity::target::Entity::find()
            .filter(entity::target::Column::ResourceId.eq(resource_id.0))
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn get_target_with_site(&self, id: TargetId) -> Result<Option<(Target, Site)>> {
        let Some(target_model) = entity::target::Entity::find_by_id(id.0)
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };
        let Some(site_model) = entity::site::Entity::find_by_id(target_model.site_id)
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };
        Ok(Some((target_model.into(), site_model.into())))
    }

    async fn list_enabled_targets_with_resources_for_site(
        &self,
        site_id: SiteId,
    ) -> Result<Vec<(Target, Resource)>> {
        let targets = entity::target::Entity::find()
            .filter(entity::target::Column::SiteId.eq(site_id.0))
            .filter(entity::target::Column::Enabled.eq(true))
            .all(&self.conn)
            .await?;

        let mut joined = Vec::with_capacity(targets.len());
        for target_model in targets {
            let Some(resource_model) =
                entity::resource::Entity::find_by_id(target_model.resource_id)
                    .one(&self.conn)
                    .await?
            else {
                continue;
            };
            joined.push((target_model.into(), resource_model.into()));
        }
        Ok(joined)
    }

    async fn list_resource_ids_for_targets(
        &self,
        target_ids: &[TargetId],
    ) -> Result<Vec<ResourceId>> {
        // per-id lookups; the distinct-set definition is the contract,
        // not the query shape
        let mut seen = HashSet::new();
        let mut resource_ids = Vec::new();
        for id in target_ids {
            let Some(target_model) = entity::target::Entity::find_by_id(id.0)
                .one(&self.conn)
                .await?
            else {
                continue;
            };
            if seen.insert(target_model.resource_id) {
                resource_ids.push(ResourceId(target_model.resource_id));
            }
        }
        Ok(resource_ids)
    }

    // target health operations

    async fn get_target_health(&self, id: TargetId) -> Result<Option<TargetHealth>> {
        let result = entity::target_health::Entity::find_by_id(id.0)
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn update_target_health(&self, health: &TargetHealth) -> Result<TargetHealth> {
        let model: entity::target_health::ActiveModel = health.into();
        let result = model.update(&self.conn).await?;
        Ok(result.into())
    }

    async fn set_target_health_status(&self, id: TargetId, status: HealthStatus) -> Result<()> {
        entity::target_health::Entity::update_many()
            .col_expr(
                entity::target_health::Column::HcHealth,
                sea_orm::sea_query::Expr::value(status.as_str()),
            )
            .filter(entity::target_health::Column::TargetId.eq(id.0))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    // agent operations

    async fn create_newt(&self, newt: &Newt) -> Result<Newt> {
        let model: entity::newt::ActiveModel = newt.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_newt(&self, id: &NewtId) -> Result<Option<Newt>> {
        let result = entity::newt::Entity::find_by_id(id.0.clone())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn get_newt_for_site(&self, site_id: SiteId) -> Result<Option<Newt>> {
        let result = entity::newt::Entity::find()
            .filter(entity::newt::Column::SiteId.eq(site_id.0))
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn create_olm(&self, olm: &Olm) -> Result<Olm> {
        let model: entity::olm::ActiveModel = olm.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_olm(&self, id: &OlmId) -> Result<Option<Olm>> {
        let result = entity::olm::Entity::find_by_id(id.0.clone())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn create_client(&self, client: &Client) -> Result<Client> {
        let model: entity::client::ActiveModel = client.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_client(&self, id: ClientId) -> Result<Option<Client>> {
        let result = entity::client::Entity::find_by_id(id.0)
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_clients_for_olm(&self, olm_id: &OlmId) -> Result<Vec<Client>> {
        let results = entity::client::Entity::find()
            .filter(entity::client::Column::OlmId.eq(olm_id.0.clone()))
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn associate_client_with_site(
        &self,
        client_id: ClientId,
        site_id: SiteId,
    ) -> Result<()> {
        let existing = entity::client_site_association::Entity::find_by_id((client_id.0, site_id.0))
            .one(&self.conn)
            .await?;
        if existing.is_some() {
            return Ok(());
        }
        let model = entity::client_site_association::ActiveModel {
            client_id: Set(client_id.0),
            site_id: Set(site_id.0),
        };
        model.insert(&self.conn).await?;
        Ok(())
    }

    async fn list_site_ids_for_client(&self, client_id: ClientId) -> Result<Vec<SiteId>> {
        let results = entity::client_site_association::Entity::find()
            .filter(entity::client_site_association::Column::ClientId.eq(client_id.0))
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(|m| SiteId(m.site_id)).collect())
    }

    async fn list_client_ids_for_site(&self, site_id: SiteId) -> Result<Vec<ClientId>> {
        let results = entity::client_site_association::Entity::find()
            .filter(entity::client_site_association::Column::SiteId.eq(site_id.0))
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(|m| ClientId(m.client_id)).collect())
    }

    // exit node operations

    async fn create_exit_node(&self, node: &ExitNode) -> Result<ExitNode> {
        let model: entity::exit_node::ActiveModel = node.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_exit_node(&self, id: ExitNodeId) -> Result<Option<ExitNode>> {
        let result = entity::exit_node::Entity::find_by_id(id.0)
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    // allowlist operations

    async fn add_whitelist_email(&self, resource_id: ResourceId, email: &str) -> Result<()> {
        let existing =
            entity::resource_whitelist::Entity::find_by_id((resource_id.0, email.to_string()))
                .one(&self.conn)
                .await?;
        if existing.is_some() {
            return Ok(());
        }
        let model = entity::resource_whitelist::ActiveModel {
            resource_id: Set(resource_id.0),
            email: Set(email.to_string()),
        };
        model.insert(&self.conn).await?;
        Ok(())
    }

    async fn list_whitelist_emails(&self, resource_id: ResourceId) -> Result<Vec<String>> {
        let results = entity::resource_whitelist::Entity::find()
            .filter(entity::resource_whitelist::Column::ResourceId.eq(resource_id.0))
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(|m| m.email).collect())
    }

    // session / user operations

    async fn create_user(&self, user: &User) -> Result<User> {
        let model: entity::user::ActiveModel = user.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        let result = entity::user::Entity::find_by_id(id.0.clone())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn create_session(&self, session: &Session) -> Result<Session> {
        let model: entity::session::ActiveModel = session.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_session_by_token(&self, token: &str) -> Result<Option<Session>> {
        let result = entity::session::Entity::find()
            .filter(entity::session::Column::SessionToken.eq(token))
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }
}
