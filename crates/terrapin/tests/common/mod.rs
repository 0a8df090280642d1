//! shared fixtures for terrapin integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use terrapin::keys::JwtKeys;
use terrapin_db::{Database, TerrapinDb};
use terrapin_types::{
    Client, ClientId, Config, ExitNode, ExitNodeId, Newt, NewtId, Olm, OlmId, Org, OrgId,
    Resource, ResourceId, RoutingPolicy, Site, SiteId, Target, TargetId, TargetMethod,
};

/// an in-memory database with migrations applied.
pub async fn test_db() -> TerrapinDb {
    TerrapinDb::new_in_memory()
        .await
        .expect("failed to create in-memory database")
}

/// a config pointing at the canonical test dashboard.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.app.dashboard_url = "https://app.example.com".to_string();
    config
}

/// a freshly generated controller keypair. the backing directory is
/// discarded; the pems stay cached in memory.
pub fn test_keys() -> Arc<JwtKeys> {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    Arc::new(JwtKeys::load_or_generate(dir.path()).expect("failed to generate keypair"))
}

pub async fn seed_org(db: &TerrapinDb) -> Org {
    db.create_org(&Org {
        org_id: OrgId::from("org-1"),
        name: "Test Org".to_string(),
    })
    .await
    .expect("failed to create org")
}

pub async fn seed_site(
    db: &TerrapinDb,
    org: &Org,
    nice_id: &str,
    dns_authority_enabled: bool,
    public_ip: Option<&str>,
) -> Site {
    db.create_site(&Site {
        site_id: SiteId(0),
        org_id: org.org_id.clone(),
        nice_id: nice_id.to_string(),
        name: format!("Site {nice_id}"),
        site_type: "newt".to_string(),
        public_ip: public_ip.map(str::to_string),
        server_public_ip: None,
        docker_socket_enabled: false,
        dns_authority_enabled,
        exit_node_id: None,
    })
    .await
    .expect("failed to create site")
}

pub async fn seed_resource(
    db: &TerrapinDb,
    org: &Org,
    full_domain: Option<&str>,
    dns_authority_enabled: bool,
) -> Resource {
    db.create_resource(&Resource {
        resource_id: ResourceId(0),
        org_id: org.org_id.clone(),
        name: "svc".to_string(),
        full_domain: full_domain.map(str::to_string),
        ssl: true,
        http: true,
        sso: false,
        block_access: false,
        email_whitelist_enabled: false,
        dns_authority_enabled,
        dns_authority_ttl: 60,
        dns_authority_routing_policy: RoutingPolicy::Failover,
    })
    .await
    .expect("failed to create resource")
}

pub async fn seed_target(
    db: &TerrapinDb,
    resource: &Resource,
    site: &Site,
    enabled: bool,
) -> Target {
    db.create_target(&Target {
        target_id: TargetId(0),
        resource_id: resource.resource_id,
        site_id: site.site_id,
        ip: "10.0.0.5".to_string(),
        port: 8080,
        method: TargetMethod::Http,
        enabled,
        priority: 100,
        ssl: false,
    })
    .await
    .expect("failed to create target")
}

pub async fn seed_newt(db: &TerrapinDb, site: &Site) -> Newt {
    db.create_newt(&Newt {
        newt_id: NewtId(format!("newt-{}", site.nice_id)),
        site_id: Some(site.site_id),
    })
    .await
    .expect("failed to create newt")
}

/// an olm with one client associated to each of the given sites.
pub async fn seed_olm_with_client(db: &TerrapinDb, id: &str, sites: &[&Site]) -> (Olm, Client) {
    let olm = db
        .create_olm(&Olm {
            olm_id: OlmId::from(id),
        })
        .await
        .expect("failed to create olm");
    let client = db
        .create_client(&Client {
            client_id: ClientId(0),
            olm_id: olm.olm_id.clone(),
            pub_key: Some(format!("pk-{id}")),
        })
        .await
        .expect("failed to create client");
    for site in sites {
        db.associate_client_with_site(client.client_id, site.site_id)
            .await
            .expect("failed to associate client with site");
    }
    (olm, client)
}

pub async fn seed_exit_node(db: &TerrapinDb, endpoint: &str) -> ExitNode {
    db.create_exit_node(&ExitNode {
        exit_node_id: ExitNodeId(0),
        public_key: format!("exit-pk-{endpoint}"),
        endpoint: endpoint.to_string(),
    })
    .await
    .expect("failed to create exit node")
}
