//! integration tests for the reconnect sync path: an attaching agent
//! receives its full view through the connect hooks wired by create_app.

mod common;

use serde_json::json;
use terrapin::bus::{AgentAddr, AgentBus};
use terrapin_db::Database;
use terrapin_proto::{
    NEWT_AUTH_PROXY_CONFIG, NEWT_DNS_AUTHORITY_CONFIG, OLM_DNS_AUTHORITY_CONFIG, OLM_SYNC,
};

/// a reconnecting olm receives an `olm/sync` followed by the zone
/// configs its client's sites serve.
#[tokio::test]
async fn olm_reconnect_receives_sync_then_zones() {
    let db = common::test_db().await;
    let bus = AgentBus::new();
    let org = common::seed_org(&db).await;
    let exit_node = common::seed_exit_node(&db, "relay.example.com:51820").await;

    let mut site = common::seed_site(&db, &org, "s1", true, Some("203.0.113.10")).await;
    site.exit_node_id = Some(exit_node.exit_node_id);
    let site = db.update_site(&site).await.unwrap();

    let resource = common::seed_resource(&db, &org, Some("svc.example.com"), true).await;
    common::seed_target(&db, &resource, &site, true).await;
    common::seed_newt(&db, &site).await;
    let (olm, _client) = common::seed_olm_with_client(&db, "olm-1", &[&site]).await;

    let _app = terrapin::create_app(
        db.clone(),
        bus.clone(),
        common::test_config(),
        common::test_keys(),
    )
    .await;

    // simulate the connection layer attaching the olm
    let mut rx = bus.attach(AgentAddr::olm(olm.olm_id.as_str())).await;

    let sync = rx.try_recv().expect("first message is the sync");
    assert_eq!(sync.msg_type, OLM_SYNC);
    assert_eq!(sync.data["sites"][0]["siteId"], json!(site.site_id.0));
    assert_eq!(sync.data["sites"][0]["publicIp"], json!("203.0.113.10"));
    let exit_nodes = sync.data["exitNodes"].as_array().unwrap();
    assert_eq!(exit_nodes.len(), 1);
    assert_eq!(exit_nodes[0]["endpoint"], json!("relay.example.com:51820"));
    assert_eq!(exit_nodes[0]["relayPort"], json!(51820));
    assert_eq!(exit_nodes[0]["siteIds"], json!([site.site_id.0]));

    // the bootstrap contains a zone for every resource whose
    // recipient set includes this olm
    let zones = rx.try_recv().expect("second message is the zone bootstrap");
    assert_eq!(zones.msg_type, OLM_DNS_AUTHORITY_CONFIG);
    assert_eq!(zones.data["action"], json!("update"));
    assert_eq!(zones.data["zones"][0]["domain"], json!("svc.example.com"));

    assert!(rx.try_recv().is_err(), "no further bootstrap messages");
}

/// an olm with no site associations gets no bootstrap traffic.
#[tokio::test]
async fn olm_without_associations_stays_silent() {
    let db = common::test_db().await;
    let bus = AgentBus::new();
    let (olm, _client) = common::seed_olm_with_client(&db, "olm-lonely", &[]).await;

    let _app = terrapin::create_app(
        db.clone(),
        bus.clone(),
        common::test_config(),
        common::test_keys(),
    )
    .await;

    let mut rx = bus.attach(AgentAddr::olm(olm.olm_id.as_str())).await;
    assert!(rx.try_recv().is_err());
}

/// a reconnecting newt receives its site's auth-proxy config and zones.
#[tokio::test]
async fn newt_reconnect_receives_site_view() {
    let db = common::test_db().await;
    let bus = AgentBus::new();
    let org = common::seed_org(&db).await;
    let site = common::seed_site(&db, &org, "s1", true, Some("203.0.113.10")).await;

    let mut resource = common::seed_resource(&db, &org, Some("secure.example.com"), true).await;
    resource.sso = true;
    let resource = db.update_resource(&resource).await.unwrap();
    common::seed_target(&db, &resource, &site, true).await;
    let newt = common::seed_newt(&db, &site).await;

    let _app = terrapin::create_app(
        db.clone(),
        bus.clone(),
        common::test_config(),
        common::test_keys(),
    )
    .await;

    let mut rx = bus.attach(AgentAddr::newt(newt.newt_id.as_str())).await;

    let auth = rx.try_recv().expect("auth proxy config on reconnect");
    assert_eq!(auth.msg_type, NEWT_AUTH_PROXY_CONFIG);
    assert_eq!(
        auth.data["resources"][0]["domain"],
        json!("secure.example.com")
    );

    let zones = rx.try_recv().expect("zone bootstrap on reconnect");
    assert_eq!(zones.msg_type, NEWT_DNS_AUTHORITY_CONFIG);
    assert_eq!(zones.data["zones"][0]["domain"], json!("secure.example.com"));
}

/// sites of two clients of the same olm are merged into one sync view.
#[tokio::test]
async fn sync_merges_sites_across_clients() {
    let db = common::test_db().await;
    let bus = AgentBus::new();
    let org = common::seed_org(&db).await;
    let site1 = common::seed_site(&db, &org, "s1", true, Some("203.0.113.10")).await;
    let site2 = common::seed_site(&db, &org, "s2", true, Some("198.51.100.7")).await;

    let (olm, _c1) = common::seed_olm_with_client(&db, "olm-multi", &[&site1]).await;
    // second client of the same olm
    let client2 = db
        .create_client(&terrapin_types::Client {
            client_id: terrapin_types::ClientId(0),
            olm_id: olm.olm_id.clone(),
            pub_key: None,
        })
        .await
        .unwrap();
    db.associate_client_with_site(client2.client_id, site2.site_id)
        .await
        .unwrap();

    let _app = terrapin::create_app(
        db.clone(),
        bus.clone(),
        common::test_config(),
        common::test_keys(),
    )
    .await;

    let mut rx = bus.attach(AgentAddr::olm(olm.olm_id.as_str())).await;
    let sync = rx.try_recv().unwrap();
    let site_ids: Vec<i64> = sync.data["sites"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["siteId"].as_i64().unwrap())
        .collect();
    assert_eq!(site_ids, vec![site1.site_id.0, site2.site_id.0]);
}
