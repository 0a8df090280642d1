//! integration tests for the dns-authority reconciler: zone construction
//! against live store state, recipient computation and dispatch.

mod common;

use serde_json::json;
use terrapin::bus::{AgentAddr, AgentBus};
use terrapin::reconciler::DnsAuthorityReconciler;
use terrapin_db::Database;
use terrapin_proto::{NEWT_DNS_AUTHORITY_CONFIG, OLM_DNS_AUTHORITY_CONFIG};
use terrapin_types::HealthStatus;

/// a single-site authoritative zone reaches the site's newt with the
/// exact wire shape.
#[tokio::test]
async fn single_site_zone_is_pushed_to_newt() {
    let db = common::test_db().await;
    let bus = AgentBus::new();
    let org = common::seed_org(&db).await;
    let site = common::seed_site(&db, &org, "s1", true, Some("203.0.113.10")).await;
    let resource = common::seed_resource(&db, &org, Some("svc.example.com"), true).await;
    common::seed_target(&db, &resource, &site, true).await;
    let newt = common::seed_newt(&db, &site).await;

    let mut rx = bus.attach(AgentAddr::newt(newt.newt_id.as_str())).await;

    let reconciler = DnsAuthorityReconciler::new(db.clone(), bus.clone());
    reconciler
        .update_dns_authority_for_resource(resource.resource_id)
        .await
        .unwrap();

    let msg = rx.try_recv().expect("newt should receive a zone update");
    assert_eq!(msg.msg_type, NEWT_DNS_AUTHORITY_CONFIG);
    assert_eq!(
        msg.data,
        json!({
            "action": "update",
            "zones": [{
                "enabled": true,
                "domain": "svc.example.com",
                "ttl": 60,
                "routingPolicy": "failover",
                "targets": [{
                    "ip": "203.0.113.10",
                    "priority": 100,
                    "healthy": true,
                    "siteId": site.site_id.0,
                    "siteName": site.name,
                }],
            }],
        })
    );
}

/// two back-to-back updates without a state change produce byte-identical
/// messages.
#[tokio::test]
async fn repeated_updates_are_byte_identical() {
    let db = common::test_db().await;
    let bus = AgentBus::new();
    let org = common::seed_org(&db).await;
    let site = common::seed_site(&db, &org, "s1", true, Some("203.0.113.10")).await;
    let resource = common::seed_resource(&db, &org, Some("svc.example.com"), true).await;
    common::seed_target(&db, &resource, &site, true).await;
    let newt = common::seed_newt(&db, &site).await;

    let mut rx = bus.attach(AgentAddr::newt(newt.newt_id.as_str())).await;
    let reconciler = DnsAuthorityReconciler::new(db.clone(), bus.clone());

    reconciler
        .update_dns_authority_for_resource(resource.resource_id)
        .await
        .unwrap();
    reconciler
        .update_dns_authority_for_resource(resource.resource_id)
        .await
        .unwrap();

    let first = serde_json::to_string(&rx.try_recv().unwrap()).unwrap();
    let second = serde_json::to_string(&rx.try_recv().unwrap()).unwrap();
    assert_eq!(first, second);
}

/// an unhealthy target stays in the zone with
/// `healthy: false`.
#[tokio::test]
async fn unhealthy_target_is_kept_with_healthy_false() {
    let db = common::test_db().await;
    let bus = AgentBus::new();
    let org = common::seed_org(&db).await;
    let site = common::seed_site(&db, &org, "s1", true, Some("203.0.113.10")).await;
    let resource = common::seed_resource(&db, &org, Some("svc.example.com"), true).await;
    let target = common::seed_target(&db, &resource, &site, true).await;
    let newt = common::seed_newt(&db, &site).await;

    // enable health checking and flip to unhealthy
    let mut health = db.get_target_health(target.target_id).await.unwrap().unwrap();
    health.hc_enabled = true;
    db.update_target_health(&health).await.unwrap();
    db.set_target_health_status(target.target_id, HealthStatus::Unhealthy)
        .await
        .unwrap();

    let mut rx = bus.attach(AgentAddr::newt(newt.newt_id.as_str())).await;
    DnsAuthorityReconciler::new(db.clone(), bus.clone())
        .update_dns_authority_for_resource(resource.resource_id)
        .await
        .unwrap();

    let msg = rx.try_recv().unwrap();
    let targets = &msg.data["zones"][0]["targets"];
    assert_eq!(targets.as_array().unwrap().len(), 1);
    assert_eq!(targets[0]["healthy"], json!(false));
}

/// the recipient set is the newts on qualifying sites plus
/// the olms whose clients associate with those sites; nothing else.
#[tokio::test]
async fn recipients_are_qualifying_newts_and_associated_olms() {
    let db = common::test_db().await;
    let bus = AgentBus::new();
    let org = common::seed_org(&db).await;
    let good_site = common::seed_site(&db, &org, "s1", true, Some("203.0.113.10")).await;
    // hosts a target but has dns authority off
    let bad_site = common::seed_site(&db, &org, "s2", false, Some("198.51.100.7")).await;
    let resource = common::seed_resource(&db, &org, Some("svc.example.com"), true).await;
    common::seed_target(&db, &resource, &good_site, true).await;
    common::seed_target(&db, &resource, &bad_site, true).await;

    let good_newt = common::seed_newt(&db, &good_site).await;
    let bad_newt = common::seed_newt(&db, &bad_site).await;
    let (good_olm, _) = common::seed_olm_with_client(&db, "olm-good", &[&good_site]).await;
    let (bad_olm, _) = common::seed_olm_with_client(&db, "olm-bad", &[&bad_site]).await;

    let mut good_newt_rx = bus.attach(AgentAddr::newt(good_newt.newt_id.as_str())).await;
    let mut bad_newt_rx = bus.attach(AgentAddr::newt(bad_newt.newt_id.as_str())).await;
    let mut good_olm_rx = bus.attach(AgentAddr::olm(good_olm.olm_id.as_str())).await;
    let mut bad_olm_rx = bus.attach(AgentAddr::olm(bad_olm.olm_id.as_str())).await;

    DnsAuthorityReconciler::new(db.clone(), bus.clone())
        .update_dns_authority_for_resource(resource.resource_id)
        .await
        .unwrap();

    let newt_msg = good_newt_rx.try_recv().expect("qualifying newt receives");
    assert_eq!(newt_msg.msg_type, NEWT_DNS_AUTHORITY_CONFIG);
    let olm_msg = good_olm_rx.try_recv().expect("associated olm receives");
    assert_eq!(olm_msg.msg_type, OLM_DNS_AUTHORITY_CONFIG);

    // every answer ip sent is a qualifying site's public ip
    for msg in [&newt_msg, &olm_msg] {
        for target in msg.data["zones"][0]["targets"].as_array().unwrap() {
            assert_eq!(target["ip"], json!("203.0.113.10"));
        }
    }

    assert!(bad_newt_rx.try_recv().is_err(), "non-qualifying newt is silent");
    assert!(bad_olm_rx.try_recv().is_err(), "unassociated olm is silent");
}

/// removing and re-adding dns authority yields first a remove then an
/// update to the same recipient.
#[tokio::test]
async fn disable_then_enable_round_trips_remove_and_update() {
    let db = common::test_db().await;
    let bus = AgentBus::new();
    let org = common::seed_org(&db).await;
    let site = common::seed_site(&db, &org, "s1", true, Some("203.0.113.10")).await;
    let mut resource = common::seed_resource(&db, &org, Some("svc.example.com"), true).await;
    common::seed_target(&db, &resource, &site, true).await;
    let newt = common::seed_newt(&db, &site).await;

    let mut rx = bus.attach(AgentAddr::newt(newt.newt_id.as_str())).await;
    let reconciler = DnsAuthorityReconciler::new(db.clone(), bus.clone());

    // operator turns dns authority off
    resource.dns_authority_enabled = false;
    db.update_resource(&resource).await.unwrap();
    reconciler
        .update_dns_authority_for_resource(resource.resource_id)
        .await
        .unwrap();

    let removal = rx.try_recv().expect("newt should receive the removal");
    assert_eq!(
        removal.data,
        json!({"action": "remove", "zones": [{"domain": "svc.example.com"}]})
    );

    // and back on
    resource.dns_authority_enabled = true;
    db.update_resource(&resource).await.unwrap();
    reconciler
        .update_dns_authority_for_resource(resource.resource_id)
        .await
        .unwrap();

    let update = rx.try_recv().expect("newt should receive the re-add");
    assert_eq!(update.data["action"], json!("update"));
    assert_eq!(update.data["zones"][0]["domain"], json!("svc.example.com"));
}

/// a health batch touching several targets of one resource triggers a
/// single rebuild; resources without dns authority are skipped.
#[tokio::test]
async fn health_update_collapses_to_distinct_resources() {
    let db = common::test_db().await;
    let bus = AgentBus::new();
    let org = common::seed_org(&db).await;
    let site = common::seed_site(&db, &org, "s1", true, Some("203.0.113.10")).await;
    let resource = common::seed_resource(&db, &org, Some("svc.example.com"), true).await;
    let t1 = common::seed_target(&db, &resource, &site, true).await;
    let t2 = common::seed_target(&db, &resource, &site, true).await;

    let plain = common::seed_resource(&db, &org, Some("plain.example.com"), false).await;
    let t3 = common::seed_target(&db, &plain, &site, true).await;

    let newt = common::seed_newt(&db, &site).await;
    let mut rx = bus.attach(AgentAddr::newt(newt.newt_id.as_str())).await;

    DnsAuthorityReconciler::new(db.clone(), bus.clone())
        .on_health_check_update(&[t1.target_id, t2.target_id, t3.target_id])
        .await
        .unwrap();

    let msg = rx.try_recv().expect("one rebuild for the dns resource");
    assert_eq!(msg.data["zones"][0]["domain"], json!("svc.example.com"));
    assert!(
        rx.try_recv().is_err(),
        "no second rebuild and nothing for the non-dns resource"
    );
}

/// dropped sends (no recipient connected) are advisory; the pass still
/// succeeds.
#[tokio::test]
async fn update_with_no_connected_recipients_is_ok() {
    let db = common::test_db().await;
    let bus = AgentBus::new();
    let org = common::seed_org(&db).await;
    let site = common::seed_site(&db, &org, "s1", true, Some("203.0.113.10")).await;
    let resource = common::seed_resource(&db, &org, Some("svc.example.com"), true).await;
    common::seed_target(&db, &resource, &site, true).await;
    common::seed_newt(&db, &site).await;

    // nobody attached to the bus
    DnsAuthorityReconciler::new(db.clone(), bus.clone())
        .update_dns_authority_for_resource(resource.resource_id)
        .await
        .unwrap();
}
