//! end-to-end tests for the agent websocket endpoint: a real listener,
//! a real client, and the full attach / bootstrap / dispatch / detach
//! path through the bus.

mod common;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use terrapin::bus::AgentBus;
use terrapin_db::{Database, TerrapinDb};
use terrapin_proto::{
    AgentMessage, HEALTHCHECK_STATUS, HealthCheckStatusReport, NEWT_DNS_AUTHORITY_CONFIG,
    TargetStatusReport,
};
use terrapin_types::HealthStatus;
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite};

/// serve the app on an ephemeral port, returning its address.
async fn spawn_app(db: &TerrapinDb) -> SocketAddr {
    let app = terrapin::create_app(
        db.clone(),
        AgentBus::new(),
        common::test_config(),
        common::test_keys(),
    )
    .await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn newt_gets_bootstrap_and_can_report_health() {
    let db = common::test_db().await;
    let org = common::seed_org(&db).await;
    let site = common::seed_site(&db, &org, "s1", true, Some("203.0.113.10")).await;
    let resource = common::seed_resource(&db, &org, Some("svc.example.com"), true).await;
    let target = common::seed_target(&db, &resource, &site, true).await;
    let newt = common::seed_newt(&db, &site).await;
    let addr = spawn_app(&db).await;

    let url = format!("ws://{addr}/api/v1/agent/ws?kind=newt&id={}", newt.newt_id);
    let (mut ws, _response) = connect_async(url).await.expect("upgrade should succeed");

    // the reconnect bootstrap is pushed as the first frame
    let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("bootstrap should arrive promptly")
        .expect("stream should be open")
        .expect("frame should be readable");
    let msg: AgentMessage = serde_json::from_str(frame.to_text().unwrap()).unwrap();
    assert_eq!(msg.msg_type, NEWT_DNS_AUTHORITY_CONFIG);
    assert_eq!(msg.data["zones"][0]["domain"], "svc.example.com");

    // report a health flip through the socket
    let mut targets = BTreeMap::new();
    targets.insert(
        target.target_id.to_string(),
        TargetStatusReport {
            status: "unhealthy".to_string(),
            last_check: None,
            check_count: 1,
            last_error: Some("connect timeout".to_string()),
            config: serde_json::Value::Null,
        },
    );
    let report =
        AgentMessage::new(HEALTHCHECK_STATUS, &HealthCheckStatusReport { targets }).unwrap();
    ws.send(tungstenite::Message::Text(
        serde_json::to_string(&report).unwrap().into(),
    ))
    .await
    .unwrap();

    // the flip lands in the store
    let mut persisted = HealthStatus::Unknown;
    for _ in 0..50 {
        persisted = db
            .get_target_health(target.target_id)
            .await
            .unwrap()
            .unwrap()
            .hc_health;
        if persisted == HealthStatus::Unhealthy {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(persisted, HealthStatus::Unhealthy);

    ws.close(None).await.unwrap();
}

#[tokio::test]
async fn unknown_agent_is_rejected_before_upgrade() {
    let db = common::test_db().await;
    let addr = spawn_app(&db).await;

    let url = format!("ws://{addr}/api/v1/agent/ws?kind=newt&id=ghost");
    let err = connect_async(url).await.expect_err("upgrade must fail");
    match err {
        tungstenite::Error::Http(response) => {
            assert_eq!(response.status().as_u16(), 401);
        }
        other => panic!("expected http rejection, got: {other}"),
    }
}

#[tokio::test]
async fn unknown_kind_is_a_bad_request() {
    let db = common::test_db().await;
    let addr = spawn_app(&db).await;

    let url = format!("ws://{addr}/api/v1/agent/ws?kind=badger&id=x");
    let err = connect_async(url).await.expect_err("upgrade must fail");
    match err {
        tungstenite::Error::Http(response) => {
            assert_eq!(response.status().as_u16(), 400);
        }
        other => panic!("expected http rejection, got: {other}"),
    }
}
