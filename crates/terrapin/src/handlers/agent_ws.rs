//! websocket endpoint bridging agent connections onto the bus.
//!
//! the framing here is deliberately thin: json text frames carrying
//! [`AgentMessage`] envelopes. the bus owns all semantics; this handler
//! only attaches the agent, pumps its outbound queue onto the socket,
//! feeds inbound frames to dispatch, and detaches on close.

use axum::{
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use terrapin_db::Database;
use terrapin_proto::AgentMessage;
use terrapin_types::{NewtId, OlmId};
use tracing::{debug, info, warn};

use super::ApiError;
use crate::AppState;
use crate::bus::AgentAddr;

/// query parameters identifying the connecting agent.
#[derive(Debug, Deserialize)]
pub struct AgentWsQuery {
    /// agent kind: "newt" or "olm".
    kind: String,
    /// agent id.
    id: String,
}

/// `GET /api/v1/agent/ws?kind=newt&id=...` - upgrade an agent connection.
///
/// the agent must already be registered in the store; unknown agents are
/// rejected before the upgrade.
pub async fn agent_ws(
    State(state): State<AppState>,
    Query(query): Query<AgentWsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let addr = match query.kind.as_str() {
        "newt" => {
            if state
                .db
                .get_newt(&NewtId::from(query.id.as_str()))
                .await?
                .is_none()
            {
                return Err(ApiError::UnknownAgent(format!(
                    "newt {} is not registered",
                    query.id
                )));
            }
            AgentAddr::newt(query.id)
        }
        "olm" => {
            if state
                .db
                .get_olm(&OlmId::from(query.id.as_str()))
                .await?
                .is_none()
            {
                return Err(ApiError::UnknownAgent(format!(
                    "olm {} is not registered",
                    query.id
                )));
            }
            AgentAddr::olm(query.id)
        }
        other => {
            return Err(ApiError::Rejected(format!("unknown agent kind: {other}")));
        }
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(state, addr, socket)))
}

/// run one agent connection until either side closes.
async fn handle_socket(state: AppState, addr: AgentAddr, socket: WebSocket) {
    info!(agent = %addr, "agent connected");
    let mut outbound = state.bus.attach(addr.clone()).await;
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            queued = outbound.recv() => {
                // a closed queue means the bus replaced this connection
                let Some(msg) = queued else { break };
                let text = match serde_json::to_string(&msg) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(agent = %addr, error = %e, "failed to encode outbound message");
                        continue;
                    }
                };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<AgentMessage>(&text) {
                            Ok(msg) => {
                                state.bus.dispatch(addr.clone(), msg).await;
                            }
                            Err(e) => {
                                // malformed frames are dropped, the
                                // connection stays open
                                warn!(agent = %addr, error = %e, "malformed inbound frame");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if sink.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        debug!(agent = %addr, "ignoring non-text frame");
                    }
                    Some(Err(e)) => {
                        debug!(agent = %addr, error = %e, "agent socket error");
                        break;
                    }
                }
            }
        }
    }

    state.bus.detach(&addr).await;
    info!(agent = %addr, "agent disconnected");
}
