//! the agent bus: one logical duplex channel per connected agent.
//!
//! outbound delivery is best-effort and non-blocking. each connected agent
//! owns a bounded queue drained by its connection layer; a `send` to an
//! absent agent or a full queue returns [`SendOutcome::Dropped`] and is
//! recovered by the reconnect-time resync, never by retry.
//!
//! inbound messages are routed to handlers registered by message type.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use terrapin_proto::AgentMessage;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

/// outbound queue capacity per connected agent. a full queue drops the
/// enqueue rather than blocking the caller.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 64;

/// the two kinds of edge agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    /// site-side tunnel/ingress agent.
    Newt,
    /// local-resolver agent.
    Olm,
}

impl AgentKind {
    /// lowercase wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Newt => "newt",
            AgentKind::Olm => "olm",
        }
    }
}

/// address of a connected agent on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentAddr {
    /// which kind of agent this is.
    pub kind: AgentKind,
    /// the agent's platform identifier.
    pub id: String,
}

impl AgentAddr {
    /// address of a newt agent.
    pub fn newt(id: impl Into<String>) -> Self {
        Self {
            kind: AgentKind::Newt,
            id: id.into(),
        }
    }

    /// address of an olm agent.
    pub fn olm(id: impl Into<String>) -> Self {
        Self {
            kind: AgentKind::Olm,
            id: id.into(),
        }
    }
}

impl std::fmt::Display for AgentAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind.as_str(), self.id)
    }
}

/// result of an outbound send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// the message was enqueued on the agent's channel.
    Sent,
    /// the agent is not connected, its queue is full, or its channel
    /// closed. the message is gone; resync recovers.
    Dropped,
}

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Handler = Arc<dyn Fn(AgentAddr, Value) -> BoxFuture + Send + Sync>;
type ConnectHook = Arc<dyn Fn(AgentAddr) -> BoxFuture + Send + Sync>;

struct BusInner {
    /// outbound senders for currently connected agents.
    connections: RwLock<HashMap<AgentAddr, mpsc::Sender<AgentMessage>>>,
    /// inbound handlers keyed by message type.
    handlers: RwLock<HashMap<String, Handler>>,
    /// hooks fired once per agent (re)connect.
    connect_hooks: RwLock<Vec<ConnectHook>>,
}

/// the message bus between the controller and its agents.
///
/// all clones share the same connection table, handler registry and
/// connect hooks.
#[derive(Clone)]
pub struct AgentBus {
    inner: Arc<BusInner>,
}

impl AgentBus {
    /// create an empty bus.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                connections: RwLock::new(HashMap::new()),
                handlers: RwLock::new(HashMap::new()),
                connect_hooks: RwLock::new(Vec::new()),
            }),
        }
    }

    /// bind an inbound message type to a handler.
    ///
    /// registration happens at startup, before any agent connects; a later
    /// registration for the same type replaces the earlier one.
    pub async fn register_handler<F, Fut>(&self, msg_type: &str, handler: F)
    where
        F: Fn(AgentAddr, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |addr, payload| Box::pin(handler(addr, payload)));
        self.inner
            .handlers
            .write()
            .await
            .insert(msg_type.to_string(), handler);
    }

    /// register a hook fired once per agent (re)connect.
    pub async fn on_connect<F, Fut>(&self, hook: F)
    where
        F: Fn(AgentAddr) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let hook: ConnectHook = Arc::new(move |addr| Box::pin(hook(addr)));
        self.inner.connect_hooks.write().await.push(hook);
    }

    /// attach an agent connection and fire connect hooks.
    ///
    /// returns the receiving end of the agent's outbound queue; the
    /// connection layer drains it onto the socket. a re-attach replaces
    /// the previous queue, orphaning the stale connection's receiver.
    pub async fn attach(&self, addr: AgentAddr) -> mpsc::Receiver<AgentMessage> {
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        {
            let mut connections = self.inner.connections.write().await;
            if connections.insert(addr.clone(), tx).is_some() {
                debug!(agent = %addr, "replaced stale connection on re-attach");
            }
        }

        // hooks run after the sender is registered so bootstrap pushes
        // land in the fresh queue
        let hooks = self.inner.connect_hooks.read().await.clone();
        for hook in hooks {
            hook(addr.clone()).await;
        }

        rx
    }

    /// detach an agent connection. no-op if the agent is not attached.
    pub async fn detach(&self, addr: &AgentAddr) {
        self.inner.connections.write().await.remove(addr);
    }

    /// whether an agent is currently attached.
    pub async fn is_connected(&self, addr: &AgentAddr) -> bool {
        self.inner.connections.read().await.contains_key(addr)
    }

    /// number of currently attached agents.
    pub async fn connected_count(&self) -> usize {
        self.inner.connections.read().await.len()
    }

    /// enqueue a message for an agent without blocking.
    pub async fn send(&self, addr: &AgentAddr, msg: AgentMessage) -> SendOutcome {
        let connections = self.inner.connections.read().await;
        let Some(tx) = connections.get(addr) else {
            warn!(agent = %addr, msg_type = %msg.msg_type, "drop: agent not connected");
            return SendOutcome::Dropped;
        };
        match tx.try_send(msg) {
            Ok(()) => SendOutcome::Sent,
            Err(mpsc::error::TrySendError::Full(msg)) => {
                warn!(agent = %addr, msg_type = %msg.msg_type, "drop: outbound queue full");
                SendOutcome::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(msg)) => {
                warn!(agent = %addr, msg_type = %msg.msg_type, "drop: outbound channel closed");
                SendOutcome::Dropped
            }
        }
    }

    /// route an inbound message to its registered handler.
    ///
    /// unknown types are logged and dropped; the connection stays open.
    pub async fn dispatch(&self, from: AgentAddr, msg: AgentMessage) {
        let handler = {
            let handlers = self.inner.handlers.read().await;
            handlers.get(&msg.msg_type).cloned()
        };
        match handler {
            Some(handler) => handler(from, msg.data).await,
            None => {
                warn!(agent = %from, msg_type = %msg.msg_type, "no handler for inbound message");
            }
        }
    }
}

impl Default for AgentBus {
    fn default() -> Self {
        Self::new()
    }
}
