//! WebSocket JSON-RPC connection.
//!
//! One connection carries both request/response traffic (correlated by id)
//! and subscription notifications (routed by subscription id). A reader task
//! owns the receive half; when it ends, every pending request fails and all
//! subscription channels close, which is how downstream code observes a
//! dropped connection. `reconnect` swaps in a fresh connection; the old
//! tasks unwind on their own.

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::time::{timeout, Duration};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const NOTIFICATION_BUFFER: usize = 64;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("websocket error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("not connected")]
    NotConnected,
    #[error("connection closed")]
    ConnectionClosed,
    #[error("request timed out")]
    Timeout,
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

type PendingMap = Mutex<HashMap<u64, oneshot::Sender<Result<Value, RpcError>>>>;
type SubscriptionMap = Mutex<HashMap<String, mpsc::Sender<Value>>>;

struct Connection {
    outbound: mpsc::Sender<Message>,
    pending: PendingMap,
    subscriptions: SubscriptionMap,
    next_id: AtomicU64,
}

impl Connection {
    fn fail_all(&self) {
        let mut pending = self.pending.lock().expect("pending lock");
        for (_, tx) in pending.drain() {
            let _ = tx.send(Err(RpcError::ConnectionClosed));
        }
        self.subscriptions.lock().expect("subscriptions lock").clear();
    }
}

/// JSON-RPC client over one (replaceable) WebSocket connection.
pub struct WsRpcClient {
    url: String,
    conn: RwLock<Option<Arc<Connection>>>,
}

impl WsRpcClient {
    /// Connect to the node; fails fast when the endpoint is unreachable.
    pub async fn connect(url: &str) -> Result<Self, RpcError> {
        let client = Self {
            url: url.to_string(),
            conn: RwLock::new(None),
        };
        client.reconnect().await?;
        Ok(client)
    }

    /// Tear down the current connection and dial a fresh one.
    pub async fn reconnect(&self) -> Result<(), RpcError> {
        let (ws, _) = connect_async(&self.url).await?;
        let (mut sink, mut stream) = ws.split();
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<Message>(NOTIFICATION_BUFFER);
        let conn = Arc::new(Connection {
            outbound: outbound_tx,
            pending: Mutex::new(HashMap::new()),
            subscriptions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        });

        tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                if let Err(e) = sink.send(msg).await {
                    debug!(error = %e, "websocket send failed");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let reader_conn = Arc::clone(&conn);
        tokio::spawn(async move {
            while let Some(msg) = stream.next().await {
                let text = match msg {
                    Ok(Message::Text(t)) => t,
                    Ok(Message::Close(_)) | Err(_) => break,
                    Ok(_) => continue,
                };
                route_message(&reader_conn, &text);
            }
            reader_conn.fail_all();
        });

        let previous = self.conn.write().await.replace(conn);
        if let Some(old) = previous {
            old.fail_all();
        }
        Ok(())
    }

    async fn current(&self) -> Result<Arc<Connection>, RpcError> {
        self.conn
            .read()
            .await
            .as_ref()
            .cloned()
            .ok_or(RpcError::NotConnected)
    }

    /// Send one request and await its response.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let conn = self.current().await?;
        request_on(&conn, method, params).await
    }

    /// Subscribe via `method`; returns the subscription id and the channel
    /// notifications are routed to. The channel closes with the connection.
    pub async fn subscribe(
        &self,
        method: &str,
        params: Value,
    ) -> Result<(String, mpsc::Receiver<Value>), RpcError> {
        let conn = self.current().await?;
        let result = request_on(&conn, method, params).await?;
        let sub_id = result
            .as_str()
            .ok_or_else(|| RpcError::UnexpectedResponse(result.to_string()))?
            .to_string();
        let (tx, rx) = mpsc::channel(NOTIFICATION_BUFFER);
        conn.subscriptions
            .lock()
            .expect("subscriptions lock")
            .insert(sub_id.clone(), tx);
        Ok((sub_id, rx))
    }

    /// Best-effort unsubscribe; the subscription channel is dropped either way.
    pub async fn unsubscribe(&self, method: &str, sub_id: &str) {
        if let Ok(conn) = self.current().await {
            conn.subscriptions
                .lock()
                .expect("subscriptions lock")
                .remove(sub_id);
            if let Err(e) = request_on(&conn, method, json!([sub_id])).await {
                debug!(sub_id, error = %e, "unsubscribe failed");
            }
        }
    }
}

async fn request_on(conn: &Connection, method: &str, params: Value) -> Result<Value, RpcError> {
    let id = conn.next_id.fetch_add(1, Ordering::Relaxed);
    let (tx, rx) = oneshot::channel();
    conn.pending.lock().expect("pending lock").insert(id, tx);
    let frame = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    });
    if conn
        .outbound
        .send(Message::Text(frame.to_string()))
        .await
        .is_err()
    {
        conn.pending.lock().expect("pending lock").remove(&id);
        return Err(RpcError::ConnectionClosed);
    }
    match timeout(REQUEST_TIMEOUT, rx).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(RpcError::ConnectionClosed),
        Err(_) => {
            conn.pending.lock().expect("pending lock").remove(&id);
            Err(RpcError::Timeout)
        }
    }
}

fn route_message(conn: &Connection, text: &str) {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "unparseable frame");
            return;
        }
    };
    if let Some(id) = value.get("id").and_then(Value::as_u64) {
        let sender = conn.pending.lock().expect("pending lock").remove(&id);
        if let Some(tx) = sender {
            let result = if let Some(err) = value.get("error") {
                Err(RpcError::Rpc(err.to_string()))
            } else {
                Ok(value.get("result").cloned().unwrap_or(Value::Null))
            };
            let _ = tx.send(result);
        }
        return;
    }
    if value.get("method").and_then(Value::as_str) == Some("ledger.subscription") {
        let params = value.get("params").cloned().unwrap_or(Value::Null);
        let sub_id = params
            .get("subscription")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let result = params.get("result").cloned().unwrap_or(Value::Null);
        let subs = conn.subscriptions.lock().expect("subscriptions lock");
        if let Some(tx) = subs.get(&sub_id) {
            if tx.try_send(result).is_err() {
                warn!(sub_id = %sub_id, "subscription buffer full, dropping notification");
            }
        }
    }
}
