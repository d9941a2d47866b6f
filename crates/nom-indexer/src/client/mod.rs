//! Node client: the typed API surface the indexer consumes.
//!
//! [`NodeApi`] is the seam between the ingestion engine and the transport;
//! [`NodeClient`] implements it over the WebSocket JSON-RPC connection.
//! Tests substitute a scripted implementation.

pub mod api;
pub mod ws;

use api::{
    AccountBlock, AccountInfo, Momentum, MomentumHeader, MomentumList, PillarInfoList,
    ProjectList, SentinelInfoList, UnwrapTokenRequestList, WrapTokenRequestList,
};
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;
use ws::{RpcError, WsRpcClient};

/// One live momentum subscription: batches of headers plus an unsubscribe
/// hook.
pub struct MomentumSubscription {
    headers: mpsc::Receiver<Value>,
    unsubscribe: Option<Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>>,
}

impl MomentumSubscription {
    /// Build a subscription from a raw notification channel; used by the
    /// real client and by scripted nodes in tests.
    pub fn from_channel(headers: mpsc::Receiver<Value>) -> Self {
        Self {
            headers,
            unsubscribe: None,
        }
    }

    pub fn with_unsubscribe(
        mut self,
        f: impl FnOnce() -> BoxFuture<'static, ()> + Send + 'static,
    ) -> Self {
        self.unsubscribe = Some(Box::new(f));
        self
    }

    /// Next batch of momentum headers; `None` when the channel closed.
    pub async fn next(&mut self) -> Option<Vec<MomentumHeader>> {
        let value = self.headers.recv().await?;
        match serde_json::from_value::<Vec<MomentumHeader>>(value) {
            Ok(batch) => Some(batch),
            Err(e) => {
                warn!(error = %e, "malformed momentum notification");
                Some(Vec::new())
            }
        }
    }

    pub async fn unsubscribe(mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f().await;
        }
    }
}

/// The node endpoints the indexer depends on.
#[async_trait]
pub trait NodeApi: Send + Sync {
    async fn frontier_momentum(&self) -> Result<Momentum, RpcError>;
    async fn momentums_by_height(&self, height: u64, count: u64)
        -> Result<MomentumList, RpcError>;
    async fn account_block_by_hash(&self, hash: &str) -> Result<Option<AccountBlock>, RpcError>;
    async fn account_info_by_address(&self, address: &str) -> Result<AccountInfo, RpcError>;
    async fn pillars(&self, page: u32, per_page: u32) -> Result<PillarInfoList, RpcError>;
    async fn active_sentinels(&self, page: u32, per_page: u32)
        -> Result<SentinelInfoList, RpcError>;
    async fn projects(&self, page: u32, per_page: u32) -> Result<ProjectList, RpcError>;
    async fn wrap_token_requests(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<WrapTokenRequestList, RpcError>;
    async fn unwrap_token_requests(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<UnwrapTokenRequestList, RpcError>;
    async fn subscribe_momentums(&self) -> Result<MomentumSubscription, RpcError>;
    async fn reconnect(&self) -> Result<(), RpcError>;
}

/// Production [`NodeApi`] over the WebSocket JSON-RPC transport.
pub struct NodeClient {
    rpc: Arc<WsRpcClient>,
}

impl NodeClient {
    pub async fn connect(ws_url: &str) -> Result<Self, RpcError> {
        let rpc = Arc::new(WsRpcClient::connect(ws_url).await?);
        Ok(Self { rpc })
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, RpcError> {
        let result = self.rpc.request(method, params).await?;
        serde_json::from_value(result).map_err(|e| RpcError::UnexpectedResponse(e.to_string()))
    }
}

#[async_trait]
impl NodeApi for NodeClient {
    async fn frontier_momentum(&self) -> Result<Momentum, RpcError> {
        self.call("ledger.getFrontierMomentum", json!([])).await
    }

    async fn momentums_by_height(
        &self,
        height: u64,
        count: u64,
    ) -> Result<MomentumList, RpcError> {
        self.call("ledger.getMomentumsByHeight", json!([height, count]))
            .await
    }

    async fn account_block_by_hash(&self, hash: &str) -> Result<Option<AccountBlock>, RpcError> {
        self.call("ledger.getAccountBlockByHash", json!([hash])).await
    }

    async fn account_info_by_address(&self, address: &str) -> Result<AccountInfo, RpcError> {
        self.call("ledger.getAccountInfoByAddress", json!([address]))
            .await
    }

    async fn pillars(&self, page: u32, per_page: u32) -> Result<PillarInfoList, RpcError> {
        self.call("embedded.pillar.getAll", json!([page, per_page]))
            .await
    }

    async fn active_sentinels(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<SentinelInfoList, RpcError> {
        self.call("embedded.sentinel.getAllActive", json!([page, per_page]))
            .await
    }

    async fn projects(&self, page: u32, per_page: u32) -> Result<ProjectList, RpcError> {
        self.call("embedded.accelerator.getAll", json!([page, per_page]))
            .await
    }

    async fn wrap_token_requests(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<WrapTokenRequestList, RpcError> {
        self.call(
            "embedded.bridge.getAllWrapTokenRequests",
            json!([page, per_page]),
        )
        .await
    }

    async fn unwrap_token_requests(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<UnwrapTokenRequestList, RpcError> {
        self.call(
            "embedded.bridge.getAllUnwrapTokenRequests",
            json!([page, per_page]),
        )
        .await
    }

    async fn subscribe_momentums(&self) -> Result<MomentumSubscription, RpcError> {
        let (sub_id, rx) = self.rpc.subscribe("ledger.subscribe", json!(["momentums"])).await?;
        let rpc = Arc::clone(&self.rpc);
        Ok(MomentumSubscription::from_channel(rx).with_unsubscribe(move || {
            async move {
                rpc.unsubscribe("ledger.unsubscribe", &sub_id).await;
            }
            .boxed()
        }))
    }

    async fn reconnect(&self) -> Result<(), RpcError> {
        self.rpc.reconnect().await
    }
}
