//! Momentum processing: one momentum in, one atomic batch out.

use super::{decoder, Indexer};
use crate::client::api::{self, AccountHeader};
use crate::models::{self, block_type, saturating_i64, Account, TxData};
use crate::repository::{
    AccountBlockRepository, AccountRepository, BalanceRepository, Batch, MomentumRepository,
    TokenRepository,
};
use anyhow::{Context, Result};
use std::time::Instant;
use tracing::{debug, warn};
use znn_abi::constants;

/// Methods on the pillar contract whose decoded inputs get the resolved
/// pillar owner injected for downstream consumers.
const PILLAR_OWNER_METHODS: &[&str] = &[
    "Delegate",
    "Register",
    "RegisterLegacy",
    "Revoke",
    "UpdatePillar",
];

/// Balance snapshots are skipped for genesis and for outsized momentums; a
/// single momentum must stay bounded work.
const BALANCE_PASS_MAX_TX: usize = 1000;

impl Indexer {
    /// Process one fully-fetched momentum: build the batch with every
    /// account-block, account, balance, token, embedded-event and reward
    /// write, then submit it. Per-statement store errors are logged, not
    /// fatal; only failure to reach the store at all is propagated.
    pub async fn process_momentum(&self, m: &api::Momentum) -> Result<()> {
        let started = Instant::now();
        let mut batch = Batch::new();

        if !m.content.is_empty() {
            if m.height > 1 && m.content.len() < BALANCE_PASS_MAX_TX {
                self.update_balances(&mut batch, &m.content).await;
            }
            self.process_account_blocks(&mut batch, m).await;
        }

        let (producer_owner, producer_name) =
            self.pillar_info_for_producer(&m.producer, m.height).await;

        MomentumRepository::insert_batch(
            &mut batch,
            &models::Momentum {
                height: m.height as i64,
                hash: m.hash.clone(),
                timestamp: m.unix_timestamp(),
                tx_count: m.content.len() as i32,
                producer: m.producer.clone(),
                producer_owner,
                producer_name,
            },
        );

        batch
            .submit(&self.pool)
            .await
            .with_context(|| format!("failed to submit batch for momentum {}", m.height))?;

        debug!(height = m.height, elapsed = ?started.elapsed(), "processed momentum");
        Ok(())
    }

    /// Queue a balance upsert for every (address, token) snapshot of every
    /// address appearing in the momentum's content.
    async fn update_balances(&self, batch: &mut Batch, headers: &[AccountHeader]) {
        for header in headers {
            let info = match self.node.account_info_by_address(&header.address).await {
                Ok(info) => info,
                Err(e) => {
                    warn!(address = %header.address, error = %e, "failed to get account info");
                    continue;
                }
            };
            for (token_standard, balance_info) in &info.balance_info_map {
                if balance_info.balance.0 < 0 {
                    continue;
                }
                BalanceRepository::upsert_batch(
                    batch,
                    &models::Balance {
                        address: header.address.clone(),
                        token_standard: token_standard.clone(),
                        balance: saturating_i64(
                            balance_info.balance.0,
                            "balance",
                            &header.address,
                        ),
                    },
                );
            }
        }
    }

    async fn process_account_blocks(&self, batch: &mut Batch, m: &api::Momentum) {
        for header in &m.content {
            let block = match self.node.account_block_by_hash(&header.hash).await {
                Ok(Some(block)) => block,
                Ok(None) => continue,
                Err(e) => {
                    warn!(hash = %header.hash, error = %e, "failed to get account block");
                    continue;
                }
            };
            self.process_account_block(batch, &block, m).await;
        }
    }

    /// Decode a block's call data, injecting the resolved pillar owner for
    /// pillar-contract methods so that both the stored row and the embedded
    /// dispatch see it.
    async fn decode_tx_data(&self, block: &api::AccountBlock) -> Option<TxData> {
        let mut tx_data = decoder::try_decode_tx_data(block)?;
        if block.to_address == constants::PILLAR_ADDRESS {
            let pillar_name = tx_data.input("name").to_string();
            if !pillar_name.is_empty() && PILLAR_OWNER_METHODS.contains(&tx_data.method.as_str())
            {
                let owner = self.pillar_owner(&pillar_name).await;
                tx_data.inputs.insert("pillarOwner".to_string(), owner);
            }
        }
        Some(tx_data)
    }

    async fn process_account_block(
        &self,
        batch: &mut Batch,
        block: &api::AccountBlock,
        m: &api::Momentum,
    ) {
        let tx_data = self.decode_tx_data(block).await;

        AccountRepository::upsert_batch(
            batch,
            &Account {
                address: block.address.clone(),
                block_count: block.height as i64,
                public_key: hex::encode(&block.public_key),
                ..Default::default()
            },
        );

        let paired_hash = block
            .paired_account_block
            .as_ref()
            .map(|p| p.hash.clone())
            .unwrap_or_default();

        AccountBlockRepository::insert_batch(
            batch,
            &models::AccountBlock {
                hash: block.hash.clone(),
                momentum_hash: m.hash.clone(),
                momentum_timestamp: m.unix_timestamp(),
                momentum_height: m.height as i64,
                block_type: block.block_type,
                height: block.height as i64,
                address: block.address.clone(),
                to_address: block.to_address.clone(),
                amount: saturating_i64(block.amount.0, "amount", &block.hash),
                token_standard: block.token_standard.clone(),
                data: hex::encode(&block.data),
                paired_account_block: paired_hash.clone(),
                ..Default::default()
            },
            tx_data.as_ref(),
        );

        if !paired_hash.is_empty() {
            AccountBlockRepository::update_paired_block_batch(batch, &paired_hash, &block.hash);
        }
        for descendant in &block.descendant_blocks {
            AccountBlockRepository::update_descendant_of_batch(
                batch,
                &descendant.hash,
                &block.hash,
            );
        }

        if block.block_type == block_type::CONTRACT_RECEIVE
            && constants::is_embedded_contract(&block.address)
        {
            if let Some(paired) = block.paired_account_block.as_deref() {
                if let Some(paired_tx_data) = self.decode_tx_data(paired).await {
                    self.index_embedded_contracts(batch, block, &paired_tx_data, m)
                        .await;
                }
            }
        }

        if block.block_type == block_type::USER_RECEIVE {
            if let Some(paired) = block.paired_account_block.as_deref() {
                if paired.address == constants::LIQUIDITY_TREASURY_ADDRESS {
                    self.index_liquidity_reward(batch, block, m);
                } else if paired.block_type == block_type::CONTRACT_SEND
                    && block.to_address == constants::EMPTY_ADDRESS
                    && block.token_standard == constants::EMPTY_TOKEN_STANDARD
                {
                    self.index_received_reward(batch, block, m);
                }
            }
        }

        if let Some(token_info) = &block.token_info {
            TokenRepository::upsert_batch(batch, &token_from_info(token_info));
            TokenRepository::increment_transaction_count_batch(
                batch,
                &token_info.token_standard,
                m.height as i64,
            );
        }
    }

    /// Resolve a momentum producer to its pillar (owner, name): first via
    /// the pillar-update history at or before this height, then via the
    /// current pillar row.
    pub(crate) async fn pillar_info_for_producer(
        &self,
        producer_address: &str,
        height: u64,
    ) -> (String, String) {
        match self
            .repos
            .pillar_update
            .info_at_height_by_producer(producer_address, height as i64)
            .await
        {
            Ok(Some((owner, name))) if !owner.is_empty() => return (owner, name),
            Ok(_) => {}
            Err(e) => warn!(producer_address, error = %e, "pillar update lookup failed"),
        }
        match self.repos.pillar.get_by_producer(producer_address).await {
            Ok(Some(pillar)) => (pillar.owner_address, pillar.name),
            Ok(None) => (String::new(), String::new()),
            Err(e) => {
                warn!(producer_address, error = %e, "pillar lookup failed");
                (String::new(), String::new())
            }
        }
    }
}

fn token_from_info(info: &api::TokenInfo) -> models::Token {
    models::Token {
        token_standard: info.token_standard.clone(),
        name: info.name.clone(),
        symbol: info.symbol.clone(),
        domain: info.domain.clone(),
        decimals: info.decimals,
        owner: info.owner.clone(),
        total_supply: saturating_i64(info.total_supply.0, "total_supply", &info.token_standard),
        max_supply: saturating_i64(info.max_supply.0, "max_supply", &info.token_standard),
        is_burnable: info.is_burnable,
        is_mintable: info.is_mintable,
        is_utility: info.is_utility,
        ..Default::default()
    }
}

pub(crate) fn parse_numeric_input<T: std::str::FromStr + Default>(
    tx_data: &TxData,
    name: &str,
) -> T {
    let raw = tx_data.input(name);
    raw.parse().unwrap_or_else(|_| {
        warn!(input = name, value = raw, method = %tx_data.method, "invalid numeric input, using default");
        T::default()
    })
}
