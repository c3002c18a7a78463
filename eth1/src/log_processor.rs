use anyhow::{bail, Error as AnyhowError, Result};
use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use thiserror::Error;
use types::{
    config::Config,
    primitives::{ExecutionAddress, ExecutionBlockHash, ExecutionBlockNumber, Slot},
};

use crate::{
    deposit_event::DepositEvent,
    deposit_service::DepositContract,
    eth1_api::Eth1Api,
    eth1_log::Log,
    log_cache::{LogCache, LogValueContainer},
};

#[derive(Debug, Error)]
enum Error {
    #[error("execution block not found: {block_hash:?}")]
    BlockNotFound { block_hash: ExecutionBlockHash },
}

/// Decodes logs emitted by a single contract and records them in a [`LogCache`].
pub struct LogProcessor<A, V> {
    eth1_api: A,
    contract_address: ExecutionAddress,
    cache: Mutex<LogCache<V>>,
}

impl<A: Eth1Api, V: TryFrom<Log, Error = AnyhowError> + Send> LogProcessor<A, V> {
    /// Creates a processor for logs of the deposit contract in `config`.
    #[must_use]
    pub fn new(config: &Config, eth1_api: A) -> Self {
        Self::with_contract_address(config.deposit_contract_address, eth1_api)
    }

    #[must_use]
    pub fn with_contract_address(contract_address: ExecutionAddress, eth1_api: A) -> Self {
        Self {
            eth1_api,
            contract_address,
            cache: Mutex::default(),
        }
    }

    /// Processes logs in the execution block with hash `block_hash` and marks the block finalized.
    ///
    /// Logs in blocks that were already processed are skipped, so processing a block again
    /// has no effect. If any log fails to decode, none of the logs in the block are recorded.
    pub async fn process_logs_in_eth1_block(&self, block_hash: ExecutionBlockHash) -> Result<()> {
        let Some(block) = self.eth1_api.block_by_hash(block_hash).await? else {
            bail!(Error::BlockNotFound { block_hash });
        };

        let logs = self
            .eth1_api
            .logs_in_block(block_hash, self.contract_address)
            .await?;

        let mut cache = self.cache.lock();
        let mut processed = 0_usize;

        for log in logs {
            if !cache.should_process(&log) {
                continue;
            }

            let block_number = log.block_number.unwrap_or(block.number);
            let log_index = log.log_index.unwrap_or_default();

            let container = match V::try_from(log) {
                Ok(value) => LogValueContainer {
                    value,
                    block_number,
                    log_index,
                },
                Err(error) => {
                    cache.rollback();
                    return Err(error);
                }
            };

            if let Err(error) = cache.push(container) {
                cache.rollback();
                return Err(error);
            }

            processed += 1;
        }

        cache.set_last_finalized_block(block.number);

        debug!(
            "processed {processed} logs in execution block {} ({block_hash:?})",
            block.number,
        );

        Ok(())
    }

    #[must_use]
    pub fn last_finalized_block(&self) -> ExecutionBlockNumber {
        self.cache.lock().last_finalized_block()
    }

    #[must_use]
    pub fn finalized_values_at(&self, block_number: ExecutionBlockNumber) -> Vec<V>
    where
        V: Clone,
    {
        self.cache
            .lock()
            .finalized_values_at(block_number)
            .cloned()
            .collect()
    }
}

// Execution blocks are produced in lockstep with beacon blocks,
// so the execution block number of a finalized block equals its slot.
#[async_trait]
impl<A: Eth1Api> DepositContract for LogProcessor<A, DepositEvent> {
    async fn deposits(&self, slot: Slot) -> Result<Vec<DepositEvent>> {
        Ok(self.finalized_values_at(slot))
    }
}
