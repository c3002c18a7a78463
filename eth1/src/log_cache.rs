use std::collections::HashMap;

use anyhow::Result;
use types::primitives::ExecutionBlockNumber;

use crate::eth1_log::Log;

/// Value decoded from a log along with the position of the log in the execution chain.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LogValueContainer<V> {
    pub value: V,
    pub block_number: ExecutionBlockNumber,
    pub log_index: u64,
}

/// Values decoded from logs in finalized execution blocks.
///
/// Values from the block currently being processed are staged separately and only become
/// visible in [`LogCache::final_store`] once [`LogCache::set_last_finalized_block`] is called.
/// A block that fails partway through is discarded with [`LogCache::rollback`].
///
/// The cache lives in memory only and starts out empty after a restart.
#[derive(Debug)]
pub struct LogCache<V> {
    final_store: Vec<LogValueContainer<V>>,
    // Positions in `final_store` grouped by block number.
    final_positions: HashMap<ExecutionBlockNumber, Vec<usize>>,
    processing_store: Vec<LogValueContainer<V>>,
    last_finalized_block: ExecutionBlockNumber,
}

impl<V> Default for LogCache<V> {
    fn default() -> Self {
        Self {
            final_store: vec![],
            final_positions: HashMap::new(),
            processing_store: vec![],
            last_finalized_block: 0,
        }
    }
}

impl<V> LogCache<V> {
    /// Returns `false` for logs in blocks that have already been finalized and for pending logs.
    ///
    /// The cache does not deduplicate values on its own.
    /// Callers must check this before calling [`LogCache::push`].
    #[must_use]
    pub fn should_process(&self, log: &Log) -> bool {
        log.block_number
            .is_some_and(|block_number| block_number > self.last_finalized_block)
    }

    pub fn push(&mut self, container: LogValueContainer<V>) -> Result<()> {
        self.processing_store.push(container);
        Ok(())
    }

    /// Moves all staged values into the final store.
    ///
    /// The last finalized block never decreases. Staged values are committed even if
    /// `block_number` is lower than the current one.
    pub fn set_last_finalized_block(&mut self, block_number: ExecutionBlockNumber) {
        self.last_finalized_block = self.last_finalized_block.max(block_number);

        let first_position = self.final_store.len();

        for (position, container) in (first_position..).zip(&self.processing_store) {
            self.final_positions
                .entry(container.block_number)
                .or_default()
                .push(position);
        }

        self.final_store.append(&mut self.processing_store);
    }

    pub fn rollback(&mut self) {
        self.processing_store.clear();
    }

    #[must_use]
    pub const fn last_finalized_block(&self) -> ExecutionBlockNumber {
        self.last_finalized_block
    }

    #[must_use]
    pub fn final_store(&self) -> &[LogValueContainer<V>] {
        &self.final_store
    }

    #[must_use]
    pub fn processing_store(&self) -> &[LogValueContainer<V>] {
        &self.processing_store
    }

    pub fn finalized_values_at(
        &self,
        block_number: ExecutionBlockNumber,
    ) -> impl Iterator<Item = &V> {
        self.final_positions
            .get(&block_number)
            .into_iter()
            .flatten()
            .filter_map(|position| self.final_store.get(*position))
            .map(|container| &container.value)
    }
}
