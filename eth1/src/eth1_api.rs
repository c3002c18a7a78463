use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use types::primitives::{ExecutionAddress, ExecutionBlockHash};

use crate::{eth1_block::Eth1Block, eth1_log::Log};

/// Read access to the execution chain.
#[async_trait]
pub trait Eth1Api: Send + Sync {
    /// Returns `None` if the execution node does not know the block.
    async fn block_by_hash(&self, block_hash: ExecutionBlockHash) -> Result<Option<Eth1Block>>;

    /// Returns logs emitted by `address` in the block with hash `block_hash`.
    async fn logs_in_block(
        &self,
        block_hash: ExecutionBlockHash,
        address: ExecutionAddress,
    ) -> Result<Vec<Log>>;
}

#[async_trait]
impl<A: Eth1Api + ?Sized> Eth1Api for Arc<A> {
    async fn block_by_hash(&self, block_hash: ExecutionBlockHash) -> Result<Option<Eth1Block>> {
        self.as_ref().block_by_hash(block_hash).await
    }

    async fn logs_in_block(
        &self,
        block_hash: ExecutionBlockHash,
        address: ExecutionAddress,
    ) -> Result<Vec<Log>> {
        self.as_ref().logs_in_block(block_hash, address).await
    }
}
