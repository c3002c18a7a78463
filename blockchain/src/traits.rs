use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use types::{
    containers::{BeaconBlock, BlobSidecars},
    primitives::ExecutionBlockHash,
    traits::BeaconState,
};

/// Handles to the stores a block is processed against.
pub trait BeaconStorage: Send + Sync {
    type BeaconState: BeaconState;
    type AvailabilityStore: Send + Sync;
    type ForkchoiceStore: ForkchoiceStore;

    fn beacon_state(&self) -> Arc<Self::BeaconState>;

    fn availability_store(&self) -> Arc<Self::AvailabilityStore>;

    fn forkchoice_store(&self) -> Arc<Self::ForkchoiceStore>;
}

/// Consensus rules applied to beacon blocks and blobs.
///
/// Implementations mutate the state and availability store through interior synchronization.
#[async_trait]
pub trait StateTransition<B: BeaconStorage>: Send + Sync {
    async fn process_slot(&self, state: &B::BeaconState) -> Result<()>;

    async fn process_block(&self, state: &B::BeaconState, block: &BeaconBlock) -> Result<()>;

    async fn process_blobs(
        &self,
        availability_store: &B::AvailabilityStore,
        block: &BeaconBlock,
        blobs: &BlobSidecars,
    ) -> Result<()>;
}

#[async_trait]
pub trait BlockValidator<B: BeaconStorage>: Send + Sync {
    async fn validate_block(&self, state: &B::BeaconState, block: &BeaconBlock) -> Result<()>;
}

pub trait ForkchoiceStore: Send + Sync {
    fn insert_node(&self, block_hash: ExecutionBlockHash) -> Result<()>;
}
