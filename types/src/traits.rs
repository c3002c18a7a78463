use std::sync::Arc;

use anyhow::Result;

use crate::{
    containers::ExecutionPayloadHeader,
    primitives::{Slot, H256},
};

/// Read access to the parts of the beacon state consulted by block processing.
///
/// Mutation is left to the state transition function, which is expected to synchronize
/// access internally. All accessors are fallible because the state may be backed by storage.
pub trait BeaconState: Send + Sync {
    fn slot(&self) -> Result<Slot>;

    fn latest_execution_payload_header(&self) -> Result<ExecutionPayloadHeader>;

    fn randao_mix_at_index(&self, index: u64) -> Result<H256>;
}

impl<S: BeaconState + ?Sized> BeaconState for Arc<S> {
    fn slot(&self) -> Result<Slot> {
        self.as_ref().slot()
    }

    fn latest_execution_payload_header(&self) -> Result<ExecutionPayloadHeader> {
        self.as_ref().latest_execution_payload_header()
    }

    fn randao_mix_at_index(&self, index: u64) -> Result<H256> {
        self.as_ref().randao_mix_at_index(index)
    }
}
