#![expect(clippy::module_name_repetitions)]

use std::sync::Arc;

use anyhow::{ensure, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use types::{
    containers::ExecutionPayload,
    primitives::{ExecutionBlockHash, Slot, VersionedHash, H256},
};

use crate::types::{ForkChoiceUpdateRequest, ForkChoiceUpdatedResponse, PayloadStatusV1};

#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// [`notify_forkchoice_updated`](https://github.com/ethereum/consensus-specs/blob/1bfefe301da592375e2e02f65849a96aadec1936/specs/bellatrix/fork-choice.md#notify_forkchoice_updated)
    async fn notify_forkchoice_updated(
        &self,
        request: ForkChoiceUpdateRequest,
    ) -> Result<ForkChoiceUpdatedResponse>;

    /// [`notify_new_payload`](https://github.com/ethereum/consensus-specs/blob/1bfefe301da592375e2e02f65849a96aadec1936/specs/deneb/beacon-chain.md#modified-notify_new_payload)
    ///
    /// Returns `Ok(false)` if the engine considers the payload invalid.
    /// Failures to reach the engine are reported as errors.
    async fn notify_new_payload(
        &self,
        slot: Slot,
        payload: &ExecutionPayload,
        versioned_hashes: Vec<VersionedHash>,
        parent_beacon_block_root: H256,
    ) -> Result<bool>;
}

#[async_trait]
impl<E: ExecutionEngine + ?Sized> ExecutionEngine for &E {
    async fn notify_forkchoice_updated(
        &self,
        request: ForkChoiceUpdateRequest,
    ) -> Result<ForkChoiceUpdatedResponse> {
        (**self).notify_forkchoice_updated(request).await
    }

    async fn notify_new_payload(
        &self,
        slot: Slot,
        payload: &ExecutionPayload,
        versioned_hashes: Vec<VersionedHash>,
        parent_beacon_block_root: H256,
    ) -> Result<bool> {
        (**self)
            .notify_new_payload(slot, payload, versioned_hashes, parent_beacon_block_root)
            .await
    }
}

#[async_trait]
impl<E: ExecutionEngine + ?Sized> ExecutionEngine for Arc<E> {
    async fn notify_forkchoice_updated(
        &self,
        request: ForkChoiceUpdateRequest,
    ) -> Result<ForkChoiceUpdatedResponse> {
        self.as_ref().notify_forkchoice_updated(request).await
    }

    async fn notify_new_payload(
        &self,
        slot: Slot,
        payload: &ExecutionPayload,
        versioned_hashes: Vec<VersionedHash>,
        parent_beacon_block_root: H256,
    ) -> Result<bool> {
        self.as_ref()
            .notify_new_payload(slot, payload, versioned_hashes, parent_beacon_block_root)
            .await
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NewPayloadNotification {
    pub slot: Slot,
    pub block_hash: ExecutionBlockHash,
    pub versioned_hashes: Vec<VersionedHash>,
    pub parent_beacon_block_root: H256,
}

/// Execution engine that records every notification it receives.
#[derive(Default)]
pub struct MockExecutionEngine {
    execution_valid: bool,
    reachable: bool,
    forkchoice_updates: Mutex<Vec<ForkChoiceUpdateRequest>>,
    new_payloads: Mutex<Vec<NewPayloadNotification>>,
}

#[async_trait]
impl ExecutionEngine for MockExecutionEngine {
    async fn notify_forkchoice_updated(
        &self,
        request: ForkChoiceUpdateRequest,
    ) -> Result<ForkChoiceUpdatedResponse> {
        self.forkchoice_updates.lock().push(request);

        ensure!(self.reachable, Error);

        Ok(ForkChoiceUpdatedResponse {
            payload_status: PayloadStatusV1::valid(Some(request.state.head_block_hash)),
            payload_id: None,
        })
    }

    async fn notify_new_payload(
        &self,
        slot: Slot,
        payload: &ExecutionPayload,
        versioned_hashes: Vec<VersionedHash>,
        parent_beacon_block_root: H256,
    ) -> Result<bool> {
        self.new_payloads.lock().push(NewPayloadNotification {
            slot,
            block_hash: payload.block_hash,
            versioned_hashes,
            parent_beacon_block_root,
        });

        ensure!(self.reachable, Error);

        Ok(self.execution_valid)
    }
}

impl MockExecutionEngine {
    #[must_use]
    pub fn new(execution_valid: bool) -> Self {
        Self {
            execution_valid,
            reachable: true,
            ..Self::default()
        }
    }

    /// Creates an engine that fails every request as if the connection were down.
    #[must_use]
    pub fn unreachable() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn forkchoice_updates(&self) -> Vec<ForkChoiceUpdateRequest> {
        self.forkchoice_updates.lock().clone()
    }

    #[must_use]
    pub fn new_payloads(&self) -> Vec<NewPayloadNotification> {
        self.new_payloads.lock().clone()
    }
}

#[derive(Debug, Error)]
#[error("execution engine is unreachable")]
struct Error;
