use core::sync::atomic::{AtomicUsize, Ordering};
use std::{collections::HashMap, sync::Arc};

use anyhow::{bail, ensure, Result};
use async_trait::async_trait;
use eth1::{Eth1Api, Eth1Block, Log};
use futures::future;
use parking_lot::Mutex;
use types::{
    containers::{BeaconBlock, BlobSidecars, ExecutionPayloadHeader},
    primitives::{ExecutionAddress, ExecutionBlockHash, Slot, H256},
    traits::BeaconState,
};

use crate::traits::{BeaconStorage, BlockValidator, ForkchoiceStore, StateTransition};

pub struct State {
    slot: Slot,
    latest_block_hash: Option<ExecutionBlockHash>,
    randao_mixes: HashMap<u64, H256>,
}

impl State {
    pub fn new(slot: Slot, latest_block_hash: ExecutionBlockHash) -> Self {
        Self {
            slot,
            latest_block_hash: Some(latest_block_hash),
            randao_mixes: HashMap::new(),
        }
    }

    pub fn with_randao_mix(mut self, index: u64, mix: H256) -> Self {
        self.randao_mixes.insert(index, mix);
        self
    }

    pub fn without_latest_header(self) -> Self {
        Self {
            latest_block_hash: None,
            ..self
        }
    }
}

impl BeaconState for State {
    fn slot(&self) -> Result<Slot> {
        Ok(self.slot)
    }

    fn latest_execution_payload_header(&self) -> Result<ExecutionPayloadHeader> {
        let Some(block_hash) = self.latest_block_hash else {
            bail!("latest execution payload header is unavailable");
        };

        Ok(ExecutionPayloadHeader {
            block_hash,
            ..ExecutionPayloadHeader::default()
        })
    }

    fn randao_mix_at_index(&self, index: u64) -> Result<H256> {
        Ok(self.randao_mixes.get(&index).copied().unwrap_or_default())
    }
}

pub struct AvailabilityStore;

#[derive(Default)]
pub struct Forkchoice {
    pub fail: bool,
    pub inserted: Mutex<Vec<ExecutionBlockHash>>,
}

impl ForkchoiceStore for Forkchoice {
    fn insert_node(&self, block_hash: ExecutionBlockHash) -> Result<()> {
        ensure!(!self.fail, "forkchoice store is unavailable");
        self.inserted.lock().push(block_hash);
        Ok(())
    }
}

pub struct Storage {
    pub state: Arc<State>,
    pub forkchoice: Arc<Forkchoice>,
}

impl BeaconStorage for Storage {
    type BeaconState = State;
    type AvailabilityStore = AvailabilityStore;
    type ForkchoiceStore = Forkchoice;

    fn beacon_state(&self) -> Arc<State> {
        Arc::clone(&self.state)
    }

    fn availability_store(&self) -> Arc<AvailabilityStore> {
        Arc::new(AvailabilityStore)
    }

    fn forkchoice_store(&self) -> Arc<Forkchoice> {
        Arc::clone(&self.forkchoice)
    }
}

#[derive(Default)]
pub struct Transition {
    pub fail_block: bool,
    pub fail_blobs: bool,
    pub hang_blobs: bool,
    pub slots: AtomicUsize,
    pub blocks: AtomicUsize,
    pub blobs: AtomicUsize,
}

impl Transition {
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.slots.load(Ordering::SeqCst),
            self.blocks.load(Ordering::SeqCst),
            self.blobs.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl StateTransition<Storage> for Arc<Transition> {
    async fn process_slot(&self, _state: &State) -> Result<()> {
        self.slots.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn process_block(&self, _state: &State, _block: &BeaconBlock) -> Result<()> {
        self.blocks.fetch_add(1, Ordering::SeqCst);
        ensure!(!self.fail_block, "block application failed");
        Ok(())
    }

    async fn process_blobs(
        &self,
        _availability_store: &AvailabilityStore,
        _block: &BeaconBlock,
        _blobs: &BlobSidecars,
    ) -> Result<()> {
        self.blobs.fetch_add(1, Ordering::SeqCst);

        if self.hang_blobs {
            future::pending::<()>().await;
        }

        ensure!(!self.fail_blobs, "blob processing failed");
        Ok(())
    }
}

#[derive(Default)]
pub struct Validator {
    pub fail: bool,
    pub hang: bool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl BlockValidator<Storage> for Arc<Validator> {
    async fn validate_block(&self, _state: &State, _block: &BeaconBlock) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.hang {
            future::pending::<()>().await;
        }

        ensure!(!self.fail, "block is invalid");
        Ok(())
    }
}

/// Execution chain in which every requested block exists and contains no logs.
#[derive(Default)]
pub struct Eth1Chain {
    pub fail: bool,
    pub requested: Mutex<Vec<ExecutionBlockHash>>,
}

#[async_trait]
impl Eth1Api for Eth1Chain {
    async fn block_by_hash(&self, block_hash: ExecutionBlockHash) -> Result<Option<Eth1Block>> {
        self.requested.lock().push(block_hash);

        ensure!(!self.fail, "execution node is unreachable");

        Ok(Some(Eth1Block {
            hash: block_hash,
            number: block_hash.to_low_u64_be(),
            ..Eth1Block::default()
        }))
    }

    async fn logs_in_block(
        &self,
        _block_hash: ExecutionBlockHash,
        _address: ExecutionAddress,
    ) -> Result<Vec<Log>> {
        Ok(vec![])
    }
}
