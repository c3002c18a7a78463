use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::{
    channel::mpsc::{self, Sender},
    StreamExt as _,
};
use log::{debug, error, info};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use types::{config::Config, containers::BeaconBlock, primitives::Slot};

use crate::deposit_event::DepositEvent;

/// Beacon block announced by a [`BlockFeed`].
pub type BlockEvent = Arc<BeaconBlock>;

/// Number of block events a feed can send before it has to wait for the service.
pub const BLOCK_EVENT_BUFFER: usize = 16;

pub trait BlockFeed: Send + Sync {
    type Subscription: Subscription;

    fn subscribe(&self, sender: Sender<BlockEvent>) -> Self::Subscription;
}

pub trait Subscription: Send + 'static {
    fn unsubscribe(self);
}

#[async_trait]
pub trait DepositContract: Send + Sync {
    async fn deposits(&self, slot: Slot) -> Result<Vec<DepositEvent>>;
}

pub trait StorageBackend: Send + Sync {
    type DepositStore: DepositStore;

    fn deposit_store(&self, event: &BlockEvent) -> Self::DepositStore;
}

pub trait DepositStore {
    fn enqueue_deposits(&self, deposits: Vec<DepositEvent>) -> Result<()>;
}

#[async_trait]
impl<C: DepositContract + ?Sized> DepositContract for Arc<C> {
    async fn deposits(&self, slot: Slot) -> Result<Vec<DepositEvent>> {
        self.as_ref().deposits(slot).await
    }
}

#[derive(Debug, Error)]
enum Error {
    #[error(
        "block slot is less than eth1 follow distance \
         (block_slot: {block_slot}, eth1_follow_distance: {eth1_follow_distance})"
    )]
    SlotUnderflow {
        block_slot: Slot,
        eth1_follow_distance: u64,
    },
}

/// Moves deposits observed on the execution chain into the deposit store of each new block.
pub struct DepositService<F, C, S> {
    feed: F,
    deposit_contract: C,
    storage_backend: S,
    eth1_follow_distance: u64,
}

impl<F, C, S> DepositService<F, C, S>
where
    F: BlockFeed + 'static,
    C: DepositContract + 'static,
    S: StorageBackend + 'static,
{
    #[must_use]
    pub const fn new(config: &Config, feed: F, deposit_contract: C, storage_backend: S) -> Self {
        Self {
            feed,
            deposit_contract,
            storage_backend,
            eth1_follow_distance: config.eth1_follow_distance,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        "deposit-handler"
    }

    pub const fn status(&self) -> Result<()> {
        Ok(())
    }

    pub const fn wait_for_healthy(&self) {}

    /// Subscribes to the block feed and handles events in a new task until
    /// `cancellation_token` is cancelled or the feed is closed.
    ///
    /// Failures to handle an event are logged. The event is not retried.
    pub fn start(self, cancellation_token: CancellationToken) -> JoinHandle<()> {
        let (sender, mut receiver) = mpsc::channel(BLOCK_EVENT_BUFFER);
        let subscription = self.feed.subscribe(sender);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    () = cancellation_token.cancelled() => break,

                    event = receiver.next() => match event {
                        Some(event) => {
                            if let Err(error) = self.handle_deposit_event(&event).await {
                                error!("failed to handle deposit event: {error:?}");
                            }
                        }
                        None => {
                            debug!("block feed closed");
                            break;
                        }
                    },
                }
            }

            subscription.unsubscribe();
            debug!("{} stopped", self.name());
        })
    }

    async fn handle_deposit_event(&self, event: &BlockEvent) -> Result<()> {
        let block_slot = event.slot;
        let eth1_follow_distance = self.eth1_follow_distance;

        let slot = block_slot
            .checked_sub(eth1_follow_distance)
            .ok_or(Error::SlotUnderflow {
                block_slot,
                eth1_follow_distance,
            })?;

        info!("processing deposit logs (slot: {slot})");

        let deposits = self.deposit_contract.deposits(slot).await?;

        self.storage_backend
            .deposit_store(event)
            .enqueue_deposits(deposits)
    }
}
