pub use crate::{
    deposit_event::DepositEvent,
    deposit_service::{
        BlockEvent, BlockFeed, DepositContract, DepositService, DepositStore, StorageBackend,
        Subscription, BLOCK_EVENT_BUFFER,
    },
    eth1_api::Eth1Api,
    eth1_block::Eth1Block,
    eth1_log::Log,
    log_cache::{LogCache, LogValueContainer},
    log_processor::LogProcessor,
};

mod deposit_event;
mod deposit_service;
mod eth1_api;
mod eth1_block;
mod eth1_log;
mod log_cache;
mod log_processor;
