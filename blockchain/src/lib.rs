pub use crate::{
    error::Error,
    service::Service,
    traits::{BeaconStorage, BlockValidator, ForkchoiceStore, StateTransition},
};

pub mod forkchoice;
pub mod payload_verifier;

mod error;
mod service;
mod traits;

#[cfg(test)]
mod mocks;
