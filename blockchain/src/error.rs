use thiserror::Error;
use types::{
    preset::PresetName,
    primitives::{ExecutionBlockHash, H256},
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("block has no body")]
    NilBlockBody,
    #[error("block body has no execution payload")]
    NilPayload,
    #[error("execution engine considers payload invalid (block_hash: {block_hash:?})")]
    InvalidPayload { block_hash: ExecutionBlockHash },
    #[error(
        "execution payload parent hash does not match latest execution payload header \
         (in_state: {in_state:?}, in_block: {in_block:?})"
    )]
    UnfinalizedParent {
        in_state: ExecutionBlockHash,
        in_block: ExecutionBlockHash,
    },
    #[error(
        "execution payload prev_randao does not match RANDAO mix \
         (in_state: {in_state:?}, in_block: {in_block:?})"
    )]
    RandaoMismatch { in_state: H256, in_block: H256 },
    #[error(
        "execution payload has too many withdrawals (maximum: {maximum}, in_block: {in_block})"
    )]
    TooManyWithdrawals { maximum: usize, in_block: usize },
    #[error(
        "configuration {config_name} is based on {in_config} preset \
         but service is built for {in_service} preset"
    )]
    PresetMismatch {
        config_name: String,
        in_config: PresetName,
        in_service: PresetName,
    },
}
