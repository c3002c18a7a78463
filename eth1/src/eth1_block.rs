use types::primitives::{ExecutionBlockHash, ExecutionBlockNumber, UnixSeconds};

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Eth1Block {
    pub hash: ExecutionBlockHash,
    pub parent_hash: ExecutionBlockHash,
    pub number: ExecutionBlockNumber,
    pub timestamp: UnixSeconds,
}
