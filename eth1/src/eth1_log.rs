use types::primitives::{ExecutionAddress, ExecutionBlockHash, ExecutionBlockNumber, H256};

/// Log emitted by a contract on the execution chain.
///
/// Fields describing the position of the log are `None` while the log is pending.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Log {
    pub address: ExecutionAddress,
    pub topics: Vec<H256>,
    pub data: Vec<u8>,
    pub block_hash: Option<ExecutionBlockHash>,
    pub block_number: Option<ExecutionBlockNumber>,
    pub log_index: Option<u64>,
    pub removed: Option<bool>,
}

impl Log {
    /// Whether the log was dropped from the canonical chain by a reorganization.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.removed == Some(true)
    }
}
