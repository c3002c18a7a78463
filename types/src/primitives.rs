use std::sync::Arc;

pub use ethereum_types::{H160, H256, H64, U256};
pub use primitive_types::{H384, H768};

pub type BlobIndex = u64;
pub type DepositIndex = u64;
pub type Epoch = u64;
pub type ExecutionAddress = H160;
pub type ExecutionBlockHash = H256;
pub type ExecutionBlockNumber = u64;
pub type Gas = u64;
pub type Gwei = u64;
pub type Slot = u64;
pub type UnixSeconds = u64;
pub type ValidatorIndex = u64;
pub type Wei = U256;
pub type WithdrawalIndex = u64;

// KZG and BLS values are never interpreted here, only passed along or hashed.
pub type KzgCommitment = H384;
pub type KzgProof = H384;
pub type PublicKeyBytes = H384;
pub type SignatureBytes = H768;
pub type VersionedHash = H256;

pub type Blob = Arc<[u8]>;
pub type Transaction = Arc<[u8]>;

pub const GENESIS_EPOCH: Epoch = 0;
pub const FAR_FUTURE_EPOCH: Epoch = Epoch::MAX;
