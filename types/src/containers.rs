use std::sync::Arc;

use crate::primitives::{
    Blob, BlobIndex, ExecutionAddress, ExecutionBlockHash, ExecutionBlockNumber, Gas, Gwei,
    KzgCommitment, KzgProof, PublicKeyBytes, SignatureBytes, Slot, Transaction, UnixSeconds,
    ValidatorIndex, Wei, WithdrawalIndex, H256,
};

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Withdrawal {
    pub index: WithdrawalIndex,
    pub validator_index: ValidatorIndex,
    pub address: ExecutionAddress,
    pub amount: Gwei,
}

#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct ExecutionPayload {
    pub parent_hash: ExecutionBlockHash,
    pub fee_recipient: ExecutionAddress,
    pub state_root: H256,
    pub receipts_root: H256,
    pub prev_randao: H256,
    pub block_number: ExecutionBlockNumber,
    pub gas_limit: Gas,
    pub gas_used: Gas,
    pub timestamp: UnixSeconds,
    pub base_fee_per_gas: Wei,
    pub block_hash: ExecutionBlockHash,
    pub transactions: Vec<Transaction>,
    pub withdrawals: Vec<Withdrawal>,
    pub blob_gas_used: Gas,
    pub excess_blob_gas: Gas,
}

/// Summary of an [`ExecutionPayload`] kept in the beacon state.
///
/// Roots of the variable-length fields are computed by the tree-hash codec and are not stored here.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct ExecutionPayloadHeader {
    pub parent_hash: ExecutionBlockHash,
    pub fee_recipient: ExecutionAddress,
    pub state_root: H256,
    pub receipts_root: H256,
    pub prev_randao: H256,
    pub block_number: ExecutionBlockNumber,
    pub gas_limit: Gas,
    pub gas_used: Gas,
    pub timestamp: UnixSeconds,
    pub base_fee_per_gas: Wei,
    pub block_hash: ExecutionBlockHash,
    pub blob_gas_used: Gas,
    pub excess_blob_gas: Gas,
}

#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct BeaconBlockBody {
    pub randao_reveal: SignatureBytes,
    pub graffiti: H256,
    // `None` in blocks from before the execution-enabled fork.
    pub execution_payload: Option<ExecutionPayload>,
    pub blob_kzg_commitments: Vec<KzgCommitment>,
}

#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct BeaconBlock {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub parent_root: H256,
    pub state_root: H256,
    pub body: Option<BeaconBlockBody>,
}

impl BeaconBlock {
    #[must_use]
    pub fn execution_payload(&self) -> Option<&ExecutionPayload> {
        self.body.as_ref()?.execution_payload.as_ref()
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BlobSidecar {
    pub index: BlobIndex,
    pub blob: Blob,
    pub kzg_commitment: KzgCommitment,
    pub kzg_proof: KzgProof,
}

pub type BlobSidecars = Vec<Arc<BlobSidecar>>;

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct DepositData {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: H256,
    pub amount: Gwei,
    pub signature: SignatureBytes,
}
