use sha2::{Digest as _, Sha256};
use typenum::Unsigned as _;
use types::{
    preset::Preset,
    primitives::{Epoch, KzgCommitment, Slot, VersionedHash},
};

/// Version byte prepended to hashes of KZG commitments.
pub const VERSIONED_HASH_VERSION_KZG: u8 = 0x01;

/// [`compute_epoch_at_slot`](https://github.com/ethereum/consensus-specs/blob/0b76c8367ed19014d104e3fbd4718e73f459a748/specs/phase0/beacon-chain.md#compute_epoch_at_slot)
#[must_use]
pub fn compute_epoch_at_slot<P: Preset>(slot: Slot) -> Epoch {
    slot / P::SlotsPerEpoch::U64
}

/// [`kzg_commitment_to_versioned_hash`](https://github.com/ethereum/consensus-specs/blob/0b76c8367ed19014d104e3fbd4718e73f459a748/specs/deneb/beacon-chain.md#kzg_commitment_to_versioned_hash)
#[must_use]
pub fn kzg_commitment_to_versioned_hash(kzg_commitment: KzgCommitment) -> VersionedHash {
    let digest = Sha256::digest(kzg_commitment.as_bytes());
    let mut versioned_hash = VersionedHash::from_slice(digest.as_slice());
    versioned_hash.as_bytes_mut()[0] = VERSIONED_HASH_VERSION_KZG;
    versioned_hash
}
