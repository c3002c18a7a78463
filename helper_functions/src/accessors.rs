use anyhow::Result;
use typenum::Unsigned as _;
use types::{
    preset::Preset,
    primitives::{Epoch, H256},
    traits::BeaconState,
};

use crate::misc;

/// [`get_current_epoch`](https://github.com/ethereum/consensus-specs/blob/0b76c8367ed19014d104e3fbd4718e73f459a748/specs/phase0/beacon-chain.md#get_current_epoch)
pub fn get_current_epoch<P: Preset>(state: &(impl BeaconState + ?Sized)) -> Result<Epoch> {
    Ok(misc::compute_epoch_at_slot::<P>(state.slot()?))
}

/// Index into `randao_mixes`, which is a ring buffer of `EPOCHS_PER_HISTORICAL_VECTOR` entries.
#[must_use]
pub fn randao_mix_index<P: Preset>(epoch: Epoch) -> u64 {
    epoch % P::EpochsPerHistoricalVector::U64
}

/// [`get_randao_mix`](https://github.com/ethereum/consensus-specs/blob/0b76c8367ed19014d104e3fbd4718e73f459a748/specs/phase0/beacon-chain.md#get_randao_mix)
pub fn get_randao_mix<P: Preset>(
    state: &(impl BeaconState + ?Sized),
    epoch: Epoch,
) -> Result<H256> {
    state.randao_mix_at_index(randao_mix_index::<P>(epoch))
}
