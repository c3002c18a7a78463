use anyhow::{ensure, Result};
use helper_functions::accessors;
use typenum::Unsigned as _;
use types::{containers::ExecutionPayload, preset::Preset, traits::BeaconState};

use crate::error::Error;

/// Checks that `payload` extends the execution chain recorded in `state`.
///
/// Checks are done in order and the first failure is returned:
/// 1. The parent hash matches the block hash in the latest execution payload header.
/// 2. `prev_randao` matches the RANDAO mix of the current epoch.
/// 3. The number of withdrawals does not exceed `MAX_WITHDRAWALS_PER_PAYLOAD`.
pub fn verify_payload<P: Preset>(
    state: &(impl BeaconState + ?Sized),
    payload: &ExecutionPayload,
) -> Result<()> {
    let in_state = state.latest_execution_payload_header()?.block_hash;
    let in_block = payload.parent_hash;

    ensure!(
        in_state == in_block,
        Error::UnfinalizedParent { in_state, in_block },
    );

    let current_epoch = accessors::get_current_epoch::<P>(state)?;
    let in_state = accessors::get_randao_mix::<P>(state, current_epoch)?;
    let in_block = payload.prev_randao;

    ensure!(
        in_state == in_block,
        Error::RandaoMismatch { in_state, in_block },
    );

    let maximum = P::MaxWithdrawalsPerPayload::USIZE;
    let in_block = payload.withdrawals.len();

    ensure!(
        in_block <= maximum,
        Error::TooManyWithdrawals { maximum, in_block },
    );

    Ok(())
}
