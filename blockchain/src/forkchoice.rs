use anyhow::Result;
use execution_engine::{ExecutionEngine, ForkChoiceStateV1, ForkChoiceUpdateRequest};
use log::{debug, error, warn};
use types::{
    config::Config,
    containers::ExecutionPayload,
    preset::Preset,
    primitives::ExecutionBlockHash,
    traits::BeaconState,
};

/// Notifies the execution engine that `head_block_hash` is the head of the chain.
///
/// The safe and finalized blocks are both taken from the latest execution payload header
/// in `state`. The request is tagged with the phase active at the slot of `state`.
pub async fn send_fcu<P: Preset>(
    config: &Config,
    execution_engine: &impl ExecutionEngine,
    state: &(impl BeaconState + ?Sized),
    head_block_hash: ExecutionBlockHash,
) -> Result<()> {
    let latest_block_hash = state.latest_execution_payload_header()?.block_hash;
    let fork_version = config.phase_at_slot::<P>(state.slot()?);

    let request = ForkChoiceUpdateRequest {
        state: ForkChoiceStateV1 {
            head_block_hash,
            safe_block_hash: latest_block_hash,
            finalized_block_hash: latest_block_hash,
        },
        fork_version,
    };

    let response = execution_engine.notify_forkchoice_updated(request).await?;
    let status = response.payload_status.status;

    if status.is_invalid() {
        warn!(
            "execution engine considers forkchoice head invalid \
             (head_block_hash: {head_block_hash:?}, status: {status:?})",
        );
    } else if status.is_valid() {
        debug!("forkchoice updated (head_block_hash: {head_block_hash:?})");
    } else {
        debug!(
            "execution engine has not validated forkchoice head yet \
             (head_block_hash: {head_block_hash:?}, status: {status:?})",
        );
    }

    Ok(())
}

/// Sends a forkchoice update after a block has been processed.
///
/// The head is the block hash of `payload` if present and the block hash of the
/// latest execution payload header in `state` otherwise. Failures are logged.
pub async fn send_post_block_fcu<P: Preset>(
    config: &Config,
    execution_engine: &impl ExecutionEngine,
    state: &(impl BeaconState + ?Sized),
    payload: Option<&ExecutionPayload>,
) {
    let head_block_hash = match payload {
        Some(payload) => payload.block_hash,
        None => match state.latest_execution_payload_header() {
            Ok(header) => header.block_hash,
            Err(error) => {
                error!("failed to get latest execution payload header from state: {error:?}");
                return;
            }
        },
    };

    if let Err(error) = send_fcu::<P>(config, execution_engine, state, head_block_hash).await {
        error!(
            "failed to send forkchoice update (head_block_hash: {head_block_hash:?}): {error:?}",
        );
    }
}
