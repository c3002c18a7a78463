use core::marker::PhantomData;
use std::sync::Arc;

use anyhow::{ensure, Result};
use eth1::{DepositEvent, Eth1Api, LogProcessor};
use execution_engine::ExecutionEngine;
use futures::try_join;
use helper_functions::misc;
use log::{debug, error, info};
use types::{
    config::Config,
    containers::{BeaconBlock, BlobSidecars, ExecutionPayload},
    preset::Preset,
};

use crate::{
    error::Error,
    forkchoice, payload_verifier,
    traits::{BeaconStorage, BlockValidator, ForkchoiceStore as _, StateTransition},
};

/// Processes beacon blocks in two stages.
///
/// The execution payload and the block are validated first.
/// Blobs and the block are applied to storage only if both validations succeed.
/// Callers must not process multiple blocks against the same state concurrently.
pub struct Service<P, B, T, V, E, A> {
    config: Arc<Config>,
    storage: B,
    state_transition: T,
    block_validator: V,
    execution_engine: E,
    log_processor: Arc<LogProcessor<A, DepositEvent>>,
    phantom: PhantomData<P>,
}

impl<P, B, T, V, E, A> Service<P, B, T, V, E, A>
where
    P: Preset,
    B: BeaconStorage,
    T: StateTransition<B>,
    V: BlockValidator<B>,
    E: ExecutionEngine,
    A: Eth1Api,
{
    pub fn new(
        config: Arc<Config>,
        storage: B,
        state_transition: T,
        block_validator: V,
        execution_engine: E,
        log_processor: Arc<LogProcessor<A, DepositEvent>>,
    ) -> Result<Self> {
        ensure!(
            config.preset_base == P::NAME,
            Error::PresetMismatch {
                config_name: config.config_name.to_string(),
                in_config: config.preset_base,
                in_service: P::NAME,
            },
        );

        info!(
            "block processing configured for {} with {} preset",
            config.config_name, config.preset_base,
        );

        Ok(Self {
            config,
            storage,
            state_transition,
            block_validator,
            execution_engine,
            log_processor,
            phantom: PhantomData,
        })
    }

    /// Log processor shared with readers of deposits.
    #[must_use]
    pub const fn log_processor(&self) -> &Arc<LogProcessor<A, DepositEvent>> {
        &self.log_processor
    }

    pub async fn process_beacon_block(
        &self,
        block: &BeaconBlock,
        blobs: &BlobSidecars,
    ) -> Result<()> {
        let state = self.storage.beacon_state();

        try_join!(
            self.validate_execution_payload_on_block(block),
            self.block_validator.validate_block(&state, block),
        )?;

        let availability_store = self.storage.availability_store();

        try_join!(
            self.state_transition.process_blobs(&availability_store, block, blobs),
            self.state_transition.process_block(&state, block),
        )?;

        debug!("processed beacon block (slot: {})", block.slot);

        Ok(())
    }

    pub async fn process_slot(&self) -> Result<()> {
        let state = self.storage.beacon_state();
        self.state_transition.process_slot(&state).await
    }

    pub async fn validate_block(&self, block: &BeaconBlock) -> Result<()> {
        let state = self.storage.beacon_state();
        self.block_validator.validate_block(&state, block).await
    }

    /// Verifies the execution payload against the state and submits it to the execution engine.
    ///
    /// A payload the engine considers invalid results in [`Error::InvalidPayload`].
    /// Failures to reach the engine are returned as they are.
    pub async fn validate_execution_payload_on_block(&self, block: &BeaconBlock) -> Result<()> {
        let body = block.body.as_ref().ok_or(Error::NilBlockBody)?;
        let payload = body.execution_payload.as_ref().ok_or(Error::NilPayload)?;
        let state = self.storage.beacon_state();

        payload_verifier::verify_payload::<P>(&*state, payload)?;

        let versioned_hashes = body
            .blob_kzg_commitments
            .iter()
            .copied()
            .map(misc::kzg_commitment_to_versioned_hash)
            .collect();

        let valid = self
            .execution_engine
            .notify_new_payload(block.slot, payload, versioned_hashes, block.parent_root)
            .await?;

        ensure!(
            valid,
            Error::InvalidPayload {
                block_hash: payload.block_hash,
            },
        );

        Ok(())
    }

    /// Records the execution payload of `block` and processes logs in its execution block.
    ///
    /// A forkchoice update is sent exactly once after everything else, even if an earlier step
    /// fails or `block` has no execution payload. Errors from the forkchoice update are logged.
    pub async fn post_block_process(&self, block: Option<&BeaconBlock>) -> Result<()> {
        let payload = block.and_then(BeaconBlock::execution_payload);

        let result = match payload {
            Some(payload) => self.record_execution_payload(payload).await,
            None => {
                debug!("block has no execution payload; skipping forkchoice insertion");
                Ok(())
            }
        };

        let state = self.storage.beacon_state();

        forkchoice::send_post_block_fcu::<P>(
            &self.config,
            &self.execution_engine,
            &*state,
            payload,
        )
        .await;

        result
    }

    async fn record_execution_payload(&self, payload: &ExecutionPayload) -> Result<()> {
        let block_hash = payload.block_hash;

        self.storage.forkchoice_store().insert_node(block_hash)?;

        if let Err(error) = self.log_processor.process_logs_in_eth1_block(block_hash).await {
            error!("failed to process logs in execution block {block_hash:?}: {error:?}");
            return Err(error);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::{sync::atomic::Ordering, time::Duration};

    use execution_engine::MockExecutionEngine;
    use test_case::test_case;
    use tokio::time;
    use types::{
        containers::{BeaconBlockBody, Withdrawal},
        nonstandard::Phase,
        preset::{Mainnet, Minimal, PresetName},
        primitives::{KzgCommitment, H256},
    };

    use crate::mocks::{Eth1Chain, Forkchoice, State, Storage, Transition, Validator};

    use super::*;

    const LATEST_BLOCK_HASH: H256 = H256([0x11; 32]);
    const PAYLOAD_BLOCK_HASH: H256 = H256([0x22; 32]);

    // Bounds tests that rely on a failing future cancelling a sibling that never completes.
    const SIBLING_TIMEOUT: Duration = Duration::from_secs(5);

    type TestService = Service<
        Minimal,
        Storage,
        Arc<Transition>,
        Arc<Validator>,
        Arc<MockExecutionEngine>,
        Arc<Eth1Chain>,
    >;

    struct Harness {
        service: TestService,
        forkchoice: Arc<Forkchoice>,
        transition: Arc<Transition>,
        validator: Arc<Validator>,
        execution_engine: Arc<MockExecutionEngine>,
        eth1_chain: Arc<Eth1Chain>,
    }

    #[derive(Default)]
    struct Setup {
        execution_invalid: bool,
        execution_unreachable: bool,
        block_invalid: bool,
        block_validation_hangs: bool,
        block_application_fails: bool,
        blob_processing_fails: bool,
        blob_processing_hangs: bool,
        forkchoice_insertion_fails: bool,
        log_processing_fails: bool,
    }

    impl Setup {
        fn build(self) -> Harness {
            let config = Arc::new(Config::minimal());

            let forkchoice = Arc::new(Forkchoice {
                fail: self.forkchoice_insertion_fails,
                ..Forkchoice::default()
            });

            let transition = Arc::new(Transition {
                fail_block: self.block_application_fails,
                fail_blobs: self.blob_processing_fails,
                hang_blobs: self.blob_processing_hangs,
                ..Transition::default()
            });

            let validator = Arc::new(Validator {
                fail: self.block_invalid,
                hang: self.block_validation_hangs,
                ..Validator::default()
            });

            let execution_engine = Arc::new(if self.execution_unreachable {
                MockExecutionEngine::unreachable()
            } else {
                MockExecutionEngine::new(!self.execution_invalid)
            });

            let eth1_chain = Arc::new(Eth1Chain {
                fail: self.log_processing_fails,
                ..Eth1Chain::default()
            });

            // Slot 9 is in epoch 1 on minimal.
            let state = State::new(9, LATEST_BLOCK_HASH).with_randao_mix(1, H256::repeat_byte(3));

            let storage = Storage {
                state: Arc::new(state),
                forkchoice: Arc::clone(&forkchoice),
            };

            let log_processor = Arc::new(LogProcessor::new(&config, Arc::clone(&eth1_chain)));

            let service = Service::new(
                config,
                storage,
                Arc::clone(&transition),
                Arc::clone(&validator),
                Arc::clone(&execution_engine),
                log_processor,
            )
            .expect("minimal configuration should match Minimal preset");

            Harness {
                service,
                forkchoice,
                transition,
                validator,
                execution_engine,
                eth1_chain,
            }
        }
    }

    impl Harness {
        fn forkchoice_heads(&self) -> Vec<H256> {
            self.execution_engine
                .forkchoice_updates()
                .into_iter()
                .map(|request| request.state.head_block_hash)
                .collect()
        }
    }

    fn valid_block() -> BeaconBlock {
        BeaconBlock {
            slot: 9,
            parent_root: H256::repeat_byte(4),
            body: Some(BeaconBlockBody {
                execution_payload: Some(ExecutionPayload {
                    parent_hash: LATEST_BLOCK_HASH,
                    prev_randao: H256::repeat_byte(3),
                    block_hash: PAYLOAD_BLOCK_HASH,
                    ..ExecutionPayload::default()
                }),
                blob_kzg_commitments: vec![KzgCommitment::repeat_byte(5)],
                ..BeaconBlockBody::default()
            }),
            ..BeaconBlock::default()
        }
    }

    fn block_without_payload() -> BeaconBlock {
        BeaconBlock {
            body: Some(BeaconBlockBody::default()),
            ..valid_block()
        }
    }

    fn block_without_body() -> BeaconBlock {
        BeaconBlock {
            body: None,
            ..valid_block()
        }
    }

    #[tokio::test]
    async fn process_beacon_block_runs_both_stages() -> Result<()> {
        let harness = Setup::default().build();

        harness
            .service
            .process_beacon_block(&valid_block(), &BlobSidecars::new())
            .await?;

        assert_eq!(harness.validator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(harness.transition.counts(), (0, 1, 1));

        let new_payloads = harness.execution_engine.new_payloads();

        assert_eq!(new_payloads.len(), 1);
        assert_eq!(new_payloads[0].slot, 9);
        assert_eq!(new_payloads[0].block_hash, PAYLOAD_BLOCK_HASH);
        assert_eq!(new_payloads[0].parent_beacon_block_root, H256::repeat_byte(4));
        assert_eq!(
            new_payloads[0].versioned_hashes,
            [misc::kzg_commitment_to_versioned_hash(
                KzgCommitment::repeat_byte(5),
            )],
        );

        // Block processing leaves forkchoice alone.
        assert!(harness.execution_engine.forkchoice_updates().is_empty());
        assert!(harness.forkchoice.inserted.lock().is_empty());

        Ok(())
    }

    #[test_case(
        Setup { execution_invalid: true, ..Setup::default() };
        "payload invalid according to engine"
    )]
    #[test_case(
        Setup { execution_unreachable: true, ..Setup::default() };
        "engine unreachable"
    )]
    #[test_case(
        Setup { block_invalid: true, ..Setup::default() };
        "block invalid"
    )]
    #[tokio::test]
    async fn process_beacon_block_stops_after_failed_validation(setup: Setup) {
        let harness = setup.build();

        harness
            .service
            .process_beacon_block(&valid_block(), &BlobSidecars::new())
            .await
            .expect_err("validation should fail");

        assert_eq!(harness.transition.counts(), (0, 0, 0));
    }

    #[tokio::test]
    async fn process_beacon_block_does_not_apply_block_with_invalid_payload() {
        let harness = Setup::default().build();

        let mut block = valid_block();

        if let Some(payload) = block
            .body
            .as_mut()
            .and_then(|body| body.execution_payload.as_mut())
        {
            payload.withdrawals = vec![Withdrawal::default(); 5];
        }

        let error = harness
            .service
            .process_beacon_block(&block, &BlobSidecars::new())
            .await
            .expect_err("5 withdrawals exceed the limit of 4 on minimal");

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::TooManyWithdrawals {
                maximum: 4,
                in_block: 5,
            }),
        ));
        assert!(harness.execution_engine.new_payloads().is_empty());
        assert_eq!(harness.transition.counts(), (0, 0, 0));
    }

    #[test_case(
        Setup { block_application_fails: true, ..Setup::default() };
        "block application fails"
    )]
    #[test_case(
        Setup { blob_processing_fails: true, ..Setup::default() };
        "blob processing fails"
    )]
    #[tokio::test]
    async fn process_beacon_block_surfaces_second_stage_errors(setup: Setup) {
        let harness = setup.build();

        harness
            .service
            .process_beacon_block(&valid_block(), &BlobSidecars::new())
            .await
            .expect_err("second stage should fail");

        assert_eq!(harness.validator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(harness.execution_engine.new_payloads().len(), 1);
    }

    #[tokio::test]
    async fn failed_payload_validation_cancels_pending_block_validation() -> Result<()> {
        let harness = Setup {
            execution_invalid: true,
            block_validation_hangs: true,
            ..Setup::default()
        }
        .build();

        let error = time::timeout(
            SIBLING_TIMEOUT,
            harness
                .service
                .process_beacon_block(&valid_block(), &BlobSidecars::new()),
        )
        .await?
        .expect_err("engine considers payload invalid");

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::InvalidPayload { .. }),
        ));
        assert_eq!(harness.transition.counts(), (0, 0, 0));

        Ok(())
    }

    #[tokio::test]
    async fn failed_block_application_cancels_pending_blob_processing() -> Result<()> {
        let harness = Setup {
            block_application_fails: true,
            blob_processing_hangs: true,
            ..Setup::default()
        }
        .build();

        let error = time::timeout(
            SIBLING_TIMEOUT,
            harness
                .service
                .process_beacon_block(&valid_block(), &BlobSidecars::new()),
        )
        .await?
        .expect_err("block application fails");

        assert_eq!(error.to_string(), "block application failed");
        assert_eq!(harness.transition.counts(), (0, 1, 1));

        Ok(())
    }

    #[test]
    fn new_rejects_config_for_another_preset() -> Result<()> {
        let config = Arc::new(Config::minimal());
        let eth1_chain = Arc::new(Eth1Chain::default());

        let storage = Storage {
            state: Arc::new(State::new(0, LATEST_BLOCK_HASH)),
            forkchoice: Arc::default(),
        };

        let result = Service::<Mainnet, _, _, _, _, _>::new(
            Arc::clone(&config),
            storage,
            Arc::new(Transition::default()),
            Arc::new(Validator::default()),
            Arc::new(MockExecutionEngine::new(true)),
            Arc::new(LogProcessor::new(&config, eth1_chain)),
        );

        let Err(error) = result else {
            anyhow::bail!("Mainnet service should not accept minimal configuration");
        };

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::PresetMismatch {
                in_config: PresetName::Minimal,
                in_service: PresetName::Mainnet,
                ..
            }),
        ));

        Ok(())
    }

    #[test_case(block_without_body() => matches Some(Error::NilBlockBody); "nil body")]
    #[test_case(block_without_payload() => matches Some(Error::NilPayload); "nil payload")]
    #[tokio::test]
    async fn validate_execution_payload_on_block_rejects_missing_payload(
        block: BeaconBlock,
    ) -> Option<Error> {
        let harness = Setup::default().build();

        let error = harness
            .service
            .validate_execution_payload_on_block(&block)
            .await
            .expect_err("block has no execution payload");

        assert!(harness.execution_engine.new_payloads().is_empty());

        error.downcast::<Error>().ok()
    }

    #[tokio::test]
    async fn validate_execution_payload_on_block_distinguishes_invalid_payload() {
        let invalid = Setup {
            execution_invalid: true,
            ..Setup::default()
        }
        .build();

        let unreachable = Setup {
            execution_unreachable: true,
            ..Setup::default()
        }
        .build();

        let invalid_error = invalid
            .service
            .validate_execution_payload_on_block(&valid_block())
            .await
            .expect_err("engine considers payload invalid");

        let transport_error = unreachable
            .service
            .validate_execution_payload_on_block(&valid_block())
            .await
            .expect_err("engine is unreachable");

        assert!(matches!(
            invalid_error.downcast_ref::<Error>(),
            Some(Error::InvalidPayload { block_hash }) if *block_hash == PAYLOAD_BLOCK_HASH,
        ));
        assert!(transport_error.downcast_ref::<Error>().is_none());
    }

    #[tokio::test]
    async fn process_slot_and_validate_block_are_passthroughs() -> Result<()> {
        let harness = Setup::default().build();

        harness.service.process_slot().await?;
        harness.service.validate_block(&block_without_body()).await?;

        assert_eq!(harness.transition.counts(), (1, 0, 0));
        assert_eq!(harness.validator.calls.load(Ordering::SeqCst), 1);

        Ok(())
    }

    #[tokio::test]
    async fn post_block_process_without_body_falls_back_to_latest_payload() -> Result<()> {
        let harness = Setup::default().build();

        harness
            .service
            .post_block_process(Some(&block_without_body()))
            .await?;

        assert!(harness.forkchoice.inserted.lock().is_empty());
        assert!(harness.eth1_chain.requested.lock().is_empty());
        assert_eq!(harness.forkchoice_heads(), [LATEST_BLOCK_HASH]);

        Ok(())
    }

    #[tokio::test]
    async fn post_block_process_records_payload_and_processes_logs() -> Result<()> {
        let harness = Setup::default().build();

        harness.service.post_block_process(Some(&valid_block())).await?;

        assert_eq!(*harness.forkchoice.inserted.lock(), [PAYLOAD_BLOCK_HASH]);
        assert_eq!(*harness.eth1_chain.requested.lock(), [PAYLOAD_BLOCK_HASH]);
        assert_eq!(
            harness.service.log_processor().last_finalized_block(),
            PAYLOAD_BLOCK_HASH.to_low_u64_be(),
        );

        let updates = harness.execution_engine.forkchoice_updates();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].state.head_block_hash, PAYLOAD_BLOCK_HASH);
        assert_eq!(updates[0].state.safe_block_hash, LATEST_BLOCK_HASH);
        assert_eq!(updates[0].state.finalized_block_hash, LATEST_BLOCK_HASH);
        assert_eq!(updates[0].fork_version, Phase::Deneb);

        Ok(())
    }

    #[test_case(None, Setup::default() => (true, LATEST_BLOCK_HASH); "nil block")]
    #[test_case(
        Some(block_without_body()),
        Setup::default()
        => (true, LATEST_BLOCK_HASH);
        "nil body"
    )]
    #[test_case(
        Some(block_without_payload()),
        Setup::default()
        => (true, LATEST_BLOCK_HASH);
        "nil payload"
    )]
    #[test_case(
        Some(valid_block()),
        Setup::default()
        => (true, PAYLOAD_BLOCK_HASH);
        "payload"
    )]
    #[test_case(
        Some(valid_block()),
        Setup { log_processing_fails: true, ..Setup::default() }
        => (false, PAYLOAD_BLOCK_HASH);
        "log processing error"
    )]
    #[test_case(
        Some(valid_block()),
        Setup { forkchoice_insertion_fails: true, ..Setup::default() }
        => (false, PAYLOAD_BLOCK_HASH);
        "forkchoice insertion error"
    )]
    #[test_case(
        None,
        Setup { execution_unreachable: true, ..Setup::default() }
        => (true, LATEST_BLOCK_HASH);
        "nil block with unreachable engine"
    )]
    #[test_case(
        Some(valid_block()),
        Setup { log_processing_fails: true, execution_unreachable: true, ..Setup::default() }
        => (false, PAYLOAD_BLOCK_HASH);
        "log processing error with unreachable engine"
    )]
    #[tokio::test]
    async fn post_block_process_sends_forkchoice_update_exactly_once(
        block: Option<BeaconBlock>,
        setup: Setup,
    ) -> (bool, H256) {
        let harness = setup.build();

        let result = harness.service.post_block_process(block.as_ref()).await;

        let heads = harness.forkchoice_heads();

        assert_eq!(heads.len(), 1);

        (result.is_ok(), heads[0])
    }

    #[tokio::test]
    async fn post_block_process_skips_logs_when_forkchoice_insertion_fails() {
        let harness = Setup {
            forkchoice_insertion_fails: true,
            ..Setup::default()
        }
        .build();

        harness
            .service
            .post_block_process(Some(&valid_block()))
            .await
            .expect_err("forkchoice insertion fails");

        assert!(harness.eth1_chain.requested.lock().is_empty());
        assert_eq!(harness.service.log_processor().last_finalized_block(), 0);
    }
}
