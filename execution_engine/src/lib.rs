pub use crate::{
    execution_engine::{ExecutionEngine, MockExecutionEngine, NewPayloadNotification},
    types::{
        ForkChoiceStateV1, ForkChoiceUpdateRequest, ForkChoiceUpdatedResponse, PayloadId,
        PayloadStatusV1, PayloadValidationStatus,
    },
};

mod execution_engine;
mod types;
