use std::borrow::Cow;

use hex_literal::hex;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use typenum::Unsigned as _;

use crate::{
    nonstandard::Phase,
    preset::{Preset, PresetName},
    primitives::{Epoch, ExecutionAddress, Slot, FAR_FUTURE_EPOCH, GENESIS_EPOCH, H160},
};

/// Number of slots between a beacon block and the execution block its deposits are read from.
///
/// Execution blocks are produced in lockstep with beacon blocks,
/// so the previous slot is the most recent one that is guaranteed to be final.
pub const DEFAULT_ETH1_FOLLOW_DISTANCE: u64 = 1;

/// Configuration variables customizable at runtime.
///
/// Integer fields accept both native integers and strings to stay compatible with
/// configuration files in `consensus-specs`, which quote some values.
#[serde_as]
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    // Meta
    pub config_name: Cow<'static, str>,
    pub preset_base: PresetName,

    // Forking
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub altair_fork_epoch: Epoch,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub bellatrix_fork_epoch: Epoch,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub capella_fork_epoch: Epoch,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub deneb_fork_epoch: Epoch,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub electra_fork_epoch: Epoch,

    // Time parameters
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub eth1_follow_distance: u64,

    // Deposit contract
    pub deposit_contract_address: ExecutionAddress,
}

impl Default for Config {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl Config {
    #[must_use]
    pub fn mainnet() -> Self {
        Self {
            config_name: Cow::Borrowed("mainnet"),
            preset_base: PresetName::Mainnet,
            altair_fork_epoch: 74_240,
            bellatrix_fork_epoch: 144_896,
            capella_fork_epoch: 194_048,
            deneb_fork_epoch: 269_568,
            electra_fork_epoch: 364_032,
            eth1_follow_distance: DEFAULT_ETH1_FOLLOW_DISTANCE,
            deposit_contract_address: H160(hex!("00000000219ab540356cBB839Cbe05303d7705Fa")),
        }
    }

    /// Every execution-enabled phase is active from genesis.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            config_name: Cow::Borrowed("minimal"),
            preset_base: PresetName::Minimal,
            altair_fork_epoch: GENESIS_EPOCH,
            bellatrix_fork_epoch: GENESIS_EPOCH,
            capella_fork_epoch: GENESIS_EPOCH,
            deneb_fork_epoch: GENESIS_EPOCH,
            electra_fork_epoch: FAR_FUTURE_EPOCH,
            eth1_follow_distance: DEFAULT_ETH1_FOLLOW_DISTANCE,
            deposit_contract_address: H160(hex!("1234567890123456789012345678901234567890")),
        }
    }

    #[must_use]
    pub const fn fork_epoch(&self, phase: Phase) -> Epoch {
        match phase {
            Phase::Phase0 => GENESIS_EPOCH,
            Phase::Altair => self.altair_fork_epoch,
            Phase::Bellatrix => self.bellatrix_fork_epoch,
            Phase::Capella => self.capella_fork_epoch,
            Phase::Deneb => self.deneb_fork_epoch,
            Phase::Electra => self.electra_fork_epoch,
        }
    }

    #[must_use]
    pub fn phase_at_epoch(&self, epoch: Epoch) -> Phase {
        enum_iterator::all::<Phase>()
            .take_while(|phase| self.fork_epoch(*phase) <= epoch)
            .last()
            .unwrap_or(Phase::Phase0)
    }

    #[must_use]
    pub fn phase_at_slot<P: Preset>(&self, slot: Slot) -> Phase {
        self.phase_at_epoch(slot / P::SlotsPerEpoch::U64)
    }
}
