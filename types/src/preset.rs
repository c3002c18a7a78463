use core::{fmt::Debug, hash::Hash};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::{Display, EnumString};
use typenum::{NonZero, Unsigned, U16, U32, U4, U64, U65536, U8};

/// Compile-time configuration variables.
///
/// Only the variables consulted by block processing are included.
/// See [presets in `consensus-specs`](https://github.com/ethereum/consensus-specs/tree/aac851f860fa384916f62027b2dbe3318a354c5b/presets).
pub trait Preset: Copy + Eq + Ord + Hash + Default + Debug + Send + Sync + 'static {
    // Phase 0
    type EpochsPerHistoricalVector: Unsigned + NonZero + Debug + Send + Sync;
    type SlotsPerEpoch: Unsigned + NonZero + Debug + Send + Sync;

    // Capella
    type MaxWithdrawalsPerPayload: Unsigned + NonZero + Debug + Send + Sync;

    const NAME: PresetName;
}

/// [Mainnet preset](https://github.com/ethereum/consensus-specs/tree/aac851f860fa384916f62027b2dbe3318a354c5b/presets/mainnet).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Mainnet;

impl Preset for Mainnet {
    type EpochsPerHistoricalVector = U65536;
    type SlotsPerEpoch = U32;
    type MaxWithdrawalsPerPayload = U16;

    const NAME: PresetName = PresetName::Mainnet;
}

/// [Minimal preset](https://github.com/ethereum/consensus-specs/tree/aac851f860fa384916f62027b2dbe3318a354c5b/presets/minimal).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Minimal;

impl Preset for Minimal {
    type EpochsPerHistoricalVector = U64;
    type SlotsPerEpoch = U8;
    type MaxWithdrawalsPerPayload = U4;

    const NAME: PresetName = PresetName::Minimal;
}

#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Debug,
    Display,
    EnumString,
    DeserializeFromStr,
    SerializeDisplay,
)]
#[strum(serialize_all = "lowercase")]
pub enum PresetName {
    #[default]
    Mainnet,
    Minimal,
}
