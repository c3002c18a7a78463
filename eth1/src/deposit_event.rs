// `DepositEvent` logs consist of 18 EVM words (shown here in hexadecimal):
// ```text
// 00000000000000000000000000000000000000000000000000000000000000a0 pubkey                 offset
// 0000000000000000000000000000000000000000000000000000000000000100 withdrawal_credentials offset
// 0000000000000000000000000000000000000000000000000000000000000140 amount                 offset
// 0000000000000000000000000000000000000000000000000000000000000180 signature              offset
// 0000000000000000000000000000000000000000000000000000000000000200 index                  offset
// 0000000000000000000000000000000000000000000000000000000000000030 pubkey                 length
// ................................................................ pubkey
// ................................00000000000000000000000000000000 pubkey
// 0000000000000000000000000000000000000000000000000000000000000020 withdrawal_credentials length
// ................................................................ withdrawal_credentials
// 0000000000000000000000000000000000000000000000000000000000000008 amount                 length
// ................000000000000000000000000000000000000000000000000 amount
// 0000000000000000000000000000000000000000000000000000000000000060 signature              length
// ................................................................ signature
// ................................................................ signature
// ................................................................ signature
// 0000000000000000000000000000000000000000000000000000000000000008 index                  length
// ................000000000000000000000000000000000000000000000000 index
// ```
//
// Every field is ABI-encoded as `bytes` even though all of them have a fixed size,
// so the position of each value is known in advance and the offsets can be ignored.
//
// See:
// - <https://github.com/ethereum/consensus-specs/blob/fab27d17f0dd289a6abbb99acae39387ac2320cf/solidity_deposit_contract/deposit_contract.sol>
// - <https://docs.soliditylang.org/en/v0.8.2/abi-spec.html>

use core::ops::Range;

use anyhow::{ensure, Error as AnyhowError};
use hex_literal::hex;
use thiserror::Error;
use types::{
    containers::DepositData,
    primitives::{DepositIndex, Gwei, PublicKeyBytes, SignatureBytes, H256},
};

use crate::eth1_log::Log;

#[derive(Debug, Error)]
enum Error {
    #[error("log has unexpected topics: {log:?}")]
    UnexpectedTopics { log: Box<Log> },
    #[error("log has been removed: {log:?}")]
    Removed { log: Box<Log> },
    #[error("log data has the wrong length (expected: {expected}, actual: {actual})")]
    WrongLength { expected: usize, actual: usize },
}

const EVM_WORD_SIZE: usize = 32;

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct DepositEvent {
    pub data: DepositData,
    pub index: DepositIndex,
}

impl TryFrom<Log> for DepositEvent {
    type Error = AnyhowError;

    fn try_from(log: Log) -> Result<Self, Self::Error> {
        ensure!(
            log.topics == [Self::TOPIC],
            Error::UnexpectedTopics { log: Box::new(log) },
        );

        ensure!(!log.is_removed(), Error::Removed { log: Box::new(log) });

        let log_data = log.data.as_slice();

        ensure!(
            log_data.len() == Self::LENGTH,
            Error::WrongLength {
                expected: Self::LENGTH,
                actual: log_data.len(),
            },
        );

        let pubkey = PublicKeyBytes::from_slice(&log_data[Self::PUBKEY]);
        let withdrawal_credentials = H256::from_slice(&log_data[Self::WITHDRAWAL_CREDENTIALS]);
        let amount = Gwei::from_le_bytes(log_data[Self::AMOUNT].try_into()?);
        let signature = SignatureBytes::from_slice(&log_data[Self::SIGNATURE]);
        let index = DepositIndex::from_le_bytes(log_data[Self::INDEX].try_into()?);

        Ok(Self {
            data: DepositData {
                pubkey,
                withdrawal_credentials,
                amount,
                signature,
            },
            index,
        })
    }
}

impl DepositEvent {
    /// Keccak-256 hash of `DepositEvent(bytes,bytes,bytes,bytes,bytes)`.
    pub const TOPIC: H256 = H256(hex!(
        "649bbc62d0e31342afea4e5cd82d4049e7e1ee912fc0889aa790803be39038c5"
    ));

    const LENGTH: usize = 18 * EVM_WORD_SIZE;

    const PUBKEY: Range<usize> = word_span(6, 48);
    const WITHDRAWAL_CREDENTIALS: Range<usize> = word_span(9, 32);
    const AMOUNT: Range<usize> = word_span(11, size_of::<Gwei>());
    const SIGNATURE: Range<usize> = word_span(13, 96);
    const INDEX: Range<usize> = word_span(17, size_of::<DepositIndex>());
}

const fn word_span(first_word: usize, length: usize) -> Range<usize> {
    let start = first_word * EVM_WORD_SIZE;
    start..start + length
}
