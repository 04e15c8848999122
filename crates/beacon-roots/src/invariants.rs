//! Invariant checking over sequences of calls.
//!
//! [`InvariantChecker`] replays decoded fuzzer input against one storage and verifies, after every
//! call, the properties the contract must uphold regardless of input.

use crate::{
    constants::SYSTEM_ADDRESS,
    context::Outcome,
    contract::BeaconRootsContract,
    harness::fuzz_input::{
        FuzzInput,
        InputReader,
    },
    primitives::{
        B256,
        Word,
    },
    storage::ContractStorage,
};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("call {call}: record reverted")]
    RecordReverted { call: usize },
    #[error("call {call}: record returned {len} bytes")]
    RecordReturnedData { call: usize, len: usize },
    #[error("call {call}: record grew storage from {before} to {after} slots")]
    RecordStorageGrowth {
        call: usize,
        before: usize,
        after: usize,
    },
    #[error("call {call}: query changed storage from {before} to {after} slots")]
    QueryMutatedStorage {
        call: usize,
        before: usize,
        after: usize,
    },
    #[error("call {call}: query with {len} bytes of calldata did not revert")]
    QueryAcceptedBadLength { call: usize, len: usize },
    #[error("call {call}: query returned {len} bytes")]
    QueryReturnLength { call: usize, len: usize },
    #[error("call {call}: query for the timestamp recorded by the previous call reverted")]
    SymmetryReverted { call: usize },
    #[error("call {call}: query returned {actual}, previous call recorded {expected}")]
    SymmetryMismatch {
        call: usize,
        expected: B256,
        actual: B256,
    },
    #[error("call {call}: query for timestamp {timestamp} returned {actual}, recorded {expected}")]
    IntegrityMismatch {
        call: usize,
        timestamp: Word,
        expected: B256,
        actual: B256,
    },
}

/// Replays calls against one storage and checks every outcome.
#[derive(Debug, Default)]
pub struct InvariantChecker {
    storage: ContractStorage,
    previous: Option<FuzzInput>,
    /// Root last recorded for each timestamp.
    recorded: HashMap<Word, Word>,
    calls: usize,
}

impl InvariantChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `data` and check every call in it.
    ///
    /// Returns the number of calls checked.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] encountered.
    pub fn run(data: &[u8]) -> Result<usize, InvariantViolation> {
        let mut checker = Self::new();
        for input in InputReader::new(data) {
            checker.check(input)?;
        }
        Ok(checker.calls)
    }

    /// Execute `input` and check the outcome against everything seen so far.
    ///
    /// # Errors
    ///
    /// Returns an [`InvariantViolation`] describing the first broken property.
    pub fn check(&mut self, input: FuzzInput) -> Result<Outcome, InvariantViolation> {
        self.calls += 1;
        let call = self.calls;

        let before = self.storage.len();
        let outcome = BeaconRootsContract::execute(&mut input.context(&mut self.storage));
        let after = self.storage.len();

        if input.caller == SYSTEM_ADDRESS {
            self.recorded.insert(
                Word::from(input.timestamp),
                Word::from_left_aligned(&input.calldata),
            );
            check_record(call, &outcome, before, after)?;
        } else {
            if after != before {
                return Err(InvariantViolation::QueryMutatedStorage {
                    call,
                    before,
                    after,
                });
            }
            self.check_query(call, &input, &outcome)?;
        }

        tracing::trace!(call, reverted = outcome.is_reverted(), "invariants hold");
        self.previous = Some(input);
        Ok(outcome)
    }

    fn check_query(
        &self,
        call: usize,
        input: &FuzzInput,
        outcome: &Outcome,
    ) -> Result<(), InvariantViolation> {
        let len = input.calldata.len();
        if len != Word::BYTES {
            if !outcome.is_reverted() {
                return Err(InvariantViolation::QueryAcceptedBadLength { call, len });
            }
            return Ok(());
        }

        if !outcome.is_reverted() && outcome.data().len() != Word::BYTES {
            return Err(InvariantViolation::QueryReturnLength {
                call,
                len: outcome.data().len(),
            });
        }

        let requested = Word::from_be_slice(&input.calldata);

        // A query for the timestamp the immediately preceding call recorded must succeed.
        if let Some(previous) = &self.previous
            && previous.caller == SYSTEM_ADDRESS
            && Word::from(previous.timestamp) == requested
        {
            let expected = Word::from_left_aligned(&previous.calldata);
            let Some(actual) = returned_word(outcome) else {
                return Err(InvariantViolation::SymmetryReverted { call });
            };
            if actual != expected {
                return Err(InvariantViolation::SymmetryMismatch {
                    call,
                    expected: expected.to_b256(),
                    actual: actual.to_b256(),
                });
            }
        }

        if let (Some(actual), Some(expected)) =
            (returned_word(outcome), self.recorded.get(&requested))
            && actual != *expected
        {
            return Err(InvariantViolation::IntegrityMismatch {
                call,
                timestamp: requested,
                expected: expected.to_b256(),
                actual: actual.to_b256(),
            });
        }

        Ok(())
    }

    pub fn storage(&self) -> &ContractStorage {
        &self.storage
    }

    /// Number of calls checked so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

fn check_record(
    call: usize,
    outcome: &Outcome,
    before: usize,
    after: usize,
) -> Result<(), InvariantViolation> {
    if outcome.is_reverted() {
        return Err(InvariantViolation::RecordReverted { call });
    }
    if !outcome.data().is_empty() {
        return Err(InvariantViolation::RecordReturnedData {
            call,
            len: outcome.data().len(),
        });
    }
    // Both ring buffer slots are written together, so a bucket is either new (2) or reused (0).
    if after != before && after != before + 2 {
        return Err(InvariantViolation::RecordStorageGrowth {
            call,
            before,
            after,
        });
    }
    Ok(())
}

fn returned_word(outcome: &Outcome) -> Option<Word> {
    match outcome {
        Outcome::Reverted => None,
        Outcome::Returned(data) => Some(Word::from_be_slice(data)),
    }
}
