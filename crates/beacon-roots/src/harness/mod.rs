//! JSON test-vector harness.
//!
//! A [`TestVector`] describes one call (caller, calldata, block timestamp, storage seed). The
//! harness runs it against [`BeaconRootsContract`] and reports an [`ExecutionResult`] with the
//! outcome and the post-call storage.

pub mod fuzz_input;
pub mod serde_utils;

use crate::{
    context::{
        CallContext,
        Outcome,
    },
    contract::BeaconRootsContract,
    error::{
        HarnessError,
        Result,
    },
    primitives::{
        Address,
        Bytes,
        Word,
    },
    storage::ContractStorage,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;

/// A self-contained description of one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestVector {
    #[serde(with = "serde_utils::address")]
    pub caller: Address,
    #[serde(with = "serde_utils::calldata")]
    pub calldata: Bytes,
    pub timestamp: Word,
    /// Slots written into storage before the call.
    #[serde(default)]
    pub storage: BTreeMap<Word, Word>,
    /// Block number of the call. Carried through, not used by the contract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocknumber: Option<u64>,
}

impl TestVector {
    pub fn new(caller: Address, calldata: impl Into<Bytes>, timestamp: impl Into<Word>) -> Self {
        Self {
            caller,
            calldata: calldata.into(),
            timestamp: timestamp.into(),
            storage: BTreeMap::new(),
            blocknumber: None,
        }
    }

    #[must_use]
    pub fn with_storage(
        mut self,
        storage: impl IntoIterator<Item = (impl Into<Word>, impl Into<Word>)>,
    ) -> Self {
        self.storage
            .extend(storage.into_iter().map(|(slot, value)| (slot.into(), value.into())));
        self
    }

    /// Parse a vector from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Decode`] if the text is not a valid test vector.
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(HarnessError::Decode)
    }
}

/// Outcome half of an [`ExecutionResult`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReturnValue {
    pub reverted: bool,
    /// Returned bytes as hex without prefix. Empty when reverted or when there is no output.
    pub data: String,
}

impl From<&Outcome> for ReturnValue {
    fn from(outcome: &Outcome) -> Self {
        Self {
            reverted: outcome.is_reverted(),
            data: hex::encode(outcome.data()),
        }
    }
}

/// What the harness reports for one call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecutionResult {
    pub ret: ReturnValue,
    /// Reserved for a storage hash, always zero.
    pub hash: u64,
    /// Storage after the call, see [`ContractStorage::snapshot`].
    #[serde(default)]
    pub storage: BTreeMap<String, String>,
}

impl ExecutionResult {
    pub fn new(outcome: &Outcome, storage: &ContractStorage) -> Self {
        Self {
            ret: ReturnValue::from(outcome),
            hash: 0,
            storage: storage.snapshot(),
        }
    }

    /// # Errors
    ///
    /// Returns [`HarnessError::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(HarnessError::Encode)
    }
}

/// Runs test vectors against one storage that persists between calls.
///
/// Each vector's seed is written on top of the current storage before its call, so a sequence
/// of vectors behaves like a sequence of calls to the same deployed contract.
#[derive(Debug, Default)]
pub struct Session {
    storage: ContractStorage,
    calls: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&mut self, vector: &TestVector) -> ExecutionResult {
        self.storage.extend(vector.storage.iter().map(|(slot, value)| (*slot, *value)));

        let outcome = {
            let mut ctx = CallContext::new(
                vector.caller,
                vector.calldata.clone(),
                vector.timestamp,
                &mut self.storage,
            );
            BeaconRootsContract::execute(&mut ctx)
        };
        self.calls += 1;

        tracing::debug!(
            call = self.calls,
            caller = %vector.caller,
            timestamp = %vector.timestamp,
            reverted = outcome.is_reverted(),
            "executed test vector"
        );

        ExecutionResult::new(&outcome, &self.storage)
    }

    /// # Errors
    ///
    /// Returns [`HarnessError::Decode`] if `input` is not a valid test vector. The session is left
    /// untouched in that case.
    pub fn run_json(&mut self, input: &str) -> Result<ExecutionResult> {
        let vector = TestVector::from_json(input)?;
        Ok(self.run(&vector))
    }

    /// Run every vector in order, returning one result per vector.
    pub fn run_all<'a>(
        &mut self,
        vectors: impl IntoIterator<Item = &'a TestVector>,
    ) -> Vec<ExecutionResult> {
        vectors.into_iter().map(|vector| self.run(vector)).collect()
    }

    pub fn storage(&self) -> &ContractStorage {
        &self.storage
    }

    /// Number of calls executed so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

/// Run a single vector against fresh storage holding only the vector's seed.
pub fn run_vector(vector: &TestVector) -> ExecutionResult {
    Session::new().run(vector)
}

/// Decode and run a single JSON test vector.
///
/// # Errors
///
/// Returns [`HarnessError::Decode`] for malformed input. A reverting call is not an error.
pub fn run_json(input: &str) -> Result<ExecutionResult> {
    Session::new().run_json(input)
}

/// Input accepted by [`run_json_batch`]: one vector or a list of vectors.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VectorInput {
    Single(TestVector),
    Batch(Vec<TestVector>),
}

/// Output of [`run_json_batch`], mirroring the shape of the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResultOutput {
    Single(ExecutionResult),
    Batch(Vec<ExecutionResult>),
}

/// Decode a vector or a list of vectors and run them through one [`Session`].
///
/// # Errors
///
/// Returns [`HarnessError::Decode`] for malformed input. Nothing is executed in that case.
pub fn run_json_batch(input: &str) -> Result<ResultOutput> {
    let input: VectorInput = serde_json::from_str(input).map_err(HarnessError::Decode)?;
    let mut session = Session::new();

    Ok(match input {
        VectorInput::Single(vector) => ResultOutput::Single(session.run(&vector)),
        VectorInput::Batch(vectors) => ResultOutput::Batch(session.run_all(&vectors)),
    })
}
