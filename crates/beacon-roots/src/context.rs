use crate::{
    primitives::{
        Address,
        Bytes,
        Word,
    },
    storage::ContractStorage,
};

/// Terminal state of a single contract invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The call failed. No output, no storage changes.
    Reverted,
    /// The call succeeded with the given output, which may be empty.
    Returned(Bytes),
}

impl Outcome {
    pub fn is_reverted(&self) -> bool {
        matches!(self, Self::Reverted)
    }

    /// Output of the call, empty for a revert.
    pub fn data(&self) -> &[u8] {
        match self {
            Self::Reverted => &[],
            Self::Returned(data) => &data[..],
        }
    }

    /// The returned bytes, or `None` if the call reverted.
    pub fn into_return_value(self) -> Option<Bytes> {
        match self {
            Self::Reverted => None,
            Self::Returned(data) => Some(data),
        }
    }
}

/// Value handed to [`CallContext::return_value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnData(Bytes);

impl From<Word> for ReturnData {
    fn from(word: Word) -> Self {
        Self(Bytes::copy_from_slice(&word.to_be_bytes()))
    }
}

impl From<Bytes> for ReturnData {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for ReturnData {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }
}

/// Inputs of one invocation plus the storage it runs against.
///
/// The context ends with exactly one [`Outcome`], built through [`CallContext::revert`] or
/// [`CallContext::return_value`] and returned straight out of the contract logic.
#[derive(Debug)]
pub struct CallContext<'s> {
    caller: Address,
    calldata: Bytes,
    timestamp: Word,
    storage: &'s mut ContractStorage,
}

impl<'s> CallContext<'s> {
    pub fn new(
        caller: Address,
        calldata: impl Into<Bytes>,
        timestamp: impl Into<Word>,
        storage: &'s mut ContractStorage,
    ) -> Self {
        Self {
            caller,
            calldata: calldata.into(),
            timestamp: timestamp.into(),
            storage,
        }
    }

    pub fn caller(&self) -> Address {
        self.caller
    }

    pub fn calldata(&self) -> &Bytes {
        &self.calldata
    }

    /// Block timestamp of the call.
    pub fn timestamp(&self) -> Word {
        self.timestamp
    }

    pub fn storage(&self) -> &ContractStorage {
        &*self.storage
    }

    pub fn storage_mut(&mut self) -> &mut ContractStorage {
        &mut *self.storage
    }

    /// Abort the call without output.
    #[must_use = "the outcome must be returned from the contract logic"]
    pub fn revert(&self) -> Outcome {
        tracing::trace!(caller = %self.caller, "call reverted");
        Outcome::Reverted
    }

    /// Finish the call with `value` as output.
    #[must_use = "the outcome must be returned from the contract logic"]
    pub fn return_value(&self, value: impl Into<ReturnData>) -> Outcome {
        let ReturnData(data) = value.into();
        tracing::trace!(caller = %self.caller, len = data.len(), "call returned");
        Outcome::Returned(data)
    }
}
