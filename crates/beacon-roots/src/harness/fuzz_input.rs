//! Decoding of raw fuzzer input into a stream of calls.
//!
//! The byte stream is a concatenation of records, each laid out as (all integers big-endian):
//!
//! | field       | encoding                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | caller      | 32 bytes, only the low 20 are kept                                |
//! | calldata    | `u16` length, then that many bytes                                |
//! | storage     | optional: repeated `u16` flag (odd = entry follows), key, value   |
//! | timestamp   | `u64`, raised to at least [`FORK_TIMESTAMP`]                      |
//! | blocknumber | `u64`, raised to at least [`LONDON_BLOCK`]                        |
//!
//! Running out of bytes ends the stream.

use super::TestVector;
use crate::{
    constants::{
        FORK_TIMESTAMP,
        LONDON_BLOCK,
    },
    context::CallContext,
    primitives::{
        Address,
        Bytes,
        Word,
    },
    storage::ContractStorage,
};

/// One decoded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzInput {
    pub caller: Address,
    pub calldata: Bytes,
    pub timestamp: u64,
    pub block_number: u64,
}

impl FuzzInput {
    /// Build the call context for this input over `storage`.
    pub fn context<'s>(&self, storage: &'s mut ContractStorage) -> CallContext<'s> {
        CallContext::new(self.caller, self.calldata.clone(), self.timestamp, storage)
    }

    /// Render this input as a JSON test vector seeded with `storage`.
    pub fn to_vector(&self, storage: &ContractStorage) -> TestVector {
        TestVector {
            caller: self.caller,
            calldata: self.calldata.clone(),
            timestamp: Word::from(self.timestamp),
            storage: storage.iter().map(|(slot, value)| (*slot, *value)).collect(),
            blocknumber: Some(self.block_number),
        }
    }
}

/// Cursor over raw fuzzer bytes.
#[derive(Debug, Clone)]
pub struct InputReader<'a> {
    data: &'a [u8],
}

impl<'a> InputReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    /// Decode the next call.
    ///
    /// With `storage` set, the storage entries preceding the timestamp are decoded and written
    /// into it as they are read; without it, the record is expected to carry no storage section.
    /// Returns `None` once the input is exhausted. Entries written before the input ran out stay
    /// written.
    pub fn next_input(&mut self, storage: Option<&mut ContractStorage>) -> Option<FuzzInput> {
        let caller = self.read_word()?.into_address();
        let calldata = self.read_bytes()?;

        if let Some(storage) = storage {
            while self.read_bool()? {
                let slot = self.read_word()?;
                let value = self.read_word()?;
                storage.set(slot, value);
            }
        }

        let timestamp = self.read_u64()?.max(FORK_TIMESTAMP);
        let block_number = self.read_u64()?.max(LONDON_BLOCK);

        Some(FuzzInput {
            caller,
            calldata,
            timestamp,
            block_number,
        })
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        if self.data.len() < len {
            return None;
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Some(head)
    }

    fn read_u16(&mut self) -> Option<u16> {
        self.take(2)?.try_into().ok().map(u16::from_be_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take(8)?.try_into().ok().map(u64::from_be_bytes)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u16().map(|flag| flag % 2 == 1)
    }

    fn read_word(&mut self) -> Option<Word> {
        self.take(Word::BYTES).map(Word::from_be_slice)
    }

    fn read_bytes(&mut self) -> Option<Bytes> {
        let len = self.read_u16()?;
        self.take(usize::from(len)).map(Bytes::copy_from_slice)
    }
}

/// Iterates over calls without storage sections.
impl Iterator for InputReader<'_> {
    type Item = FuzzInput;

    fn next(&mut self) -> Option<FuzzInput> {
        self.next_input(None)
    }
}

/// Encodes calls in the layout [`InputReader`] decodes. Used to build corpora and test inputs.
#[derive(Debug, Clone, Default)]
pub struct InputWriter {
    data: Vec<u8>,
}

impl InputWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call without a storage section.
    #[must_use]
    pub fn call(self, caller: Address, calldata: &[u8], timestamp: u64, block_number: u64) -> Self {
        self.push(caller, calldata, None, timestamp, block_number)
    }

    /// Append a call with a storage section, terminated by an even flag.
    ///
    /// The terminator is written even when `storage` is empty, so the record decodes with
    /// [`InputReader::next_input`] given a storage.
    ///
    /// # Panics
    ///
    /// Panics if `calldata` is longer than `u16::MAX` bytes.
    #[must_use]
    pub fn call_with_storage(
        self,
        caller: Address,
        calldata: &[u8],
        storage: &[(Word, Word)],
        timestamp: u64,
        block_number: u64,
    ) -> Self {
        self.push(caller, calldata, Some(storage), timestamp, block_number)
    }

    fn push(
        mut self,
        caller: Address,
        calldata: &[u8],
        storage: Option<&[(Word, Word)]>,
        timestamp: u64,
        block_number: u64,
    ) -> Self {
        let len = u16::try_from(calldata.len()).expect("calldata longer than u16::MAX");

        self.data.extend_from_slice(&Word::from(caller).to_be_bytes());
        self.data.extend_from_slice(&len.to_be_bytes());
        self.data.extend_from_slice(calldata);
        if let Some(storage) = storage {
            for (slot, value) in storage {
                self.data.extend_from_slice(&1u16.to_be_bytes());
                self.data.extend_from_slice(&slot.to_be_bytes());
                self.data.extend_from_slice(&value.to_be_bytes());
            }
            self.data.extend_from_slice(&0u16.to_be_bytes());
        }
        self.data.extend_from_slice(&timestamp.to_be_bytes());
        self.data.extend_from_slice(&block_number.to_be_bytes());
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.data
    }
}
