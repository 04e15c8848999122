pub use alloy_primitives::{
    Address,
    B256,
    Bytes,
    U256,
    address,
    b256,
    bytes,
};

use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
    de,
};
use std::{
    borrow::Cow,
    fmt,
    ops::{
        Add,
        Rem,
    },
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WordError {
    #[error("invalid hex word {input:?}: {source}")]
    InvalidHex {
        input: String,
        #[source]
        source: hex::FromHexError,
    },
}

/// A 256-bit EVM word.
///
/// All arithmetic wraps modulo 2^256 and every constructor reduces its input into that range,
/// so a `Word` is always a valid storage key, storage value or stack item.
/// The canonical byte form is 32 bytes, big-endian, left-zero-padded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Word(U256);

impl Word {
    pub const ZERO: Self = Self(U256::ZERO);
    pub const MAX: Self = Self(U256::MAX);

    /// Size of the canonical encoding in bytes.
    pub const BYTES: usize = 32;

    /// Interpret `bytes` as the big-endian number they encode.
    ///
    /// Any length is accepted. Inputs longer than 32 bytes are reduced mod 2^256, which keeps the
    /// trailing 32 bytes.
    #[must_use]
    pub fn from_be_slice(bytes: &[u8]) -> Self {
        let tail = &bytes[bytes.len().saturating_sub(Self::BYTES)..];
        Self(U256::from_be_slice(tail))
    }

    /// Coerce raw call data into a storage word the way `CALLDATALOAD(0)` does.
    ///
    /// Only the first 32 bytes are read. Shorter input is zero padded on the right, so
    /// `0x11` becomes `0x1100..00`.
    #[must_use]
    pub fn from_left_aligned(bytes: &[u8]) -> Self {
        let mut word = [0u8; Self::BYTES];
        let len = bytes.len().min(Self::BYTES);
        word[..len].copy_from_slice(&bytes[..len]);
        Self::from(word)
    }

    /// Parse base-16 text, with or without a `0x` prefix.
    ///
    /// Odd digit counts are accepted, empty text is zero, and values wider than 256 bits are
    /// reduced mod 2^256.
    ///
    /// # Errors
    ///
    /// Returns [`WordError::InvalidHex`] if the text contains a non-hex character.
    pub fn from_hex(text: &str) -> Result<Self, WordError> {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);

        let digits: Cow<'_, str> = if digits.len() % 2 == 1 {
            Cow::Owned(format!("0{digits}"))
        } else {
            Cow::Borrowed(digits)
        };

        let bytes = hex::decode(digits.as_ref()).map_err(|source| {
            WordError::InvalidHex {
                input: text.to_owned(),
                source,
            }
        })?;

        Ok(Self::from_be_slice(&bytes))
    }

    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 32] {
        self.0.to_be_bytes::<32>()
    }

    #[must_use]
    pub fn to_b256(self) -> B256 {
        B256::from(self.to_be_bytes())
    }

    /// The low 20 bytes of the word, as an address.
    #[must_use]
    pub fn into_address(self) -> Address {
        Address::from_word(self.to_b256())
    }

    /// Canonical text form: `0x` followed by minimal lowercase hex digits.
    pub fn to_hex_string(&self) -> String {
        format!("0x{:x}", self.0)
    }
}

impl From<u64> for Word {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for Word {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<[u8; 32]> for Word {
    fn from(bytes: [u8; 32]) -> Self {
        Self(U256::from_be_bytes(bytes))
    }
}

impl From<B256> for Word {
    fn from(value: B256) -> Self {
        Self::from(value.0)
    }
}

impl From<Address> for Word {
    fn from(address: Address) -> Self {
        Self::from(address.into_word())
    }
}

impl From<Word> for U256 {
    fn from(word: Word) -> Self {
        word.0
    }
}

impl From<Word> for B256 {
    fn from(word: Word) -> Self {
        word.to_b256()
    }
}

impl Add for Word {
    type Output = Word;

    fn add(self, rhs: Word) -> Word {
        Word(self.0.wrapping_add(rhs.0))
    }
}

impl Add<u64> for Word {
    type Output = Word;

    fn add(self, rhs: u64) -> Word {
        self + Word::from(rhs)
    }
}

/// `x % 0` is zero, matching the EVM `MOD` opcode.
impl Rem for Word {
    type Output = Word;

    fn rem(self, rhs: Word) -> Word {
        Word(self.0.checked_rem(rhs.0).unwrap_or_default())
    }
}

impl Rem<u64> for Word {
    type Output = Word;

    fn rem(self, rhs: u64) -> Word {
        self % Word::from(rhs)
    }
}

impl PartialEq<u64> for Word {
    fn eq(&self, other: &u64) -> bool {
        self.0 == U256::from(*other)
    }
}

impl PartialEq<[u8; 32]> for Word {
    fn eq(&self, other: &[u8; 32]) -> bool {
        *self == Word::from(*other)
    }
}

impl PartialEq<B256> for Word {
    fn eq(&self, other: &B256) -> bool {
        *self == other.0
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Serialized as canonical hex text.
impl Serialize for Word {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

/// Accepts a non-negative JSON integer, hex text, or an array of big-endian bytes.
impl<'de> Deserialize<'de> for Word {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(WordVisitor)
    }
}

struct WordVisitor;

impl<'de> de::Visitor<'de> for WordVisitor {
    type Value = Word;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an unsigned integer, a hex string or a byte array")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Word, E> {
        Ok(Word::from(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Word, E> {
        u64::try_from(value)
            .map(Word::from)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<Word, E> {
        Ok(Word::from_be_slice(&value.to_be_bytes()))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Word, E> {
        Word::from_hex(value).map_err(E::custom)
    }

    fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Word, E> {
        Ok(Word::from_be_slice(value))
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Word, A::Error> {
        let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(Word::BYTES));
        while let Some(byte) = seq.next_element::<u8>()? {
            bytes.push(byte);
        }
        Ok(Word::from_be_slice(&bytes))
    }
}
