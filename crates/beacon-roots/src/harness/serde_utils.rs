//! Serde adapters for the loosely typed fields of a test vector.

use crate::primitives::{
    Address,
    Bytes,
    Word,
};
use serde::{
    Deserialize,
    Deserializer,
    Serializer,
};

/// An address given in any word form (integer, hex text, bytes), reduced to its low 20 bytes.
pub mod address {
    use super::*;

    pub fn serialize<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(address)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        Ok(Word::deserialize(deserializer)?.into_address())
    }
}

/// Raw bytes given as hex text (optional `0x`) or as an array of byte values.
pub mod calldata {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Hex(String),
        Raw(Vec<u8>),
    }

    pub fn serialize<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Hex(text) => {
                let digits = text
                    .strip_prefix("0x")
                    .or_else(|| text.strip_prefix("0X"))
                    .unwrap_or(&text);
                hex::decode(digits)
                    .map(Bytes::from)
                    .map_err(serde::de::Error::custom)
            }
            Repr::Raw(bytes) => Ok(Bytes::from(bytes)),
        }
    }
}
