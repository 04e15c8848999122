//! EIP-4788: Beacon Block Root in the EVM
//!
//! See also https://eips.ethereum.org/EIPS/eip-4788.
//!
//! Storage holds two ring buffers of `HISTORICAL_ROOTS_MODULUS` slots each:
//! - Slot `timestamp % HISTORICAL_ROOTS_MODULUS`: timestamp
//! - Slot `timestamp % HISTORICAL_ROOTS_MODULUS + HISTORICAL_ROOTS_MODULUS`: beacon root

use crate::{
    constants,
    context::{
        CallContext,
        Outcome,
    },
    primitives::{
        Address,
        Bytes,
        Word,
    },
};

/// Beacon roots contract marker type.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeaconRootsContract;

impl BeaconRootsContract {
    pub const SYSTEM_ADDRESS: Address = constants::SYSTEM_ADDRESS;
    pub const HISTORICAL_ROOTS_MODULUS: u64 = constants::HISTORICAL_ROOTS_MODULUS;

    /// Timestamp slot (first ring buffer).
    #[inline]
    pub fn timestamp_index(timestamp: Word) -> Word {
        timestamp % Self::HISTORICAL_ROOTS_MODULUS
    }

    /// Root slot (second ring buffer, offset by the buffer size).
    #[inline]
    pub fn root_index(timestamp: Word) -> Word {
        Self::timestamp_index(timestamp) + Self::HISTORICAL_ROOTS_MODULUS
    }

    /// Run one invocation.
    ///
    /// The system address records `(timestamp, calldata)`, every other caller queries the root
    /// stored for the timestamp given as calldata.
    pub fn execute(ctx: &mut CallContext<'_>) -> Outcome {
        if ctx.caller() == Self::SYSTEM_ADDRESS {
            tracing::trace!(path = "record", "dispatching call");
            Self::record(ctx)
        } else {
            tracing::trace!(path = "query", caller = %ctx.caller(), "dispatching call");
            Self::query(ctx)
        }
    }

    /// Record path: write the block timestamp and the root in calldata into their buckets.
    /// Never reverts and produces no output.
    fn record(ctx: &mut CallContext<'_>) -> Outcome {
        let timestamp = ctx.timestamp();
        let timestamp_idx = Self::timestamp_index(timestamp);
        let root_idx = timestamp_idx + Self::HISTORICAL_ROOTS_MODULUS;
        debug_assert!(in_bounds(timestamp_idx) && in_bounds(root_idx));

        let root = Word::from_left_aligned(ctx.calldata());
        tracing::debug!(
            %timestamp,
            %timestamp_idx,
            root = %root.to_b256(),
            "recording beacon root"
        );

        let storage = ctx.storage_mut();
        storage.set(timestamp_idx, timestamp);
        storage.set(root_idx, root);

        ctx.return_value(Bytes::new())
    }

    /// Query path: return the root recorded for the timestamp in calldata.
    ///
    /// Reverts if calldata is not exactly one word, or if the bucket holds a different
    /// timestamp. Never written and evicted buckets are indistinguishable.
    fn query(ctx: &mut CallContext<'_>) -> Outcome {
        let Ok(requested) = <[u8; 32]>::try_from(&ctx.calldata()[..]) else {
            tracing::debug!(
                caller = %ctx.caller(),
                len = ctx.calldata().len(),
                cause = "bad_calldata_length",
                "query reverted"
            );
            return ctx.revert();
        };

        let timestamp_idx = Self::timestamp_index(Word::from(requested));
        debug_assert!(in_bounds(timestamp_idx));

        let stored = ctx.storage().get(timestamp_idx);
        if stored != requested {
            tracing::debug!(
                caller = %ctx.caller(),
                %timestamp_idx,
                %stored,
                cause = "timestamp_mismatch",
                "query reverted"
            );
            return ctx.revert();
        }

        let root_idx = timestamp_idx + Self::HISTORICAL_ROOTS_MODULUS;
        debug_assert!(timestamp_idx < root_idx && in_bounds(root_idx));

        let root = ctx.storage().get(root_idx);
        tracing::trace!(%timestamp_idx, root = %root.to_b256(), "query returned");

        ctx.return_value(root)
    }
}

/// The contract only ever touches the first `2 * HISTORICAL_ROOTS_MODULUS` slots.
fn in_bounds(slot: Word) -> bool {
    slot < Word::from(2 * constants::HISTORICAL_ROOTS_MODULUS)
}
