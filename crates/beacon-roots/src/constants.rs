use crate::primitives::{
    Address,
    address,
};

/// The only caller allowed to record beacon roots.
/// Every other caller takes the query path.
pub const SYSTEM_ADDRESS: Address = address!("fffffffffffffffffffffffffffffffffffffffe");

/// Number of buckets in each of the two ring buffers (timestamps, roots).
pub const HISTORICAL_ROOTS_MODULUS: u64 = 98304;

/// Shanghai activation timestamp on mainnet.
pub const SHANGHAI_TIMESTAMP: u64 = 1_681_338_455;

/// Lower bound applied to timestamps decoded from fuzzer input.
/// Shanghai is the earliest fork with `PUSH0`, which the contract bytecode relies on.
pub const FORK_TIMESTAMP: u64 = SHANGHAI_TIMESTAMP;

/// Lower bound applied to block numbers decoded from fuzzer input.
pub const LONDON_BLOCK: u64 = 12_965_000;
