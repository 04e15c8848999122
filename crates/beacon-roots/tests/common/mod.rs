#![allow(dead_code)]

use beacon_roots::{
    BeaconRootsContract,
    CallContext,
    ContractStorage,
    Outcome,
    Word,
    constants::SYSTEM_ADDRESS,
    primitives::{
        Address,
        Bytes,
    },
};
use rand::{
    Rng,
    SeedableRng,
    rngs::StdRng,
};

pub const MODULUS: u64 = BeaconRootsContract::HISTORICAL_ROOTS_MODULUS;

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A random caller that is never the system address.
pub fn random_user(rng: &mut StdRng) -> Address {
    loop {
        let mut bytes = [0u8; 20];
        rng.fill(&mut bytes);
        let caller = Address::from(bytes);
        if caller != SYSTEM_ADDRESS {
            return caller;
        }
    }
}

pub fn random_root(rng: &mut StdRng) -> [u8; 32] {
    let mut root = [0u8; 32];
    rng.fill(&mut root);
    root
}

/// A timestamp that is not zero, so it cannot match an empty bucket.
pub fn random_timestamp(rng: &mut StdRng) -> u64 {
    rng.random_range(1..u64::MAX / 2)
}

pub fn record(storage: &mut ContractStorage, timestamp: u64, root: &[u8]) -> Outcome {
    let mut ctx = CallContext::new(
        SYSTEM_ADDRESS,
        Bytes::copy_from_slice(root),
        timestamp,
        storage,
    );
    BeaconRootsContract::execute(&mut ctx)
}

pub fn query_as(
    storage: &mut ContractStorage,
    caller: Address,
    calldata: &[u8],
    timestamp: u64,
) -> Outcome {
    let mut ctx = CallContext::new(caller, Bytes::copy_from_slice(calldata), timestamp, storage);
    BeaconRootsContract::execute(&mut ctx)
}

pub fn query(storage: &mut ContractStorage, timestamp: u64) -> Outcome {
    query_as(
        storage,
        Address::with_last_byte(1),
        &Word::from(timestamp).to_be_bytes(),
        0,
    )
}
