//! Random call streams replayed against the contract and its bytecode.

mod common;

use beacon_roots::{
    DifferentialChecker,
    Word,
    constants::{
        FORK_TIMESTAMP,
        LONDON_BLOCK,
        SYSTEM_ADDRESS,
    },
    harness::fuzz_input::InputWriter,
};
use common::*;
use rand::{
    Rng,
    rngs::StdRng,
};

const SEEDS: u64 = 8;
const CALLS: usize = 64;

/// Timestamps drawn from a few buckets so records collide and evict each other.
fn clustered_timestamp(rng: &mut StdRng) -> u64 {
    FORK_TIMESTAMP + rng.random_range(0..4) * MODULUS + rng.random_range(0..8)
}

fn random_stream(rng: &mut StdRng) -> Vec<u8> {
    let mut writer = InputWriter::new();
    let mut recorded = Vec::new();

    for _ in 0..CALLS {
        let timestamp = clustered_timestamp(rng);
        let mut seed = Vec::new();
        if rng.random_bool(0.2) {
            // Plant a matching bucket so the query path can succeed from seeded state.
            let planted = clustered_timestamp(rng);
            seed.push((Word::from(planted % MODULUS), Word::from(planted)));
            seed.push((
                Word::from(planted % MODULUS + MODULUS),
                Word::from(random_root(rng)),
            ));
            recorded.push(planted);
        }

        writer = match rng.random_range(0..4) {
            0 => {
                recorded.push(timestamp);
                let root = random_root(rng);
                let len = rng.random_range(0..=32);
                writer.call_with_storage(
                    SYSTEM_ADDRESS,
                    &root[..len],
                    &seed,
                    timestamp,
                    LONDON_BLOCK,
                )
            }
            1 if !recorded.is_empty() => {
                let asked = recorded[rng.random_range(0..recorded.len())];
                writer.call_with_storage(
                    random_user(rng),
                    &Word::from(asked).to_be_bytes(),
                    &seed,
                    timestamp,
                    LONDON_BLOCK,
                )
            }
            2 => {
                let len = rng.random_range(0..64);
                writer.call_with_storage(
                    random_user(rng),
                    &vec![0x5a; len],
                    &seed,
                    timestamp,
                    LONDON_BLOCK,
                )
            }
            _ => {
                writer.call_with_storage(
                    random_user(rng),
                    &Word::from(clustered_timestamp(rng)).to_be_bytes(),
                    &seed,
                    timestamp,
                    LONDON_BLOCK,
                )
            }
        };
    }

    writer.finish()
}

#[test]
fn test_random_streams_match_bytecode() {
    for seed in 0..SEEDS {
        let mut rng = rng(seed);
        let data = random_stream(&mut rng);

        assert_eq!(DifferentialChecker::run(&data), Ok(CALLS), "seed {seed}");
    }
}

#[test]
fn test_truncated_stream_checks_complete_calls() {
    let mut rng = rng(99);
    let data = random_stream(&mut rng);

    let calls = DifferentialChecker::run(&data[..data.len() - 1]).unwrap();

    assert_eq!(calls, CALLS - 1);
}
