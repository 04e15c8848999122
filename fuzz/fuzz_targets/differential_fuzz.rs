#![no_main]
use beacon_roots::{
    harness::fuzz_input::InputReader,
    ContractStorage,
    DifferentialChecker,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Err(mismatch) = DifferentialChecker::run(data) {
        // Dump the calls with their storage sections as replayable vectors before failing.
        let mut reader = InputReader::new(data);
        let mut vectors = Vec::new();
        loop {
            let mut seed = ContractStorage::new();
            let Some(input) = reader.next_input(Some(&mut seed)) else {
                break;
            };
            vectors.push(input.to_vector(&seed));
        }
        if let Ok(json) = serde_json::to_string_pretty(&vectors) {
            eprintln!("{json}");
        }
        panic!("{mismatch}");
    }
});
