#![no_main]
use beacon_roots::{
    harness::fuzz_input::InputReader,
    ContractStorage,
    InvariantChecker,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Err(violation) = InvariantChecker::run(data) {
        // Dump the offending calls as replayable vectors before failing.
        let vectors: Vec<_> = InputReader::new(data)
            .map(|input| input.to_vector(&ContractStorage::new()))
            .collect();
        if let Ok(json) = serde_json::to_string_pretty(&vectors) {
            eprintln!("{json}");
        }
        panic!("{violation}");
    }
});
