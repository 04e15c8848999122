#![no_main]
use beacon_roots::{
    run_json,
    run_json_batch,
    HarnessError,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // Arbitrary text either decodes or is rejected; it never panics.
    match run_json(input) {
        Ok(result) => {
            assert!(!result.ret.reverted || result.ret.data.is_empty());
            assert_eq!(result.hash, 0);
            result.to_json().unwrap();
        }
        Err(HarnessError::Decode(_)) => {}
        Err(e) => panic!("unexpected harness error: {e}"),
    }
    let _ = run_json_batch(input);
});
