//! Subcommand implementations. Each returns the text to print on stdout.

use anyhow::{
    Context,
    Result,
};
use beacon_roots::{
    ContractStorage,
    DifferentialChecker,
    InvariantChecker,
    ResultOutput,
    TestVector,
    harness::fuzz_input::InputReader,
    run_json_batch,
};
use std::{
    io::Read,
    path::Path,
};
use tracing::{
    info,
    warn,
};

/// Run the vector(s) in `input` and render the result(s) as JSON.
pub fn run(input: &str, pretty: bool) -> Result<String> {
    let output = run_json_batch(input).context("failed to run test vector")?;

    if let ResultOutput::Batch(results) = &output {
        let reverted = results.iter().filter(|result| result.ret.reverted).count();
        info!(calls = results.len(), reverted, "ran test vectors");
    }

    let json = if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    };
    json.context("failed to encode execution result")
}

/// Replay a corpus and report how many calls passed the invariant checks.
pub fn invariants(data: &[u8]) -> Result<String> {
    let calls = InvariantChecker::run(data)
        .inspect_err(|e| warn!(error = %e, "invariant violated"))
        .context("corpus failed invariant checks")?;
    info!(calls, bytes = data.len(), "corpus passed invariant checks");
    Ok(calls.to_string())
}

/// Replay a corpus with storage sections against the bytecode and report how many calls agreed.
pub fn differential(data: &[u8]) -> Result<String> {
    let calls = DifferentialChecker::run(data)
        .inspect_err(|e| warn!(error = %e, "bytecode disagrees"))
        .context("corpus failed differential check")?;
    info!(calls, bytes = data.len(), "corpus matches the bytecode");
    Ok(calls.to_string())
}

/// Decode a corpus into the JSON test vectors it describes.
///
/// With `with_storage`, each vector is seeded with the storage entries of its own record.
pub fn decode(data: &[u8], with_storage: bool) -> Result<String> {
    let mut reader = InputReader::new(data);
    let mut vectors: Vec<TestVector> = Vec::new();

    loop {
        let mut seed = ContractStorage::new();
        let input = if with_storage {
            reader.next_input(Some(&mut seed))
        } else {
            reader.next_input(None)
        };
        let Some(input) = input else {
            break;
        };
        vectors.push(input.to_vector(&seed));
    }

    if reader.remaining() > 0 {
        warn!(trailing = reader.remaining(), "ignoring incomplete trailing record");
    }
    info!(vectors = vectors.len(), "decoded corpus");

    serde_json::to_string_pretty(&vectors).context("failed to encode test vectors")
}

pub fn read_text(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}
