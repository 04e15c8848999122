//! EIP-4788 beacon roots contract logic.
//!
//! This crate models the beacon roots system contract as plain Rust: a 256-bit [`Word`] type,
//! a sparse [`ContractStorage`], a [`CallContext`] that ends in a revert or a return, and the
//! [`BeaconRootsContract`] record/query paths on top. The [`harness`] module runs JSON test
//! vectors against it, [`invariants`] checks decoded fuzzer input and [`differential`] compares
//! every call with the contract bytecode running on revm.

pub mod constants;
pub mod context;
pub mod contract;
pub mod differential;
mod error;
pub mod harness;
pub mod invariants;
pub mod primitives;
pub mod storage;

pub use context::{
    CallContext,
    Outcome,
    ReturnData,
};
pub use contract::BeaconRootsContract;
pub use differential::{
    DifferentialChecker,
    DifferentialError,
    EvmOracle,
    OracleError,
};
pub use error::{
    HarnessError,
    Result,
};
pub use harness::{
    ExecutionResult,
    ResultOutput,
    ReturnValue,
    Session,
    TestVector,
    VectorInput,
    run_json,
    run_json_batch,
    run_vector,
};
pub use invariants::{
    InvariantChecker,
    InvariantViolation,
};
pub use primitives::{
    Word,
    WordError,
};
pub use storage::ContractStorage;
