//! Differential execution against the contract bytecode.
//!
//! [`DifferentialChecker`] runs every decoded call twice: once through [`BeaconRootsContract`] and
//! once through [`BEACON_ROOTS_CODE`] deployed in a revm [`InMemoryDB`]. Both sides keep their
//! storage between calls and receive the same storage section before each call. The first call
//! where the returned [`ReturnValue`] or a written slot differs is reported.

use crate::{
    constants::SYSTEM_ADDRESS,
    context::Outcome,
    contract::BeaconRootsContract,
    harness::{
        ReturnValue,
        fuzz_input::{
            FuzzInput,
            InputReader,
        },
    },
    primitives::{
        Address,
        Bytes,
        U256,
        Word,
        address,
        bytes,
    },
    storage::ContractStorage,
};
use alloy_primitives::keccak256;
use revm::{
    Context,
    ExecuteEvm,
    MainBuilder,
    MainContext,
    bytecode::Bytecode,
    context::{
        BlockEnv,
        CfgEnv,
        TxEnv,
        result::ExecutionResult,
    },
    database::{
        Database,
        DatabaseCommit,
        InMemoryDB,
    },
    primitives::{
        TxKind,
        hardfork::SpecId,
    },
    state::AccountInfo,
};
use thiserror::Error;

/// Address the bytecode is deployed at.
pub const BEACON_ROOTS_ADDRESS: Address = address!("beac00541d49391ed88abf392bfc1f4dea8c4143");

/// Runtime bytecode of the contract, using `HISTORICAL_ROOTS_MODULUS` (`0x018000`) buckets.
pub static BEACON_ROOTS_CODE: Bytes = bytes!(
    "3373fffffffffffffffffffffffffffffffffffffffe14604457602036146024575f5ffd5b620180005f350680545f35146037575f5ffd5b6201800001545f5260205ff35b6201800042064281555f359062018000015500"
);

const GAS_LIMIT: u64 = 10_000_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("bytecode halted: {0}")]
    Halted(String),
    #[error("transaction rejected: {0}")]
    Transaction(String),
    #[error("database error: {0}")]
    Database(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DifferentialError {
    #[error("call {call}: contract returned {ours:?}, bytecode returned {evm:?}")]
    ReturnMismatch {
        call: usize,
        ours: ReturnValue,
        evm: ReturnValue,
    },
    #[error("call {call}: slot {slot} holds {ours} in the contract and {evm} in the bytecode")]
    StorageMismatch {
        call: usize,
        slot: Word,
        ours: Word,
        evm: Word,
    },
    #[error("call {call}: {source}")]
    Oracle {
        call: usize,
        #[source]
        source: OracleError,
    },
}

/// The contract bytecode running on revm over an in-memory state.
#[derive(Debug)]
pub struct EvmOracle {
    db: InMemoryDB,
}

impl Default for EvmOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl EvmOracle {
    pub fn new() -> Self {
        let mut db = InMemoryDB::default();
        db.insert_account_info(
            BEACON_ROOTS_ADDRESS,
            AccountInfo {
                nonce: 1,
                balance: U256::ZERO,
                code_hash: keccak256(&BEACON_ROOTS_CODE),
                code: Some(Bytecode::new_legacy(BEACON_ROOTS_CODE.clone())),
            },
        );
        Self { db }
    }

    /// Write `value` into `slot` of the contract account.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Database`] if the database rejects the write.
    pub fn set_storage(&mut self, slot: Word, value: Word) -> Result<(), OracleError> {
        self.db
            .insert_account_storage(BEACON_ROOTS_ADDRESS, slot.into(), value.into())
            .map_err(|e| OracleError::Database(e.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`OracleError::Database`] if the slot cannot be loaded.
    pub fn storage(&mut self, slot: Word) -> Result<Word, OracleError> {
        self.db
            .storage(BEACON_ROOTS_ADDRESS, slot.into())
            .map(Word::from)
            .map_err(|e| OracleError::Database(e.to_string()))
    }

    /// Execute `input` as a transaction to the contract and commit its state changes.
    ///
    /// # Errors
    ///
    /// Returns an [`OracleError`] if revm rejects the transaction or the bytecode halts.
    pub fn call(&mut self, input: &FuzzInput) -> Result<Outcome, OracleError> {
        let nonce = self
            .db
            .basic(input.caller)
            .map_err(|e| OracleError::Database(e.to_string()))?
            .map_or(0, |info| info.nonce);

        // Block number and timestamp are u64 or U256 depending on the revm release.
        let mut block = BlockEnv::default();
        block.number = input.block_number.try_into().unwrap_or_default();
        block.timestamp = input.timestamp.try_into().unwrap_or_default();
        block.basefee = 0;

        let mut cfg_env = CfgEnv::default();
        cfg_env.spec = SpecId::SHANGHAI;

        let tx_env = TxEnv {
            kind: TxKind::Call(BEACON_ROOTS_ADDRESS),
            caller: input.caller,
            data: input.calldata.clone(),
            nonce,
            gas_price: 0,
            gas_limit: GAS_LIMIT,
            ..Default::default()
        };

        let result_and_state = {
            let mut evm = Context::mainnet()
                .with_db(&mut self.db)
                .with_block(block)
                .with_cfg(cfg_env)
                .build_mainnet();
            evm.transact(tx_env)
                .map_err(|e| OracleError::Transaction(e.to_string()))?
        };
        self.db.commit(result_and_state.state);

        match result_and_state.result {
            ExecutionResult::Success { output, .. } => Ok(Outcome::Returned(output.into_data())),
            ExecutionResult::Revert { .. } => Ok(Outcome::Reverted),
            ExecutionResult::Halt { reason, .. } => Err(OracleError::Halted(format!("{reason:?}"))),
        }
    }
}

/// Replays calls against [`BeaconRootsContract`] and [`EvmOracle`] side by side.
#[derive(Debug, Default)]
pub struct DifferentialChecker {
    storage: ContractStorage,
    oracle: EvmOracle,
    calls: usize,
}

impl DifferentialChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `data`, storage sections included, and compare every call in it.
    ///
    /// Returns the number of calls compared.
    ///
    /// # Errors
    ///
    /// Returns the first [`DifferentialError`] encountered.
    pub fn run(data: &[u8]) -> Result<usize, DifferentialError> {
        let mut checker = Self::new();
        let mut reader = InputReader::new(data);

        loop {
            let mut seed = ContractStorage::new();
            let Some(input) = reader.next_input(Some(&mut seed)) else {
                break;
            };
            checker.check(&input, &seed)?;
        }

        Ok(checker.calls)
    }

    /// Apply `seed` to both sides, execute `input` on both and compare.
    ///
    /// Calls sent from [`BEACON_ROOTS_ADDRESS`] itself are skipped and return `None`: revm
    /// rejects transactions from an account with code.
    ///
    /// # Errors
    ///
    /// Returns a [`DifferentialError`] if the two sides disagree or the EVM fails.
    pub fn check(
        &mut self,
        input: &FuzzInput,
        seed: &ContractStorage,
    ) -> Result<Option<ReturnValue>, DifferentialError> {
        if input.caller == BEACON_ROOTS_ADDRESS {
            tracing::trace!(caller = %input.caller, "skipping call from the contract account");
            return Ok(None);
        }

        self.calls += 1;
        let call = self.calls;
        let oracle_err = |source| DifferentialError::Oracle { call, source };

        for (slot, value) in seed {
            self.storage.set(*slot, *value);
            self.oracle.set_storage(*slot, *value).map_err(oracle_err)?;
        }

        let ours = ReturnValue::from(&BeaconRootsContract::execute(
            &mut input.context(&mut self.storage),
        ));
        let evm = ReturnValue::from(&self.oracle.call(input).map_err(oracle_err)?);

        if ours != evm {
            return Err(DifferentialError::ReturnMismatch { call, ours, evm });
        }

        if input.caller == SYSTEM_ADDRESS {
            let timestamp = Word::from(input.timestamp);
            for slot in [
                BeaconRootsContract::timestamp_index(timestamp),
                BeaconRootsContract::root_index(timestamp),
            ] {
                let ours = self.storage.get(slot);
                let evm = self.oracle.storage(slot).map_err(oracle_err)?;
                if ours != evm {
                    return Err(DifferentialError::StorageMismatch {
                        call,
                        slot,
                        ours,
                        evm,
                    });
                }
            }
        }

        tracing::trace!(call, reverted = ours.reverted, "bytecode agrees");
        Ok(Some(ours))
    }

    pub fn storage(&self) -> &ContractStorage {
        &self.storage
    }

    /// Number of calls compared so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::{
            FORK_TIMESTAMP,
            LONDON_BLOCK,
        },
        harness::fuzz_input::InputWriter,
    };

    const USER: Address = address!("0000000000000000000000000000000000000009");
    const MODULUS: u64 = BeaconRootsContract::HISTORICAL_ROOTS_MODULUS;

    fn call(caller: Address, calldata: &[u8], timestamp: u64) -> FuzzInput {
        FuzzInput {
            caller,
            calldata: Bytes::copy_from_slice(calldata),
            timestamp,
            block_number: LONDON_BLOCK,
        }
    }

    #[test]
    fn test_bytecode_record_then_query() {
        let mut oracle = EvmOracle::new();
        let timestamp = FORK_TIMESTAMP + 12;

        let recorded = oracle.call(&call(SYSTEM_ADDRESS, &[0x11; 32], timestamp)).unwrap();
        let queried = oracle
            .call(&call(USER, &Word::from(timestamp).to_be_bytes(), 0))
            .unwrap();

        assert_eq!(recorded, Outcome::Returned(Bytes::new()));
        assert_eq!(queried.data(), &[0x11u8; 32]);
        assert_eq!(
            oracle.storage(Word::from(timestamp % MODULUS)).unwrap(),
            timestamp
        );
    }

    #[test]
    fn test_bytecode_bad_length_reverts() {
        let mut oracle = EvmOracle::new();

        for len in [0, 31, 33] {
            let outcome = oracle.call(&call(USER, &vec![0u8; len], 0)).unwrap();
            assert!(outcome.is_reverted(), "len {len}");
        }
    }

    #[test]
    fn test_record_and_queries_agree() {
        let timestamp = FORK_TIMESTAMP + 12;
        let data = InputWriter::new()
            .call_with_storage(SYSTEM_ADDRESS, &[0xab, 0xcd], &[], timestamp, LONDON_BLOCK)
            .call_with_storage(
                USER,
                &Word::from(timestamp).to_be_bytes(),
                &[],
                timestamp,
                LONDON_BLOCK,
            )
            .call_with_storage(
                USER,
                &Word::from(timestamp + 1).to_be_bytes(),
                &[],
                timestamp,
                LONDON_BLOCK,
            )
            .call_with_storage(USER, &[0x01], &[], timestamp, LONDON_BLOCK)
            .finish();

        assert_eq!(DifferentialChecker::run(&data), Ok(4));
    }

    #[test]
    fn test_storage_section_reaches_both_sides() {
        let timestamp = FORK_TIMESTAMP + 7;
        let timestamp_idx = BeaconRootsContract::timestamp_index(Word::from(timestamp));
        let seed = [
            (timestamp_idx, Word::from(timestamp)),
            (BeaconRootsContract::root_index(Word::from(timestamp)), Word::MAX),
        ];
        let data = InputWriter::new()
            .call_with_storage(
                USER,
                &Word::from(timestamp).to_be_bytes(),
                &seed,
                FORK_TIMESTAMP,
                LONDON_BLOCK,
            )
            .finish();

        let mut checker = DifferentialChecker::new();
        let mut storage = ContractStorage::new();
        let input = InputReader::new(&data)
            .next_input(Some(&mut storage))
            .unwrap();
        let ret = checker.check(&input, &storage).unwrap().unwrap();

        assert!(!ret.reverted);
        assert_eq!(ret.data, "ff".repeat(32));
        assert_eq!(checker.storage().get(timestamp_idx), timestamp);
    }

    #[test]
    fn test_eviction_agrees() {
        let timestamp = FORK_TIMESTAMP + 5;
        let data = InputWriter::new()
            .call_with_storage(SYSTEM_ADDRESS, &[0x11; 32], &[], timestamp, LONDON_BLOCK)
            .call_with_storage(SYSTEM_ADDRESS, &[0x22; 32], &[], timestamp + MODULUS, LONDON_BLOCK)
            .call_with_storage(
                USER,
                &Word::from(timestamp).to_be_bytes(),
                &[],
                timestamp,
                LONDON_BLOCK,
            )
            .call_with_storage(
                USER,
                &Word::from(timestamp + MODULUS).to_be_bytes(),
                &[],
                timestamp,
                LONDON_BLOCK,
            )
            .finish();

        assert_eq!(DifferentialChecker::run(&data), Ok(4));
    }

    #[test]
    fn test_call_from_contract_account_is_skipped() {
        let mut checker = DifferentialChecker::new();

        let ret = checker
            .check(&call(BEACON_ROOTS_ADDRESS, &[], FORK_TIMESTAMP), &ContractStorage::new())
            .unwrap();

        assert_eq!(ret, None);
        assert_eq!(checker.calls(), 0);
    }

    #[test]
    fn test_divergence_is_reported() {
        let timestamp = FORK_TIMESTAMP + 1;
        let mut checker = DifferentialChecker::new();
        let empty = ContractStorage::new();
        checker
            .check(&call(SYSTEM_ADDRESS, &[0x11; 32], timestamp), &empty)
            .unwrap();

        checker
            .storage
            .set(BeaconRootsContract::root_index(Word::from(timestamp)), 1u64);
        let err = checker
            .check(&call(USER, &Word::from(timestamp).to_be_bytes(), 0), &empty)
            .unwrap_err();

        assert!(matches!(err, DifferentialError::ReturnMismatch { call: 2, .. }));
    }
}
