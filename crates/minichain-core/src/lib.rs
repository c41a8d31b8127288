//! Core engine of a minimal proof-of-work ledger node: block/transaction
//! data model, canonical hashing, proof-of-work search, chain validation,
//! the ledger state machine and the longest-valid-chain consensus rule.
//!
//! Networking and HTTP live in `minichain-node`; this crate only needs an
//! injected [`consensus::ChainFetcher`] to talk to peers.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod consensus;
pub mod constants;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod pow;
pub mod validate;

pub use error::LedgerError;
pub use ledger::Ledger;
pub use pow::ProofOfWork;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

/// One sealed unit of the chain. Immutable once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position in the chain.
    pub index: u64,
    /// Seconds since the Unix epoch at sealing time.
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    /// Solution of the proof-of-work puzzle binding this block to its
    /// predecessor.
    pub proof: u64,
    /// Canonical hash of the predecessor, or the genesis sentinel `"1"`.
    pub previous_hash: String,
}

impl Block {
    /// Canonical hash of this block. See [`hash::block_hash`].
    pub fn hash(&self) -> String {
        hash::block_hash(self)
    }
}

/// Current wall-clock time as fractional seconds since the Unix epoch.
pub fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_secs_f64()
}
