//! Canonical block hashing.
//!
//! Two structurally equal blocks must hash identically on every node, no
//! matter which process built them or what wire format the transport used.
//! Canonical form: compact JSON with keys in lexicographic order at every
//! level, hashed with SHA-256 and rendered as lowercase hex.

use crate::{Block, Transaction};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Hex-encoded SHA-256 digest of the canonical JSON form of `block`.
pub fn block_hash(block: &Block) -> String {
    hex::encode(Sha256::digest(canonical_json(block).as_bytes()))
}

/// Field-sorted compact JSON rendering of `block`.
///
/// Key order comes from explicitly built `BTreeMap`s, not from serde's
/// struct-field ordering, so reordering a struct declaration can never
/// silently change every block hash in existence.
pub fn canonical_json(block: &Block) -> String {
    let txs: Vec<Value> = block.transactions.iter().map(transaction_value).collect();
    let mut fields = BTreeMap::new();
    fields.insert("index", json!(block.index));
    fields.insert("previous_hash", json!(block.previous_hash));
    fields.insert("proof", json!(block.proof));
    fields.insert("timestamp", json!(block.timestamp));
    fields.insert("transactions", Value::Array(txs));
    json!(fields).to_string()
}

fn transaction_value(tx: &Transaction) -> Value {
    let mut fields = BTreeMap::new();
    fields.insert("amount", json!(tx.amount));
    fields.insert("recipient", json!(tx.recipient));
    fields.insert("sender", json!(tx.sender));
    json!(fields)
}
