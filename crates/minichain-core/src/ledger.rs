//! The ledger owns the chain, the pending-transaction pool and the peer
//! registry, and composes hashing and proof-of-work to mine new blocks.

use crate::constants::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF, MINING_REWARD, REWARD_SENDER};
use crate::{hash, unix_timestamp, Block, LedgerError, ProofOfWork, Transaction};
use std::collections::BTreeSet;
use tracing::info;
use url::Url;

pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    nodes: BTreeSet<String>,
    node_id: String,
    pow: ProofOfWork,
}

impl Ledger {
    /// A fresh ledger at default difficulty, seeded with its genesis block.
    pub fn new(node_id: impl Into<String>) -> Self {
        Self::with_pow(node_id, ProofOfWork::default())
    }

    /// A fresh ledger using `pow` for mining and validation. The genesis
    /// block (index 1, fixed proof, sentinel previous hash) is appended
    /// here so the chain is never observed empty.
    pub fn with_pow(node_id: impl Into<String>, pow: ProofOfWork) -> Self {
        let genesis = Block {
            index: 1,
            timestamp: unix_timestamp(),
            transactions: Vec::new(),
            proof: GENESIS_PROOF,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        };
        Self {
            chain: vec![genesis],
            pending: Vec::new(),
            nodes: BTreeSet::new(),
            node_id: node_id.into(),
            pow,
        }
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    /// Registered peer network locations, deduplicated and sorted.
    pub fn nodes(&self) -> &BTreeSet<String> {
        &self.nodes
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn pow(&self) -> &ProofOfWork {
        &self.pow
    }

    pub fn last_block(&self) -> Result<&Block, LedgerError> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Adds a peer address to the registry, normalized to a canonical
    /// network location. Idempotent; returns whether the entry was new.
    pub fn register_node(&mut self, address: &str) -> Result<bool, LedgerError> {
        let location = canonical_location(address)?;
        Ok(self.nodes.insert(location))
    }

    /// Queues a transaction for the next mined block and returns the index
    /// of the block it will land in.
    pub fn submit_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: u64,
    ) -> Result<u64, LedgerError> {
        let next_index = self.last_block()?.index + 1;
        self.pending.push(Transaction {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        });
        Ok(next_index)
    }

    /// The `(last_proof, last_hash)` pair a proof-of-work search for the
    /// next block must run against. Callers that search off-thread read
    /// this first, solve without any lock held, then call
    /// [`Self::seal_block`] with the result.
    pub fn mining_inputs(&self) -> Result<(u64, String), LedgerError> {
        let last = self.last_block()?;
        Ok((last.proof, hash::block_hash(last)))
    }

    /// Mines the next block synchronously: solve against the current tip,
    /// then seal. Blocks the caller for the whole search.
    pub fn mine(&mut self) -> Result<Block, LedgerError> {
        let (last_proof, last_hash) = self.mining_inputs()?;
        let proof = self.pow.solve(last_proof, &last_hash);
        self.seal_block(proof, last_hash)
    }

    /// Appends a block carrying the pending pool plus this node's reward
    /// transaction, then clears the pool. `previous_hash` must still be the
    /// hash of the current tip; otherwise the proof was computed against a
    /// tip that no longer exists and nothing is mutated.
    pub fn seal_block(
        &mut self,
        proof: u64,
        previous_hash: String,
    ) -> Result<Block, LedgerError> {
        let last = self.last_block()?;
        if hash::block_hash(last) != previous_hash {
            return Err(LedgerError::StaleProof {
                expected: previous_hash,
            });
        }
        let index = last.index + 1;
        self.pending.push(Transaction {
            sender: REWARD_SENDER.to_string(),
            recipient: self.node_id.clone(),
            amount: MINING_REWARD,
        });
        let block = Block {
            index,
            timestamp: unix_timestamp(),
            transactions: std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        };
        self.chain.push(block.clone());
        info!(index, proof, "sealed new block");
        Ok(block)
    }

    /// Unconditionally adopts `chain` as the local chain. The caller
    /// (consensus resolution) is responsible for validating it and for
    /// comparing lengths first.
    pub fn replace_chain(&mut self, chain: Vec<Block>) {
        self.chain = chain;
    }
}

/// Normalizes a peer address to a canonical network-location string:
/// `host` or `host:port` when a host is recognizable (retrying with an
/// `http://` prefix for bare `host:port` forms), else a non-empty path
/// component as a lenient fallback for non-URL addresses.
fn canonical_location(address: &str) -> Result<String, LedgerError> {
    let trimmed = address.trim();
    let with_host = |candidate: &str| {
        Url::parse(candidate)
            .ok()
            .filter(|url| url.host_str().is_some())
    };
    // Only scheme-less inputs get the prefix retry; anything already
    // carrying a scheme must parse with a host on its own, or a degenerate
    // input like "http://" would sneak its scheme in as a host.
    let parsed = with_host(trimmed).or_else(|| {
        if trimmed.contains("://") {
            None
        } else {
            with_host(&format!("http://{trimmed}"))
        }
    });
    if let Some(url) = parsed {
        if let Some(host) = url.host_str() {
            return Ok(match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            });
        }
    }
    let path = trimmed.trim_matches('/');
    if !path.is_empty() && !path.contains("://") {
        return Ok(path.to_string());
    }
    Err(LedgerError::InvalidAddress(address.to_string()))
}
