//! Conflict resolution across nodes: the longest valid peer chain wins.
//!
//! Fetching is injected through [`ChainFetcher`] so the resolver can be
//! exercised against fake peers; the node wires in an HTTP client.

use crate::{validate, Block, Ledger};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// A peer's full chain with its self-reported length. Doubles as the wire
/// shape of a node's chain endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeerChain {
    pub length: u64,
    pub chain: Vec<Block>,
}

/// A peer could not be queried. Expected and transient; resolution skips
/// the peer and moves on.
#[derive(Debug, Error)]
#[error("failed to fetch chain from {address}: {reason}")]
pub struct FetchError {
    pub address: String,
    pub reason: String,
}

/// Capability to retrieve a remote node's chain. Implemented over HTTP by
/// the node binary and by in-memory fakes in tests.
pub trait ChainFetcher {
    fn fetch_chain(&self, address: &str) -> Result<PeerChain, FetchError>;
}

/// Fetches every peer's chain, skipping (and logging) unreachable peers.
pub fn fetch_candidates(peers: &[String], fetcher: &dyn ChainFetcher) -> Vec<PeerChain> {
    let mut candidates = Vec::with_capacity(peers.len());
    for address in peers {
        match fetcher.fetch_chain(address) {
            Ok(peer) => candidates.push(peer),
            Err(err) => warn!(%err, "skipping unreachable peer"),
        }
    }
    candidates
}

/// Replaces the local chain with the longest candidate that is strictly
/// longer than it and passes validation. Returns whether a replacement
/// happened. Equal-length candidates never win; invalid chains are ignored
/// no matter how long they claim to be.
pub fn adopt_longest(
    ledger: &mut Ledger,
    candidates: impl IntoIterator<Item = PeerChain>,
) -> bool {
    let mut new_chain: Option<Vec<Block>> = None;
    let mut max_length = ledger.chain().len() as u64;
    for candidate in candidates {
        if candidate.length <= max_length {
            continue;
        }
        if !validate::valid_chain(&candidate.chain, ledger.pow()) {
            debug!(
                length = candidate.length,
                "ignoring longer but invalid peer chain"
            );
            continue;
        }
        max_length = candidate.length;
        new_chain = Some(candidate.chain);
    }
    match new_chain {
        Some(chain) => {
            ledger.replace_chain(chain);
            true
        }
        None => false,
    }
}

/// One full resolution pass over the ledger's registered peers: fetch each
/// chain, then adopt the longest valid one if it beats the local chain.
/// Returns true iff the local chain was replaced.
pub fn resolve_conflicts(ledger: &mut Ledger, fetcher: &dyn ChainFetcher) -> bool {
    let peers: Vec<String> = ledger.nodes().iter().cloned().collect();
    let candidates = fetch_candidates(&peers, fetcher);
    adopt_longest(ledger, candidates)
}
