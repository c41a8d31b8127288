//! Whole-chain validation: structural and proof-of-work continuity.

use crate::{hash, Block, ProofOfWork};

/// Checks that `chain` is internally consistent: every block after the
/// genesis links to its predecessor's canonical hash, continues its index,
/// and carries a proof satisfying `pow` against the predecessor.
///
/// The first block is trusted as genesis and not inspected. An empty slice
/// is rejected; a genesis-only chain is valid by definition. Pure function,
/// never mutates or performs I/O.
pub fn valid_chain(chain: &[Block], pow: &ProofOfWork) -> bool {
    let Some(mut prev) = chain.first() else {
        return false;
    };
    for block in &chain[1..] {
        if block.index != prev.index + 1 {
            return false;
        }
        let prev_hash = hash::block_hash(prev);
        if block.previous_hash != prev_hash {
            return false;
        }
        if !pow.is_valid(prev.proof, block.proof, &prev_hash) {
            return false;
        }
        prev = block;
    }
    true
}
