//! Proof-of-work puzzle: find the smallest `proof` such that
//! `sha256("{last_proof}{proof}{last_hash}")` starts with a run of zero hex
//! digits. Expensive to find, one hash to verify.

use crate::constants::DEFAULT_DIFFICULTY;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};

/// How many attempts to burn between polls of the cancel flag.
const CANCEL_POLL_INTERVAL: u64 = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: usize,
}

impl ProofOfWork {
    /// A puzzle requiring `difficulty` leading zero hex digits.
    pub const fn new(difficulty: usize) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Verifies a candidate proof against the predecessor's proof and hash.
    pub fn is_valid(&self, last_proof: u64, proof: u64, last_hash: &str) -> bool {
        let guess = format!("{last_proof}{proof}{last_hash}");
        let digest = hex::encode(Sha256::digest(guess.as_bytes()));
        digest.bytes().take(self.difficulty).all(|b| b == b'0')
    }

    /// Smallest non-negative proof satisfying [`Self::is_valid`], searching
    /// in ascending order from 0. CPU-bound with an unbounded worst case;
    /// callers that cannot afford to block should use
    /// [`Self::solve_with_cancel`] on a dedicated thread.
    pub fn solve(&self, last_proof: u64, last_hash: &str) -> u64 {
        let mut proof = 0;
        while !self.is_valid(last_proof, proof, last_hash) {
            proof += 1;
        }
        proof
    }

    /// Like [`Self::solve`], but gives up and returns `None` once `cancel`
    /// is observed set. The flag is polled every `CANCEL_POLL_INTERVAL`
    /// attempts, so cancellation is prompt but not instantaneous.
    pub fn solve_with_cancel(
        &self,
        last_proof: u64,
        last_hash: &str,
        cancel: &AtomicBool,
    ) -> Option<u64> {
        let mut proof = 0;
        loop {
            if self.is_valid(last_proof, proof, last_hash) {
                return Some(proof);
            }
            if proof % CANCEL_POLL_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
                return None;
            }
            proof += 1;
        }
    }
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_finds_a_valid_proof() {
        let pow = ProofOfWork::new(2);
        let proof = pow.solve(100, "abc");
        assert!(pow.is_valid(100, proof, "abc"));
    }

    #[test]
    fn solve_finds_the_smallest_proof() {
        let pow = ProofOfWork::new(1);
        let proof = pow.solve(42, "deadbeef");
        for smaller in 0..proof {
            assert!(!pow.is_valid(42, smaller, "deadbeef"));
        }
    }

    #[test]
    fn zero_difficulty_accepts_proof_zero() {
        let pow = ProofOfWork::new(0);
        assert!(pow.is_valid(0, 0, ""));
        assert_eq!(pow.solve(0, ""), 0);
    }

    #[test]
    fn is_valid_depends_on_all_inputs() {
        let pow = ProofOfWork::new(1);
        let proof = pow.solve(7, "aa");
        assert!(pow.is_valid(7, proof, "aa"));
        // Perturbing any input should (overwhelmingly likely) break a
        // difficulty-high-enough proof; use difficulty 4 for low collision
        // odds on the perturbed inputs.
        let strict = ProofOfWork::new(4);
        let strict_proof = strict.solve(7, "aa");
        assert!(strict.is_valid(7, strict_proof, "aa"));
        assert!(!strict.is_valid(8, strict_proof, "aa"));
        assert!(!strict.is_valid(7, strict_proof + 1, "aa"));
        assert!(!strict.is_valid(7, strict_proof, "ab"));
    }

    #[test]
    fn solve_with_cancel_returns_none_when_flagged() {
        // Difficulty 64 is unsatisfiable in practice; the pre-set flag must
        // stop the search at the first poll.
        let pow = ProofOfWork::new(64);
        let cancel = AtomicBool::new(true);
        assert_eq!(pow.solve_with_cancel(1, "ff", &cancel), None);
    }

    #[test]
    fn solve_with_cancel_matches_solve_when_not_flagged() {
        let pow = ProofOfWork::new(2);
        let cancel = AtomicBool::new(false);
        assert_eq!(
            pow.solve_with_cancel(100, "abc", &cancel),
            Some(pow.solve(100, "abc"))
        );
    }
}
