use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum LedgerError {
    /// The address has neither a recognizable host component nor a
    /// non-empty path to fall back on.
    #[error("invalid node address: {0:?}")]
    InvalidAddress(String),

    /// The chain holds no blocks. Unreachable after construction, since the
    /// genesis block is seeded there; hitting this is a logic bug.
    #[error("ledger chain is empty")]
    EmptyChain,

    /// The chain tip moved while a proof was being searched for, so the
    /// solved proof no longer extends the current last block.
    #[error("chain tip changed while sealing block (proof was computed against {expected})")]
    StaleProof { expected: String },
}
