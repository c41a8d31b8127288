/// Proof recorded in the genesis block, which has no puzzle to solve.
pub const GENESIS_PROOF: u64 = 100;
/// Previous-hash sentinel of the genesis block, which has no predecessor.
pub const GENESIS_PREVIOUS_HASH: &str = "1";
/// Leading zero hex digits a valid proof hash must carry.
pub const DEFAULT_DIFFICULTY: usize = 4;
/// Sender recorded on mining reward transactions. A local convention, not
/// a claim verified by peers.
pub const REWARD_SENDER: &str = "0";
/// Amount credited to this node for each block it mines.
pub const MINING_REWARD: u64 = 1;
