//! Two-node convergence: forks heal when each side resolves against the
//! other and adopts the strictly longer valid chain.

use minichain_core::consensus::{resolve_conflicts, ChainFetcher, FetchError, PeerChain};
use minichain_core::{Ledger, ProofOfWork};
use std::cell::RefCell;
use std::collections::HashMap;

/// An in-memory "network" of chain snapshots keyed by address.
#[derive(Default)]
struct FakeNetwork {
    chains: RefCell<HashMap<String, PeerChain>>,
}

impl FakeNetwork {
    fn publish(&self, address: &str, ledger: &Ledger) {
        self.chains.borrow_mut().insert(
            address.to_string(),
            PeerChain {
                length: ledger.chain().len() as u64,
                chain: ledger.chain().to_vec(),
            },
        );
    }
}

impl ChainFetcher for FakeNetwork {
    fn fetch_chain(&self, address: &str) -> Result<PeerChain, FetchError> {
        self.chains
            .borrow()
            .get(address)
            .cloned()
            .ok_or_else(|| FetchError {
                address: address.to_string(),
                reason: "no route to host".to_string(),
            })
    }
}

#[test]
fn forked_nodes_converge_on_the_longer_chain() {
    let network = FakeNetwork::default();
    let mut alpha = Ledger::with_pow("alpha", ProofOfWork::new(1));
    let mut beta = Ledger::with_pow("beta", ProofOfWork::new(1));
    alpha.register_node("beta.local:5000").unwrap();
    beta.register_node("alpha.local:5000").unwrap();

    // Beta races ahead by two blocks.
    beta.submit_transaction("alice", "bob", 7).unwrap();
    beta.mine().unwrap();
    beta.mine().unwrap();
    network.publish("alpha.local:5000", &alpha);
    network.publish("beta.local:5000", &beta);

    // Alpha observes the longer chain and adopts it.
    assert!(resolve_conflicts(&mut alpha, &network));
    assert_eq!(alpha.chain(), beta.chain());

    // Alpha now extends the shared history; beta catches up in turn.
    alpha.mine().unwrap();
    network.publish("alpha.local:5000", &alpha);
    assert!(resolve_conflicts(&mut beta, &network));
    assert_eq!(beta.chain(), alpha.chain());
    assert_eq!(beta.chain().len(), 4);

    // A second pass with nothing new changes nothing.
    network.publish("beta.local:5000", &beta);
    assert!(!resolve_conflicts(&mut alpha, &network));
    assert!(!resolve_conflicts(&mut beta, &network));
}

#[test]
fn node_keeps_its_chain_when_only_shorter_peers_exist() {
    let network = FakeNetwork::default();
    let mut alpha = Ledger::with_pow("alpha", ProofOfWork::new(1));
    let beta = Ledger::with_pow("beta", ProofOfWork::new(1));
    alpha.register_node("beta.local:5000").unwrap();

    alpha.mine().unwrap();
    network.publish("beta.local:5000", &beta);

    let before = alpha.chain().to_vec();
    assert!(!resolve_conflicts(&mut alpha, &network));
    assert_eq!(alpha.chain(), before.as_slice());
}
