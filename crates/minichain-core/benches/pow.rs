use criterion::{criterion_group, criterion_main, Criterion};
use minichain_core::{hash, Block, ProofOfWork, Transaction};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn bench_pow(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let transactions: Vec<Transaction> = (0..10)
        .map(|i| Transaction {
            sender: format!("alice-{i}"),
            recipient: "bob".into(),
            amount: rng.gen_range(1..10),
        })
        .collect();
    let block = Block {
        index: 1,
        timestamp: 1_600_000_000.0,
        transactions,
        proof: 100,
        previous_hash: "1".into(),
    };
    let last_hash = hash::block_hash(&block);

    c.bench_function("solve_difficulty_3", |b| {
        let pow = ProofOfWork::new(3);
        b.iter(|| pow.solve(block.proof, &last_hash));
    });

    c.bench_function("block_hash", |b| {
        b.iter(|| hash::block_hash(&block));
    });
}

criterion_group!(benches, bench_pow);
criterion_main!(benches);
