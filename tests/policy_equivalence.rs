// Cross-policy equivalence under a seeded randomized workload.
//
// The three probing strategies (scalar, SSE2, AVX2) must agree on every
// observable result regardless of which one a table happens to resolve to
// at construction. This drives the same sequence of inserts, removes, and
// membership checks through all three policies and asserts they end up in
// lockstep the whole way, not just at the end.

use probeset::{HashSet, Policy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Clone, Copy, Debug)]
enum Op {
    Insert(u32),
    Remove(u32),
    Contains(u32),
}

fn workload(seed: u64, len: usize, key_space: u32) -> Vec<Op> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            let key = rng.gen_range(0..key_space);
            match rng.gen_range(0..3) {
                0 => Op::Insert(key),
                1 => Op::Remove(key),
                _ => Op::Contains(key),
            }
        })
        .collect()
}

fn run(policy: Policy, ops: &[Op]) -> (usize, Vec<bool>) {
    let mut set: HashSet<u32> = HashSet::with_policy(policy).unwrap();
    let mut observations = Vec::with_capacity(ops.len());
    for op in ops {
        match *op {
            Op::Insert(k) => {
                observations.push(set.insert(k).unwrap());
            }
            Op::Remove(k) => {
                observations.push(set.remove(&k));
            }
            Op::Contains(k) => {
                observations.push(set.contains(&k));
            }
        }
    }
    (set.count(), observations)
}

#[test]
fn scalar_simd16_simd32_agree_on_a_seeded_mixed_workload() {
    for seed in [1u64, 2, 42, 1000, 999_999] {
        let ops = workload(seed, 5_000, 800);

        let (scalar_count, scalar_obs) = run(Policy::Scalar, &ops);
        let (simd16_count, simd16_obs) = run(Policy::Simd16, &ops);
        let (simd32_count, simd32_obs) = run(Policy::Simd32, &ops);

        assert_eq!(
            scalar_count, simd16_count,
            "seed {seed}: scalar and simd16 disagree on final count"
        );
        assert_eq!(
            scalar_count, simd32_count,
            "seed {seed}: scalar and simd32 disagree on final count"
        );
        assert_eq!(
            scalar_obs, simd16_obs,
            "seed {seed}: scalar and simd16 disagree on some operation's result"
        );
        assert_eq!(
            scalar_obs, simd32_obs,
            "seed {seed}: scalar and simd32 disagree on some operation's result"
        );
    }
}

#[test]
fn requested_policy_never_exceeds_what_the_host_reports_as_best() {
    let best = Policy::best_available();
    for requested in [Policy::Scalar, Policy::Simd16, Policy::Simd32] {
        let set: HashSet<u32> = HashSet::with_policy(requested).unwrap();
        let rank = |p: Policy| match p {
            Policy::Scalar => 0,
            Policy::Simd16 => 1,
            Policy::Simd32 => 2,
        };
        assert!(rank(set.policy()) <= rank(best));
    }
}

#[test]
fn rehash_preserves_membership_across_many_doublings() {
    let mut set: HashSet<u32> = HashSet::new().unwrap();
    let initial_capacity = set.capacity();

    for k in 0..(initial_capacity as u32 * 20) {
        set.insert(k).unwrap();
    }

    assert!(set.capacity() > initial_capacity);
    for k in 0..(initial_capacity as u32 * 20) {
        assert!(set.contains(&k));
    }
}
