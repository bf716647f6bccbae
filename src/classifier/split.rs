//! Seeded train/test splitting.
//!
//! The split is stratified by label whenever more than one distinct label
//! is present, so every class with at least two members lands in both
//! partitions. A fixed seed keeps every training run reproducible.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Split `labels.len()` samples into (train, test) index sets.
///
/// `test_ratio` is the target share of the test partition. Classes with a
/// single member stay in the training set; the training set is never left
/// empty.
pub fn train_test_split(labels: &[usize], test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(idx);
    }

    if by_class.len() <= 1 {
        return plain_split(labels.len(), test_ratio, &mut rng);
    }

    let mut train = Vec::new();
    let mut test = Vec::new();

    for (_, mut members) in by_class {
        members.shuffle(&mut rng);
        let n = members.len();
        let test_count = if n < 2 {
            0
        } else {
            ((n as f64 * test_ratio).round() as usize).clamp(1, n - 1)
        };
        test.extend_from_slice(&members[..test_count]);
        train.extend_from_slice(&members[test_count..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

fn plain_split(n: usize, test_ratio: f64, rng: &mut StdRng) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    let test_count = if n < 2 {
        0
    } else {
        ((n as f64 * test_ratio).round() as usize).clamp(1, n - 1)
    };

    let mut test: Vec<usize> = indices[..test_count].to_vec();
    let mut train: Vec<usize> = indices[test_count..].to_vec();
    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}
