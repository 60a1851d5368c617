//! Stratified train/test splitting and stratified k-fold partitioning.

use log::warn;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{AbstrakError, Result};
use crate::track::Track;

/// Indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Seeded stratified split of `labels` into train and test indices.
///
/// The test set holds `ceil(test_fraction * n)` samples. Each class receives a
/// share proportional to its size (largest remainder, ties in class order),
/// and every class keeps at least one member in the training set.
pub fn stratified_split(labels: &[Track], test_fraction: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(AbstrakError::invalid_argument(format!(
            "test_fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let n = labels.len();
    let members: Vec<(Track, Vec<usize>)> = Track::ALL
        .into_iter()
        .map(|track| {
            let idx: Vec<usize> = (0..n).filter(|&i| labels[i] == track).collect();
            (track, idx)
        })
        .filter(|(_, idx)| !idx.is_empty())
        .collect();

    let requested = (test_fraction * n as f64).ceil() as usize;
    let capacity = n - members.len();
    if requested > capacity {
        warn!(
            "Requested {requested} test samples but only {capacity} can be held out; \
             every class keeps one training sample"
        );
    }
    let n_test = requested.min(capacity);
    if n_test == 0 {
        return Err(AbstrakError::invalid_argument(format!(
            "cannot hold out a test set from {n} samples"
        )));
    }

    let counts: Vec<usize> = members.iter().map(|(_, idx)| idx.len()).collect();
    let quotas = allocate_quotas(&counts, n_test);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);

    for ((_, idx), quota) in members.into_iter().zip(quotas) {
        let mut idx = idx;
        idx.shuffle(&mut rng);
        test.extend_from_slice(&idx[..quota]);
        train.extend_from_slice(&idx[quota..]);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Ok(SplitIndices { train, test })
}

/// Largest-remainder allocation of `total` over classes of the given sizes,
/// capped at `count - 1` per class with the excess passed on in class order.
fn allocate_quotas(counts: &[usize], total: usize) -> Vec<usize> {
    let n: usize = counts.iter().sum();
    let exact: Vec<f64> = counts
        .iter()
        .map(|&c| total as f64 * c as f64 / n as f64)
        .collect();

    let mut quotas: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();
    let mut remaining = total - quotas.iter().sum::<usize>();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra).then_with(|| a.cmp(&b))
    });
    for &class in order.iter().cycle().take(remaining) {
        quotas[class] += 1;
    }

    // hand surplus from classes that would lose their last training member
    remaining = 0;
    for (quota, &count) in quotas.iter_mut().zip(counts) {
        let cap = count.saturating_sub(1);
        if *quota > cap {
            remaining += *quota - cap;
            *quota = cap;
        }
    }
    for (quota, &count) in quotas.iter_mut().zip(counts) {
        if remaining == 0 {
            break;
        }
        let room = count.saturating_sub(1) - *quota;
        let take = room.min(remaining);
        *quota += take;
        remaining -= take;
    }

    quotas
}

/// Stratified k-fold partition without shuffling.
///
/// Classes are encoded in order of first appearance. Samples of each class are
/// dealt to folds in index order so that fold sizes differ by at most one and
/// each fold mirrors the class distribution. Returns one split per fold.
pub fn stratified_kfold(labels: &[Track], n_splits: usize) -> Result<Vec<SplitIndices>> {
    let n = labels.len();
    if n_splits < 2 {
        return Err(AbstrakError::invalid_argument(format!(
            "cross-validation needs at least 2 folds, got {n_splits}"
        )));
    }
    if n_splits > n {
        return Err(AbstrakError::invalid_argument(format!(
            "cannot split {n} samples into {n_splits} folds"
        )));
    }

    let mut classes: Vec<Track> = Vec::new();
    for label in labels {
        if !classes.contains(label) {
            classes.push(*label);
        }
    }
    let encoded: Vec<usize> = labels
        .iter()
        .map(|l| classes.iter().position(|c| c == l).unwrap_or(0))
        .collect();
    let mut class_counts = vec![0usize; classes.len()];
    for &c in &encoded {
        class_counts[c] += 1;
    }

    if class_counts.iter().all(|&c| c < n_splits) {
        return Err(AbstrakError::invalid_argument(format!(
            "n_splits = {n_splits} exceeds the member count of every class"
        )));
    }
    if class_counts.iter().any(|&c| c < n_splits) {
        warn!("The least populated class has fewer than {n_splits} members");
    }

    let mut sorted = encoded.clone();
    sorted.sort_unstable();

    // allocation[fold][class]: members of class dealt to fold
    let allocation: Vec<Vec<usize>> = (0..n_splits)
        .map(|fold| {
            let mut counts = vec![0usize; classes.len()];
            for &c in sorted.iter().skip(fold).step_by(n_splits) {
                counts[c] += 1;
            }
            counts
        })
        .collect();

    let mut test_fold = vec![0usize; n];
    for class in 0..classes.len() {
        let fold_ids = (0..n_splits).flat_map(|fold| {
            std::iter::repeat_n(fold, allocation[fold][class])
        });
        let positions = (0..n).filter(|&i| encoded[i] == class);
        for (i, fold) in positions.zip(fold_ids) {
            test_fold[i] = fold;
        }
    }

    Ok((0..n_splits)
        .map(|fold| {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..n).partition(|&i| test_fold[i] == fold);
            SplitIndices { train, test }
        })
        .collect())
}
