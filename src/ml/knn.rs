//! Brute-force k-nearest-neighbor index with distance-weighted voting.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AbstrakError, Result};
use crate::ml::distance::DistanceMetric;
use crate::ml::sparse::SparseVector;
use crate::track::Track;

/// Per-class probabilities in class order (`RPL`, `TKJ`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassProbabilities(pub [f64; 2]);

impl ClassProbabilities {
    /// Probability of one track.
    pub fn get(&self, track: Track) -> f64 {
        self.0[track.index()]
    }

    /// Most probable track and its probability. Ties go to the first class.
    pub fn best(&self) -> (Track, f64) {
        let mut best = (Track::ALL[0], self.0[0]);
        for track in Track::ALL.iter().skip(1) {
            let p = self.get(*track);
            if p > best.1 {
                best = (*track, p);
            }
        }
        best
    }

    pub fn as_array(&self) -> [f64; 2] {
        self.0
    }
}

impl fmt::Display for ClassProbabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={:.4}, {}={:.4}",
            Track::Rpl,
            self.get(Track::Rpl),
            Track::Tkj,
            self.get(Track::Tkj)
        )
    }
}

/// A neighbor found for a query: training index and distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

/// Fitted KNN model: the training vectors, their labels and the search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnIndex {
    k: usize,
    metric: DistanceMetric,
    vectors: Vec<SparseVector>,
    labels: Vec<Track>,
}

impl KnnIndex {
    /// Store the training set.
    ///
    /// Fails when `k` is zero, when the training set is empty or when `k`
    /// exceeds the number of training samples.
    pub fn fit(
        k: usize,
        metric: DistanceMetric,
        vectors: Vec<SparseVector>,
        labels: Vec<Track>,
    ) -> Result<Self> {
        if k == 0 {
            return Err(AbstrakError::invalid_argument("k must be at least 1"));
        }
        if vectors.is_empty() {
            return Err(AbstrakError::invalid_argument(
                "cannot fit a neighbor index on an empty training set",
            ));
        }
        if vectors.len() != labels.len() {
            return Err(AbstrakError::invalid_argument(format!(
                "{} vectors but {} labels",
                vectors.len(),
                labels.len()
            )));
        }
        if k > vectors.len() {
            return Err(AbstrakError::invalid_argument(format!(
                "k = {k} exceeds the {} training samples",
                vectors.len()
            )));
        }
        let dim = vectors[0].dim();
        if vectors.iter().any(|v| v.dim() != dim) {
            return Err(AbstrakError::invalid_argument(
                "training vectors have differing dimensions",
            ));
        }

        Ok(Self {
            k,
            metric,
            vectors,
            labels,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Number of training samples.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Dimension of the training vectors.
    pub fn dim(&self) -> usize {
        self.vectors.first().map(SparseVector::dim).unwrap_or(0)
    }

    pub fn labels(&self) -> &[Track] {
        &self.labels
    }

    /// Distinct labels present in the training set, in class order.
    pub fn classes(&self) -> Vec<Track> {
        Track::ALL
            .into_iter()
            .filter(|t| self.labels.contains(t))
            .collect()
    }

    /// The `k` nearest training samples, closest first. Equal distances are
    /// ordered by training index.
    pub fn neighbors(&self, query: &SparseVector) -> Result<Vec<Neighbor>> {
        let mut scored = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, v)| {
                self.metric
                    .distance(query, v)
                    .map(|distance| Neighbor { index, distance })
            })
            .collect::<Result<Vec<_>>>()?;

        scored.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.index.cmp(&b.index))
        });
        scored.truncate(self.k);
        Ok(scored)
    }

    /// Class probabilities from inverse-distance voting.
    pub fn predict_proba(&self, query: &SparseVector) -> Result<ClassProbabilities> {
        let neighbors = self.neighbors(query)?;
        Ok(self.vote(&neighbors))
    }

    pub fn predict(&self, query: &SparseVector) -> Result<Track> {
        Ok(self.predict_proba(query)?.best().0)
    }

    fn vote(&self, neighbors: &[Neighbor]) -> ClassProbabilities {
        let mut weights = [0.0_f64; 2];

        // exact matches outvote everything else
        if neighbors.iter().any(|n| n.distance == 0.0) {
            for n in neighbors.iter().filter(|n| n.distance == 0.0) {
                weights[self.labels[n.index].index()] += 1.0;
            }
        } else {
            for n in neighbors {
                weights[self.labels[n.index].index()] += 1.0 / n.distance;
            }
        }

        let total: f64 = weights.iter().sum();
        if total > 0.0 && total.is_finite() {
            for w in &mut weights {
                *w /= total;
            }
        }
        ClassProbabilities(weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec2(x: f64, y: f64) -> SparseVector {
        SparseVector::from_dense(&[x, y])
    }

    fn index(k: usize) -> KnnIndex {
        KnnIndex::fit(
            k,
            DistanceMetric::Euclidean,
            vec![vec2(0.0, 0.0), vec2(1.0, 0.0), vec2(5.0, 5.0), vec2(6.0, 5.0)],
            vec![Track::Rpl, Track::Rpl, Track::Tkj, Track::Tkj],
        )
        .unwrap()
    }

    #[test]
    fn test_fit_validation() {
        let v = vec![vec2(0.0, 1.0)];
        assert!(KnnIndex::fit(0, DistanceMetric::Cosine, v.clone(), vec![Track::Rpl]).is_err());
        assert!(KnnIndex::fit(2, DistanceMetric::Cosine, v.clone(), vec![Track::Rpl]).is_err());
        assert!(KnnIndex::fit(1, DistanceMetric::Cosine, vec![], vec![]).is_err());
        assert!(KnnIndex::fit(1, DistanceMetric::Cosine, v, vec![]).is_err());
    }

    #[test]
    fn test_neighbors_ordering() {
        let idx = index(3);
        let neighbors = idx.neighbors(&vec2(0.5, 0.0)).unwrap();
        // indices 0 and 1 are equidistant; index order breaks the tie
        assert_eq!(neighbors[0].index, 0);
        assert_eq!(neighbors[1].index, 1);
        assert_eq!(neighbors[2].index, 2);
    }

    #[test]
    fn test_inverse_distance_vote() {
        let idx = index(3);
        let proba = idx.predict_proba(&vec2(0.5, 0.0)).unwrap();
        // two RPL neighbors at 0.5 dominate one distant TKJ neighbor
        assert!(proba.get(Track::Rpl) > 0.9);
        assert!((proba.get(Track::Rpl) + proba.get(Track::Tkj) - 1.0).abs() < 1e-12);
        assert_eq!(idx.predict(&vec2(5.5, 5.0)).unwrap(), Track::Tkj);
    }

    #[test]
    fn test_zero_distance_neighbors_win() {
        let idx = index(4);
        let proba = idx.predict_proba(&vec2(5.0, 5.0)).unwrap();
        assert_eq!(proba.as_array(), [0.0, 1.0]);
    }

    #[test]
    fn test_tie_goes_to_first_class() {
        let idx = KnnIndex::fit(
            2,
            DistanceMetric::Euclidean,
            vec![vec2(1.0, 0.0), vec2(-1.0, 0.0)],
            vec![Track::Tkj, Track::Rpl],
        )
        .unwrap();
        let (track, p) = idx.predict_proba(&vec2(0.0, 0.0)).unwrap().best();
        assert_eq!(track, Track::Rpl);
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_classes() {
        let idx = index(1);
        assert_eq!(idx.classes(), vec![Track::Rpl, Track::Tkj]);
        assert_eq!(idx.len(), 4);
        assert_eq!(idx.dim(), 2);
    }
}
