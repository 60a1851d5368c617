//! Distance metrics over sparse feature vectors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AbstrakError, Result};
use crate::ml::sparse::SparseVector;

/// Distance metric used by the neighbor search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine distance (1 - cosine similarity)
    #[default]
    Cosine,
    /// Euclidean (L2) distance
    Euclidean,
    /// Manhattan (L1) distance
    Manhattan,
}

impl DistanceMetric {
    /// Calculate the distance between two vectors using this metric.
    pub fn distance(&self, a: &SparseVector, b: &SparseVector) -> Result<f64> {
        if a.dim() != b.dim() {
            return Err(AbstrakError::invalid_argument(format!(
                "Vector dimensions must match for distance calculation ({} vs {})",
                a.dim(),
                b.dim()
            )));
        }

        let result = match self {
            DistanceMetric::Cosine => {
                let norm_a = a.norm();
                let norm_b = b.norm();

                if norm_a == 0.0 || norm_b == 0.0 {
                    1.0 // Maximum distance for zero vectors
                } else {
                    // rounding can push identical vectors slightly below zero
                    (1.0 - a.dot(b) / (norm_a * norm_b)).max(0.0)
                }
            }
            DistanceMetric::Euclidean => a
                .zip_union(b)
                .map(|(x, y)| (x - y).powi(2))
                .sum::<f64>()
                .sqrt(),
            DistanceMetric::Manhattan => a.zip_union(b).map(|(x, y)| (x - y).abs()).sum(),
        };

        Ok(result)
    }

    /// Get the name of this distance metric.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Manhattan => "manhattan",
        }
    }

    /// Parse a distance metric from a string.
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            "manhattan" | "l1" => Ok(DistanceMetric::Manhattan),
            _ => Err(AbstrakError::invalid_argument(format!(
                "Unknown distance metric: {s}"
            ))),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMetric {
    type Err = AbstrakError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(values: &[f64]) -> SparseVector {
        SparseVector::from_dense(values)
    }

    #[test]
    fn test_cosine() {
        let m = DistanceMetric::Cosine;
        assert!(m.distance(&v(&[1.0, 0.0]), &v(&[2.0, 0.0])).unwrap().abs() < 1e-12);
        assert!((m.distance(&v(&[1.0, 0.0]), &v(&[0.0, 1.0])).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(m.distance(&v(&[0.0, 0.0]), &v(&[1.0, 0.0])).unwrap(), 1.0);
    }

    #[test]
    fn test_euclidean_and_manhattan() {
        let a = v(&[1.0, 0.0, 3.0]);
        let b = v(&[0.0, 2.0, 3.0]);
        let e = DistanceMetric::Euclidean.distance(&a, &b).unwrap();
        assert!((e - 5.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(DistanceMetric::Manhattan.distance(&a, &b).unwrap(), 3.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        assert!(
            DistanceMetric::Cosine
                .distance(&v(&[1.0]), &v(&[1.0, 2.0]))
                .is_err()
        );
    }

    #[test]
    fn test_parse_and_serde() {
        assert_eq!("L2".parse::<DistanceMetric>().unwrap(), DistanceMetric::Euclidean);
        assert!("hamming".parse::<DistanceMetric>().is_err());
        assert_eq!(
            serde_json::to_string(&DistanceMetric::Manhattan).unwrap(),
            "\"manhattan\""
        );
    }
}
