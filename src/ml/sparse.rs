//! Sparse feature vectors.

use serde::{Deserialize, Serialize};

use crate::error::{AbstrakError, Result};

/// A sparse vector of `f64` with strictly increasing indices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SparseVector {
    dim: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// An all-zero vector.
    pub fn zeros(dim: usize) -> Self {
        SparseVector {
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from `(index, value)` pairs. Pairs are sorted, zeros dropped,
    /// and duplicate indices summed.
    pub fn from_pairs(dim: usize, mut pairs: Vec<(usize, f64)>) -> Result<Self> {
        pairs.sort_by_key(|&(i, _)| i);

        let mut indices: Vec<usize> = Vec::with_capacity(pairs.len());
        let mut values: Vec<f64> = Vec::with_capacity(pairs.len());
        for (index, value) in pairs {
            if index >= dim {
                return Err(AbstrakError::invalid_argument(format!(
                    "index {index} out of bounds for dimension {dim}"
                )));
            }
            match indices.last() {
                Some(&last) if last == index => {
                    if let Some(v) = values.last_mut() {
                        *v += value;
                    }
                }
                _ => {
                    indices.push(index);
                    values.push(value);
                }
            }
        }

        let mut vector = SparseVector {
            dim,
            indices,
            values,
        };
        vector.prune_zeros();
        Ok(vector)
    }

    /// Build from a dense slice.
    pub fn from_dense(dense: &[f64]) -> Self {
        let (indices, values) = dense
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, v)| (i, *v))
            .unzip();
        SparseVector {
            dim: dense.len(),
            indices,
            values,
        }
    }

    fn prune_zeros(&mut self) {
        let (indices, values): (Vec<usize>, Vec<f64>) = self
            .iter()
            .filter(|(_, v)| *v != 0.0)
            .unzip();
        self.indices = indices;
        self.values = values;
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored non-zero entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over `(index, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Value at `index` (zero when absent).
    pub fn get(&self, index: usize) -> f64 {
        self.indices
            .binary_search(&index)
            .map(|pos| self.values[pos])
            .unwrap_or(0.0)
    }

    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for (i, v) in self.iter() {
            dense[i] = v;
        }
        dense
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut a, mut b) = (0, 0);
        let mut sum = 0.0;
        while a < self.indices.len() && b < other.indices.len() {
            match self.indices[a].cmp(&other.indices[b]) {
                std::cmp::Ordering::Less => a += 1,
                std::cmp::Ordering::Greater => b += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[a] * other.values[b];
                    a += 1;
                    b += 1;
                }
            }
        }
        sum
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Scale to unit L2 norm. A zero vector stays zero.
    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }

    /// Walk the union of both index sets, yielding `(a_i, b_i)` per index.
    pub(crate) fn zip_union<'a>(
        &'a self,
        other: &'a SparseVector,
    ) -> impl Iterator<Item = (f64, f64)> + 'a {
        let (mut a, mut b) = (0, 0);
        std::iter::from_fn(move || {
            let ai = self.indices.get(a);
            let bi = other.indices.get(b);
            match (ai, bi) {
                (None, None) => None,
                (Some(_), None) => {
                    a += 1;
                    Some((self.values[a - 1], 0.0))
                }
                (None, Some(_)) => {
                    b += 1;
                    Some((0.0, other.values[b - 1]))
                }
                (Some(x), Some(y)) => match x.cmp(y) {
                    std::cmp::Ordering::Less => {
                        a += 1;
                        Some((self.values[a - 1], 0.0))
                    }
                    std::cmp::Ordering::Greater => {
                        b += 1;
                        Some((0.0, other.values[b - 1]))
                    }
                    std::cmp::Ordering::Equal => {
                        a += 1;
                        b += 1;
                        Some((self.values[a - 1], other.values[b - 1]))
                    }
                },
            }
        })
    }
}
