//! Exhaustive inner-product search over f16 unit vectors.

use std::cmp::Ordering;

use half::f16;

use crate::constants::validate_embedding_dim;
use crate::embedding::utils::l2_normalize;
use crate::index::error::{IndexError, IndexResult};

/// Row-major matrix of L2-normalized vectors stored as f16.
///
/// Inner product over unit vectors equals cosine similarity. Storing f16
/// halves memory and file size; scores carry roughly three significant digits.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIpIndex {
    dimension: usize,
    vectors: Vec<f16>,
}

impl FlatIpIndex {
    pub fn new(dimension: usize) -> IndexResult<Self> {
        if dimension == 0 {
            return Err(IndexError::ZeroDimension);
        }
        Ok(Self {
            dimension,
            vectors: Vec::new(),
        })
    }

    /// Rebuilds an index from already-normalized rows.
    pub fn from_f16(dimension: usize, vectors: Vec<f16>) -> IndexResult<Self> {
        if dimension == 0 {
            return Err(IndexError::ZeroDimension);
        }
        if vectors.len() % dimension != 0 {
            return Err(IndexError::DimensionMismatch {
                expected: dimension,
                actual: vectors.len() % dimension,
            });
        }
        Ok(Self { dimension, vectors })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Normalizes and appends `vector`; returns its row.
    pub fn add(&mut self, vector: &[f32]) -> IndexResult<usize> {
        validate_embedding_dim(vector.len(), self.dimension)?;

        let mut normalized = vector.to_vec();
        l2_normalize(&mut normalized);
        self.vectors
            .extend(normalized.iter().map(|&v| f16::from_f32(v)));
        Ok(self.len() - 1)
    }

    pub fn row(&self, row: usize) -> Option<&[f16]> {
        let start = row.checked_mul(self.dimension)?;
        self.vectors.get(start..start + self.dimension)
    }

    pub fn as_f16(&self) -> &[f16] {
        &self.vectors
    }

    /// Top `n` rows by inner product with the normalized `query`, best first.
    /// Equal scores keep row order.
    pub fn search(&self, query: &[f32], n: usize) -> IndexResult<Vec<(usize, f32)>> {
        validate_embedding_dim(query.len(), self.dimension)?;

        let mut query = query.to_vec();
        l2_normalize(&mut query);

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dimension)
            .map(|row| inner_product(row, &query))
            .enumerate()
            .collect();

        if n < scored.len() {
            scored.select_nth_unstable_by(n, by_score_desc);
            scored.truncate(n);
        }
        scored.sort_by(by_score_desc);

        Ok(scored)
    }
}

#[inline]
fn inner_product(row: &[f16], query: &[f32]) -> f32 {
    row.iter().zip(query).map(|(a, b)| a.to_f32() * b).sum()
}

fn by_score_desc(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}
