//! Exact inner-product search over a dense vector matrix.
//!
//! The catalog is small enough that an exhaustive scan outperforms any
//! approximate structure once index build and recall loss are accounted
//! for, so search computes every inner product and ranks the results.

use crate::index::storage::VectorStorageError;

/// A single search result: a catalog position and its similarity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// Row in the vector matrix, which is also the catalog position
    pub position: usize,
    /// Inner product between the query and the stored vector
    pub score: f32,
}

/// Dense row-major vector matrix with exhaustive inner-product search.
///
/// Scores over unit-normalized vectors are cosine similarities. The index
/// is immutable once constructed; rebuilds produce a new instance.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    data: Vec<f32>,
    dimension: usize,
    count: usize,
}

impl FlatIndex {
    /// Build an index from per-record embedding rows.
    pub fn from_rows(dimension: usize, rows: &[Vec<f32>]) -> Result<Self, VectorStorageError> {
        let mut data = Vec::with_capacity(rows.len() * dimension);
        for row in rows {
            if row.len() != dimension {
                return Err(VectorStorageError::DimensionMismatch {
                    expected: dimension,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            data,
            dimension,
            count: rows.len(),
        })
    }

    /// Build an index from an already-flattened matrix.
    pub fn from_flat(
        dimension: usize,
        count: usize,
        data: Vec<f32>,
    ) -> Result<Self, VectorStorageError> {
        let expected = count
            .checked_mul(dimension)
            .ok_or_else(|| VectorStorageError::InvalidFormat(
                "Matrix size overflows".to_string(),
            ))?;
        if data.len() != expected {
            return Err(VectorStorageError::InvalidFormat(format!(
                "Matrix has {} values, expected {} for {} vectors of dimension {}",
                data.len(),
                expected,
                count,
                dimension
            )));
        }

        Ok(Self {
            data,
            dimension,
            count,
        })
    }

    /// Number of vectors in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Dimension of the stored vectors.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Get the vector stored at `position`.
    #[must_use]
    pub fn row(&self, position: usize) -> Option<&[f32]> {
        if position >= self.count {
            return None;
        }
        let start = position * self.dimension;
        Some(&self.data[start..start + self.dimension])
    }

    /// Borrow the flattened matrix for persistence.
    #[must_use]
    pub fn as_flat(&self) -> &[f32] {
        &self.data
    }

    /// Score every stored vector against `query` and return the top `k`
    /// hits ordered by descending score.
    ///
    /// Equal scores rank by ascending position, so results are stable
    /// across runs and platforms. Requesting more hits than stored vectors
    /// returns all of them.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, VectorStorageError> {
        if query.len() != self.dimension {
            return Err(VectorStorageError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut hits: Vec<SearchHit> = (0..self.count)
            .map(|position| {
                let start = position * self.dimension;
                let row = &self.data[start..start + self.dimension];
                SearchHit {
                    position,
                    score: dot(query, row),
                }
            })
            .collect();

        hits.sort_unstable_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(k.min(self.count));

        Ok(hits)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
