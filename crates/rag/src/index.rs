//! Ephemeral exact-search vector index.
//!
//! Built once per query from the chunk embeddings, searched, then dropped.
//! Per-query corpora are small, so search is a brute-force scan.

use crate::types::Chunk;
use freshquery_core::{AppError, AppResult};

/// A search hit: chunk id, squared L2 distance and the chunk itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor<'a> {
    pub id: usize,
    pub distance: f32,
    pub chunk: &'a Chunk,
}

/// Flat L2 index over chunk embeddings.
///
/// Chunk ids are positions in insertion order.
#[derive(Debug)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<f32>,
    chunks: Vec<Chunk>,
}

impl FlatIndex {
    /// Build an index from chunks and their embeddings (same order).
    ///
    /// Fails if the counts differ, the input is empty, or the vectors do not
    /// share one non-zero dimension.
    pub fn new(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> AppResult<Self> {
        if chunks.len() != embeddings.len() {
            return Err(AppError::Index(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimension = embeddings
            .first()
            .map(Vec::len)
            .ok_or_else(|| AppError::Index("Cannot build an empty index".to_string()))?;

        if dimension == 0 {
            return Err(AppError::Index("Embedding dimension is zero".to_string()));
        }

        let mut vectors = Vec::with_capacity(dimension * embeddings.len());
        for (id, embedding) in embeddings.into_iter().enumerate() {
            if embedding.len() != dimension {
                return Err(AppError::Index(format!(
                    "Embedding {} has dimension {}, expected {}",
                    id,
                    embedding.len(),
                    dimension
                )));
            }
            vectors.extend(embedding);
        }

        tracing::debug!(chunks = chunks.len(), dimension, "Built flat index");

        Ok(Self {
            dimension,
            vectors,
            chunks,
        })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn chunk(&self, id: usize) -> Option<&Chunk> {
        self.chunks.get(id)
    }

    /// Exact k-nearest-neighbour search.
    ///
    /// Returns `min(k, len)` hits ordered by ascending distance, ties broken
    /// by the lower chunk id.
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<Neighbor<'_>>> {
        if query.len() != self.dimension {
            return Err(AppError::Index(format!(
                "Query has dimension {}, index has {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(id, vector)| (id, squared_l2(query, vector)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(id, distance)| Neighbor {
                id,
                distance,
                chunk: &self.chunks[id],
            })
            .collect())
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(n: usize) -> Chunk {
        Chunk {
            text: format!("chunk {}", n),
            source_url: format!("https://site{}.example/", n),
            rank: n + 1,
            offset: 0,
        }
    }

    fn index(vectors: Vec<Vec<f32>>) -> FlatIndex {
        let chunks = (0..vectors.len()).map(chunk).collect();
        FlatIndex::new(chunks, vectors).unwrap()
    }

    #[test]
    fn test_identical_vector_is_top_hit() {
        let idx = index(vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ]);

        let hits = idx.search(&[0.0, 1.0, 0.0], 3).unwrap();
        assert_eq!(hits[0].id, 1);
        assert_eq!(hits[0].distance, 0.0);
        assert_eq!(hits[0].chunk.text, "chunk 1");
    }

    #[test]
    fn test_fewer_chunks_than_k() {
        let idx = index(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);

        let hits = idx.search(&[1.0, 0.0], 5).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, 0);
        assert_eq!(hits[1].id, 1);
    }

    #[test]
    fn test_ties_break_on_lower_id() {
        let idx = index(vec![vec![1.0, 1.0], vec![2.0, 2.0], vec![1.0, 1.0]]);

        let hits = idx.search(&[1.0, 1.0], 2).unwrap();
        assert_eq!(hits[0].id, 0);
        assert_eq!(hits[1].id, 2);
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let err = FlatIndex::new(vec![chunk(0)], vec![]).unwrap_err();
        assert!(err.to_string().contains("1 chunks but 0 embeddings"));
    }

    #[test]
    fn test_ragged_dimensions_rejected() {
        let result = FlatIndex::new(vec![chunk(0), chunk(1)], vec![vec![1.0, 0.0], vec![1.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let idx = index(vec![vec![1.0, 0.0]]);
        assert!(idx.search(&[1.0, 0.0, 0.0], 1).is_err());
    }
}
