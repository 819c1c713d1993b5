use log::{debug, info};
use std::collections::HashMap;

use crate::matrix::{SimilarityMatrix, VoteMatrix};
use crate::similarity;

#[derive(Debug, Clone)]
struct CacheEntry {
    fingerprint: String,
    matrix: SimilarityMatrix,
}

/// Similarity matrices by (dataset, term).
///
/// Every entry remembers the fingerprint of the votes it was computed from, so
/// that changed votes are never served a stale matrix.
#[derive(Debug, Clone, Default)]
pub struct SimilarityCache {
    entries: HashMap<(String, String), CacheEntry>,
}

impl SimilarityCache {
    pub fn new() -> SimilarityCache {
        SimilarityCache::default()
    }

    /// Adds a matrix computed elsewhere, for instance read back from disk.
    pub fn insert(&mut self, dataset: &str, term: &str, fingerprint: &str, matrix: SimilarityMatrix) {
        self.entries.insert(
            (dataset.to_string(), term.to_string()),
            CacheEntry {
                fingerprint: fingerprint.to_string(),
                matrix,
            },
        );
    }

    pub fn get(&self, dataset: &str, term: &str) -> Option<&SimilarityMatrix> {
        self.entries
            .get(&(dataset.to_string(), term.to_string()))
            .map(|e| &e.matrix)
    }

    pub fn fingerprint(&self, dataset: &str, term: &str) -> Option<&str> {
        self.entries
            .get(&(dataset.to_string(), term.to_string()))
            .map(|e| e.fingerprint.as_str())
    }

    /// Returns the matrix of the term, computing it only when the cached one
    /// was built from different votes.
    pub fn get_or_compute(
        &mut self,
        dataset: &str,
        term: &str,
        votes: &VoteMatrix,
    ) -> &SimilarityMatrix {
        let key = (dataset.to_string(), term.to_string());
        let fingerprint = votes.fingerprint();
        let fresh = matches!(self.entries.get(&key), Some(e) if e.fingerprint == fingerprint);
        if fresh {
            debug!("get_or_compute: cache hit for {:?}", key);
        } else {
            info!(
                "get_or_compute: computing similarity for {:?} ({} councillors, {} votes)",
                key,
                votes.len(),
                votes.vote_ids().len()
            );
            let matrix = similarity(votes);
            self.entries.insert(
                key.clone(),
                CacheEntry {
                    fingerprint,
                    matrix,
                },
            );
        }
        &self.entries[&key].matrix
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Position;
    use crate::matrix::Similarity;

    fn votes(b: Position) -> VoteMatrix {
        VoteMatrix::new(
            vec!["v1".to_string()],
            vec![
                ("A".to_string(), vec![Position::Affirmative]),
                ("B".to_string(), vec![b]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn recomputes_when_votes_change() {
        let mut cache = SimilarityCache::new();
        let agree = votes(Position::Affirmative);
        let s = cache.get_or_compute("tmmis", "2022-2026", &agree).get("A", "B");
        assert_eq!(s, Some(Similarity::from_counts(1, 1)));
        assert_eq!(
            cache.fingerprint("tmmis", "2022-2026"),
            Some(agree.fingerprint().as_str())
        );

        let disagree = votes(Position::Negative);
        let s = cache.get_or_compute("tmmis", "2022-2026", &disagree).get("A", "B");
        assert_eq!(s, Some(Similarity::from_counts(0, 1)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn serves_inserted_matrix_with_same_fingerprint() {
        let mut cache = SimilarityCache::new();
        let v = votes(Position::Affirmative);
        // A stored matrix, in a different order than a fresh computation.
        let stored = similarity(&v).sorted_by_anchors(&["B".to_string()]);
        cache.insert("chw", "2018-2022", &v.fingerprint(), stored.clone());
        assert_eq!(cache.get_or_compute("chw", "2018-2022", &v), &stored);
        assert!(cache.get("chw", "2010-2014").is_none());
    }
}
