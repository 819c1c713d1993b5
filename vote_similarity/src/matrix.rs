use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::*;
use crate::layout::order_by_anchors;

/// The numeric votes of a term, aligned on one canonical list of vote
/// identifiers.
///
/// Invariant: every row has exactly one position per vote identifier.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct VoteMatrix {
    vote_ids: Vec<String>,
    rows: Vec<(String, Vec<Position>)>,
}

impl VoteMatrix {
    pub fn new(
        vote_ids: Vec<String>,
        rows: Vec<(String, Vec<Position>)>,
    ) -> Result<VoteMatrix, SimilarityError> {
        let mut names: HashSet<&str> = HashSet::new();
        for (name, positions) in rows.iter() {
            if positions.len() != vote_ids.len() {
                return Err(SimilarityError::MalformedInput {
                    councillor: name.clone(),
                    message: format!(
                        "{} votes recorded, {} declared",
                        positions.len(),
                        vote_ids.len()
                    ),
                });
            }
            if !names.insert(name.as_str()) {
                return Err(SimilarityError::MalformedInput {
                    councillor: name.clone(),
                    message: "councillor appears twice".to_string(),
                });
            }
        }
        Ok(VoteMatrix { vote_ids, rows })
    }

    pub fn vote_ids(&self) -> &[String] {
        &self.vote_ids
    }

    pub fn rows(&self) -> &[(String, Vec<Position>)] {
        &self.rows
    }

    pub fn councillors(&self) -> Vec<String> {
        self.rows.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn positions(&self, councillor: &str) -> Option<&[Position]> {
        self.rows
            .iter()
            .find(|(name, _)| name == councillor)
            .map(|(_, p)| p.as_slice())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// SHA-256 of the content of the matrix, used to detect stale caches.
    pub fn fingerprint(&self) -> String {
        let mut buf = String::new();
        for vid in self.vote_ids.iter() {
            buf.push_str(vid);
            buf.push('\n');
        }
        for (name, positions) in self.rows.iter() {
            buf.push_str(name);
            buf.push('\t');
            for p in positions.iter() {
                buf.push(match p {
                    Position::Affirmative => '1',
                    Position::Negative => '0',
                    Position::Missing => '-',
                });
            }
            buf.push('\n');
        }
        sha256::digest(buf.as_str())
    }
}

/// The agreement between two councillors.
///
/// Scores are kept as counts so that they can be stored and read back without
/// any loss.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Similarity {
    /// The two councillors were never both recorded on the same vote.
    Undefined,
    /// Invariant: `0 < overlap` and `agreed <= overlap`.
    Score { agreed: u32, overlap: u32 },
}

impl Similarity {
    pub fn from_counts(agreed: u32, overlap: u32) -> Similarity {
        if overlap == 0 {
            Similarity::Undefined
        } else {
            Similarity::Score { agreed, overlap }
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Similarity::Undefined => None,
            Similarity::Score { agreed, overlap } => Some(*agreed as f64 / *overlap as f64),
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Similarity::Score { .. })
    }
}

/// Highest scores first, undefined scores last. Scores are compared exactly.
pub(crate) fn compare_descending(a: Similarity, b: Similarity) -> Ordering {
    match (a, b) {
        (
            Similarity::Score {
                agreed: a1,
                overlap: o1,
            },
            Similarity::Score {
                agreed: a2,
                overlap: o2,
            },
        ) => (a2 as u64 * o1 as u64).cmp(&(a1 as u64 * o2 as u64)),
        (Similarity::Score { .. }, Similarity::Undefined) => Ordering::Less,
        (Similarity::Undefined, Similarity::Score { .. }) => Ordering::Greater,
        (Similarity::Undefined, Similarity::Undefined) => Ordering::Equal,
    }
}

/// Square and symmetric table of similarities between all the councillors of a
/// term. The diagonal is left undefined.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SimilarityMatrix {
    councillors: Vec<String>,
    scores: Vec<Vec<Similarity>>,
}

impl SimilarityMatrix {
    pub(crate) fn new_unchecked(
        councillors: Vec<String>,
        scores: Vec<Vec<Similarity>>,
    ) -> SimilarityMatrix {
        SimilarityMatrix {
            councillors,
            scores,
        }
    }

    /// Rebuilds a matrix from stored parts, checking its shape.
    pub fn from_parts(
        councillors: Vec<String>,
        scores: Vec<Vec<Similarity>>,
    ) -> Result<SimilarityMatrix, SimilarityError> {
        let n = councillors.len();
        if scores.len() != n {
            return Err(SimilarityError::MalformedInput {
                councillor: String::new(),
                message: format!("{} rows of scores for {} councillors", scores.len(), n),
            });
        }
        for (i, row) in scores.iter().enumerate() {
            if row.len() != n {
                return Err(SimilarityError::MalformedInput {
                    councillor: councillors[i].clone(),
                    message: format!("{} scores, expected {}", row.len(), n),
                });
            }
            for (j, s) in row.iter().enumerate() {
                if let Similarity::Score { agreed, overlap } = s {
                    if *overlap == 0 || agreed > overlap {
                        return Err(SimilarityError::MalformedInput {
                            councillor: councillors[i].clone(),
                            message: format!("invalid score {}/{}", agreed, overlap),
                        });
                    }
                }
                if *s != scores[j][i] {
                    return Err(SimilarityError::MalformedInput {
                        councillor: councillors[i].clone(),
                        message: format!("score with {:?} is not symmetric", councillors[j]),
                    });
                }
            }
        }
        Ok(SimilarityMatrix {
            councillors,
            scores,
        })
    }

    pub fn councillors(&self) -> &[String] {
        &self.councillors
    }

    pub fn scores(&self) -> &[Vec<Similarity>] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.councillors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.councillors.is_empty()
    }

    pub fn index_of(&self, councillor: &str) -> Option<usize> {
        self.councillors.iter().position(|c| c == councillor)
    }

    pub fn at(&self, row: usize, col: usize) -> Similarity {
        self.scores[row][col]
    }

    pub fn get(&self, a: &str, b: &str) -> Option<Similarity> {
        Some(self.at(self.index_of(a)?, self.index_of(b)?))
    }

    /// The same matrix, ordered by descending similarity to the first anchor,
    /// ties broken by the following anchors. The first anchor is put first.
    /// Anchors that are not part of the matrix are ignored.
    pub fn sorted_by_anchors(&self, anchors: &[String]) -> SimilarityMatrix {
        let anchor_idxs: Vec<usize> = anchors.iter().filter_map(|a| self.index_of(a)).collect();
        let members: Vec<usize> = (0..self.len()).collect();
        let order = order_by_anchors(self, &members, &anchor_idxs);
        self.permuted(&order)
    }

    pub(crate) fn permuted(&self, order: &[usize]) -> SimilarityMatrix {
        SimilarityMatrix {
            councillors: order.iter().map(|i| self.councillors[*i].clone()).collect(),
            scores: order
                .iter()
                .map(|i| order.iter().map(|j| self.scores[*i][*j]).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn vote_matrix_rejects_misaligned_rows() {
        let res = VoteMatrix::new(
            names(&["v1", "v2"]),
            vec![
                ("A".to_string(), vec![Position::Affirmative, Position::Negative]),
                ("B".to_string(), vec![Position::Affirmative]),
            ],
        );
        assert!(matches!(
            res,
            Err(SimilarityError::MalformedInput { councillor, .. }) if councillor == "B"
        ));
    }

    #[test]
    fn fingerprint_follows_content() {
        let m1 = VoteMatrix::new(
            names(&["v1"]),
            vec![("A".to_string(), vec![Position::Affirmative])],
        )
        .unwrap();
        let m2 = VoteMatrix::new(
            names(&["v1"]),
            vec![("A".to_string(), vec![Position::Negative])],
        )
        .unwrap();
        assert_eq!(m1.fingerprint(), m1.clone().fingerprint());
        assert_ne!(m1.fingerprint(), m2.fingerprint());
    }

    #[test]
    fn descending_order_is_exact() {
        let two_thirds = Similarity::from_counts(2, 3);
        let four_sixths = Similarity::from_counts(4, 6);
        let half = Similarity::from_counts(1, 2);
        assert_eq!(compare_descending(two_thirds, four_sixths), Ordering::Equal);
        assert_eq!(compare_descending(two_thirds, half), Ordering::Less);
        assert_eq!(compare_descending(half, Similarity::Undefined), Ordering::Less);
        assert_eq!(
            compare_descending(Similarity::Undefined, Similarity::from_counts(0, 4)),
            Ordering::Greater
        );
    }

    #[test]
    fn from_parts_checks_symmetry() {
        let s = Similarity::from_counts(1, 2);
        let ok = SimilarityMatrix::from_parts(
            names(&["A", "B"]),
            vec![
                vec![Similarity::Undefined, s],
                vec![s, Similarity::Undefined],
            ],
        );
        assert!(ok.is_ok());
        let bad = SimilarityMatrix::from_parts(
            names(&["A", "B"]),
            vec![
                vec![Similarity::Undefined, s],
                vec![Similarity::Undefined, Similarity::Undefined],
            ],
        );
        assert!(bad.is_err());
    }

    #[test]
    fn sorted_by_anchors_breaks_ties_on_second_anchor() {
        // Mayor agrees fully with both X and Y; the tie-breaker prefers Y.
        let full = Similarity::from_counts(4, 4);
        let low = Similarity::from_counts(1, 4);
        let high = Similarity::from_counts(3, 4);
        let u = Similarity::Undefined;
        let m = SimilarityMatrix::from_parts(
            names(&["X", "Mayor", "Y", "Deputy"]),
            vec![
                vec![u, full, high, low],
                vec![full, u, full, low],
                vec![high, full, u, high],
                vec![low, low, high, u],
            ],
        )
        .unwrap();
        let sorted = m.sorted_by_anchors(&names(&["Mayor", "Deputy"]));
        assert_eq!(sorted.councillors(), &names(&["Mayor", "Y", "X", "Deputy"])[..]);
        assert_eq!(sorted.get("X", "Y"), Some(high));
    }
}
