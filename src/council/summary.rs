// Persisted similarity matrices. Scores are stored as exact counts, undefined
// scores as null.

use serde::{Deserialize, Serialize};

use crate::council::*;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ScoreJs {
    pub agreed: u32,
    pub overlap: u32,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TermSummary {
    pub dataset: String,
    pub term: String,
    /// Fingerprint of the votes the scores were computed from.
    pub digest: String,
    pub anchors: Vec<String>,
    pub vacancies: TermVacancies,
    pub councillors: Vec<String>,
    pub scores: Vec<Vec<Option<ScoreJs>>>,
}

impl TermSummary {
    pub fn new(
        dataset: &str,
        term: &str,
        digest: &str,
        anchors: &[String],
        vacancies: &TermVacancies,
        matrix: &SimilarityMatrix,
    ) -> TermSummary {
        TermSummary {
            dataset: dataset.to_string(),
            term: term.to_string(),
            digest: digest.to_string(),
            anchors: anchors.to_vec(),
            vacancies: vacancies.clone(),
            councillors: matrix.councillors().to_vec(),
            scores: matrix
                .scores()
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|s| match s {
                            Similarity::Undefined => None,
                            Similarity::Score { agreed, overlap } => Some(ScoreJs {
                                agreed: *agreed,
                                overlap: *overlap,
                            }),
                        })
                        .collect()
                })
                .collect(),
        }
    }

    pub fn matrix(&self) -> Result<SimilarityMatrix, SimilarityError> {
        let scores: Vec<Vec<Similarity>> = self
            .scores
            .iter()
            .map(|row| {
                row.iter()
                    .map(|s| match s {
                        None => Similarity::Undefined,
                        Some(js) => Similarity::from_counts(js.agreed, js.overlap),
                    })
                    .collect()
            })
            .collect();
        SimilarityMatrix::from_parts(self.councillors.clone(), scores)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TermFailure {
    pub dataset: String,
    pub term: String,
    pub error: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    pub results: Vec<TermSummary>,
    #[serde(default)]
    pub failures: Vec<TermFailure>,
}

impl Summary {
    pub fn find(&self, dataset: &str, term: &str) -> Option<&TermSummary> {
        self.results
            .iter()
            .find(|r| r.dataset == dataset && r.term == term)
    }

    /// Adds the stored matrices to the cache. Entries that do not form a valid
    /// matrix are skipped.
    pub fn seed_cache(&self, cache: &mut SimilarityCache) {
        for r in self.results.iter() {
            match r.matrix() {
                Ok(m) => cache.insert(&r.dataset, &r.term, &r.digest, m),
                Err(e) => warn!(
                    "seed_cache: skipping {} {}: {}",
                    r.dataset, r.term, e
                ),
            }
        }
    }
}

pub fn parse_summary(contents: &str) -> CouncilResult<Summary> {
    serde_json::from_str(contents).context(ParsingJsonSnafu {})
}

pub fn read_summary(path: &str) -> CouncilResult<Summary> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    parse_summary(&contents)
}

/// Keys are sorted, as in `normalized_json`.
pub fn summary_to_string(summary: &Summary) -> CouncilResult<String> {
    let js: JSValue = serde_json::to_value(summary).context(ParsingJsonSnafu {})?;
    serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})
}

/// Reformats a JSON document the way summaries are written, so that two
/// documents can be compared line by line.
pub fn normalized_json(path: &str) -> CouncilResult<String> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use vote_similarity::builder::Builder;

    fn matrix() -> SimilarityMatrix {
        let mut builder = Builder::new(&NormalizationRules::DEFAULT_RULES)
            .unwrap()
            .vote_ids(&["v1".to_string(), "v2".to_string(), "v3".to_string()])
            .unwrap();
        let row = |v: &[&str]| -> Vec<String> { v.iter().map(|s| s.to_string()).collect() };
        builder.add_row("A", &row(&["Yes", "Yes", "No"])).unwrap();
        builder.add_row("B", &row(&["Yes", "No", "No"])).unwrap();
        builder.add_row("C / D", &row(&["Vacant", "Yes", "Yes"])).unwrap();
        similarity(&builder.build(&VacancyMetadata::new()).unwrap())
    }

    #[test]
    fn keeps_counts_and_undefined() {
        let m = matrix();
        let s = TermSummary::new("d", "t", "digest", &[], &TermVacancies::new(), &m);
        let js = serde_json::to_string(&Summary {
            results: vec![s],
            failures: vec![],
        })
        .unwrap();
        assert!(js.contains(r#"{"agreed":2,"overlap":3}"#));
        assert!(js.contains("null"));

        let back = parse_summary(&js).unwrap();
        assert_eq!(back.find("d", "t").unwrap().matrix().unwrap(), m);
        assert!(back.find("d", "other").is_none());
    }

    #[test]
    fn seeds_valid_entries_only() {
        let m = matrix();
        let good = TermSummary::new("d", "good", "abc", &[], &TermVacancies::new(), &m);
        let mut bad = good.clone();
        bad.term = "bad".to_string();
        bad.scores[0][1] = Some(ScoreJs {
            agreed: 4,
            overlap: 3,
        });
        let summary = Summary {
            results: vec![good, bad],
            failures: vec![],
        };
        let mut cache = SimilarityCache::new();
        summary.seed_cache(&mut cache);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.fingerprint("d", "good"), Some("abc"));
    }

    #[test]
    fn failures_are_optional() {
        let summary = parse_summary(r#"{"results": []}"#).unwrap();
        assert_eq!(summary, Summary::default());
    }
}
