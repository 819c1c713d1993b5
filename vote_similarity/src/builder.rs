pub use crate::config::*;

use crate::normalize::parse_choice;
use crate::VoteMatrix;

/// A builder for assembling a scorecard row by row.
///
/// Entries are checked as they are added, so that an error points at the row
/// that caused it.
///
/// ```
/// pub use vote_similarity::builder::Builder;
/// pub use vote_similarity::{NormalizationRules, VacancyMetadata};
/// # use vote_similarity::{similarity, SimilarityError};
///
/// let mut builder = Builder::new(&NormalizationRules::DEFAULT_RULES)?
///     .vote_ids(&["Item 1".to_string(), "Item 2".to_string()])?;
///
/// builder.add_row("Anna", &["Yes".to_string(), "No".to_string()])?;
/// builder.add_row("Bob", &["Yes".to_string(), "Absent".to_string()])?;
///
/// let votes = builder.build(&VacancyMetadata::new())?;
/// let scores = similarity(&votes);
/// assert_eq!(scores.get("Anna", "Bob").and_then(|s| s.value()), Some(1.0));
/// # Ok::<(), SimilarityError>(())
/// ```
pub struct Builder {
    pub(crate) _rules: NormalizationRules,
    pub(crate) _vote_ids: Vec<String>,
    pub(crate) _rows: Vec<ScorecardRow>,
}

impl Builder {
    pub fn new(rules: &NormalizationRules) -> Result<Builder, SimilarityError> {
        Ok(Builder {
            _rules: *rules,
            _vote_ids: Vec::new(),
            _rows: Vec::new(),
        })
    }

    /// Declares the votes of the scorecard, in chronological order. Rows added
    /// before are discarded.
    pub fn vote_ids(self, vote_ids: &[String]) -> Result<Builder, SimilarityError> {
        Ok(Builder {
            _rules: self._rules,
            _vote_ids: vote_ids.to_vec(),
            _rows: Vec::new(),
        })
    }

    /// Adds the row of a seat.
    ///
    /// name: a councillor, or two councillors separated by `/` when the seat
    /// changed hands during the term.
    /// choices: one raw entry per declared vote.
    pub fn add_row(&mut self, name: &str, choices: &[String]) -> Result<(), SimilarityError> {
        if choices.len() != self._vote_ids.len() {
            return Err(SimilarityError::MalformedInput {
                councillor: name.to_string(),
                message: format!(
                    "{} entries for {} declared votes",
                    choices.len(),
                    self._vote_ids.len()
                ),
            });
        }
        if let Some(literal) = choices
            .iter()
            .find(|c| parse_choice(c, &self._rules).is_none())
        {
            return Err(SimilarityError::UnrecognizedChoice {
                councillor: name.to_string(),
                literal: literal.clone(),
            });
        }
        self._rows.push(ScorecardRow {
            name: name.to_string(),
            choices: choices.to_vec(),
        });
        Ok(())
    }

    /// Normalizes the rows added so far.
    pub fn build(&self, vacancies: &VacancyMetadata) -> Result<VoteMatrix, SimilarityError> {
        let table = RawVoteTable::Scorecard {
            vote_ids: self._vote_ids.clone(),
            rows: self._rows.clone(),
        };
        crate::normalize(&[table], vacancies, &self._rules)
    }
}
