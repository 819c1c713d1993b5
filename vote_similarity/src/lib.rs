/*!
Voting similarity between the members of a council.

The library works in three steps, all pure functions of their inputs:

- [`normalize`] reads the source tables of a term, reconciles the seats that
  changed hands during the term, and produces a [`VoteMatrix`] where every
  councillor has one position per vote.
- [`similarity`] computes, for every pair of councillors, the share of votes
  where they voted the same way, among the votes where both were recorded.
- [`layout`] filters, orders and masks a [`SimilarityMatrix`] for a diagonal
  display anchored on a reference councillor.

See the [`manual`] for the details of the input formats.
*/

mod cache;
mod config;
mod layout;
mod matrix;
mod normalize;
mod timeline;

pub mod builder;
pub mod manual;

use log::{debug, info, warn};

pub use crate::cache::SimilarityCache;
pub use crate::config::*;
pub use crate::layout::{layout, Layout};
pub use crate::matrix::{Similarity, SimilarityMatrix, VoteMatrix};
pub use crate::normalize::{parse_choice, ChoiceTable};
pub use crate::timeline::{is_seat_transfer, merge_tables, reconcile, split_seat_name, SEAT_SEPARATOR};

/// Builds the vote matrix of a term.
///
/// Arguments:
/// * `tables` the sources of the term, in chronological order. A term whose
/// records are split across several files is merged here.
/// * `vacancies` the councillors that did not serve the full term. They are
/// checked against the result.
/// * `rules` how to read the entries of the sources
pub fn normalize(
    tables: &[RawVoteTable],
    vacancies: &VacancyMetadata,
    rules: &NormalizationRules,
) -> Result<VoteMatrix, SimilarityError> {
    info!("normalize: processing {} source tables", tables.len());
    let mut merged: Option<ChoiceTable> = None;
    for table in tables.iter() {
        let parsed = ChoiceTable::from_raw(table, rules)?;
        merged = Some(match merged {
            None => parsed,
            Some(previous) => merge_tables(&previous, &parsed)?,
        });
    }
    let reconciled = reconcile(&merged.unwrap_or_default())?;
    check_vacancies(&reconciled, vacancies);
    let votes = reconciled.to_matrix()?;
    info!(
        "normalize: {} councillors, {} votes",
        votes.len(),
        votes.vote_ids().len()
    );
    Ok(votes)
}

fn check_vacancies(table: &ChoiceTable, vacancies: &VacancyMetadata) {
    for (name, entry) in vacancies.entries.iter() {
        if table.row(name).is_none() {
            warn!(
                "check_vacancies: {:?} ({:?}) has no votes in this term",
                name, entry.reason
            );
        }
        for replacement in entry.replacements.iter() {
            if table.row(replacement).is_none() {
                warn!(
                    "check_vacancies: replacement {:?} of {:?} has no votes in this term",
                    replacement, name
                );
            }
        }
    }
}

/// Computes the similarity between all the pairs of councillors.
///
/// Only the votes where both councillors have a position count. The score is
/// the number of identical positions over the number of such votes, or
/// [`Similarity::Undefined`] when there is none. The diagonal is undefined.
pub fn similarity(votes: &VoteMatrix) -> SimilarityMatrix {
    let rows = votes.rows();
    let n = rows.len();
    let mut scores: Vec<Vec<Similarity>> = vec![vec![Similarity::Undefined; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let s = pair_similarity(&rows[i].1, &rows[j].1);
            debug!("similarity: {:?} / {:?}: {:?}", rows[i].0, rows[j].0, s);
            scores[i][j] = s;
            scores[j][i] = s;
        }
    }
    SimilarityMatrix::new_unchecked(votes.councillors(), scores)
}

fn pair_similarity(a: &[Position], b: &[Position]) -> Similarity {
    let mut agreed: u32 = 0;
    let mut overlap: u32 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        if *x == Position::Missing || *y == Position::Missing {
            continue;
        }
        overlap += 1;
        if x == y {
            agreed += 1;
        }
    }
    Similarity::from_counts(agreed, overlap)
}
