use log::debug;
use std::collections::{BTreeMap, HashMap};

use crate::config::*;
use crate::matrix::VoteMatrix;

/// Reads one entry of a source against the normalization table.
///
/// Returns `None` for anything that is not in the table, including the
/// consensus marker when the rules do not accept it.
pub fn parse_choice(literal: &str, rules: &NormalizationRules) -> Option<Ballot> {
    match literal.trim() {
        "Yes" | "yes" | "YES" => Some(Ballot::Yes),
        "No" | "no" | "NO" => Some(Ballot::No),
        "Absent" => Some(Ballot::Absent),
        "Vacant" => Some(Ballot::Vacant),
        "Conflict of Interest" | "Conflict of interest" => Some(Ballot::ConflictOfInterest),
        "Consensus" if rules.accept_consensus => Some(Ballot::Consensus),
        "" => Some(Ballot::Blank),
        _ => None,
    }
}

fn parse_or_fail(
    literal: &str,
    councillor: &str,
    rules: &NormalizationRules,
) -> Result<Ballot, SimilarityError> {
    parse_choice(literal, rules).ok_or_else(|| SimilarityError::UnrecognizedChoice {
        councillor: councillor.to_string(),
        literal: literal.to_string(),
    })
}

/// The categorical ballots of a term, aligned on one list of vote identifiers.
///
/// This is the intermediate form on which seat transfers are resolved, before
/// the ballots collapse to numeric positions.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ChoiceTable {
    pub(crate) vote_ids: Vec<String>,
    pub(crate) rows: Vec<(String, Vec<Ballot>)>,
}

impl ChoiceTable {
    pub fn new(
        vote_ids: Vec<String>,
        rows: Vec<(String, Vec<Ballot>)>,
    ) -> Result<ChoiceTable, SimilarityError> {
        for (name, ballots) in rows.iter() {
            if ballots.len() != vote_ids.len() {
                return Err(SimilarityError::MalformedInput {
                    councillor: name.clone(),
                    message: format!(
                        "{} votes recorded, {} declared",
                        ballots.len(),
                        vote_ids.len()
                    ),
                });
            }
        }
        Ok(ChoiceTable { vote_ids, rows })
    }

    pub fn vote_ids(&self) -> &[String] {
        &self.vote_ids
    }

    pub fn rows(&self) -> &[(String, Vec<Ballot>)] {
        &self.rows
    }

    pub fn row(&self, name: &str) -> Option<&[Ballot]> {
        self.rows
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, b)| b.as_slice())
    }

    pub fn from_raw(
        table: &RawVoteTable,
        rules: &NormalizationRules,
    ) -> Result<ChoiceTable, SimilarityError> {
        match table {
            RawVoteTable::Records(records) => ChoiceTable::from_records(records, rules),
            RawVoteTable::Scorecard { vote_ids, rows } => {
                ChoiceTable::from_scorecard(vote_ids, rows, rules)
            }
        }
    }

    /// Pivots long-format records into a table.
    ///
    /// Votes are indexed in order of first appearance, councillors by name.
    /// Records repeated verbatim are dropped; two different records for the
    /// same councillor and vote identifier are an error.
    pub fn from_records(
        records: &[VoteRecord],
        rules: &NormalizationRules,
    ) -> Result<ChoiceTable, SimilarityError> {
        let mut vote_ids: Vec<String> = Vec::new();
        let mut vote_index: HashMap<&str, usize> = HashMap::new();
        let mut cells: BTreeMap<&str, HashMap<usize, (Ballot, &str)>> = BTreeMap::new();

        for r in records.iter() {
            let ballot = parse_or_fail(&r.choice, &r.councillor, rules)?;
            let idx = match vote_index.get(r.vote_id.as_str()) {
                Some(idx) => *idx,
                None => {
                    vote_ids.push(r.vote_id.clone());
                    vote_index.insert(r.vote_id.as_str(), vote_ids.len() - 1);
                    vote_ids.len() - 1
                }
            };
            let row = cells.entry(r.councillor.as_str()).or_default();
            match row.get(&idx) {
                Some((_, literal)) if *literal == r.choice.as_str() => {
                    debug!("from_records: dropping duplicate record {:?}", r);
                }
                Some(_) => {
                    return Err(SimilarityError::AmbiguousVoteIdentifier {
                        vote_id: r.vote_id.clone(),
                        councillor: r.councillor.clone(),
                    });
                }
                None => {
                    row.insert(idx, (ballot, r.choice.as_str()));
                }
            }
        }

        let num_votes = vote_ids.len();
        let rows: Vec<(String, Vec<Ballot>)> = cells
            .into_iter()
            .map(|(name, row)| {
                let ballots = (0..num_votes)
                    .map(|idx| row.get(&idx).map(|p| p.0).unwrap_or(Ballot::Unrecorded))
                    .collect();
                (name.to_string(), ballots)
            })
            .collect();
        debug!(
            "from_records: {} records -> {} councillors x {} votes",
            records.len(),
            rows.len(),
            num_votes
        );
        Ok(ChoiceTable { vote_ids, rows })
    }

    /// Reads a scorecard, one row per seat.
    ///
    /// Repeated columns (or rows) are dropped when they hold the same entries;
    /// otherwise the table is rejected.
    pub fn from_scorecard(
        vote_ids: &[String],
        rows: &[ScorecardRow],
        rules: &NormalizationRules,
    ) -> Result<ChoiceTable, SimilarityError> {
        let mut parsed: Vec<(String, Vec<Ballot>)> = Vec::new();
        for row in rows.iter() {
            if row.choices.len() != vote_ids.len() {
                return Err(SimilarityError::MalformedInput {
                    councillor: row.name.clone(),
                    message: format!(
                        "{} votes recorded, {} declared",
                        row.choices.len(),
                        vote_ids.len()
                    ),
                });
            }
            let ballots = row
                .choices
                .iter()
                .map(|c| parse_or_fail(c, &row.name, rules))
                .collect::<Result<Vec<Ballot>, SimilarityError>>()?;
            match parsed.iter().find(|(name, _)| *name == row.name) {
                Some((_, existing)) if *existing == ballots => {
                    debug!("from_scorecard: dropping duplicate row {:?}", row.name);
                }
                Some(_) => {
                    return Err(SimilarityError::MalformedInput {
                        councillor: row.name.clone(),
                        message: "two different rows for the same councillor".to_string(),
                    });
                }
                None => parsed.push((row.name.clone(), ballots)),
            }
        }

        let mut kept: Vec<usize> = Vec::new();
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        for (idx, vid) in vote_ids.iter().enumerate() {
            match first_seen.get(vid.as_str()) {
                Some(first) => {
                    if let Some((name, _)) = parsed.iter().find(|(_, b)| b[*first] != b[idx]) {
                        return Err(SimilarityError::AmbiguousVoteIdentifier {
                            vote_id: vid.clone(),
                            councillor: name.clone(),
                        });
                    }
                    debug!("from_scorecard: dropping duplicate column {:?}", vid);
                }
                None => {
                    first_seen.insert(vid.as_str(), idx);
                    kept.push(idx);
                }
            }
        }

        Ok(ChoiceTable {
            vote_ids: kept.iter().map(|idx| vote_ids[*idx].clone()).collect(),
            rows: parsed
                .into_iter()
                .map(|(name, ballots)| (name, kept.iter().map(|idx| ballots[*idx]).collect()))
                .collect(),
        })
    }

    pub fn to_matrix(&self) -> Result<VoteMatrix, SimilarityError> {
        let rows = self
            .rows
            .iter()
            .map(|(name, ballots)| (name.clone(), ballots.iter().map(|b| b.position()).collect()))
            .collect();
        VoteMatrix::new(self.vote_ids.clone(), rows)
    }
}
