// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

/// One ballot cast by a councillor on a single decision, as found in long-format
/// voting records.
///
/// The choice is kept as the raw literal; it is checked against the
/// normalization table when the table is assembled.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct VoteRecord {
    pub councillor: String,
    pub vote_id: String,
    pub choice: String,
}

/// The parts that identify a single decision of council.
///
/// Descriptions repeat a lot across meetings ("Adopt Item as Amended"), so the
/// identifier has to combine all of them.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct VoteKey {
    pub agenda_item: String,
    pub motion_type: String,
    pub description: String,
    pub result: String,
    pub date: String,
}

impl VoteKey {
    pub fn identifier(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.agenda_item, self.motion_type, self.description, self.result, self.date
        )
    }
}

/// A row of a scorecard: one seat, one entry per vote of the term.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScorecardRow {
    pub name: String,
    pub choices: Vec<String>,
}

/// A source table for one term, before any normalization.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RawVoteTable {
    /// One record per (councillor, vote) pair.
    Records(Vec<VoteRecord>),
    /// One row per seat, one column per vote. The columns are expected in
    /// chronological order.
    Scorecard {
        vote_ids: Vec<String>,
        rows: Vec<ScorecardRow>,
    },
}

/// All the recognized entries of a ballot.
///
/// The distinction between the different missing states matters before the
/// timeline is reconciled: `Vacant` marks the seat transfers.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Ballot {
    Yes,
    No,
    Absent,
    Vacant,
    ConflictOfInterest,
    /// Unanimous procedural vote recorded without a tally.
    Consensus,
    /// Empty cell.
    Blank,
    /// The councillor does not appear at all for this vote in the source.
    Unrecorded,
}

impl Ballot {
    pub fn position(&self) -> Position {
        match self {
            Ballot::Yes | Ballot::Consensus => Position::Affirmative,
            Ballot::No => Position::Negative,
            Ballot::Absent
            | Ballot::Vacant
            | Ballot::ConflictOfInterest
            | Ballot::Blank
            | Ballot::Unrecorded => Position::Missing,
        }
    }

    pub fn is_recorded(&self) -> bool {
        self.position() != Position::Missing
    }
}

/// The numeric view of a ballot: 1, 0 or nothing.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Position {
    Affirmative,
    Negative,
    Missing,
}

/// How to read the literals of a source.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct NormalizationRules {
    /// Accept `Consensus` as an affirmative vote. Only sources that do not
    /// filter out unanimous votes beforehand contain this marker.
    pub accept_consensus: bool,
}

impl NormalizationRules {
    pub const DEFAULT_RULES: NormalizationRules = NormalizationRules {
        accept_consensus: false,
    };
}

// ********* Vacancies **********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum VacancyReason {
    /// Left during the term (resignation, removal, death) and replaced by
    /// by-election.
    EarlyDeparture,
    /// Appointed by council to fill a vacancy.
    TemporaryAppointment,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VacancyEntry {
    pub reason: VacancyReason,
    /// The other occupants of the same seat during the term.
    pub replacements: Vec<String>,
}

/// Councillors of one term that did not serve the full term.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct VacancyMetadata {
    pub entries: BTreeMap<String, VacancyEntry>,
}

impl VacancyMetadata {
    pub fn new() -> VacancyMetadata {
        VacancyMetadata::default()
    }

    pub fn insert(&mut self, councillor: &str, reason: VacancyReason, replacements: &[String]) {
        self.entries.insert(
            councillor.to_string(),
            VacancyEntry {
                reason,
                replacements: replacements.to_vec(),
            },
        );
    }

    pub fn reason(&self, councillor: &str) -> Option<VacancyReason> {
        self.entries.get(councillor).map(|e| e.reason)
    }
}

// ******** Layout requests *********

/// Which partial-term councillors to keep in a layout.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct IncludeFlags {
    pub early_departures: bool,
    pub temporary_appointments: bool,
}

impl IncludeFlags {
    pub fn includes(&self, reason: VacancyReason) -> bool {
        match reason {
            VacancyReason::EarlyDeparture => self.early_departures,
            VacancyReason::TemporaryAppointment => self.temporary_appointments,
        }
    }
}

/// A selection made by the person looking at a term.
///
/// A new request is built on every change of selection; nothing is kept
/// between two layouts.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct LayoutRequest {
    pub reference: Option<String>,
    pub include: IncludeFlags,
    /// The canonical anchors of the term, usually the mayor followed by
    /// tie-breakers. Used when the reference is not available.
    pub anchors: Vec<String>,
}

/// Errors that prevent a term from being ingested.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SimilarityError {
    /// The shape of the input does not match the declared votes.
    MalformedInput { councillor: String, message: String },
    /// Two different entries share the same vote identifier.
    AmbiguousVoteIdentifier { vote_id: String, councillor: String },
    /// A seat transfer row whose vacancy boundary cannot be found.
    UnresolvableTimeline { seat: String, message: String },
    /// A literal that is not part of the normalization table.
    UnrecognizedChoice { councillor: String, literal: String },
}

impl Error for SimilarityError {}

impl Display for SimilarityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimilarityError::MalformedInput {
                councillor,
                message,
            } => write!(f, "malformed input for {:?}: {}", councillor, message),
            SimilarityError::AmbiguousVoteIdentifier {
                vote_id,
                councillor,
            } => write!(
                f,
                "vote identifier {:?} is used by different votes (councillor {:?})",
                vote_id, councillor
            ),
            SimilarityError::UnresolvableTimeline { seat, message } => {
                write!(f, "cannot split the timeline of seat {:?}: {}", seat, message)
            }
            SimilarityError::UnrecognizedChoice {
                councillor,
                literal,
            } => write!(
                f,
                "unrecognized vote {:?} for councillor {:?}",
                literal, councillor
            ),
        }
    }
}
