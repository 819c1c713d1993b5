use log::{debug, info};
use std::collections::HashMap;

use crate::config::*;
use crate::normalize::ChoiceTable;

/// Separates the two occupants of a seat that changed hands during the term,
/// as in `"Ana Bailão / Alejandra Bravo"`.
pub const SEAT_SEPARATOR: char = '/';

pub fn is_seat_transfer(name: &str) -> bool {
    name.contains(SEAT_SEPARATOR)
}

/// The two occupants of a shared seat, in order of service.
pub fn split_seat_name(name: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = name.split(SEAT_SEPARATOR).map(|s| s.trim()).collect();
    match parts.as_slice() {
        [first, second] if !first.is_empty() && !second.is_empty() => {
            Some((first.to_string(), second.to_string()))
        }
        _ => None,
    }
}

/// Splits every seat-transfer row into one row per occupant.
///
/// The transfer happens at the first `Vacant` entry of the row. The first
/// occupant keeps the entries before it, the second occupant the entries from
/// it onward; everything else becomes unrecorded. Only one transfer per seat
/// is supported: a row that becomes vacant again after the second occupant
/// started voting is rejected.
pub fn reconcile(table: &ChoiceTable) -> Result<ChoiceTable, SimilarityError> {
    let mut rows: Vec<(String, Vec<Ballot>)> = Vec::new();
    for (name, ballots) in table.rows.iter() {
        if is_seat_transfer(name) {
            let [first, second] = split_row(name, ballots)?;
            info!(
                "reconcile: seat {:?} split into {:?} and {:?}",
                name, first.0, second.0
            );
            push_segment(&mut rows, first)?;
            push_segment(&mut rows, second)?;
        } else {
            push_segment(&mut rows, (name.clone(), ballots.clone()))?;
        }
    }
    ChoiceTable::new(table.vote_ids.clone(), rows)
}

fn split_row(
    name: &str,
    ballots: &[Ballot],
) -> Result<[(String, Vec<Ballot>); 2], SimilarityError> {
    let (first_name, second_name) =
        split_seat_name(name).ok_or_else(|| SimilarityError::UnresolvableTimeline {
            seat: name.to_string(),
            message: format!("expected two names separated by '{}'", SEAT_SEPARATOR),
        })?;

    let boundary = ballots
        .iter()
        .position(|b| *b == Ballot::Vacant)
        .ok_or_else(|| SimilarityError::UnresolvableTimeline {
            seat: name.to_string(),
            message: "no vacancy found in the row".to_string(),
        })?;

    let mut second_seated = false;
    for (idx, b) in ballots.iter().enumerate().skip(boundary) {
        match b {
            Ballot::Vacant if second_seated => {
                return Err(SimilarityError::UnresolvableTimeline {
                    seat: name.to_string(),
                    message: format!("seat becomes vacant a second time at vote #{}", idx + 1),
                });
            }
            Ballot::Vacant | Ballot::Unrecorded => {}
            _ => {
                second_seated = true;
            }
        }
    }
    debug!("split_row: {:?}: vacancy starts at vote #{}", name, boundary + 1);

    let first: Vec<Ballot> = ballots
        .iter()
        .enumerate()
        .map(|(idx, b)| if idx < boundary { *b } else { Ballot::Unrecorded })
        .collect();
    let second: Vec<Ballot> = ballots
        .iter()
        .enumerate()
        .map(|(idx, b)| if idx < boundary { Ballot::Unrecorded } else { *b })
        .collect();
    Ok([(first_name, first), (second_name, second)])
}

// A councillor may already have a row of their own (for instance from another
// source of the same term). Both rows are combined as long as they do not
// record the same vote.
fn push_segment(
    rows: &mut Vec<(String, Vec<Ballot>)>,
    segment: (String, Vec<Ballot>),
) -> Result<(), SimilarityError> {
    let (name, ballots) = segment;
    if let Some((_, existing)) = rows.iter_mut().find(|(n, _)| *n == name) {
        for (cell, b) in existing.iter_mut().zip(ballots.iter()) {
            match (*cell, *b) {
                (_, Ballot::Unrecorded) => {}
                (Ballot::Unrecorded, new) => *cell = new,
                _ => {
                    return Err(SimilarityError::MalformedInput {
                        councillor: name,
                        message: "two seats record the same vote".to_string(),
                    });
                }
            }
        }
        debug!("push_segment: combined two segments of {:?}", name);
        Ok(())
    } else {
        rows.push((name, ballots));
        Ok(())
    }
}

/// Outer union of two tables of the same term.
///
/// The votes of `first` come first in the combined index, so sources should be
/// given in chronological order. Entries missing from one of the tables are
/// unrecorded. When both tables hold an entry for the same councillor and
/// vote, they have to agree.
pub fn merge_tables(
    first: &ChoiceTable,
    second: &ChoiceTable,
) -> Result<ChoiceTable, SimilarityError> {
    let mut vote_ids: Vec<String> = first.vote_ids.clone();
    let mut index: HashMap<String, usize> = vote_ids
        .iter()
        .enumerate()
        .map(|(idx, vid)| (vid.clone(), idx))
        .collect();
    for vid in second.vote_ids.iter() {
        if !index.contains_key(vid) {
            index.insert(vid.clone(), vote_ids.len());
            vote_ids.push(vid.clone());
        }
    }
    let num_votes = vote_ids.len();

    let mut rows: Vec<(String, Vec<Ballot>)> = first
        .rows
        .iter()
        .map(|(name, ballots)| {
            let mut extended = ballots.clone();
            extended.resize(num_votes, Ballot::Unrecorded);
            (name.clone(), extended)
        })
        .collect();

    for (name, ballots) in second.rows.iter() {
        let row_idx = match rows.iter().position(|(n, _)| n == name) {
            Some(row_idx) => row_idx,
            None => {
                rows.push((name.clone(), vec![Ballot::Unrecorded; num_votes]));
                rows.len() - 1
            }
        };
        for (vid, b) in second.vote_ids.iter().zip(ballots.iter()) {
            let cell = &mut rows[row_idx].1[index[vid]];
            match (*cell, *b) {
                (_, Ballot::Unrecorded) => {}
                (Ballot::Unrecorded, new) => *cell = new,
                (old, new) if old == new => {}
                _ => {
                    return Err(SimilarityError::AmbiguousVoteIdentifier {
                        vote_id: vid.clone(),
                        councillor: name.clone(),
                    });
                }
            }
        }
    }
    info!(
        "merge_tables: {} + {} votes -> {} votes, {} councillors",
        first.vote_ids.len(),
        second.vote_ids.len(),
        num_votes,
        rows.len()
    );
    ChoiceTable::new(vote_ids, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use Ballot::*;

    fn ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("v{}", i)).collect()
    }

    fn table(vote_ids: Vec<String>, rows: Vec<(&str, Vec<Ballot>)>) -> ChoiceTable {
        ChoiceTable::new(
            vote_ids,
            rows.into_iter().map(|(n, b)| (n.to_string(), b)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn seat_names() {
        assert_eq!(
            split_seat_name("Ana Bailão / Alejandra Bravo"),
            Some(("Ana Bailão".to_string(), "Alejandra Bravo".to_string()))
        );
        assert_eq!(split_seat_name("A / B / C"), None);
        assert_eq!(split_seat_name("A / "), None);
        assert!(!is_seat_transfer("Paula Fletcher"));
    }

    #[test]
    fn split_at_first_vacancy() {
        let t = table(
            ids(6),
            vec![
                ("Mayor", vec![Yes, Yes, No, No, Yes, Yes]),
                ("First / Second", vec![Yes, No, Vacant, Vacant, No, Yes]),
            ],
        );
        let r = reconcile(&t).unwrap();
        let names: Vec<&str> = r.rows().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Mayor", "First", "Second"]);
        assert_eq!(
            r.row("First"),
            Some(&[Yes, No, Unrecorded, Unrecorded, Unrecorded, Unrecorded][..])
        );
        assert_eq!(
            r.row("Second"),
            Some(&[Unrecorded, Unrecorded, Vacant, Vacant, No, Yes][..])
        );
    }

    #[test]
    fn split_segments_cover_the_term() {
        let original = vec![Yes, No, Yes, Vacant, Vacant, No, No, Yes];
        let t = table(ids(8), vec![("A / B", original.clone())]);
        let r = reconcile(&t).unwrap();
        let a = r.row("A").unwrap();
        let b = r.row("B").unwrap();
        for idx in 0..original.len() {
            let seated = [a[idx], b[idx]].iter().filter(|x| x.is_recorded()).count();
            if original[idx] == Vacant {
                assert_eq!(seated, 0);
            } else {
                assert_eq!(seated, 1, "vote #{}", idx + 1);
            }
        }
    }

    #[test]
    fn no_vacancy_is_unresolvable() {
        let t = table(ids(3), vec![("A / B", vec![Yes, No, Yes])]);
        assert!(matches!(
            reconcile(&t),
            Err(SimilarityError::UnresolvableTimeline { seat, .. }) if seat == "A / B"
        ));
    }

    #[test]
    fn second_vacancy_is_unresolvable() {
        let t = table(ids(5), vec![("A / B", vec![Yes, Vacant, No, Vacant, Yes])]);
        assert!(matches!(
            reconcile(&t),
            Err(SimilarityError::UnresolvableTimeline { .. })
        ));
    }

    #[test]
    fn merge_is_an_outer_union() {
        let before = table(
            vec!["v1".to_string(), "v2".to_string()],
            vec![("A", vec![Yes, No]), ("Old", vec![No, No])],
        );
        let after = table(
            vec!["v2".to_string(), "v3".to_string()],
            vec![("A", vec![No, Yes]), ("New", vec![Absent, Yes])],
        );
        let m = merge_tables(&before, &after).unwrap();
        assert_eq!(m.vote_ids(), &ids(3)[..]);
        assert_eq!(m.row("A"), Some(&[Yes, No, Yes][..]));
        assert_eq!(m.row("Old"), Some(&[No, No, Unrecorded][..]));
        assert_eq!(m.row("New"), Some(&[Unrecorded, Absent, Yes][..]));
    }

    #[test]
    fn merge_rejects_conflicts() {
        let before = table(vec!["v1".to_string()], vec![("A", vec![Yes])]);
        let after = table(vec!["v1".to_string()], vec![("A", vec![No])]);
        assert!(matches!(
            merge_tables(&before, &after),
            Err(SimilarityError::AmbiguousVoteIdentifier { vote_id, .. }) if vote_id == "v1"
        ));
    }

    #[test]
    fn split_joins_an_existing_row() {
        // The outgoing councillor also has a row from an earlier source.
        let t = table(
            ids(4),
            vec![
                ("A", vec![Yes, Unrecorded, Unrecorded, Unrecorded]),
                ("A / B", vec![Unrecorded, No, Vacant, Yes]),
            ],
        );
        let r = reconcile(&t).unwrap();
        assert_eq!(r.rows().len(), 2);
        assert_eq!(r.row("A"), Some(&[Yes, No, Unrecorded, Unrecorded][..]));
        assert_eq!(r.row("B"), Some(&[Unrecorded, Unrecorded, Vacant, Yes][..]));
    }
}
