use log::{debug, info};

use crate::config::*;
use crate::matrix::{compare_descending, Similarity, SimilarityMatrix};

/// A similarity matrix prepared for a diagonal display.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Layout {
    /// The councillors on both axes, reference first.
    pub order: Vec<String>,
    /// Full scores in `order` x `order`.
    pub ordered: Vec<Vec<Similarity>>,
    /// Same as `ordered`, keeping only the entries strictly below the diagonal.
    pub masked: Vec<Vec<Option<Similarity>>>,
    /// The councillors that can be picked as a reference, sorted by name.
    pub candidates: Vec<String>,
    /// The reference actually used. It differs from the requested one when
    /// that councillor is filtered out or unknown.
    pub reference: Option<String>,
}

/// Filters, orders and masks a similarity matrix for one selection.
///
/// Councillors tagged in `exclusions` are dropped from both axes unless the
/// request includes their category. The rest is sorted by descending
/// similarity to the reference, which is always put first. When the requested
/// reference is not available, the first councillor by similarity to the
/// term's anchors is used instead.
pub fn layout(
    matrix: &SimilarityMatrix,
    exclusions: &VacancyMetadata,
    request: &LayoutRequest,
) -> Layout {
    let members: Vec<usize> = (0..matrix.len())
        .filter(|idx| match exclusions.reason(&matrix.councillors()[*idx]) {
            Some(reason) => request.include.includes(reason),
            None => true,
        })
        .collect();
    debug!(
        "layout: {} of {} councillors kept with {:?}",
        members.len(),
        matrix.len(),
        request.include
    );
    if members.is_empty() {
        return Layout::default();
    }

    let mut candidates: Vec<String> = members
        .iter()
        .map(|idx| matrix.councillors()[*idx].clone())
        .collect();
    candidates.sort();

    let requested: Option<usize> = request
        .reference
        .as_ref()
        .and_then(|r| matrix.index_of(r))
        .filter(|idx| members.contains(idx));
    let reference = match requested {
        Some(idx) => idx,
        None => {
            let fallback = fallback_reference(matrix, &members, &candidates, &request.anchors);
            info!(
                "layout: reference {:?} not available, using {:?}",
                request.reference,
                matrix.councillors()[fallback]
            );
            fallback
        }
    };

    let order = order_by_anchors(matrix, &members, &[reference]);
    let ordered: Vec<Vec<Similarity>> = order
        .iter()
        .map(|i| order.iter().map(|j| matrix.at(*i, *j)).collect())
        .collect();
    let masked: Vec<Vec<Option<Similarity>>> = ordered
        .iter()
        .enumerate()
        .map(|(row, scores)| {
            scores
                .iter()
                .enumerate()
                .map(|(col, s)| if row > col { Some(*s) } else { None })
                .collect()
        })
        .collect();

    Layout {
        order: order
            .iter()
            .map(|idx| matrix.councillors()[*idx].clone())
            .collect(),
        ordered,
        masked,
        candidates,
        reference: Some(matrix.councillors()[reference].clone()),
    }
}

// The first member by similarity to the anchors. Anchors do not need to be
// members themselves: their scores are still known.
fn fallback_reference(
    matrix: &SimilarityMatrix,
    members: &[usize],
    candidates: &[String],
    anchors: &[String],
) -> usize {
    let anchor_idxs: Vec<usize> = anchors.iter().filter_map(|a| matrix.index_of(a)).collect();
    if anchor_idxs.is_empty() {
        return candidates
            .first()
            .and_then(|c| matrix.index_of(c))
            .unwrap_or(members[0]);
    }
    order_by_anchors(matrix, members, &anchor_idxs)[0]
}

/// Orders `members` by descending similarity to the first anchor, breaking
/// ties with the next anchors and then with the current order. The first
/// anchor is moved to the front when it is a member: the sort alone does not
/// guarantee it, since its score with itself is undefined and other members
/// may tie.
pub(crate) fn order_by_anchors(
    matrix: &SimilarityMatrix,
    members: &[usize],
    anchors: &[usize],
) -> Vec<usize> {
    let mut order: Vec<usize> = members.to_vec();
    order.sort_by(|a, b| {
        anchors
            .iter()
            .map(|anchor| compare_descending(matrix.at(*anchor, *a), matrix.at(*anchor, *b)))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if let Some(first) = anchors.first() {
        if let Some(pos) = order.iter().position(|idx| idx == first) {
            let anchor = order.remove(pos);
            order.insert(0, anchor);
        }
    }
    order
}
