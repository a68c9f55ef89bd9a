//! Next-pair selection.
//!
//! Three policies, all of which skip pairs that already have a vote and return
//! `None` when fewer than two items are left to pair:
//!
//! - `find_most_uncertain_pair`: exhaustive O(n²) scan for the pair whose
//!   predicted outcome is closest to a coin flip.
//! - `find_most_uncertain_pair_fast`: sort by rating, then scan by increasing
//!   index distance in that order. Approximates nearest-in-rating without the
//!   quadratic scan; used after every interactive vote.
//! - `find_next_pair`: cold start, no ratings needed. Prefers the items with
//!   the fewest votes.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::RatingModel;
use crate::types::{Pair, PairKey};
use crate::vote_log::VoteLog;

/// Which rating-aware scan to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Sorted-distance scan.
    #[default]
    Fast,
    /// Full uncertainty scan over every unexcluded pair.
    Exhaustive,
}

/// Dispatch to the scan named by `policy`.
pub fn select_pair<M: RatingModel + ?Sized>(
    policy: SelectionPolicy,
    items: &[String],
    model: &M,
    excluded: &HashSet<PairKey>,
) -> Option<Pair> {
    match policy {
        SelectionPolicy::Fast => find_most_uncertain_pair_fast(items, model, excluded),
        SelectionPolicy::Exhaustive => find_most_uncertain_pair(items, model, excluded),
    }
}

/// Pair with the lowest `|P(a wins) - 0.5|` among unexcluded pairs.
///
/// Ties go to the first pair in row-major order over `items`.
pub fn find_most_uncertain_pair<M: RatingModel + ?Sized>(
    items: &[String],
    model: &M,
    excluded: &HashSet<PairKey>,
) -> Option<Pair> {
    let mut best: Option<(&String, &String)> = None;
    let mut lowest_confidence = f64::INFINITY;

    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            if excluded.contains(&PairKey::new(a, b)) {
                continue;
            }
            let confidence = model.expected_outcome(a, b).confidence();
            if confidence < lowest_confidence {
                lowest_confidence = confidence;
                best = Some((a, b));
            }
        }
    }

    best.map(|(a, b)| (a.clone(), b.clone()))
}

/// Nearest-in-rating pair found by scanning the rating-sorted order.
///
/// For `step = 1, 2, ...` every pair `step` apart in sorted order is checked;
/// the first step that has any unexcluded pair wins, and within that step the
/// smallest rating gap wins (first starting index on equal gaps). The sort is
/// stable, so equal ratings keep their `items` order.
pub fn find_most_uncertain_pair_fast<M: RatingModel + ?Sized>(
    items: &[String],
    model: &M,
    excluded: &HashSet<PairKey>,
) -> Option<Pair> {
    let mut sorted: Vec<(&String, f64)> =
        items.iter().map(|item| (item, model.rating(item))).collect();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));

    for step in 1..sorted.len() {
        let mut best: Option<(&String, &String)> = None;
        let mut lowest_distance = f64::INFINITY;

        for i in 0..sorted.len() - step {
            let (a, rating_a) = sorted[i];
            let (b, rating_b) = sorted[i + step];
            if excluded.contains(&PairKey::new(a, b)) {
                continue;
            }
            let distance = (rating_a - rating_b).abs();
            if best.is_none() || distance < lowest_distance {
                lowest_distance = distance;
                best = Some((a, b));
            }
        }

        if let Some((a, b)) = best {
            return Some((a.clone(), b.clone()));
        }
    }

    None
}

/// Cold-start selection from vote counts alone.
///
/// Items are shuffled first so that, among items with equal counts, no fixed
/// order (alphabetical, enumeration) is favored; the stable sort by ascending
/// vote count then keeps that random order inside each count.
pub fn find_next_pair<R: Rng + ?Sized>(
    items: &[String],
    votes: &VoteLog,
    rng: &mut R,
) -> Option<Pair> {
    let counts: HashMap<String, usize> = votes.vote_count_per_item();
    let excluded = votes.already_judged_pair_keys();

    let mut sorted: Vec<&String> = items.iter().collect();
    sorted.shuffle(rng);
    sorted.sort_by_key(|item| counts.get(*item).copied().unwrap_or(0));

    for (i, a) in sorted.iter().enumerate() {
        for b in &sorted[i + 1..] {
            if !excluded.contains(&PairKey::new(a, b)) {
                return Some(((*a).clone(), (*b).clone()));
            }
        }
    }

    None
}
