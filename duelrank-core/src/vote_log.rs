//! Append-only, undoable log of pairwise votes.
//!
//! The log is the single source of truth: "already judged" pairs, per-item
//! vote counts and every rating fit are derived from it on demand, never
//! cached alongside it.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{PairKey, Vote};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteLog {
    votes: Vec<Vote>,
}

impl VoteLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from already-validated votes (e.g. a parsed snapshot).
    pub fn from_votes(votes: Vec<Vote>) -> Self {
        VoteLog { votes }
    }

    /// Record a vote at the end of the log.
    pub fn append(&mut self, vote: Vote) -> Result<()> {
        if !vote.is_well_formed() {
            return Err(Error::InvalidVote(vote));
        }
        debug!(
            item_a = %vote.item_a,
            item_b = %vote.item_b,
            outcome = %vote.outcome,
            "vote appended"
        );
        self.votes.push(vote);
        Ok(())
    }

    /// Remove and return the most recent vote. An empty log stays empty.
    pub fn undo_last(&mut self) -> Option<Vote> {
        let removed = self.votes.pop();
        if let Some(ref vote) = removed {
            debug!(item_a = %vote.item_a, item_b = %vote.item_b, "vote undone");
        }
        removed
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn last(&self) -> Option<&Vote> {
        self.votes.last()
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub(crate) fn votes_mut(&mut self) -> &mut [Vote] {
        &mut self.votes
    }

    /// Canonical keys of every pair that has at least one vote.
    pub fn already_judged_pair_keys(&self) -> HashSet<PairKey> {
        self.votes.iter().map(Vote::pair_key).collect()
    }

    /// Every item id referenced by either slot of any vote.
    pub fn items_appearing_in_votes(&self) -> BTreeSet<String> {
        let mut items = BTreeSet::new();
        for vote in &self.votes {
            items.insert(vote.item_a.clone());
            items.insert(vote.item_b.clone());
        }
        items
    }

    /// Number of votes each item took part in. Ties count like decisive votes.
    pub fn vote_count_per_item(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for vote in &self.votes {
            *counts.entry(vote.item_a.clone()).or_insert(0) += 1;
            *counts.entry(vote.item_b.clone()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;
    use proptest::prelude::*;

    fn log_of(votes: &[(&str, &str, Outcome)]) -> VoteLog {
        let mut log = VoteLog::new();
        for &(a, b, outcome) in votes {
            log.append(Vote::new(a, b, outcome)).unwrap();
        }
        log
    }

    #[test]
    fn test_append_rejects_malformed_votes() {
        let mut log = VoteLog::new();
        assert!(matches!(
            log.append(Vote::new("", "b", Outcome::AWins)),
            Err(Error::InvalidVote(_))
        ));
        assert!(matches!(
            log.append(Vote::new("a", "a", Outcome::Tie)),
            Err(Error::InvalidVote(_))
        ));
        assert!(log.is_empty());
    }

    #[test]
    fn test_undo_on_empty_log() {
        let mut log = VoteLog::new();
        assert_eq!(log.undo_last(), None);
        assert!(log.is_empty());
    }

    #[test]
    fn test_undo_returns_last_vote() {
        let mut log = log_of(&[("a", "b", Outcome::AWins), ("b", "c", Outcome::Tie)]);
        assert_eq!(log.undo_last(), Some(Vote::new("b", "c", Outcome::Tie)));
        assert_eq!(log.len(), 1);
        assert_eq!(log.last(), Some(&Vote::new("a", "b", Outcome::AWins)));
    }

    #[test]
    fn test_already_judged_keys_ignore_slot_order() {
        let log = log_of(&[
            ("b", "a", Outcome::AWins),
            ("a", "b", Outcome::BWins),
            ("c", "a", Outcome::Tie),
        ]);
        let keys = log.already_judged_pair_keys();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&PairKey::new("a", "b")));
        assert!(keys.contains(&PairKey::new("a", "c")));
    }

    #[test]
    fn test_vote_count_per_item_counts_ties() {
        let log = log_of(&[
            ("a", "b", Outcome::AWins),
            ("a", "c", Outcome::Tie),
            ("b", "c", Outcome::BWins),
        ]);
        let counts = log.vote_count_per_item();
        assert_eq!(counts["a"], 2);
        assert_eq!(counts["b"], 2);
        assert_eq!(counts["c"], 2);
        assert_eq!(counts.get("d"), None);
    }

    #[test]
    fn test_items_appearing_in_votes() {
        let log = log_of(&[("x", "y", Outcome::AWins), ("y", "z", Outcome::Tie)]);
        let items: Vec<String> = log.items_appearing_in_votes().into_iter().collect();
        assert_eq!(items, vec!["x", "y", "z"]);
    }

    fn arb_outcome() -> impl Strategy<Value = Outcome> {
        prop_oneof![Just(Outcome::AWins), Just(Outcome::BWins), Just(Outcome::Tie)]
    }

    fn arb_vote() -> impl Strategy<Value = Vote> {
        ("[a-e]{1,3}", "[f-j]{1,3}", arb_outcome()).prop_map(|(a, b, o)| Vote::new(a, b, o))
    }

    proptest! {
        #[test]
        fn prop_pair_key_symmetric(vote in arb_vote()) {
            let mirrored = Vote::new(vote.item_b.clone(), vote.item_a.clone(), vote.outcome);
            prop_assert_eq!(vote.pair_key(), mirrored.pair_key());
        }

        #[test]
        fn prop_undo_inverts_append(
            votes in prop::collection::vec(arb_vote(), 0..20),
            extra in arb_vote(),
        ) {
            let original = VoteLog::from_votes(votes);
            let mut log = original.clone();
            log.append(extra.clone()).unwrap();
            prop_assert_eq!(log.undo_last(), Some(extra));
            prop_assert_eq!(log, original);
        }
    }
}
