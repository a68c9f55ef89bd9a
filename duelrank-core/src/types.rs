use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar strength per item id. Elo and Davidson ratings share this shape but
/// live on unrelated scales.
pub type Ratings = HashMap<String, f64>;

/// Two item ids to show side by side, left first.
pub type Pair = (String, String);

/// Result of a single comparison, from the point of view of the vote's slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "a")]
    AWins,
    #[serde(rename = "b")]
    BWins,
    #[serde(rename = "tie")]
    Tie,
}

impl Outcome {
    /// Actual scores `(a, b)`: 1 for the winner, 0 for the loser, 0.5 each on a tie.
    pub fn scores(self) -> (f64, f64) {
        match self {
            Outcome::AWins => (1.0, 0.0),
            Outcome::BWins => (0.0, 1.0),
            Outcome::Tie => (0.5, 0.5),
        }
    }

    pub fn is_decisive(self) -> bool {
        !matches!(self, Outcome::Tie)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::AWins => "a",
            Outcome::BWins => "b",
            Outcome::Tie => "tie",
        })
    }
}

/// One recorded judgment. Serialized as `["item-a", "item-b", "a" | "b" | "tie"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "VoteRecord", into = "VoteRecord")]
pub struct Vote {
    pub item_a: String,
    pub item_b: String,
    pub outcome: Outcome,
}

type VoteRecord = (String, String, Outcome);

impl Vote {
    pub fn new(item_a: impl Into<String>, item_b: impl Into<String>, outcome: Outcome) -> Self {
        Vote {
            item_a: item_a.into(),
            item_b: item_b.into(),
            outcome,
        }
    }

    /// Both ids non-empty and different from each other.
    pub fn is_well_formed(&self) -> bool {
        !self.item_a.is_empty() && !self.item_b.is_empty() && !self.is_self_vote()
    }

    /// Same item on both sides. Carries no ranking information.
    pub fn is_self_vote(&self) -> bool {
        self.item_a == self.item_b
    }

    pub fn pair_key(&self) -> PairKey {
        PairKey::new(&self.item_a, &self.item_b)
    }

    /// `(winner, loser)` for decisive votes, `None` for ties.
    pub fn winner_and_loser(&self) -> Option<(&str, &str)> {
        match self.outcome {
            Outcome::AWins => Some((&self.item_a, &self.item_b)),
            Outcome::BWins => Some((&self.item_b, &self.item_a)),
            Outcome::Tie => None,
        }
    }
}

/// Records are taken as written. A stored vote may name the same item twice
/// (e.g. after two files were merged by a rename); the fits skip those.
impl From<VoteRecord> for Vote {
    fn from((item_a, item_b, outcome): VoteRecord) -> Self {
        Vote { item_a, item_b, outcome }
    }
}

impl From<Vote> for VoteRecord {
    fn from(vote: Vote) -> Self {
        (vote.item_a, vote.item_b, vote.outcome)
    }
}

/// Order-independent identity of an unordered item pair.
///
/// `PairKey::new(x, y) == PairKey::new(y, x)`. Only used for "already judged"
/// lookups; the outcome of a vote stays attached to its original slot order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    low: String,
    high: String,
}

impl PairKey {
    pub fn new(x: &str, y: &str) -> Self {
        let (low, high) = if x <= y { (x, y) } else { (y, x) };
        PairKey {
            low: low.to_string(),
            high: high.to_string(),
        }
    }

    pub fn low(&self) -> &str {
        &self.low
    }

    pub fn high(&self) -> &str {
        &self.high
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.low, self.high)
    }
}

/// Predicted probabilities of the three outcomes of `a` vs `b`.
/// Models without an explicit tie term report `tie = 0.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeProbabilities {
    pub a_wins: f64,
    pub b_wins: f64,
    pub tie: f64,
}

impl OutcomeProbabilities {
    /// Distance of `P(a wins)` from a coin flip. 0 = maximally uncertain.
    pub fn confidence(&self) -> f64 {
        (self.a_wins - 0.5).abs()
    }
}

/// Internal vote with items replaced by dense indices.
pub(crate) type IndexedVote = (usize, usize, Outcome);

/// Maps between caller item ids and internal 0..N indices, so the rating fits
/// can work on plain `Vec<f64>` instead of string-keyed maps.
pub(crate) struct IdMap {
    ids: Vec<String>,
    id_to_idx: HashMap<String, usize>,
}

impl IdMap {
    /// Index every item referenced by `votes`, in order of first appearance.
    /// Self-votes are dropped.
    pub fn index_votes(votes: &[Vote]) -> (Self, Vec<IndexedVote>) {
        let mut id_map = IdMap {
            ids: Vec::new(),
            id_to_idx: HashMap::new(),
        };
        let indexed = votes
            .iter()
            .filter(|v| !v.is_self_vote())
            .map(|v| (id_map.intern(&v.item_a), id_map.intern(&v.item_b), v.outcome))
            .collect();
        (id_map, indexed)
    }

    fn intern(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.id_to_idx.get(id) {
            return idx;
        }
        let idx = self.ids.len();
        self.ids.push(id.to_string());
        self.id_to_idx.insert(id.to_string(), idx);
        idx
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[cfg(test)]
    pub fn to_idx(&self, id: &str) -> Option<usize> {
        self.id_to_idx.get(id).copied()
    }

    /// Zip dense values back onto their item ids.
    pub fn to_ratings(&self, values: &[f64]) -> Ratings {
        self.ids.iter().cloned().zip(values.iter().copied()).collect()
    }
}
