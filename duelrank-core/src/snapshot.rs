//! Persisted state of one collection.
//!
//! ```json
//! {
//!   "buckets": { "<bucket start>": <count>, ... },
//!   "starred": [ "<item>", ... ],
//!   "ratings": { "<item>": <rating>, ... },
//!   "votes":   [ ["<item a>", "<item b>", "a" | "b" | "tie"], ... ]
//! }
//! ```
//!
//! Only `votes` is required. `ratings` and `buckets` are export output for
//! other tools; the engine never reads them back into a fit.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::constants::DEFAULT_BUCKET_COUNT;
use crate::elo::{boost_ratings, bucketize, train_elo_model, EloOptions};
use crate::error::{Error, Result};
use crate::types::Ratings;
use crate::vote_log::VoteLog;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buckets: Option<BTreeMap<i64, usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starred: Option<Vec<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_ratings_descending"
    )]
    pub ratings: Option<Ratings>,
    pub votes: VoteLog,
}

/// How the export fit attached to a written snapshot is computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub elo: EloOptions,
    pub buckets: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            elo: EloOptions::default(),
            buckets: DEFAULT_BUCKET_COUNT,
        }
    }
}

impl Snapshot {
    /// Raw state only, no export fields.
    pub fn from_state(votes: &VoteLog, starred: &BTreeSet<String>) -> Self {
        Snapshot {
            buckets: None,
            starred: Some(starred.iter().cloned().collect()),
            ratings: None,
            votes: votes.clone(),
        }
    }

    /// Parse and validate. Any structural problem fails the whole load.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::MalformedSnapshot(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn starred_set(&self) -> BTreeSet<String> {
        self.starred.iter().flatten().cloned().collect()
    }

    /// Attach the slow export fit: Elo over every vote, starred items boosted,
    /// then bucket counts over the boosted ratings.
    pub fn with_export_fit<R: Rng + ?Sized>(
        mut self,
        options: &ExportOptions,
        rng: &mut R,
    ) -> Result<Self> {
        let ratings = train_elo_model(self.votes.votes(), &options.elo, rng);
        let ratings =
            boost_ratings(self.starred.iter().flatten(), &ratings, &options.elo).into_ratings();
        self.buckets = Some(bucketize(&ratings, options.buckets)?);
        self.ratings = Some(ratings);
        Ok(self)
    }
}

/// Highest rating first; equal ratings by item id.
fn serialize_ratings_descending<S: Serializer>(
    ratings: &Option<Ratings>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let Some(ratings) = ratings else {
        return serializer.serialize_none();
    };
    let mut entries: Vec<(&String, &f64)> = ratings.iter().collect();
    entries.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (item, rating) in entries {
        map.serialize_entry(item, rating)?;
    }
    map.end()
}
