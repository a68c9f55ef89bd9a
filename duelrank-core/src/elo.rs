//! Elo-style sequential rating model.
//!
//! Every training pass replays the whole vote log in a freshly shuffled order.
//! Shuffling removes the bias a fixed replay order would introduce, at the cost
//! of determinism: two fits of the same log differ slightly unless the caller
//! passes the same seeded RNG.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::constants::{
    DEFAULT_ELO_RATING, ELO_K_FACTOR_TOTAL, ELO_SCALE, EXPORT_ITERATIONS,
    INTERACTIVE_ELO_ITERATIONS,
};
use crate::error::{Error, Result};
use crate::model::RatingModel;
use crate::types::{IdMap, OutcomeProbabilities, Ratings, Vote};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EloOptions {
    /// Full passes over the vote log.
    pub iterations: usize,
    /// Total movement budget, split evenly across passes.
    pub k_factor_total: f64,
}

impl Default for EloOptions {
    fn default() -> Self {
        EloOptions {
            iterations: EXPORT_ITERATIONS,
            k_factor_total: ELO_K_FACTOR_TOTAL,
        }
    }
}

impl EloOptions {
    /// Few passes, for picking the next pair after every vote.
    pub fn interactive() -> Self {
        EloOptions {
            iterations: INTERACTIVE_ELO_ITERATIONS,
            ..Self::default()
        }
    }

    /// Per-update factor `k_factor_total / iterations`.
    pub fn k_factor(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.k_factor_total / self.iterations as f64
    }
}

/// Fitted Elo ratings. Items without an entry sit at `DEFAULT_ELO_RATING`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EloRatings {
    ratings: Ratings,
}

impl EloRatings {
    pub fn new(ratings: Ratings) -> Self {
        EloRatings { ratings }
    }

    pub fn into_ratings(self) -> Ratings {
        self.ratings
    }
}

impl RatingModel for EloRatings {
    fn baseline(&self) -> f64 {
        DEFAULT_ELO_RATING
    }

    fn ratings(&self) -> &Ratings {
        &self.ratings
    }

    fn expected_outcome(&self, item_a: &str, item_b: &str) -> OutcomeProbabilities {
        let a_wins = expected_score(self.rating(item_a), self.rating(item_b));
        OutcomeProbabilities {
            a_wins,
            b_wins: 1.0 - a_wins,
            tie: 0.0,
        }
    }
}

/// Expected score of A against B.
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / ELO_SCALE))
}

fn updated_rating(rating: f64, expected: f64, actual: f64, k_factor: f64) -> f64 {
    rating + k_factor * (actual - expected)
}

/// Fit Elo ratings to the whole vote log.
pub fn train_elo_model<R: Rng + ?Sized>(
    votes: &[Vote],
    options: &EloOptions,
    rng: &mut R,
) -> EloRatings {
    let (id_map, mut indexed) = IdMap::index_votes(votes);
    let mut ratings = vec![DEFAULT_ELO_RATING; id_map.len()];
    let k_factor = options.k_factor();

    for _ in 0..options.iterations {
        indexed.shuffle(rng);

        for &(a, b, outcome) in &indexed {
            let rating_a = ratings[a];
            let rating_b = ratings[b];
            let expected_a = expected_score(rating_a, rating_b);
            let expected_b = expected_score(rating_b, rating_a);
            let (actual_a, actual_b) = outcome.scores();

            ratings[a] = updated_rating(rating_a, expected_a, actual_a, k_factor);
            ratings[b] = updated_rating(rating_b, expected_b, actual_b, k_factor);
        }
    }

    EloRatings::new(id_map.to_ratings(&ratings))
}

/// Nudge `items` upward with virtual wins against the mean rating, leaving the
/// vote log untouched. One virtual win per item per pass, same `k` split as
/// training. The mean is taken once, before any boost is applied.
pub fn boost_ratings<I, S>(items: I, ratings: &EloRatings, options: &EloOptions) -> EloRatings
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items: Vec<String> = items.into_iter().map(|s| s.as_ref().to_string()).collect();
    let mut boosted = ratings.ratings.clone();
    if items.is_empty() {
        return EloRatings::new(boosted);
    }

    let mean_rating = if boosted.is_empty() {
        DEFAULT_ELO_RATING
    } else {
        boosted.values().sum::<f64>() / boosted.len() as f64
    };
    let k_factor = options.k_factor();

    for _ in 0..options.iterations {
        for item in &items {
            let rating = boosted.get(item).copied().unwrap_or(DEFAULT_ELO_RATING);
            let expected = expected_score(rating, mean_rating);
            boosted.insert(item.clone(), updated_rating(rating, expected, 1.0, k_factor));
        }
    }

    EloRatings::new(boosted)
}

/// Count ratings per equal-width bucket over `[min, max]`.
///
/// Keys are the (floored) lower edge of each bucket; the last bucket is open
/// above. A degenerate range (`min == max`) is treated as width 1.
pub fn bucketize(ratings: &Ratings, number_of_buckets: usize) -> Result<BTreeMap<i64, usize>> {
    if number_of_buckets < 1 {
        return Err(Error::InvalidBucketCount(number_of_buckets));
    }

    let mut buckets = BTreeMap::new();
    if ratings.is_empty() {
        return Ok(buckets);
    }

    let min = ratings.values().copied().fold(f64::INFINITY, f64::min);
    let max = ratings.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = if max > min { max - min } else { 1.0 };
    let width = range / number_of_buckets as f64;
    let bucket_start = |idx: usize| (min + width * idx as f64).floor() as i64;

    for idx in 0..number_of_buckets {
        buckets.entry(bucket_start(idx)).or_insert(0);
    }
    for &rating in ratings.values() {
        let idx = (((rating - min) / width).floor() as usize).min(number_of_buckets - 1);
        *buckets.entry(bucket_start(idx)).or_insert(0) += 1;
    }

    Ok(buckets)
}
