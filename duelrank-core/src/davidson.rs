//! Davidson model: Bradley-Terry with an explicit tie parameter.
//!
//! For strengths `beta_a`, `beta_b` and tie parameter `tau`:
//!
//! ```text
//! D = exp(beta_a) + exp(beta_b) + tau
//! P(a wins) = exp(beta_a) / D
//! P(b wins) = exp(beta_b) / D
//! P(tie)    = tau / D
//! ```
//!
//! Fitted by batch gradient ascent on the log-likelihood with an L2 pull toward
//! zero. Deterministic: votes are visited in log order.

use std::collections::HashSet;

use crate::constants::{
    DAVIDSON_INITIAL_TAU, DAVIDSON_ITERATIONS, DAVIDSON_L2_LAMBDA, DAVIDSON_LEARNING_RATE,
    DAVIDSON_MIN_TAU, DEFAULT_DAVIDSON_BETA,
};
use crate::model::RatingModel;
use crate::pairing::find_most_uncertain_pair;
use crate::types::{IdMap, Outcome, OutcomeProbabilities, Pair, Ratings, Vote};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DavidsonOptions {
    pub iterations: usize,
    pub learning_rate: f64,
    pub initial_tau: f64,
    /// L2 regularization strength.
    pub lambda: f64,
}

impl Default for DavidsonOptions {
    fn default() -> Self {
        DavidsonOptions {
            iterations: DAVIDSON_ITERATIONS,
            learning_rate: DAVIDSON_LEARNING_RATE,
            initial_tau: DAVIDSON_INITIAL_TAU,
            lambda: DAVIDSON_L2_LAMBDA,
        }
    }
}

/// Fitted betas plus the fitted tie parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct DavidsonRatings {
    betas: Ratings,
    tau: f64,
}

impl Default for DavidsonRatings {
    fn default() -> Self {
        DavidsonRatings {
            betas: Ratings::new(),
            tau: DAVIDSON_INITIAL_TAU,
        }
    }
}

impl DavidsonRatings {
    pub fn new(betas: Ratings, tau: f64) -> Self {
        DavidsonRatings {
            betas,
            tau: tau.max(DAVIDSON_MIN_TAU),
        }
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    pub fn into_betas(self) -> Ratings {
        self.betas
    }

    /// Same model with `enforce_direct_wins` applied to the betas.
    pub fn with_direct_wins(self, votes: &[Vote], margin: f64) -> Self {
        let betas = enforce_direct_wins(&self.betas, votes, margin);
        DavidsonRatings { betas, tau: self.tau }
    }
}

impl RatingModel for DavidsonRatings {
    fn baseline(&self) -> f64 {
        DEFAULT_DAVIDSON_BETA
    }

    fn ratings(&self) -> &Ratings {
        &self.betas
    }

    fn expected_outcome(&self, item_a: &str, item_b: &str) -> OutcomeProbabilities {
        let exp_a = self.rating(item_a).exp();
        let exp_b = self.rating(item_b).exp();
        let denom = exp_a + exp_b + self.tau;
        OutcomeProbabilities {
            a_wins: exp_a / denom,
            b_wins: exp_b / denom,
            tie: self.tau / denom,
        }
    }
}

/// Fit betas and tau to the vote log.
pub fn train_davidson_model(votes: &[Vote], options: &DavidsonOptions) -> DavidsonRatings {
    let (id_map, indexed) = IdMap::index_votes(votes);
    let num_items = id_map.len();
    let mut betas = vec![DEFAULT_DAVIDSON_BETA; num_items];
    let mut tau = options.initial_tau.max(DAVIDSON_MIN_TAU);

    for _ in 0..options.iterations {
        let mut gradients = vec![0.0; num_items];
        let mut tau_grad = 0.0;

        for &(a, b, outcome) in &indexed {
            let exp_a = betas[a].exp();
            let exp_b = betas[b].exp();
            let denom = exp_a + exp_b + tau;
            let prob_a = exp_a / denom;
            let prob_b = exp_b / denom;

            match outcome {
                Outcome::AWins => {
                    gradients[a] += 1.0 - prob_a;
                    gradients[b] -= prob_b;
                    tau_grad -= 1.0 / denom;
                }
                Outcome::BWins => {
                    gradients[a] -= prob_a;
                    gradients[b] += 1.0 - prob_b;
                    tau_grad -= 1.0 / denom;
                }
                Outcome::Tie => {
                    let denom_sq = denom * denom;
                    gradients[a] -= tau * exp_a / denom_sq;
                    gradients[b] -= tau * exp_b / denom_sq;
                    tau_grad += 1.0 / tau - 1.0 / denom;
                }
            }
        }

        for (beta, grad) in betas.iter_mut().zip(&gradients) {
            let regularized = grad - options.lambda * *beta;
            *beta += options.learning_rate * regularized;
        }

        tau = (tau + options.learning_rate * tau_grad).max(DAVIDSON_MIN_TAU);
    }

    DavidsonRatings::new(id_map.to_ratings(&betas), tau)
}

/// Make every decisive vote visible in the ranking.
///
/// Where the betas rank a recorded loser at or above its winner, the winner is
/// lifted to `loser + margin`. Passes repeat until nothing changes, so chains of
/// direct wins settle too. A cycle of direct wins (a > b > c > a) cannot be
/// satisfied; the pass count is capped at the number of votes.
pub fn enforce_direct_wins(betas: &Ratings, votes: &[Vote], margin: f64) -> Ratings {
    let mut betas = betas.clone();
    let max_passes = votes.len().max(1);

    for _ in 0..max_passes {
        let mut changed = false;
        for vote in votes {
            let Some((winner, loser)) = vote.winner_and_loser() else {
                continue;
            };
            if winner == loser {
                continue;
            }
            let winner_beta = betas.get(winner).copied().unwrap_or(DEFAULT_DAVIDSON_BETA);
            let loser_beta = betas.get(loser).copied().unwrap_or(DEFAULT_DAVIDSON_BETA);
            if winner_beta <= loser_beta {
                betas.insert(winner.to_string(), loser_beta + margin);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    betas
}

/// Most uncertain pair over all of `items`, ignoring which pairs were already judged.
pub fn find_most_uncertain_pair_davidson(
    items: &[String],
    ratings: &DavidsonRatings,
) -> Option<Pair> {
    find_most_uncertain_pair(items, ratings, &HashSet::new())
}
