use std::collections::BTreeSet;
use std::time::Instant;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::davidson::{train_davidson_model, DavidsonOptions};
use crate::elo::{train_elo_model, EloOptions};
use crate::error::Result;
use crate::model::{FittedModel, ModelKind, RatingModel};
use crate::pairing::{find_next_pair, select_pair, SelectionPolicy};
use crate::rename::reconcile;
use crate::snapshot::Snapshot;
use crate::throttle::{SnapshotSink, ThrottledSink};
use crate::types::{Outcome, Pair, Ratings, Vote};
use crate::vote_log::VoteLog;

/// How a session fits ratings and picks the next pair after every change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub model: ModelKind,
    pub selection: SelectionPolicy,
    /// Elo settings for the per-vote fit. Few passes, since this runs on every pick.
    pub elo: EloOptions,
    pub davidson: DavidsonOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            model: ModelKind::default(),
            selection: SelectionPolicy::default(),
            elo: EloOptions::interactive(),
            davidson: DavidsonOptions::default(),
        }
    }
}

/// One open collection: the vote log, starred items, the current fit and the
/// pair to show next.
///
/// Every mutation refits, reselects and hands the new state to the throttled
/// sink. Persistence failures are logged, never surfaced through `pick`,
/// `undo` or `star`; call `flush` to see them.
pub struct VotingSession<S, R> {
    items: Vec<String>,
    votes: VoteLog,
    starred: BTreeSet<String>,
    model: FittedModel,
    /// Set by `undo` so the user can re-decide the pair right away.
    forced_next_pair: Option<Pair>,
    next_pair: Option<Pair>,
    persistence: ThrottledSink<S>,
    config: SessionConfig,
    rng: R,
}

impl<S: SnapshotSink, R: Rng> VotingSession<S, R> {
    /// Start a session over `items`, picking up `stored` history if there is
    /// any. Renamed items are reconciled first, and the result is persisted
    /// when a rename was applied.
    pub fn open(
        items: Vec<String>,
        stored: Option<Snapshot>,
        persistence: ThrottledSink<S>,
        config: SessionConfig,
        rng: R,
    ) -> Self {
        let (votes, starred, renamed) = match stored {
            Some(snapshot) => {
                let (reconciled, renames) = reconcile(&snapshot, &items);
                let starred = reconciled.starred_set();
                (reconciled.votes, starred, !renames.is_empty())
            }
            None => (VoteLog::new(), BTreeSet::new(), false),
        };
        info!(items = items.len(), votes = votes.len(), starred = starred.len(), "session opened");

        let mut session = VotingSession {
            items,
            votes,
            starred,
            model: FittedModel::empty(config.model),
            forced_next_pair: None,
            next_pair: None,
            persistence,
            config,
            rng,
        };
        session.refresh();
        if renamed {
            session.persist();
        }
        session
    }

    /// Record `outcome` for the current pair. Returns the recorded vote, or
    /// `None` when there is nothing left to compare.
    pub fn pick(&mut self, outcome: Outcome) -> Option<Vote> {
        let (item_a, item_b) = self.next_pair.clone()?;
        let vote = Vote::new(item_a, item_b, outcome);
        if let Err(e) = self.votes.append(vote.clone()) {
            warn!(error = %e, "vote rejected");
            return None;
        }
        self.forced_next_pair = None;
        self.refresh();
        self.persist();
        Some(vote)
    }

    /// Remove the last vote. Its pair comes back as the next pair when both
    /// items are still part of the collection.
    pub fn undo(&mut self) -> Option<Vote> {
        let vote = self.votes.undo_last()?;
        let still_available =
            !vote.is_self_vote() && self.contains(&vote.item_a) && self.contains(&vote.item_b);
        self.forced_next_pair = if still_available {
            Some((vote.item_a.clone(), vote.item_b.clone()))
        } else {
            debug!(vote = ?vote, "undone pair no longer available");
            None
        };
        self.refresh();
        self.persist();
        Some(vote)
    }

    /// Star or unstar `item`. Returns whether anything changed. The current
    /// pair stays as it is.
    pub fn star(&mut self, item: &str, starred: bool) -> bool {
        let changed = if starred {
            self.starred.insert(item.to_string())
        } else {
            self.starred.remove(item)
        };
        if changed {
            debug!(item, starred, "star toggled");
            self.persist();
        }
        changed
    }

    pub fn is_starred(&self, item: &str) -> bool {
        self.starred.contains(item)
    }

    pub fn next_pair(&self) -> Option<&Pair> {
        self.next_pair.as_ref()
    }

    pub fn votes(&self) -> &VoteLog {
        &self.votes
    }

    pub fn ratings(&self) -> &Ratings {
        self.model.ratings()
    }

    pub fn model(&self) -> &FittedModel {
        &self.model
    }

    pub fn starred_items(&self) -> &BTreeSet<String> {
        &self.starred
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Raw state as it would be persisted, without the export fit.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_state(&self.votes, &self.starred)
    }

    pub fn persistence(&self) -> &ThrottledSink<S> {
        &self.persistence
    }

    /// Give the throttle a chance to write a pending snapshot whose window
    /// has elapsed.
    pub fn poll_persistence(&mut self, now: Instant) -> Result<bool> {
        self.persistence.poll(now)
    }

    /// Write any pending snapshot now.
    pub fn flush(&mut self) -> Result<bool> {
        self.persistence.flush()
    }

    fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|known| known == item)
    }

    fn refresh(&mut self) {
        if self.votes.is_empty() {
            self.model = FittedModel::empty(self.config.model);
            self.next_pair = self
                .forced_next_pair
                .clone()
                .or_else(|| find_next_pair(&self.items, &self.votes, &mut self.rng));
            return;
        }

        let votes = self.votes.votes();
        self.model = match self.config.model {
            ModelKind::Elo => {
                FittedModel::Elo(train_elo_model(votes, &self.config.elo, &mut self.rng))
            }
            ModelKind::Davidson => {
                FittedModel::Davidson(train_davidson_model(votes, &self.config.davidson))
            }
        };
        self.next_pair = match self.forced_next_pair.clone() {
            Some(pair) => Some(pair),
            None => {
                let excluded = self.votes.already_judged_pair_keys();
                select_pair(self.config.selection, &self.items, &self.model, &excluded)
            }
        };
        if self.next_pair.is_none() {
            info!(votes = self.votes.len(), "every pair has been judged");
        }
    }

    fn persist(&mut self) {
        let snapshot = self.snapshot();
        if let Err(e) = self.persistence.offer(snapshot, Instant::now()) {
            warn!(error = %e, "snapshot not persisted yet");
        }
    }
}
