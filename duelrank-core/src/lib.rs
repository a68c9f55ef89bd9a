//! duelrank-core: pairwise preference ranking engine.
//!
//! Votes ("a beats b", "b beats a", tie) → fitted ratings → the next pair worth
//! asking about. No filesystem, no terminal, no clock: items are caller-provided
//! string ids and persistence goes through a `SnapshotSink` you supply.
//!
//! # Quick start
//!
//! ```rust
//! use std::time::Duration;
//!
//! use duelrank_core::{NullSink, Outcome, SessionConfig, ThrottledSink, VotingSession};
//!
//! let items = vec!["cat.jpg".to_string(), "dog.jpg".to_string(), "emu.jpg".to_string()];
//! let persistence = ThrottledSink::new(NullSink, Duration::from_secs(10));
//!
//! let config = SessionConfig::default();
//! let mut session = VotingSession::open(items, None, persistence, config, rand::rng());
//!
//! while session.next_pair().is_some() {
//!     session.pick(Outcome::AWins);
//! }
//!
//! for (item, rating) in session.ratings() {
//!     println!("{item}: {rating:.1}");
//! }
//! ```

pub mod constants;
pub mod davidson;
pub mod elo;
pub mod error;
pub mod model;
pub mod pairing;
pub mod rename;
pub mod session;
pub mod snapshot;
pub mod throttle;
pub mod types;
pub mod vote_log;

// Re-export primary public API at crate root.
pub use davidson::{
    enforce_direct_wins, find_most_uncertain_pair_davidson, train_davidson_model, DavidsonOptions,
    DavidsonRatings,
};
pub use elo::{boost_ratings, bucketize, expected_score, train_elo_model, EloOptions, EloRatings};
pub use error::{Error, Result};
pub use model::{FittedModel, ModelKind, RatingModel};
pub use pairing::{
    find_most_uncertain_pair, find_most_uncertain_pair_fast, find_next_pair, select_pair,
    SelectionPolicy,
};
pub use rename::{apply_renames, detect_renames, reconcile, RenameMap};
pub use session::{SessionConfig, VotingSession};
pub use snapshot::{ExportOptions, Snapshot};
pub use throttle::{NullSink, SnapshotSink, ThrottledSink};
pub use types::{Outcome, OutcomeProbabilities, Pair, PairKey, Ratings, Vote};
pub use vote_log::VoteLog;
