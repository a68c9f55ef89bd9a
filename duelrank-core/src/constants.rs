/// Rating assigned to any item the Elo model has not seen yet.
pub const DEFAULT_ELO_RATING: f64 = 1000.0;

/// Divisor in the Elo expectation `1 / (1 + 10^((R_B - R_A) / ELO_SCALE))`.
///
/// 480, not the chess-standard 400. Persisted ratings were produced with it.
pub const ELO_SCALE: f64 = 480.0;

/// Total rating movement a single vote can cause over a full training run.
///
/// The per-update factor is `ELO_K_FACTOR_TOTAL / iterations`, so training for
/// 5 passes or 1000 passes moves ratings by a comparable amount.
pub const ELO_K_FACTOR_TOTAL: f64 = 500.0;

/// Training passes used on every interactive judgment. Cheap and noisy, only
/// good enough to decide which pair to show next.
pub const INTERACTIVE_ELO_ITERATIONS: usize = 5;

/// Training passes used for the persisted export fit.
pub const EXPORT_ITERATIONS: usize = 1000;

/// Number of equal-width rating buckets written to the snapshot.
pub const DEFAULT_BUCKET_COUNT: usize = 10;

/// Baseline strength of the Davidson model (betas are centered at zero).
pub const DEFAULT_DAVIDSON_BETA: f64 = 0.0;

pub const DAVIDSON_ITERATIONS: usize = 1000;
pub const DAVIDSON_LEARNING_RATE: f64 = 0.01;
pub const DAVIDSON_INITIAL_TAU: f64 = 1.0;
/// L2 pull of every beta toward zero, applied once per gradient step.
pub const DAVIDSON_L2_LAMBDA: f64 = 0.01;
/// Floor for the tie parameter after each update. Keeps `P(tie)` positive and
/// `1 / tau` finite.
pub const DAVIDSON_MIN_TAU: f64 = 1e-6;

/// Gap forced between a direct winner and its loser by `enforce_direct_wins`.
pub const DIRECT_WIN_MARGIN: f64 = 1e-3;

/// Minimum time between two snapshot writes.
pub const DEFAULT_WRITE_INTERVAL_SECS: u64 = 10;
