//! Rate-limited snapshot persistence.
//!
//! `ThrottledSink` coalesces bursts of state changes into a single write at the
//! trailing edge of a fixed window. The first change after a quiet period opens
//! the window without writing; once `interval` has passed, the next `offer` or
//! `poll` writes the most recent snapshot. `flush` writes whatever is pending
//! right away (e.g. on exit).
//!
//! Time is always passed in, so the gate owns its own timestamps and never
//! reads a clock.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::Result;
use crate::snapshot::Snapshot;

/// Destination for persisted snapshots. The core never performs I/O itself.
pub trait SnapshotSink {
    fn write(&mut self, snapshot: &Snapshot) -> Result<()>;
}

impl<S: SnapshotSink + ?Sized> SnapshotSink for Box<S> {
    fn write(&mut self, snapshot: &Snapshot) -> Result<()> {
        (**self).write(snapshot)
    }
}

/// Sink that drops every snapshot. For sessions with nowhere to persist to.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn write(&mut self, _snapshot: &Snapshot) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct ThrottledSink<S> {
    sink: S,
    interval: Duration,
    pending: Option<Snapshot>,
    window_opened_at: Option<Instant>,
    last_write_at: Option<Instant>,
}

impl<S: SnapshotSink> ThrottledSink<S> {
    pub fn new(sink: S, interval: Duration) -> Self {
        ThrottledSink {
            sink,
            interval,
            pending: None,
            window_opened_at: None,
            last_write_at: None,
        }
    }

    /// Record the latest state. Returns whether a write happened.
    pub fn offer(&mut self, snapshot: Snapshot, now: Instant) -> Result<bool> {
        self.pending = Some(snapshot);
        if self.window_opened_at.is_none() {
            self.window_opened_at = Some(now);
        }
        self.poll(now)
    }

    /// Write the pending snapshot if its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Result<bool> {
        let Some(opened_at) = self.window_opened_at else {
            return Ok(false);
        };
        if self.pending.is_none() || now.saturating_duration_since(opened_at) < self.interval {
            return Ok(false);
        }
        self.write_pending(Some(now))
    }

    /// Write the pending snapshot now, regardless of the window.
    pub fn flush(&mut self) -> Result<bool> {
        self.write_pending(None)
    }

    fn write_pending(&mut self, now: Option<Instant>) -> Result<bool> {
        let Some(snapshot) = self.pending.take() else {
            return Ok(false);
        };
        if let Err(e) = self.sink.write(&snapshot) {
            warn!(error = %e, "snapshot write failed, keeping it pending");
            self.pending = Some(snapshot);
            return Err(e);
        }
        debug!(votes = snapshot.votes.len(), "snapshot written");
        self.window_opened_at = None;
        self.last_write_at = now.or(self.last_write_at);
        Ok(true)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_write_at(&self) -> Option<Instant> {
        self.last_write_at
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{Outcome, Vote};
    use crate::vote_log::VoteLog;

    #[derive(Default)]
    struct RecordingSink {
        written: Vec<Snapshot>,
        fail: bool,
    }

    impl SnapshotSink for RecordingSink {
        fn write(&mut self, snapshot: &Snapshot) -> Result<()> {
            if self.fail {
                return Err(Error::Sink("disk full".into()));
            }
            self.written.push(snapshot.clone());
            Ok(())
        }
    }

    fn snapshot_with(n: usize) -> Snapshot {
        let mut votes = VoteLog::new();
        for i in 0..n {
            votes.append(Vote::new(format!("a{i}"), format!("b{i}"), Outcome::Tie)).unwrap();
        }
        Snapshot { votes, ..Snapshot::default() }
    }

    const INTERVAL: Duration = Duration::from_secs(10);

    #[test]
    fn test_first_offer_does_not_write() {
        let mut gate = ThrottledSink::new(RecordingSink::default(), INTERVAL);
        let t0 = Instant::now();
        assert!(!gate.offer(snapshot_with(1), t0).unwrap());
        assert!(gate.sink().written.is_empty());
        assert!(gate.has_pending());
    }

    #[test]
    fn test_burst_is_coalesced_into_latest_snapshot() {
        let mut gate = ThrottledSink::new(RecordingSink::default(), INTERVAL);
        let t0 = Instant::now();
        gate.offer(snapshot_with(1), t0).unwrap();
        gate.offer(snapshot_with(2), t0 + Duration::from_secs(3)).unwrap();
        gate.offer(snapshot_with(3), t0 + Duration::from_secs(6)).unwrap();
        assert!(gate.sink().written.is_empty());

        assert!(gate.poll(t0 + INTERVAL).unwrap());
        assert_eq!(gate.sink().written.len(), 1);
        assert_eq!(gate.sink().written[0].votes.len(), 3);
        assert!(!gate.has_pending());
        assert_eq!(gate.last_write_at(), Some(t0 + INTERVAL));
    }

    #[test]
    fn test_offer_after_window_writes() {
        let mut gate = ThrottledSink::new(RecordingSink::default(), INTERVAL);
        let t0 = Instant::now();
        gate.offer(snapshot_with(1), t0).unwrap();
        assert!(gate.offer(snapshot_with(2), t0 + Duration::from_secs(11)).unwrap());
        assert_eq!(gate.sink().written[0].votes.len(), 2);

        // A new window opens with the next change.
        assert!(!gate.offer(snapshot_with(3), t0 + Duration::from_secs(12)).unwrap());
        assert!(!gate.poll(t0 + Duration::from_secs(21)).unwrap());
        assert!(gate.poll(t0 + Duration::from_secs(22)).unwrap());
        assert_eq!(gate.sink().written.len(), 2);
    }

    #[test]
    fn test_poll_without_pending_is_noop() {
        let mut gate = ThrottledSink::new(RecordingSink::default(), INTERVAL);
        assert!(!gate.poll(Instant::now()).unwrap());
        assert!(!gate.flush().unwrap());
    }

    #[test]
    fn test_flush_writes_immediately() {
        let mut gate = ThrottledSink::new(RecordingSink::default(), INTERVAL);
        gate.offer(snapshot_with(4), Instant::now()).unwrap();
        assert!(gate.flush().unwrap());
        assert_eq!(gate.sink().written.len(), 1);
        assert!(!gate.flush().unwrap());
    }

    #[test]
    fn test_zero_interval_writes_every_offer() {
        let mut gate = ThrottledSink::new(RecordingSink::default(), Duration::ZERO);
        let t0 = Instant::now();
        assert!(gate.offer(snapshot_with(1), t0).unwrap());
        assert!(gate.offer(snapshot_with(2), t0).unwrap());
        assert_eq!(gate.sink().written.len(), 2);
    }

    #[test]
    fn test_failed_write_stays_pending() {
        let failing = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let mut gate = ThrottledSink::new(failing, INTERVAL);
        gate.offer(snapshot_with(1), Instant::now()).unwrap();
        assert!(matches!(gate.flush(), Err(Error::Sink(_))));
        assert!(gate.has_pending());

        gate.sink_mut().fail = false;
        assert!(gate.flush().unwrap());
        assert_eq!(gate.sink().written.len(), 1);
    }
}
