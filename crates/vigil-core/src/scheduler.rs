//! The permanent run loop and its backoff state.
//!
//! The scheduler alternates between two states: steady (the last pass
//! succeeded, sleep the fixed poll interval) and backoff (at least one
//! camera failed, sleep an increasing delay). There is no terminal state;
//! the loop runs until the process is externally terminated.
//!
//! The backoff delay is one process-wide value shared across all cameras:
//! any camera failing escalates the delay for the whole loop. A single
//! flaky source therefore throttles polling for healthy sources too --
//! a deliberate trade of fairness for simplicity.

use std::future::Future;
use std::time::Duration;

/// Delay after the first failed pass.
const BASE_DELAY: Duration = Duration::from_millis(250);

/// Ceiling the delay never exceeds.
const MAX_DELAY: Duration = Duration::from_secs(60 * 60);

/// Inter-pass delay state, threaded through scheduler iterations.
///
/// An explicit value owned by the loop rather than process-global state.
/// Starts at zero; each failed pass grows it by a factor of 1.2 from a
/// 250 ms base, capped at one hour. A successful pass resets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Backoff {
    current: Duration,
}

impl Backoff {
    /// A backoff with no failure recorded.
    pub const fn new() -> Self {
        Self {
            current: Duration::ZERO,
        }
    }

    /// Record a successful pass: the next failure starts over from the
    /// base delay.
    pub const fn reset(&mut self) {
        self.current = Duration::ZERO;
    }

    /// Advance to the delay for the next failed pass:
    /// `max(250ms, current × 1.2)`, capped at one hour.
    pub fn next_delay(&mut self) -> Duration {
        let grown = self.current.saturating_add(self.current / 5);
        self.current = grown.clamp(BASE_DELAY, MAX_DELAY);
        self.current
    }

    /// The delay most recently returned by [`Backoff::next_delay`], or
    /// zero if no failure has been recorded since the last reset.
    pub const fn current(&self) -> Duration {
        self.current
    }
}

/// Drive `pass` forever: on success sleep the fixed `interval`, on
/// failure sleep an escalating backoff delay, then run the next pass.
///
/// Each invocation of `pass` must attempt every camera and return the
/// aggregate result (`true` iff every camera synced completely). Failed
/// passes are always followed by a full retry of all cameras, not just
/// the failed ones. The sleep between passes is the loop's only
/// suspension point, so passes never overlap.
pub async fn run<F, Fut>(interval: Duration, mut pass: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let mut backoff = Backoff::new();
    loop {
        if pass().await {
            backoff.reset();
            tracing::debug!(interval = ?interval, "pass complete, sleeping until the next poll");
            tokio::time::sleep(interval).await;
            continue;
        }

        let delay = backoff.next_delay();
        tracing::info!(delay = ?delay, "pass failed, backing off before the retry");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn backoff_starts_at_the_base_delay() {
        let mut backoff = Backoff::new();
        assert_eq!(backoff.current(), Duration::ZERO);
        assert_eq!(backoff.next_delay(), Duration::from_millis(250));
    }

    #[test]
    fn backoff_grows_by_one_fifth() {
        let mut backoff = Backoff::new();
        assert_eq!(backoff.next_delay(), Duration::from_millis(250));
        assert_eq!(backoff.next_delay(), Duration::from_millis(300));
        assert_eq!(backoff.next_delay(), Duration::from_millis(360));
        assert_eq!(backoff.next_delay(), Duration::from_millis(432));
    }

    #[test]
    fn backoff_never_exceeds_one_hour() {
        let mut backoff = Backoff::new();
        let mut delay = Duration::ZERO;
        // 1.2^60 × 250ms is far beyond an hour.
        for _ in 0..60 {
            delay = backoff.next_delay();
        }
        assert_eq!(delay, Duration::from_secs(3600));
        assert_eq!(backoff.next_delay(), Duration::from_secs(3600));
    }

    #[test]
    fn reset_returns_to_the_base_delay() {
        let mut backoff = Backoff::new();
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.current(), Duration::ZERO);
        assert_eq!(backoff.next_delay(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_passes_back_off_and_successes_use_the_interval() {
        let interval = Duration::from_secs(10);
        let outcomes = Arc::new(Mutex::new(vec![false, false, true]));
        let started_at = Arc::new(Mutex::new(Vec::new()));

        let pass = {
            let outcomes = Arc::clone(&outcomes);
            let started_at = Arc::clone(&started_at);
            move || {
                started_at.lock().unwrap().push(tokio::time::Instant::now());
                let outcome = {
                    let mut remaining = outcomes.lock().unwrap();
                    if remaining.is_empty() {
                        true
                    } else {
                        remaining.remove(0)
                    }
                };
                async move { outcome }
            }
        };

        // The loop never returns; give it a bounded window of virtual time.
        tokio::select! {
            () = run(interval, pass) => {}
            () = tokio::time::sleep(Duration::from_secs(25)) => {}
        }

        let started_at = started_at.lock().unwrap();
        assert!(started_at.len() >= 4, "expected at least 4 passes, got {}", started_at.len());
        // Two failures escalate the delay, then a success restores the
        // steady interval.
        assert_eq!(started_at[1] - started_at[0], Duration::from_millis(250));
        assert_eq!(started_at[2] - started_at[1], Duration::from_millis(300));
        assert_eq!(started_at[3] - started_at[2], interval);
    }

    #[tokio::test(start_paused = true)]
    async fn success_resets_the_backoff_escalation() {
        let interval = Duration::from_secs(5);
        let outcomes = Arc::new(Mutex::new(vec![false, false, true, false]));
        let started_at = Arc::new(Mutex::new(Vec::new()));

        let pass = {
            let outcomes = Arc::clone(&outcomes);
            let started_at = Arc::clone(&started_at);
            move || {
                started_at.lock().unwrap().push(tokio::time::Instant::now());
                let outcome = {
                    let mut remaining = outcomes.lock().unwrap();
                    if remaining.is_empty() {
                        true
                    } else {
                        remaining.remove(0)
                    }
                };
                async move { outcome }
            }
        };

        tokio::select! {
            () = run(interval, pass) => {}
            () = tokio::time::sleep(Duration::from_secs(12)) => {}
        }

        let started_at = started_at.lock().unwrap();
        assert!(started_at.len() >= 5, "expected at least 5 passes, got {}", started_at.len());
        // fail, fail, success, fail: the fourth delay starts over at the
        // base because the success in between reset the state.
        assert_eq!(started_at[1] - started_at[0], Duration::from_millis(250));
        assert_eq!(started_at[2] - started_at[1], Duration::from_millis(300));
        assert_eq!(started_at[3] - started_at[2], interval);
        assert_eq!(started_at[4] - started_at[3], Duration::from_millis(250));
    }
}
