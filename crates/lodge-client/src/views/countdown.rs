//! Per-vote countdown.
//!
//! [`Countdown`] holds remaining seconds keyed by vote id. Values are
//! unsigned and saturate at zero. [`CountdownTicker`] drives it once per
//! tick on a tokio task that exits when every entry is zero and is aborted
//! when the ticker is dropped.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lodge_shared::constants::COUNTDOWN_TICK_MS;
use lodge_shared::types::VoteId;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining: BTreeMap<VoteId, u64>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every entry.
    pub fn seed(&mut self, entries: impl IntoIterator<Item = (VoteId, u64)>) {
        self.remaining = entries.into_iter().collect();
    }

    pub fn set(&mut self, id: VoteId, seconds: u64) {
        self.remaining.insert(id, seconds);
    }

    pub fn get(&self, id: VoteId) -> u64 {
        self.remaining.get(&id).copied().unwrap_or(0)
    }

    /// Decrement every non-zero entry by one second.
    pub fn tick(&mut self) {
        for seconds in self.remaining.values_mut() {
            *seconds = seconds.saturating_sub(1);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining.values().all(|s| *s == 0)
    }
}

pub type SharedCountdown = Arc<Mutex<Countdown>>;

/// Background ticker for a [`SharedCountdown`].
pub struct CountdownTicker {
    handle: JoinHandle<()>,
}

impl CountdownTicker {
    pub fn spawn(countdown: SharedCountdown) -> Self {
        Self::spawn_with_period(countdown, Duration::from_millis(COUNTDOWN_TICK_MS))
    }

    pub fn spawn_with_period(countdown: SharedCountdown, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick of an interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let mut countdown = countdown.lock().unwrap_or_else(|e| e.into_inner());
                countdown.tick();
                if countdown.is_finished() {
                    debug!("countdown finished, ticker stopping");
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaches_zero_and_stays() {
        let mut countdown = Countdown::new();
        countdown.seed([(1, 3), (2, 1)]);

        for _ in 0..3 {
            countdown.tick();
        }
        assert_eq!(countdown.get(1), 0);
        assert!(countdown.is_finished());

        countdown.tick();
        assert_eq!(countdown.get(1), 0);
        assert_eq!(countdown.get(2), 0);
    }

    #[test]
    fn test_entries_are_independent() {
        let mut countdown = Countdown::new();
        countdown.seed([(1, 5), (2, 0)]);
        countdown.tick();
        assert_eq!(countdown.get(1), 4);
        assert_eq!(countdown.get(2), 0);
        assert!(!countdown.is_finished());
        assert_eq!(countdown.get(42), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_stops_when_all_zero() {
        let countdown: SharedCountdown = Arc::new(Mutex::new(Countdown::new()));
        countdown.lock().unwrap().seed([(7, 2)]);

        let ticker = CountdownTicker::spawn(countdown.clone());
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(countdown.lock().unwrap().get(7), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(countdown.lock().unwrap().get(7), 0);
        assert!(ticker.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_ticker() {
        let countdown: SharedCountdown = Arc::new(Mutex::new(Countdown::new()));
        countdown.lock().unwrap().seed([(1, 100)]);

        let ticker = CountdownTicker::spawn(countdown.clone());
        tokio::time::sleep(Duration::from_millis(2500)).await;
        drop(ticker);
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(countdown.lock().unwrap().get(1), 98);
    }
}
