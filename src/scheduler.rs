//! Auto-refresh timer
//!
//! Waits `delay` once, then ticks every `interval` until stopped. No jitter,
//! no backoff. Each tick is delivered as a [`RefreshTick`] on the channel the
//! scheduler was started with.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTick;

pub struct RefreshScheduler {
    delay: Duration,
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new(delay: Duration, interval: Duration) -> Self {
        Self {
            delay,
            interval,
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Start ticking. A scheduler that is already running is left alone.
    pub fn start(&mut self, tx: UnboundedSender<RefreshTick>) {
        if self.is_running() {
            return;
        }

        let delay = self.delay;
        let period = self.interval;
        if period.is_zero() {
            tracing::warn!("Refresh interval is zero, auto-refresh disabled");
            return;
        }

        // First tick one full period after the delay
        let Some(first) = delay
            .checked_add(period)
            .and_then(|offset| Instant::now().checked_add(offset))
        else {
            tracing::warn!(
                "Refresh delay {}s + interval {}s is out of range, auto-refresh disabled",
                delay.as_secs(),
                period.as_secs()
            );
            return;
        };

        tracing::info!(
            "Auto-refresh starting in {}s, every {}s",
            delay.as_secs(),
            period.as_secs()
        );

        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if tx.send(RefreshTick).is_err() {
                    tracing::debug!("Refresh receiver gone, stopping auto-refresh");
                    break;
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!("Auto-refresh stopped");
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, error::TryRecvError};

    const SECS_20: Duration = Duration::from_secs(20);

    /// Let spawned tasks observe the advanced clock
    async fn advance(d: Duration) {
        tokio::time::advance(d).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_delay_plus_interval() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = RefreshScheduler::new(SECS_20, SECS_20);
        scheduler.start(tx);
        assert!(scheduler.is_running());

        advance(Duration::from_secs(39)).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        advance(Duration::from_secs(1)).await;
        assert_eq!(rx.recv().await, Some(RefreshTick));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_interval_after_first() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = RefreshScheduler::new(SECS_20, SECS_20);
        scheduler.start(tx);

        advance(Duration::from_secs(40)).await;
        assert_eq!(rx.recv().await, Some(RefreshTick));

        for _ in 0..3 {
            advance(Duration::from_secs(19)).await;
            assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
            advance(Duration::from_secs(1)).await;
            assert_eq!(rx.recv().await, Some(RefreshTick));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = RefreshScheduler::new(SECS_20, SECS_20);
        scheduler.start(tx);

        advance(Duration::from_secs(40)).await;
        assert_eq!(rx.recv().await, Some(RefreshTick));

        scheduler.stop();
        assert!(!scheduler.is_running());

        // Sender was dropped with the aborted task
        advance(Duration::from_secs(60)).await;
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_never_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = RefreshScheduler::new(Duration::ZERO, Duration::ZERO);
        scheduler.start(tx);
        assert!(!scheduler.is_running());

        advance(Duration::from_millis(100)).await;
        // The sender was dropped without a task to hold it
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_out_of_range_timing_does_not_start() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scheduler = RefreshScheduler::new(Duration::from_secs(u64::MAX), SECS_20);
        scheduler.start(tx.clone());
        assert!(!scheduler.is_running());

        let mut scheduler = RefreshScheduler::new(SECS_20, Duration::MAX);
        scheduler.start(tx);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_keeps_single_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = RefreshScheduler::new(SECS_20, SECS_20);
        scheduler.start(tx.clone());
        scheduler.start(tx);

        advance(Duration::from_secs(40)).await;
        assert_eq!(rx.recv().await, Some(RefreshTick));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }
}
