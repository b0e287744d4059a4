//! Drift-free countdown for a timed attempt.
//!
//! Remaining time is always recomputed from an absolute deadline instant,
//! never by decrementing a counter per tick, so delayed or coalesced ticks
//! (tab suspension, a busy executor) cannot accumulate drift against
//! wall-clock time.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Event emitted by a running [`Countdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// One wall-clock second elapsed.
    Tick { remaining_seconds: u64 },
    /// The countdown reached zero. Emitted exactly once; nothing follows it.
    Expired,
}

/// Handle to a ticking countdown.
///
/// Owns the tick task; dropping the handle stops it, so an abandoned attempt
/// can never receive a stray expiry.
#[derive(Debug)]
pub struct Countdown {
    events: mpsc::UnboundedReceiver<CountdownEvent>,
    task: Option<JoinHandle<()>>,
    deadline: Instant,
}

impl Countdown {
    /// Start a countdown of `duration_seconds`.
    ///
    /// A zero duration expires immediately, without any tick.
    #[must_use]
    pub fn start(duration_seconds: u64) -> Self {
        let deadline = Instant::now() + Duration::from_secs(duration_seconds);
        let (tx, events) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_ticks(deadline, tx));
        Self {
            events,
            task: Some(task),
            deadline,
        }
    }

    /// Remaining whole seconds, floored at zero.
    #[must_use]
    pub fn remaining_seconds(&self) -> u64 {
        remaining(self.deadline, Instant::now())
    }

    /// Receive the next tick or expiry event.
    ///
    /// Returns `None` once the countdown has expired or been stopped.
    pub async fn next_event(&mut self) -> Option<CountdownEvent> {
        self.events.recv().await
    }

    /// Stop the countdown. Idempotent; safe to call after expiry.
    ///
    /// Already-buffered events are discarded, so no tick or expiry is
    /// observable after `stop` returns.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.events.close();
        while self.events.try_recv().is_ok() {}
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.task.is_none()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.stop();
    }
}

fn remaining(deadline: Instant, now: Instant) -> u64 {
    deadline.saturating_duration_since(now).as_secs()
}

async fn run_ticks(deadline: Instant, tx: mpsc::UnboundedSender<CountdownEvent>) {
    if remaining(deadline, Instant::now()) == 0 {
        let _ = tx.send(CountdownEvent::Expired);
        return;
    }

    let mut interval = time::interval_at(Instant::now() + Duration::from_secs(1), Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let now = interval.tick().await;
        let remaining_seconds = remaining(deadline, now);
        if remaining_seconds == 0 {
            let _ = tx.send(CountdownEvent::Expired);
            return;
        }
        if tx.send(CountdownEvent::Tick { remaining_seconds }).is_err() {
            return;
        }
    }
}

/// Formats seconds as the familiar `MM:SS` header clock.
#[must_use]
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_then_expires_exactly_once() {
        let mut countdown = Countdown::start(3);

        assert_eq!(
            countdown.next_event().await,
            Some(CountdownEvent::Tick { remaining_seconds: 2 })
        );
        assert_eq!(
            countdown.next_event().await,
            Some(CountdownEvent::Tick { remaining_seconds: 1 })
        );
        assert_eq!(countdown.next_event().await, Some(CountdownEvent::Expired));
        // Terminal: the stream ends, no ticks after expiry.
        assert_eq!(countdown.next_event().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn two_second_countdown_matches_contract() {
        let mut countdown = Countdown::start(2);
        assert_eq!(
            countdown.next_event().await,
            Some(CountdownEvent::Tick { remaining_seconds: 1 })
        );
        assert_eq!(countdown.next_event().await, Some(CountdownEvent::Expired));
        assert_eq!(countdown.next_event().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_expires_immediately_without_tick() {
        let mut countdown = Countdown::start(0);
        assert_eq!(countdown.next_event().await, Some(CountdownEvent::Expired));
        assert_eq!(countdown.next_event().await, None);
        assert_eq!(countdown.remaining_seconds(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_is_computed_from_the_deadline() {
        let mut countdown = Countdown::start(10);
        assert_eq!(countdown.remaining_seconds(), 10);
        for expected in (5..10).rev() {
            assert_eq!(
                countdown.next_event().await,
                Some(CountdownEvent::Tick { remaining_seconds: expected })
            );
        }
        assert_eq!(countdown.remaining_seconds(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_silences_events() {
        let mut countdown = Countdown::start(60);
        assert!(matches!(
            countdown.next_event().await,
            Some(CountdownEvent::Tick { .. })
        ));

        countdown.stop();
        countdown.stop();
        assert!(countdown.is_stopped());
        assert_eq!(countdown.next_event().await, None);

        // Stopping after expiry is also fine.
        let mut expired = Countdown::start(0);
        assert_eq!(expired.next_event().await, Some(CountdownEvent::Expired));
        expired.stop();
        assert_eq!(expired.next_event().await, None);
    }

    #[test]
    fn clock_formats_as_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(3600), "60:00");
        assert_eq!(format_clock(125), "02:05");
    }
}
