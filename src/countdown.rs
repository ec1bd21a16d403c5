//! Round countdown and retry timers feeding the controller's event channel.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

/// Events consumed by the controller loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Time left in the open round.
    Tick(Duration),
    /// The open round has ended; fetch the next one.
    RoundElapsed,
    /// A delayed retry after a transport failure is due.
    RetryDue,
}

/// At most one live countdown. Restarting aborts the previous timer.
#[derive(Debug)]
pub struct Countdown {
    tx: UnboundedSender<Event>,
    tick: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Countdown {
    pub fn new(tx: UnboundedSender<Event>, tick: Duration) -> Self {
        Self {
            tx,
            tick,
            handle: None,
        }
    }

    /// Count down to `end`, emitting a tick each period and
    /// [`Event::RoundElapsed`] once the end is reached.
    ///
    /// The first check happens one tick after the restart, even when `end`
    /// has already passed.
    pub fn restart(&mut self, end: DateTime<Utc>) {
        self.cancel();
        let tx = self.tx.clone();
        let tick = self.tick;
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + tick, tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let remaining = end - Utc::now();
                if remaining <= chrono::Duration::zero() {
                    let _ = tx.send(Event::RoundElapsed);
                    return;
                }
                let remaining = remaining.to_std().unwrap_or_default();
                if tx.send(Event::Tick(remaining)).is_err() {
                    return;
                }
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// At most one pending retry. Scheduling aborts the previous one.
#[derive(Debug)]
pub struct RetryTimer {
    tx: UnboundedSender<Event>,
    handle: Option<JoinHandle<()>>,
}

impl RetryTimer {
    pub fn new(tx: UnboundedSender<Event>) -> Self {
        Self { tx, handle: None }
    }

    pub fn schedule(&mut self, delay: Duration) {
        self.cancel();
        let tx = self.tx.clone();
        self.handle = Some(tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(Event::RetryDue);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for RetryTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// `mm:ss` for the time left in a round, minutes wrapped at the hour.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{:02}:{:02}", (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;
    use tokio::time::timeout;

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(Duration::from_secs(0)), "00:00");
        assert_eq!(format_remaining(Duration::from_millis(59_999)), "00:59");
        assert_eq!(format_remaining(Duration::from_secs(61)), "01:01");
        assert_eq!(format_remaining(Duration::from_secs(3_600 + 125)), "02:05");
    }

    #[tokio::test]
    async fn test_elapsed_round_fires_once() {
        let (tx, mut rx) = unbounded_channel();
        let mut countdown = Countdown::new(tx, Duration::from_millis(10));
        countdown.restart(Utc::now() - chrono::Duration::seconds(1));

        let event = timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(event, Some(Event::RoundElapsed));
        sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_past_end_waits_one_tick() {
        let (tx, mut rx) = unbounded_channel();
        let mut countdown = Countdown::new(tx, Duration::from_millis(300));
        countdown.restart(Utc::now() - chrono::Duration::seconds(2));

        sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());

        let event = timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        assert_eq!(event, Some(Event::RoundElapsed));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_restart_aborts_previous_timer() {
        let (tx, mut rx) = unbounded_channel();
        let mut countdown = Countdown::new(tx, Duration::from_millis(10));
        countdown.restart(Utc::now() + chrono::Duration::hours(1));
        countdown.restart(Utc::now() - chrono::Duration::seconds(1));

        // Only the second timer runs; the first never ticks.
        let event = timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(event, Some(Event::RoundElapsed));
        sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_live_countdown_ticks_until_cancelled() {
        let (tx, mut rx) = unbounded_channel();
        let mut countdown = Countdown::new(tx, Duration::from_millis(10));
        countdown.restart(Utc::now() + chrono::Duration::seconds(30));

        match timeout(Duration::from_secs(1), rx.recv()).await.unwrap() {
            Some(Event::Tick(left)) => assert!(left <= Duration::from_secs(30)),
            other => panic!("expected a tick, got {other:?}"),
        }
        countdown.cancel();
        // Drain anything sent before the abort, then expect silence.
        sleep(Duration::from_millis(50)).await;
        while rx.try_recv().is_ok() {}
        sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_retry_reschedule_replaces_pending_retry() {
        let (tx, mut rx) = unbounded_channel();
        let mut retry = RetryTimer::new(tx);
        retry.schedule(Duration::from_millis(20));
        retry.schedule(Duration::from_millis(20));

        let event = timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(event, Some(Event::RetryDue));
        sleep(Duration::from_millis(60)).await;
        assert!(rx.try_recv().is_err());
    }
}
