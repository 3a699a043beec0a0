//! Deterministic clock and timer for tests.

use crate::{Clock, Timer};
use async_trait::async_trait;
use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct ManualClock {
    secs: Cell<u64>,
}

impl ManualClock {
    pub fn new(secs: u64) -> Self {
        Self { secs: Cell::new(secs) }
    }

    pub fn advance(&self, by: Duration) {
        self.secs.set(self.secs.get() + by.as_secs());
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> u64 {
        self.secs.get()
    }
}

/// Timer that never waits: each sleep yields to the executor once and counts itself.
#[derive(Debug, Default)]
pub struct ImmediateTimer {
    sleeps: Cell<usize>,
}

impl ImmediateTimer {
    pub fn sleeps(&self) -> usize {
        self.sleeps.get()
    }
}

#[async_trait(?Send)]
impl Timer for ImmediateTimer {
    async fn sleep(&self, _duration: Duration) {
        self.sleeps.set(self.sleeps.get() + 1);
        YieldOnce(false).await;
    }
}

struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            return Poll::Ready(());
        }
        self.0 = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(100);
        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.now_secs(), 105);
    }

    #[tokio::test]
    async fn immediate_timer_counts_sleeps() {
        let timer = ImmediateTimer::default();
        timer.sleep(Duration::from_secs(5)).await;
        timer.sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.sleeps(), 2);
    }
}
