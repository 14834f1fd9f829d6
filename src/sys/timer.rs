//! Manual-fire timer for debounced actors.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::time::{Sleep, sleep};

/// A timer that stays idle until `set_next_fire` arms it. Polling an unarmed
/// timer is always pending, which makes it convenient as a `select!` arm
/// guarded by a condition.
pub struct Timer {
    sleep: Option<Pin<Box<Sleep>>>,
}

impl Timer {
    pub fn manual() -> Timer { Timer { sleep: None } }

    pub fn set_next_fire(&mut self, after: Duration) { self.sleep = Some(Box::pin(sleep(after))); }
}

impl Future for Timer {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let Some(fire) = self.sleep.as_mut() else {
            return Poll::Pending;
        };
        match fire.as_mut().poll(cx) {
            Poll::Ready(()) => {
                self.sleep = None;
                Poll::Ready(())
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unarmed_timer_stays_pending() {
        let mut timer = Timer::manual();
        tokio::select! {
            _ = &mut timer => panic!("unarmed timer fired"),
            _ = sleep(Duration::from_millis(20)) => {}
        }
    }

    #[tokio::test]
    async fn armed_timer_fires_and_disarms() {
        let mut timer = Timer::manual();
        timer.set_next_fire(Duration::from_millis(5));
        (&mut timer).await;
        tokio::select! {
            _ = &mut timer => panic!("timer fired twice"),
            _ = sleep(Duration::from_millis(20)) => {}
        }
    }
}
