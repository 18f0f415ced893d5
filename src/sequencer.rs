//! Single-worker task sequencer enforcing a minimum interval between dispatches.

use std::future::Future;
use std::time::Duration;

use web_time::Instant;

/// Source of delays. The worker sleeps on the JS event loop; tests record instead.
#[allow(async_fn_in_trait)]
pub trait Pacer {
    /// Wait for `duration`.
    async fn pause(&self, duration: Duration);
}

/// Runs tasks one at a time, starting each at least `min_interval` after the previous
/// one started.
pub struct Sequencer<P> {
    pacer: P,
    min_interval: Duration,
    last_dispatch: Option<Instant>,
}

impl<P: Pacer> Sequencer<P> {
    /// Create a sequencer. The first dispatch never waits.
    pub fn new(pacer: P, min_interval: Duration) -> Self {
        Self {
            pacer,
            min_interval,
            last_dispatch: None,
        }
    }

    /// Wait out the interval if needed, then run `task` to completion.
    pub async fn dispatch<F: Future>(&mut self, task: F) -> F::Output {
        if let Some(last) = self.last_dispatch {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                self.pacer.pause(self.min_interval - elapsed).await;
            }
        }
        self.last_dispatch = Some(Instant::now());
        task.await
    }

    /// The wrapped pacer.
    pub fn pacer(&self) -> &P {
        &self.pacer
    }
}
