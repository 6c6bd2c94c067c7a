//! Periodic ticket queue refresh.
//!
//! The refresh task emits a freshly generated [`Batch`] as soon as it starts
//! and then once per period. Each batch replaces the whole queue; nothing is
//! merged. Dropping the [`RefreshLoop`] (or calling
//! [`RefreshLoop::shutdown`]) aborts the task.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::generator::TicketGenerator;
use crate::types::Batch;

/// Default refresh period.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Channel buffer for outgoing batches. Batches are tiny and the consumer
/// drains them every frame.
pub const BATCH_CHANNEL_BUFFER: usize = 4;

/// Handle to a running refresh task.
#[derive(Debug)]
pub struct RefreshLoop {
    task: JoinHandle<()>,
    trigger: mpsc::Sender<()>,
}

impl RefreshLoop {
    /// Spawn the refresh task onto the current tokio runtime.
    ///
    /// Returns the handle and the receiver batches arrive on.
    pub fn start(generator: TicketGenerator, period: Duration) -> (Self, mpsc::Receiver<Batch>) {
        let (tx, rx) = mpsc::channel(BATCH_CHANNEL_BUFFER);
        (Self::spawn(generator, period, tx), rx)
    }

    /// Spawn the refresh task sending into an existing channel.
    pub fn spawn(mut generator: TicketGenerator, period: Duration, batches: mpsc::Sender<Batch>) -> Self {
        let (trigger, mut trigger_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let manual = tokio::select! {
                    _ = ticker.tick() => false,
                    Some(()) = trigger_rx.recv() => {
                        ticker.reset();
                        true
                    }
                };

                let batch = Batch::new(generator.generate_batch());
                info!(
                    tickets = batch.tickets.len(),
                    unassigned = batch.unassigned(),
                    manual,
                    "ticket queue refreshed"
                );

                if batches.send(batch).await.is_err() {
                    debug!("batch receiver closed, stopping refresh loop");
                    break;
                }
            }
        });

        debug!(period_secs = period.as_secs_f64(), "refresh loop started");
        Self {
            task,
            trigger,
        }
    }

    /// Produce a batch now instead of waiting for the next tick. The
    /// periodic schedule restarts from this refresh. Requests made while
    /// one is already pending are merged.
    pub fn refresh_now(&self) {
        if self.trigger.try_send(()).is_err() {
            debug!("manual refresh already pending");
        }
    }

    /// Returns true while the task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the refresh task.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for RefreshLoop {
    fn drop(&mut self) {
        self.task.abort();
    }
}
