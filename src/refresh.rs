//! Periodic re-triggering for watch mode
//!
//! A background task emits a `Trigger` on every interval tick, the way a page
//! becoming visible again re-runs the loader. The same-day cache keeps those
//! re-runs off the network.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::loader::ApodLoader;
use crate::render::BackgroundSink;

/// Why the loader is being run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// First run after startup
    Initial,
    /// A watch interval elapsed
    Tick,
}

/// Handle for the background trigger task
pub struct TriggerHandle {
    /// Channel for receiving triggers
    pub receiver: mpsc::Receiver<Trigger>,
    shutdown_tx: mpsc::Sender<()>,
}

impl TriggerHandle {
    /// Spawns a task that sends `Trigger::Tick` every `interval`
    ///
    /// The first tick fires one full interval after spawning.
    pub fn spawn(interval: Duration) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(8);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // Skip the first tick (immediate)
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if msg_tx.send(Trigger::Tick).await.is_err() {
                            break;
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            receiver: msg_rx,
            shutdown_tx,
        }
    }

    /// Stops the trigger task
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Runs the loader now and again on every tick until `shutdown` resolves
///
/// Triggers are handled one at a time. A load in progress is abandoned as soon
/// as `shutdown` resolves.
///
/// # Arguments
/// * `loader` - The loader to run on every trigger
/// * `sink` - Where each resolved background is applied
/// * `interval` - Time between re-triggers
/// * `shutdown` - Future that resolves when watching should stop (e.g., Ctrl-C)
///
/// # Returns
/// The number of loads that ran to completion
pub async fn run_watch<F>(
    loader: &ApodLoader,
    sink: &dyn BackgroundSink,
    interval: Duration,
    shutdown: F,
) -> usize
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    debug!(trigger = ?Trigger::Initial, "Running loader");
    tokio::select! {
        _ = loader.load_and_render(sink) => {}
        _ = &mut shutdown => {
            return 0;
        }
    }

    let mut runs = 1;
    let mut handle = TriggerHandle::spawn(interval);

    loop {
        let trigger = tokio::select! {
            trigger = handle.receiver.recv() => trigger,
            _ = &mut shutdown => break,
        };
        let Some(trigger) = trigger else { break };

        debug!(?trigger, "Re-running loader");
        tokio::select! {
            outcome = loader.load_and_render(sink) => {
                debug!(source = ?outcome.source, "Background refreshed");
                runs += 1;
            }
            _ = &mut shutdown => break,
        }
    }

    handle.shutdown().await;
    runs
}
