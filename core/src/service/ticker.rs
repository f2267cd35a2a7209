use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use uuid::Uuid;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Spawns one repeating tick task per running timer. Ticks are delivered as
/// task ids on the event loop's channel.
#[derive(Clone)]
pub struct Ticker {
    handle: Handle,
    tx: UnboundedSender<Uuid>,
    period: Duration,
}

impl Ticker {
    /// Must be called from within a tokio runtime.
    pub fn new(tx: UnboundedSender<Uuid>) -> Self {
        Self::with_period(tx, TICK_PERIOD)
    }

    pub fn with_period(tx: UnboundedSender<Uuid>, period: Duration) -> Self {
        Self {
            handle: Handle::current(),
            tx,
            period,
        }
    }

    pub fn start(&self, id: Uuid) -> TickGuard {
        let tx = self.tx.clone();
        let period = self.period;
        let join = self.handle.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(id).is_err() {
                    break;
                }
            }
        });
        tracing::trace!(task_id = %id, "tick started");
        TickGuard { id, join }
    }
}

/// Owns a tick task. Dropping the guard cancels it.
pub struct TickGuard {
    id: Uuid,
    join: JoinHandle<()>,
}

impl Drop for TickGuard {
    fn drop(&mut self) {
        self.join.abort();
        tracing::trace!(task_id = %self.id, "tick cancelled");
    }
}
