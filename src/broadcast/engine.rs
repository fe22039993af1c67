//! Broadcast scheduler.
//!
//! A single ticker checks the wall clock at least twice per minute. On each
//! tick every trigger is tested independently; matching triggers spawn a
//! broadcast task. Per trigger the engine guarantees:
//! - at most one firing per matching minute, however often it ticks
//! - no overlapping firings: if the previous broadcast is still in flight
//!   when the next matching minute arrives, that firing is skipped
//!
//! Broadcast failures are logged and dropped. A panicking broadcast task is
//! re-raised on the scheduler task so the process does not run on silently.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::broadcast::trigger::ScheduleTrigger;
use crate::channels::DeliveryGateway;
use crate::clock::Clock;

/// Longest allowed tick. Two checks land inside every wall-clock minute.
pub const MAX_TICK: Duration = Duration::from_secs(30);

/// Sentinel for "never fired".
const NEVER: i64 = i64::MIN;

/// Per-trigger runtime state.
struct TriggerSlot {
    trigger: Arc<ScheduleTrigger>,
    /// Local wall-clock minute of the last claimed firing.
    last_fired_minute: AtomicI64,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the broadcast task ends, even by panic.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Fires scheduled broadcasts through the delivery gateway.
pub struct BroadcastScheduler {
    slots: Vec<TriggerSlot>,
    gateway: Arc<dyn DeliveryGateway>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
}

impl BroadcastScheduler {
    /// `tick_interval` is clamped to 1 second..=[`MAX_TICK`].
    pub fn new(
        triggers: Vec<ScheduleTrigger>,
        gateway: Arc<dyn DeliveryGateway>,
        clock: Arc<dyn Clock>,
        tick_interval: Duration,
    ) -> Self {
        let slots = triggers
            .into_iter()
            .map(|trigger| TriggerSlot {
                trigger: Arc::new(trigger),
                last_fired_minute: AtomicI64::new(NEVER),
                in_flight: Arc::new(AtomicBool::new(false)),
            })
            .collect();

        Self {
            slots,
            gateway,
            clock,
            tick_interval: tick_interval.clamp(Duration::from_secs(1), MAX_TICK),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn triggers(&self) -> impl Iterator<Item = &ScheduleTrigger> {
        self.slots.iter().map(|s| s.trigger.as_ref())
    }

    /// Next firing instant of every trigger after `now`.
    pub fn upcoming(&self, now: DateTime<Utc>) -> Vec<(String, Option<DateTime<Utc>>)> {
        self.triggers()
            .map(|t| (t.name().to_string(), t.next_fire_after(now)))
            .collect()
    }

    /// Evaluate every trigger at `now` and spawn a broadcast for each one due.
    ///
    /// Returns how many broadcasts were spawned into `tasks`.
    pub fn tick_at(&self, now: DateTime<Utc>, tasks: &mut JoinSet<()>) -> usize {
        let mut spawned = 0;

        for slot in &self.slots {
            let trigger = &slot.trigger;
            if !trigger.matches(now) {
                continue;
            }

            let minute = trigger.local_minute(now);
            if slot.last_fired_minute.swap(minute, Ordering::AcqRel) == minute {
                continue;
            }

            if slot.in_flight.swap(true, Ordering::AcqRel) {
                warn!(
                    trigger = %trigger.name(),
                    "Skipped: previous broadcast still in flight"
                );
                continue;
            }

            let guard = InFlightGuard(Arc::clone(&slot.in_flight));
            let trigger = Arc::clone(trigger);
            let gateway = Arc::clone(&self.gateway);

            info!(trigger = %trigger.name(), at = %now, "Broadcast trigger fired");
            tasks.spawn(async move {
                let _guard = guard;
                let payload = trigger.payload();
                match gateway.broadcast(&payload).await {
                    Ok(()) => info!(
                        trigger = %trigger.name(),
                        gateway = gateway.name(),
                        "Broadcast sent"
                    ),
                    Err(e) => error!(
                        trigger = %trigger.name(),
                        gateway = gateway.name(),
                        error = %e,
                        "Broadcast failed"
                    ),
                }
            });
            spawned += 1;
        }

        spawned
    }

    /// Tick forever against the injected clock.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let spawned = self.tick_at(self.clock.now(), &mut tasks);
                    if spawned > 0 {
                        debug!(spawned, "Scheduler tick");
                    }
                }
                Some(joined) = tasks.join_next() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            std::panic::resume_unwind(e.into_panic());
                        }
                        warn!(error = %e, "Broadcast task cancelled");
                    }
                }
            }
        }
    }
}

/// Spawn the scheduler loop as a background task.
pub fn spawn_scheduler(scheduler: Arc<BroadcastScheduler>) -> JoinHandle<()> {
    tokio::spawn(scheduler.run())
}
