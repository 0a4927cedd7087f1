//! The cooperative event loop driving the monitor.
//!
//! Single-threaded by design: the periodic check, the idle timeout, and
//! incoming activity events are multiplexed on one task, and every
//! callback runs to completion before the next fires, so control
//! decisions never interleave. All sensor/actuator I/O stays synchronous
//! inside the callbacks — at a 1 Hz tick against local sysfs files there
//! is nothing to win by making it asynchronous, and the ordering
//! guarantees depend on it staying inline.
//!
//! The idle timer is one-shot: it fires `Dimmed` once and stays quiet
//! until user activity leaves idle again, which re-arms it with the
//! *currently* active power mode's timeout (AC and battery differ).

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};

use crate::control::IdleLevel;
use crate::event::Event;
use crate::monitor::Monitor;

/// Cooperative cancellation for [`run`].
pub struct Shutdown {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx, rx }
    }

    /// Ask the loop to stop after the current callback.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// A handle that can trigger shutdown from another thread (signal
    /// handlers).
    pub fn trigger_handle(&self) -> watch::Sender<bool> {
        self.tx.clone()
    }

    pub(crate) fn receiver(&self) -> watch::Receiver<bool> {
        self.rx.clone()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive the monitor until `shutdown` triggers or the event channel
/// closes.
///
/// Events are applied as they arrive; whenever an event pass ends with
/// the monitor back in `Active`, the idle deadline is re-armed with the
/// active mode's timeout (this covers both plain activity and an
/// explicit leave-idle, and deliberately not a closed lid). Restoring
/// safe actuator defaults is *not* done here — the caller runs it after
/// the loop so it also covers abnormal exits.
pub async fn run(monitor: &mut Monitor, mut events: mpsc::Receiver<Event>, shutdown: &Shutdown) {
    let mut cancel = shutdown.receiver();
    if *cancel.borrow() {
        return;
    }

    let mut tick = time::interval(Duration::from_secs(monitor.config().tick_interval));
    tick.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    // The first interval tick completes immediately; skip it so the first
    // sample lands one full period after start.
    tick.tick().await;

    let mut idle_deadline = Some(Instant::now() + monitor.idle_timeout());

    loop {
        // A one-shot deadline: pending forever once it has fired.
        let deadline = idle_deadline;
        let idle_wait = async move {
            match deadline {
                Some(deadline) => time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            _ = tick.tick() => {
                monitor.tick();
            }
            () = idle_wait => {
                idle_deadline = None;
                monitor.on_idle_timeout();
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                monitor.handle_event(event);
                if monitor.idle_level() == IdleLevel::Active {
                    idle_deadline = Some(Instant::now() + monitor.idle_timeout());
                }
            }
            _ = cancel.changed() => {
                if *cancel.borrow() {
                    break;
                }
            }
        }
    }
}
