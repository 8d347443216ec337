//! Delayed and repeating timers with generation-based cancellation.
//!
//! Every timer purpose holds at most one live timer. Arming a purpose bumps
//! its generation and cancels whatever was pending; a fire event carrying a
//! stale generation is ignored. This makes cancellation race-free without
//! needing to reach into the scheduler thread.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use super::events::{DockEvent, EventSender};

/// What a scheduled timer is for. Each purpose has at most one live timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPurpose {
    /// One-shot delay between snap alignment and auto-collapse.
    SettleDelay,

    /// Repeating poll checking whether the pointer left the expanded panel.
    PointerPoll,

    /// One-shot cleanup that stops a ripple preview.
    EffectCleanup,
}

/// Schedules timer callbacks that post [`DockEvent::TimerFired`].
pub trait TimerScheduler: Send + Sync {
    /// Schedules a one-shot timer. A later fire must carry `generation`.
    fn schedule_once(&self, purpose: TimerPurpose, generation: u64, delay: Duration);

    /// Schedules a repeating timer with the given interval.
    fn schedule_repeating(&self, purpose: TimerPurpose, generation: u64, interval: Duration);

    /// Stops any pending timer for the purpose. Fires already in flight are
    /// filtered out by their stale generation.
    fn cancel(&self, purpose: TimerPurpose);
}

/// Per-purpose generation counters.
///
/// `arm` returns the generation a new timer must be scheduled with;
/// `accepts` checks a fire event against the current generation without
/// consuming it, so repeating timers keep firing until cancelled.
#[derive(Debug, Default)]
pub struct TimerSlots {
    generations: HashMap<TimerPurpose, u64>,
}

impl TimerSlots {
    /// Creates empty slots.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Invalidates any pending timer for the purpose and returns the
    /// generation to arm the replacement with.
    pub fn arm(&mut self, purpose: TimerPurpose) -> u64 {
        let generation = self.generations.entry(purpose).or_insert(0);
        *generation += 1;
        *generation
    }

    /// Invalidates any pending timer for the purpose.
    pub fn cancel(&mut self, purpose: TimerPurpose) {
        *self.generations.entry(purpose).or_insert(0) += 1;
    }

    /// Returns whether a fire event with this generation is still current.
    #[must_use]
    pub fn accepts(&self, purpose: TimerPurpose, generation: u64) -> bool {
        self.generations.get(&purpose).copied().unwrap_or(0) == generation
    }
}

/// Owns the slots and the scheduler, pairing cancel-then-arm so a purpose can
/// never have two live timers.
pub struct Timers {
    slots: TimerSlots,
    scheduler: Arc<dyn TimerScheduler>,
}

impl Timers {
    /// Creates timers driven by the given scheduler.
    #[must_use]
    pub fn new(scheduler: Arc<dyn TimerScheduler>) -> Self {
        Self { slots: TimerSlots::new(), scheduler }
    }

    /// Replaces any pending timer for the purpose with a new one-shot timer.
    pub fn arm_once(&mut self, purpose: TimerPurpose, delay: Duration) {
        self.scheduler.cancel(purpose);
        let generation = self.slots.arm(purpose);
        self.scheduler.schedule_once(purpose, generation, delay);
    }

    /// Replaces any pending timer for the purpose with a repeating timer.
    pub fn arm_repeating(&mut self, purpose: TimerPurpose, interval: Duration) {
        self.scheduler.cancel(purpose);
        let generation = self.slots.arm(purpose);
        self.scheduler.schedule_repeating(purpose, generation, interval);
    }

    /// Cancels any pending timer for the purpose.
    pub fn cancel(&mut self, purpose: TimerPurpose) {
        self.scheduler.cancel(purpose);
        self.slots.cancel(purpose);
    }

    /// Returns whether a fire event is still current.
    #[must_use]
    pub fn accepts(&self, purpose: TimerPurpose, generation: u64) -> bool {
        self.slots.accepts(purpose, generation)
    }
}

/// Thread-based scheduler posting [`DockEvent::TimerFired`] to the event
/// queue.
///
/// Each scheduled timer spawns a sleeper thread. The thread re-checks the
/// active generation after waking, so a cancelled timer wakes once and exits
/// without posting.
pub struct ThreadScheduler {
    sender: EventSender,
    active: Arc<Mutex<HashMap<TimerPurpose, u64>>>,
}

impl ThreadScheduler {
    /// Creates a scheduler posting to the given sender.
    #[must_use]
    pub fn new(sender: EventSender) -> Self {
        Self { sender, active: Arc::new(Mutex::new(HashMap::new())) }
    }

    fn is_active(active: &Mutex<HashMap<TimerPurpose, u64>>, purpose: TimerPurpose, generation: u64) -> bool {
        active.lock().get(&purpose).copied() == Some(generation)
    }
}

impl TimerScheduler for ThreadScheduler {
    fn schedule_once(&self, purpose: TimerPurpose, generation: u64, delay: Duration) {
        self.active.lock().insert(purpose, generation);

        let sender = self.sender.clone();
        let active = Arc::clone(&self.active);

        thread::spawn(move || {
            thread::sleep(delay);

            if Self::is_active(&active, purpose, generation) {
                sender.post(DockEvent::TimerFired { purpose, generation });
            }
        });
    }

    fn schedule_repeating(&self, purpose: TimerPurpose, generation: u64, interval: Duration) {
        self.active.lock().insert(purpose, generation);

        let sender = self.sender.clone();
        let active = Arc::clone(&self.active);

        thread::spawn(move || {
            loop {
                thread::sleep(interval);

                if !Self::is_active(&active, purpose, generation) {
                    break;
                }

                sender.post(DockEvent::TimerFired { purpose, generation });
            }
        });
    }

    fn cancel(&self, purpose: TimerPurpose) { self.active.lock().remove(&purpose); }
}
