//! Typed docking events and the queue that serializes them.
//!
//! Everything that can influence the docking state machine arrives here as a
//! [`DockEvent`]. Producers (platform observers, timer threads, the animation
//! driver) post from arbitrary threads; the controller drains the queue on a
//! single thread, so handler logic never races with itself.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::animation::AnimationToken;
use super::geometry::{PanelFrame, PanelPoint};
use super::timer::TimerPurpose;

/// An input to the docking state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockEvent {
    /// The panel window frame changed (posted only for non-programmatic
    /// moves, including every step of a live user drag).
    WindowMoved {
        /// The window frame after the move.
        frame: PanelFrame,
    },

    /// A live user resize ended.
    ResizeEnded {
        /// The window frame after the resize.
        frame: PanelFrame,
    },

    /// A mouse button was pressed anywhere on screen.
    GlobalPointerDown {
        /// Pointer location in screen coordinates.
        location: PanelPoint,
    },

    /// A mouse button was released anywhere on screen while a drag-end watch
    /// was active.
    GlobalPointerUp {
        /// Pointer location in screen coordinates.
        location: PanelPoint,
    },

    /// A mouse button was pressed inside the panel window.
    LocalPointerDown,

    /// A key was pressed while the panel window had focus.
    LocalKeyDown,

    /// The pointer entered the collapsed indicator strip.
    IndicatorPointerEntered,

    /// The application became active.
    AppActivated,

    /// The application resigned active.
    AppDeactivated,

    /// The accent color preference changed on disk.
    ColorPreferenceChanged,

    /// A scheduled timer fired.
    TimerFired {
        /// Which timer fired.
        purpose: TimerPurpose,
        /// Generation the timer was armed with; stale generations are
        /// discarded by the controller.
        generation: u64,
    },

    /// A frame animation ran to completion.
    AnimationCompleted {
        /// Token of the animation that finished.
        token: AnimationToken,
    },
}

/// FIFO queue of pending docking events.
///
/// Events are never coalesced or deduplicated; the controller sees every
/// posted event in order.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Mutex<VecDeque<DockEvent>>,
}

impl EventQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Appends an event to the back of the queue.
    pub fn push(&self, event: DockEvent) { self.events.lock().push_back(event); }

    /// Drains all pending events in posting order.
    #[must_use]
    pub fn take_all(&self) -> Vec<DockEvent> { self.events.lock().drain(..).collect() }

    /// Returns whether the queue holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.events.lock().is_empty() }
}

/// Cheaply cloneable handle for posting events from any thread.
#[derive(Debug, Clone, Default)]
pub struct EventSender {
    queue: Arc<EventQueue>,
}

impl EventSender {
    /// Creates a sender backed by a fresh queue.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Posts an event to the back of the queue.
    pub fn post(&self, event: DockEvent) { self.queue.push(event); }

    /// Returns the queue this sender feeds.
    #[must_use]
    pub fn queue(&self) -> &Arc<EventQueue> { &self.queue }
}
