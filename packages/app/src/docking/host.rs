//! Host abstractions the docking controller is built against.
//!
//! The controller never touches AppKit directly. Each trait here has one
//! real implementation in the platform layer and cheap fakes in the
//! controller tests.

use ledge_shared::{AccentColor, PanelEdge};

use super::animation::AnimationToken;
use super::geometry::{PanelFrame, PanelPoint, WorkArea};

/// The panel window itself.
pub trait PanelWindow: Send + Sync {
    /// Current window frame in screen coordinates.
    fn frame(&self) -> PanelFrame;

    /// Moves the window immediately, without animation. Implementations must
    /// not report this move back as a [`super::events::DockEvent::WindowMoved`].
    fn set_frame(&self, frame: PanelFrame);

    /// Starts an animated move toward `target`. Completion is reported as
    /// [`super::events::DockEvent::AnimationCompleted`] carrying `token`.
    fn animate_frame(&self, target: PanelFrame, token: AnimationToken);

    /// Stops any running frame animation without completing it.
    fn cancel_animation(&self);

    /// Enables or disables pointer input on the window.
    fn set_interactive(&self, interactive: bool);

    /// Sets the window's opacity.
    fn set_opacity(&self, opacity: f64);

    /// Brings the window to the front and activates the app.
    fn order_front_and_activate(&self);
}

/// Screen and work-area discovery.
pub trait ScreenProvider: Send + Sync {
    /// Work area of the screen containing (most of) the given frame.
    fn work_area_for(&self, frame: &PanelFrame) -> Option<WorkArea>;

    /// Work area of the primary screen.
    fn primary_work_area(&self) -> Option<WorkArea>;
}

/// Current pointer position, polled while the panel is expanded.
pub trait PointerSource: Send + Sync {
    /// Pointer location in screen coordinates.
    fn pointer_location(&self) -> PanelPoint;
}

/// Global input monitoring installed by the platform layer.
pub trait InputMonitors: Send + Sync {
    /// Starts posting [`super::events::DockEvent::GlobalPointerDown`] events.
    fn install(&self);

    /// Stops all global monitoring.
    fn remove(&self);

    /// Starts watching for the pointer-up that ends the current drag.
    fn begin_drag_end_watch(&self);

    /// Stops the drag-end watch.
    fn end_drag_end_watch(&self);
}

/// Persisted user preferences the controller reads and updates.
pub trait SettingsStore: Send + Sync {
    /// The edge the panel last docked to.
    fn preferred_edge(&self) -> PanelEdge;

    /// Persists a newly chosen docked edge.
    fn set_preferred_edge(&self, edge: PanelEdge);

    /// The accent color used by all effect surfaces.
    fn accent_color(&self) -> AccentColor;

    /// Persists a new accent color.
    fn set_accent_color(&self, color: AccentColor);
}
