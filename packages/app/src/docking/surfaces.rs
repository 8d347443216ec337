//! Effect surface traits.
//!
//! The controller drives three visual companions to the panel window. All of
//! them are passive: they never feed events back into the state machine
//! except for the indicator's pointer-entered signal, which arrives through
//! the shared event queue.

use ledge_shared::AccentColor;

use super::geometry::{PanelFrame, PanelPoint};
use super::state::SnapEdge;

/// The thin glowing strip shown along the docked screen edge while the
/// window is collapsed.
///
/// The controller only ever passes a resolved edge (`Left` or `Right`).
pub trait IndicatorSurface: Send + Sync {
    /// Shows the strip over the given frame, tinted with the accent color.
    fn show(&self, edge: SnapEdge, strip: PanelFrame, color: &AccentColor);

    /// Hides the strip.
    fn hide(&self);

    /// Brightens or dims the strip while the panel is expanded over it.
    fn set_intensity(&self, boosted: bool);
}

/// Continuous glow effect along an edge strip, used while the panel is
/// expanded and for ripple playback while collapsed.
pub trait BeamSurface: Send + Sync {
    /// Starts the glow over the given strip frame.
    fn start(&self, edge: SnapEdge, strip: PanelFrame, color: &AccentColor);

    /// Stops the glow. Safe to call when not running.
    fn stop(&self);
}

/// One-shot particle burst played where a collapse animation lands.
pub trait ImpactSurface: Send + Sync {
    /// Plays the burst at the given point on the screen edge.
    fn play(&self, edge: SnapEdge, at: PanelPoint, color: &AccentColor);
}
