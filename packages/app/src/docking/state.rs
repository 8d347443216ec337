//! Docking lifecycle state.
//!
//! The panel window is always in exactly one [`WindowState`]. The docking
//! controller owns the state exclusively; collaborators can only observe it
//! through the controller's query methods.

use ledge_shared::PanelEdge;

/// Lifecycle state of the panel window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WindowState {
    /// The window floats freely; no edge is associated.
    #[default]
    Floating,

    /// The window is aligned flush against a screen edge, waiting for the
    /// post-snap settle delay to elapse.
    Snapped,

    /// The window is fully off-screen; only the indicator strip is visible.
    Collapsed,

    /// The window is visible at its docked edge and will auto-collapse when
    /// the pointer leaves it.
    Expanded,

    /// An expanded window that resists auto-collapse because genuine user
    /// interaction was detected.
    Locked,
}

impl WindowState {
    /// Returns whether this state is associated with a docked edge.
    #[must_use]
    pub const fn is_docked(self) -> bool { !matches!(self, Self::Floating) }
}

/// The screen edge the panel is docked against, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SnapEdge {
    /// Not docked. Only valid while the window is floating.
    #[default]
    None,
    /// Docked against the left edge of the work area.
    Left,
    /// Docked against the right edge of the work area.
    Right,
}

impl SnapEdge {
    /// Returns the edge as a docked edge, or `None` when not docked.
    #[must_use]
    pub const fn resolved(self) -> Option<Self> {
        match self {
            Self::None => None,
            edge @ (Self::Left | Self::Right) => Some(edge),
        }
    }
}

impl From<PanelEdge> for SnapEdge {
    fn from(edge: PanelEdge) -> Self {
        match edge {
            PanelEdge::Left => Self::Left,
            PanelEdge::Right => Self::Right,
        }
    }
}

impl From<SnapEdge> for Option<PanelEdge> {
    fn from(edge: SnapEdge) -> Self {
        match edge {
            SnapEdge::None => None,
            SnapEdge::Left => Some(PanelEdge::Left),
            SnapEdge::Right => Some(PanelEdge::Right),
        }
    }
}

/// Checks the core invariant: an edge is set if and only if the window is in
/// a docked state.
#[must_use]
pub const fn edge_matches_state(state: WindowState, edge: SnapEdge) -> bool {
    match state {
        WindowState::Floating => matches!(edge, SnapEdge::None),
        WindowState::Snapped
        | WindowState::Collapsed
        | WindowState::Expanded
        | WindowState::Locked => !matches!(edge, SnapEdge::None),
    }
}
