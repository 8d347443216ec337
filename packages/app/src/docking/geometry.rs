//! Panel geometry and edge-snap math.
//!
//! All target frames are computed in full before any animation starts; frame
//! fields are never mutated incrementally. Coordinates are top-left based
//! (Quartz convention), matching what the platform layer reports.

use super::state::SnapEdge;

/// Distance in pixels between a window edge and the work-area edge within
/// which releasing a drag snaps the window to that edge.
pub const SNAP_THRESHOLD: i32 = 30;

/// Extra clearance beyond the work-area edge when parking the window
/// off-screen, so it can never intercept pointer events mid-animation.
pub const COLLAPSE_CLEARANCE: i32 = 50;

/// Buffer around the expanded window within which the pointer is still
/// considered "inside" for auto-collapse purposes.
pub const POINTER_EXIT_BUFFER: i32 = 80;

/// Relative area tolerance before an externally imposed resize is undone.
pub const SIZE_RESTORE_TOLERANCE: f64 = 0.05;

/// Fraction of a work-area dimension above which a size is considered
/// near-fullscreen and is not remembered as a user-chosen size.
pub const NEAR_FULLSCREEN_RATIO: f64 = 0.95;

/// Thickness in pixels of the collapsed indicator strip.
pub const INDICATOR_THICKNESS: u32 = 6;

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelPoint {
    /// X position (from the left edge of the main screen).
    pub x: i32,

    /// Y position (from the top edge of the main screen).
    pub y: i32,
}

impl PanelPoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }
}

/// A window size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelSize {
    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

impl PanelSize {
    /// Creates a new size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self { Self { width, height } }

    /// Returns the area in square pixels.
    #[must_use]
    pub const fn area(self) -> u64 { self.width as u64 * self.height as u64 }
}

/// Panel window frame (position and size).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelFrame {
    /// X position (from the left edge of the main screen).
    pub x: i32,

    /// Y position (from the top edge of the main screen).
    pub y: i32,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

#[allow(clippy::cast_possible_wrap)]
impl PanelFrame {
    /// Creates a new frame.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the frame's size.
    #[must_use]
    pub const fn size(&self) -> PanelSize { PanelSize::new(self.width, self.height) }

    /// X position of the trailing (right) edge.
    #[must_use]
    pub const fn right(&self) -> i32 { self.x + self.width as i32 }

    /// Y position of the bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 { self.y + self.height as i32 }

    /// Returns whether the point lies inside the frame.
    #[must_use]
    pub const fn contains(&self, point: PanelPoint) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Returns the frame grown by `amount` pixels in every direction.
    #[must_use]
    pub fn inflated(&self, amount: i32) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let width = (i64::from(self.width) + 2 * i64::from(amount)).max(0) as u32;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let height = (i64::from(self.height) + 2 * i64::from(amount)).max(0) as u32;

        Self { x: self.x - amount, y: self.y - amount, width, height }
    }
}

/// Usable screen area (excluding menu bar, dock, etc.).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkArea {
    /// X position (for multi-monitor setups).
    pub x: i32,

    /// Y position (for multi-monitor setups).
    pub y: i32,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

#[allow(clippy::cast_possible_wrap)]
impl WorkArea {
    /// Creates a new work area.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// X position of the trailing (right) edge.
    #[must_use]
    pub const fn right(&self) -> i32 { self.x + self.width as i32 }

    /// Y position of the bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 { self.y + self.height as i32 }
}

/// Outcome of evaluating a drag release against the work-area edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapVerdict {
    /// The window stays floating where it was released.
    Float,

    /// The window edge is within [`SNAP_THRESHOLD`] of a work-area edge and
    /// should go through the snap-then-settle sequence.
    Snap(SnapEdge),

    /// The window is already partially past the work-area boundary and
    /// should collapse immediately, skipping the snap animation.
    Overshoot(SnapEdge),
}

/// Evaluates whether a released window should snap to an edge.
///
/// Compares the window's leading/trailing edge against the work-area
/// leading/trailing edge. Overshoot (window partially off-screen) wins over
/// plain proximity so an out-of-bounds window is never animated back first.
#[must_use]
pub fn detect_snap(frame: &PanelFrame, work: &WorkArea) -> SnapVerdict {
    let left_gap = frame.x - work.x;
    let right_gap = work.right() - frame.right();

    match (left_gap < 0, right_gap < 0) {
        // Wider than the work area; snapping is meaningless.
        (true, true) => SnapVerdict::Float,
        (true, false) => SnapVerdict::Overshoot(SnapEdge::Left),
        (false, true) => SnapVerdict::Overshoot(SnapEdge::Right),
        (false, false) => {
            if left_gap <= SNAP_THRESHOLD && left_gap <= right_gap {
                SnapVerdict::Snap(SnapEdge::Left)
            } else if right_gap <= SNAP_THRESHOLD {
                SnapVerdict::Snap(SnapEdge::Right)
            } else {
                SnapVerdict::Float
            }
        }
    }
}

/// Computes the frame with the docked edge flush against the work area.
///
/// The vertical position is clamped so the window stays fully inside the
/// work area.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn edge_aligned_frame(frame: &PanelFrame, work: &WorkArea, edge: SnapEdge) -> PanelFrame {
    let x = match edge {
        SnapEdge::Right => work.right() - frame.width as i32,
        SnapEdge::Left | SnapEdge::None => work.x,
    };

    let max_y = (work.bottom() - frame.height as i32).max(work.y);
    let y = frame.y.clamp(work.y, max_y);

    PanelFrame::new(x, y, frame.width, frame.height)
}

/// Computes the fully off-screen frame for a collapsed window.
///
/// The origin is displaced outside the work area by the window width plus
/// [`COLLAPSE_CLEARANCE`], guaranteeing the window cannot intercept pointer
/// events even transiently during the hide animation.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn collapsed_frame(frame: &PanelFrame, work: &WorkArea, edge: SnapEdge) -> PanelFrame {
    let aligned = edge_aligned_frame(frame, work, edge);
    let x = match edge {
        SnapEdge::Right => work.right() + COLLAPSE_CLEARANCE,
        SnapEdge::Left | SnapEdge::None => work.x - frame.width as i32 - COLLAPSE_CLEARANCE,
    };

    PanelFrame::new(x, aligned.y, frame.width, frame.height)
}

/// Computes the thin full-height strip along a work-area edge, used for the
/// indicator and for ripple playback while collapsed.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn edge_strip_frame(work: &WorkArea, edge: SnapEdge) -> PanelFrame {
    let x = match edge {
        SnapEdge::Right => work.right() - INDICATOR_THICKNESS as i32,
        SnapEdge::Left | SnapEdge::None => work.x,
    };

    PanelFrame::new(x, work.y, INDICATOR_THICKNESS, work.height)
}

/// Computes the point on the screen edge where a collapse animation lands,
/// used for the impact burst effect.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn impact_point(frame: &PanelFrame, work: &WorkArea, edge: SnapEdge) -> PanelPoint {
    let x = match edge {
        SnapEdge::Right => work.right(),
        SnapEdge::Left | SnapEdge::None => work.x,
    };

    PanelPoint::new(x, frame.y + frame.height as i32 / 2)
}

/// Returns whether a reported size deviates from the last user-chosen size
/// by more than [`SIZE_RESTORE_TOLERANCE`] in area.
///
/// This is the best-effort heuristic for detecting OS-imposed resizes
/// (maximize, tiling); it can misfire on a legitimate resize that straddles
/// the band exactly when a move notification arrives.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn size_outside_tolerance(current: PanelSize, last_user: PanelSize) -> bool {
    if last_user.area() == 0 {
        return false;
    }

    let current_area = current.area() as f64;
    let last_area = last_user.area() as f64;
    let deviation = (current_area - last_area).abs() / last_area;

    deviation > SIZE_RESTORE_TOLERANCE
}

/// Computes the frame restoring the last user-chosen size, anchored at the
/// previous top-left corner.
#[must_use]
pub const fn restored_frame(current: &PanelFrame, last_user: PanelSize) -> PanelFrame {
    PanelFrame::new(current.x, current.y, last_user.width, last_user.height)
}

/// Returns whether a size covers nearly the whole work area in either
/// dimension. Such sizes are never remembered as user-chosen.
#[must_use]
pub fn is_near_fullscreen(size: PanelSize, work: &WorkArea) -> bool {
    f64::from(size.width) >= f64::from(work.width) * NEAR_FULLSCREEN_RATIO
        || f64::from(size.height) >= f64::from(work.height) * NEAR_FULLSCREEN_RATIO
}

/// Returns whether the pointer is outside the frame inflated by
/// [`POINTER_EXIT_BUFFER`] in every direction.
#[must_use]
pub fn pointer_left_panel(frame: &PanelFrame, pointer: PanelPoint) -> bool {
    !frame.inflated(POINTER_EXIT_BUFFER).contains(pointer)
}
