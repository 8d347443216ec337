//! The docking state machine.
//!
//! All transitions between floating, snapped, collapsed, expanded and locked
//! run through [`DockingController::handle_event`], on a single thread. The
//! controller owns the state exclusively and drives the window, the timers
//! and the effect surfaces through the host traits, so the whole machine is
//! testable without a window server.

use std::sync::Arc;
use std::time::Duration;

use ledge_shared::{AccentColor, LedgeConfig, PanelEdge};

use super::animation::AnimationToken;
use super::effects::EffectRouter;
use super::events::{DockEvent, EventQueue};
use super::geometry::{self, PanelFrame, PanelPoint, PanelSize, SnapVerdict, WorkArea};
use super::host::{InputMonitors, PanelWindow, PointerSource, ScreenProvider, SettingsStore};
use super::state::{SnapEdge, WindowState, edge_matches_state};
use super::surfaces::IndicatorSurface;
use super::timer::{TimerPurpose, Timers};

/// Delay between the snap alignment landing and the auto-collapse.
const SETTLE_DELAY: Duration = Duration::from_millis(300);

/// Interval of the pointer poll while the panel is expanded.
const POINTER_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lifetime of a ripple color preview before it is cleaned up.
const RIPPLE_PREVIEW_LIFETIME: Duration = Duration::from_secs(2);

/// What a running frame animation is for. Follow-up actions fire only when
/// the matching completion token arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnimationKind {
    /// Aligning the window flush against the docked edge after a snap.
    SnapAlign,
    /// Moving the window fully off-screen.
    Collapse,
    /// Bringing the collapsed window back to its docked edge.
    Expand,
    /// Returning an undocked window to its remembered floating frame.
    Restore,
}

/// Hosts, surfaces and stores the controller is wired to.
pub struct DockingDeps {
    /// The panel window.
    pub window: Box<dyn PanelWindow>,
    /// Screen discovery.
    pub screens: Box<dyn ScreenProvider>,
    /// Pointer position source.
    pub pointer: Box<dyn PointerSource>,
    /// Global input monitors.
    pub monitors: Box<dyn InputMonitors>,
    /// Persisted preferences, shared with the config watcher.
    pub settings: Arc<dyn SettingsStore>,
    /// The collapsed-edge indicator strip.
    pub indicator: Box<dyn IndicatorSurface>,
    /// Beam and impact surfaces.
    pub effects: EffectRouter,
    /// Timer scheduling.
    pub timers: Timers,
}

/// Edge-snap docking controller for the panel window.
pub struct DockingController {
    state: WindowState,
    snap_edge: SnapEdge,
    has_user_interaction: bool,
    pending_external_reveal: bool,
    is_dragging: bool,
    is_programmatic_move: bool,
    ripple_active: bool,
    last_user_size: PanelSize,
    remembered_floating_frame: Option<PanelFrame>,
    dock_work_area: Option<WorkArea>,
    pending_impact: Option<PanelPoint>,
    pending_animation: Option<(AnimationKind, AnimationToken)>,
    next_token: u64,
    summon_on_deactivate: bool,

    window: Box<dyn PanelWindow>,
    screens: Box<dyn ScreenProvider>,
    pointer: Box<dyn PointerSource>,
    monitors: Box<dyn InputMonitors>,
    settings: Arc<dyn SettingsStore>,
    indicator: Box<dyn IndicatorSurface>,
    effects: EffectRouter,
    timers: Timers,
}

impl DockingController {
    /// Creates a controller in the floating state. The window's current size
    /// becomes the initial user-chosen size.
    #[must_use]
    pub fn new(deps: DockingDeps, config: &LedgeConfig) -> Self {
        let last_user_size = deps.window.frame().size();

        Self {
            state: WindowState::Floating,
            snap_edge: SnapEdge::None,
            has_user_interaction: false,
            pending_external_reveal: false,
            is_dragging: false,
            is_programmatic_move: false,
            ripple_active: false,
            last_user_size,
            remembered_floating_frame: None,
            dock_work_area: None,
            pending_impact: None,
            pending_animation: None,
            next_token: 0,
            summon_on_deactivate: config.panel.summon_on_deactivate,
            window: deps.window,
            screens: deps.screens,
            pointer: deps.pointer,
            monitors: deps.monitors,
            settings: deps.settings,
            indicator: deps.indicator,
            effects: deps.effects,
            timers: deps.timers,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> WindowState { self.state }

    /// Current docked edge, `None` while floating.
    #[must_use]
    pub const fn snap_edge(&self) -> SnapEdge { self.snap_edge }

    /// Returns whether the window is fully off-screen.
    #[must_use]
    pub fn is_collapsed(&self) -> bool { self.state == WindowState::Collapsed }

    /// Drains the queue and handles every pending event in order.
    pub fn pump(&mut self, queue: &EventQueue) {
        for event in queue.take_all() {
            self.handle_event(event);
        }
    }

    /// Feeds one event through the state machine.
    pub fn handle_event(&mut self, event: DockEvent) {
        match event {
            DockEvent::WindowMoved { frame } => self.handle_window_moved(frame),
            DockEvent::ResizeEnded { frame } => self.handle_resize_ended(frame),
            DockEvent::GlobalPointerDown { location } => self.handle_global_pointer_down(location),
            DockEvent::GlobalPointerUp { location } => self.handle_global_pointer_up(location),
            DockEvent::LocalPointerDown | DockEvent::LocalKeyDown => self.notify_user_interaction(),
            DockEvent::IndicatorPointerEntered => self.handle_indicator_pointer_entered(),
            DockEvent::AppActivated => self.handle_app_activated(),
            DockEvent::AppDeactivated => self.handle_app_deactivated(),
            DockEvent::ColorPreferenceChanged => self.handle_color_changed(),
            DockEvent::TimerFired { purpose, generation } => self.handle_timer(purpose, generation),
            DockEvent::AnimationCompleted { token } => self.handle_animation_completed(token),
        }

        debug_assert!(
            edge_matches_state(self.state, self.snap_edge),
            "state {:?} with edge {:?}",
            self.state,
            self.snap_edge
        );
    }

    // ------------------------------------------------------------------
    // Event handlers
    // ------------------------------------------------------------------

    fn handle_window_moved(&mut self, frame: PanelFrame) {
        if self.is_programmatic_move {
            return;
        }

        // An OS-imposed size change (maximize, tiling) rides in on a move
        // notification. Undo it, anchored at the previous top-left.
        if geometry::size_outside_tolerance(frame.size(), self.last_user_size) {
            let restored = geometry::restored_frame(&frame, self.last_user_size);

            self.is_programmatic_move = true;
            self.window.set_frame(restored);
            self.is_programmatic_move = false;
            return;
        }

        if self.is_dragging {
            return;
        }

        self.is_dragging = true;
        self.monitors.begin_drag_end_watch();

        // A user drag overrides docking from every docked state
        if self.state.is_docked() {
            self.release_dock();
        }
    }

    fn handle_global_pointer_up(&mut self, _location: PanelPoint) {
        if !self.is_dragging {
            return;
        }

        self.is_dragging = false;
        self.monitors.end_drag_end_watch();

        let frame = self.window.frame();
        self.remembered_floating_frame = Some(frame);

        let Some(work) = self.screens.work_area_for(&frame) else {
            eprintln!("ledge: no screen found for frame {frame:?}, staying floating");
            return;
        };

        match geometry::detect_snap(&frame, &work) {
            SnapVerdict::Float => {}
            SnapVerdict::Snap(edge) => self.begin_snap(edge, frame, work),
            SnapVerdict::Overshoot(edge) => {
                // Already past the boundary; skip the alignment phase
                self.set_docked_edge(edge, work);
                self.state = WindowState::Snapped;
                self.collapse();
            }
        }
    }

    fn handle_animation_completed(&mut self, token: AnimationToken) {
        let Some((kind, pending)) = self.pending_animation else {
            return;
        };

        if pending != token {
            return;
        }

        self.pending_animation = None;

        match kind {
            AnimationKind::SnapAlign => {
                if self.state == WindowState::Snapped {
                    self.timers.arm_once(TimerPurpose::SettleDelay, SETTLE_DELAY);
                }
            }
            AnimationKind::Collapse => {
                // Off-screen now; make the window inert
                self.window.set_interactive(false);
                self.window.set_opacity(0.0);

                if let (Some(edge), Some(at)) = (self.snap_edge.resolved(), self.pending_impact.take()) {
                    self.effects.play_impact(edge, at, &self.settings.accent_color());
                }
            }
            AnimationKind::Expand => {
                if let (Some(edge), Some(work)) = (self.snap_edge.resolved(), self.dock_work_area)
                    && matches!(self.state, WindowState::Expanded | WindowState::Locked)
                {
                    let strip = geometry::edge_strip_frame(&work, edge);
                    self.effects.start_beam(edge, strip, &self.settings.accent_color());
                }

                if self.state == WindowState::Expanded {
                    self.timers.arm_repeating(TimerPurpose::PointerPoll, POINTER_POLL_INTERVAL);
                }
            }
            AnimationKind::Restore => {}
        }
    }

    fn handle_timer(&mut self, purpose: TimerPurpose, generation: u64) {
        if !self.timers.accepts(purpose, generation) {
            return;
        }

        match purpose {
            TimerPurpose::SettleDelay => {
                self.timers.cancel(TimerPurpose::SettleDelay);

                if self.state == WindowState::Snapped {
                    self.collapse();
                }
            }
            TimerPurpose::PointerPoll => {
                if self.state != WindowState::Expanded {
                    self.timers.cancel(TimerPurpose::PointerPoll);
                    return;
                }

                if self.has_user_interaction
                    || self.pending_external_reveal
                    || self.pending_animation.is_some()
                {
                    return;
                }

                let pointer = self.pointer.pointer_location();
                if geometry::pointer_left_panel(&self.window.frame(), pointer) {
                    self.timers.cancel(TimerPurpose::PointerPoll);
                    self.collapse();
                }
            }
            TimerPurpose::EffectCleanup => {
                self.timers.cancel(TimerPurpose::EffectCleanup);
                self.stop_ripple();
            }
        }
    }

    fn handle_global_pointer_down(&mut self, location: PanelPoint) {
        if !matches!(self.state, WindowState::Expanded | WindowState::Locked) {
            return;
        }

        if self.window.frame().contains(location) {
            self.notify_user_interaction();
            return;
        }

        // Outside click dismisses a locked or externally revealed panel
        if self.state == WindowState::Locked || self.pending_external_reveal {
            self.has_user_interaction = false;
            self.pending_external_reveal = false;
            self.state = WindowState::Expanded;
            self.collapse();
        }
    }

    /// Marks genuine user interaction with the visible panel, locking it
    /// against auto-collapse until an outside click dismisses it. Ignored in
    /// any other state.
    pub fn notify_user_interaction(&mut self) {
        if !matches!(self.state, WindowState::Expanded | WindowState::Locked) {
            return;
        }

        self.has_user_interaction = true;
        self.pending_external_reveal = false;
        self.state = WindowState::Locked;
        self.timers.cancel(TimerPurpose::PointerPoll);
    }

    fn handle_indicator_pointer_entered(&mut self) {
        match self.state {
            WindowState::Collapsed => self.expand(),
            WindowState::Floating => {
                // Summon affordance: bring the floating window forward
                self.window.order_front_and_activate();
                self.indicator.hide();
            }
            WindowState::Snapped | WindowState::Expanded | WindowState::Locked => {}
        }
    }

    fn handle_app_activated(&mut self) {
        if self.state == WindowState::Floating {
            self.indicator.hide();
        }
    }

    fn handle_app_deactivated(&mut self) {
        if self.state == WindowState::Floating
            && self.summon_on_deactivate
            && let Some(work) = self.screens.primary_work_area()
        {
            let edge = SnapEdge::from(self.settings.preferred_edge());
            let strip = geometry::edge_strip_frame(&work, edge);
            self.indicator.show(edge, strip, &self.settings.accent_color());
        }
    }

    fn handle_color_changed(&mut self) {
        if self.state == WindowState::Collapsed
            && let Some(edge) = self.snap_edge.resolved()
            && let Some(work) = self.dock_work_area
        {
            let strip = geometry::edge_strip_frame(&work, edge);
            self.indicator.show(edge, strip, &self.settings.accent_color());
        }
    }

    fn handle_resize_ended(&mut self, frame: PanelFrame) {
        let work = self.screens.work_area_for(&frame).or_else(|| self.screens.primary_work_area());

        // Near-fullscreen sizes come from maximize/tiling, not the user
        let near_fullscreen =
            work.is_some_and(|work| geometry::is_near_fullscreen(frame.size(), &work));

        if !near_fullscreen {
            self.last_user_size = frame.size();
        }

        if self.state == WindowState::Floating {
            self.remembered_floating_frame = Some(frame);
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    fn begin_snap(&mut self, edge: SnapEdge, frame: PanelFrame, work: WorkArea) {
        self.set_docked_edge(edge, work);
        self.state = WindowState::Snapped;

        let target = geometry::edge_aligned_frame(&frame, &work, edge);
        self.animate(AnimationKind::SnapAlign, target);
    }

    /// Collapses the window fully off-screen. Idempotent; a no-op while
    /// already collapsed or while floating.
    pub fn collapse(&mut self) {
        if self.state == WindowState::Collapsed {
            return;
        }

        let Some(edge) = self.snap_edge.resolved() else {
            return;
        };

        let frame = self.window.frame();
        let Some(work) =
            self.screens.work_area_for(&frame).or_else(|| self.screens.primary_work_area())
        else {
            eprintln!("ledge: no screen available, cannot collapse");
            return;
        };

        self.timers.cancel(TimerPurpose::SettleDelay);
        self.timers.cancel(TimerPurpose::PointerPoll);
        self.timers.cancel(TimerPurpose::EffectCleanup);

        // Stops the expand beam and any ripple alike
        self.effects.stop_beam();
        self.ripple_active = false;

        self.has_user_interaction = false;
        self.pending_external_reveal = false;
        self.state = WindowState::Collapsed;
        self.dock_work_area = Some(work);

        let strip = geometry::edge_strip_frame(&work, edge);
        self.indicator.show(edge, strip, &self.settings.accent_color());
        self.indicator.set_intensity(false);

        let target = geometry::collapsed_frame(&frame, &work, edge);
        self.pending_impact = Some(geometry::impact_point(&target, &work, edge));
        self.animate(AnimationKind::Collapse, target);
        // Input and opacity are only dropped once the window has landed
    }

    /// Brings the collapsed window back to its docked edge.
    pub fn expand(&mut self) {
        if self.state != WindowState::Collapsed {
            return;
        }

        let Some(edge) = self.snap_edge.resolved() else {
            return;
        };

        let Some(work) = self.dock_work_area.or_else(|| self.screens.primary_work_area()) else {
            return;
        };

        self.timers.cancel(TimerPurpose::EffectCleanup);
        self.stop_ripple();

        // Interactive before the animation so the panel responds immediately
        self.window.set_interactive(true);
        self.window.set_opacity(1.0);
        self.indicator.set_intensity(true);

        self.state = WindowState::Expanded;

        let target = geometry::edge_aligned_frame(&self.window.frame(), &work, edge);
        self.animate(AnimationKind::Expand, target);
    }

    /// Expands on behalf of another part of the app. The panel collapses
    /// again on the first outside click unless the user interacts with it.
    pub fn force_expand(&mut self) {
        if self.state != WindowState::Collapsed {
            return;
        }

        self.pending_external_reveal = true;
        self.expand();
    }

    /// Docks the floating window to the preferred edge, collapsing directly
    /// without the snap alignment phase.
    pub fn snap_to_preferred_edge(&mut self) {
        if self.state != WindowState::Floating {
            return;
        }

        let frame = self.window.frame();
        let Some(work) =
            self.screens.work_area_for(&frame).or_else(|| self.screens.primary_work_area())
        else {
            return;
        };

        self.remembered_floating_frame = Some(frame);

        let edge = SnapEdge::from(self.settings.preferred_edge());
        self.set_docked_edge(edge, work);
        self.state = WindowState::Snapped;
        self.collapse();
    }

    /// Releases the dock and animates back to the remembered floating frame.
    pub fn undock(&mut self) {
        if self.state == WindowState::Floating {
            return;
        }

        let target = self.remembered_floating_frame;
        self.release_dock();

        if let Some(target) = target {
            self.animate(AnimationKind::Restore, target);
        }
    }

    /// Starts the edge ripple. With `preview` the effect cleans itself up
    /// after a short lifetime; otherwise it runs until [`Self::stop_ripple`].
    pub fn start_ripple(&mut self, color: &AccentColor, preview: bool) {
        if self.state != WindowState::Collapsed {
            return;
        }

        let (Some(edge), Some(work)) = (self.snap_edge.resolved(), self.dock_work_area) else {
            return;
        };

        let strip = geometry::edge_strip_frame(&work, edge);
        self.effects.start_beam(edge, strip, color);
        self.ripple_active = true;

        if preview {
            self.timers.arm_once(TimerPurpose::EffectCleanup, RIPPLE_PREVIEW_LIFETIME);
        }
    }

    /// Stops a running ripple. Safe to call when none is running.
    pub fn stop_ripple(&mut self) {
        if self.ripple_active {
            self.effects.stop_beam();
            self.ripple_active = false;
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn set_docked_edge(&mut self, edge: SnapEdge, work: WorkArea) {
        self.snap_edge = edge;
        self.dock_work_area = Some(work);

        if let Some(preferred) = Option::<PanelEdge>::from(edge) {
            self.settings.set_preferred_edge(preferred);
        }
    }

    fn release_dock(&mut self) {
        self.window.cancel_animation();
        self.pending_animation = None;
        self.pending_impact = None;

        self.timers.cancel(TimerPurpose::SettleDelay);
        self.timers.cancel(TimerPurpose::PointerPoll);
        self.timers.cancel(TimerPurpose::EffectCleanup);

        self.effects.stop_beam();
        self.ripple_active = false;
        self.indicator.hide();

        self.window.set_interactive(true);
        self.window.set_opacity(1.0);

        self.state = WindowState::Floating;
        self.snap_edge = SnapEdge::None;
        self.has_user_interaction = false;
        self.pending_external_reveal = false;
        self.dock_work_area = None;
    }

    fn animate(&mut self, kind: AnimationKind, target: PanelFrame) {
        self.next_token += 1;
        let token = AnimationToken(self.next_token);

        self.pending_animation = Some((kind, token));
        self.window.animate_frame(target, token);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::super::surfaces::{BeamSurface, ImpactSurface};
    use super::super::timer::TimerScheduler;
    use super::*;

    // ========================================================================
    // Test Doubles
    // ========================================================================

    #[derive(Default)]
    struct FakeWindow {
        frame: Mutex<PanelFrame>,
        set_frames: Mutex<Vec<PanelFrame>>,
        animations: Mutex<Vec<(PanelFrame, AnimationToken)>>,
        interactive: Mutex<Vec<bool>>,
        opacity: Mutex<Vec<f64>>,
        cancels: Mutex<u32>,
        activations: Mutex<u32>,
    }

    impl PanelWindow for Arc<FakeWindow> {
        fn frame(&self) -> PanelFrame { *self.frame.lock() }

        fn set_frame(&self, frame: PanelFrame) {
            *self.frame.lock() = frame;
            self.set_frames.lock().push(frame);
        }

        fn animate_frame(&self, target: PanelFrame, token: AnimationToken) {
            // The fake lands instantly; completion is posted by the test
            *self.frame.lock() = target;
            self.animations.lock().push((target, token));
        }

        fn cancel_animation(&self) { *self.cancels.lock() += 1; }

        fn set_interactive(&self, interactive: bool) { self.interactive.lock().push(interactive); }

        fn set_opacity(&self, opacity: f64) { self.opacity.lock().push(opacity); }

        fn order_front_and_activate(&self) { *self.activations.lock() += 1; }
    }

    #[derive(Default)]
    struct FakeScreens {
        work: Mutex<Option<WorkArea>>,
    }

    impl ScreenProvider for Arc<FakeScreens> {
        fn work_area_for(&self, _frame: &PanelFrame) -> Option<WorkArea> { *self.work.lock() }

        fn primary_work_area(&self) -> Option<WorkArea> { *self.work.lock() }
    }

    #[derive(Default)]
    struct FakePointer {
        location: Mutex<PanelPoint>,
    }

    impl PointerSource for Arc<FakePointer> {
        fn pointer_location(&self) -> PanelPoint { *self.location.lock() }
    }

    #[derive(Default)]
    struct FakeMonitors {
        log: Mutex<Vec<&'static str>>,
    }

    impl InputMonitors for Arc<FakeMonitors> {
        fn install(&self) { self.log.lock().push("install"); }

        fn remove(&self) { self.log.lock().push("remove"); }

        fn begin_drag_end_watch(&self) { self.log.lock().push("begin_watch"); }

        fn end_drag_end_watch(&self) { self.log.lock().push("end_watch"); }
    }

    #[derive(Default)]
    struct MemorySettings {
        edge: Mutex<Option<PanelEdge>>,
        color: Mutex<AccentColor>,
    }

    impl SettingsStore for Arc<MemorySettings> {
        fn preferred_edge(&self) -> PanelEdge { self.edge.lock().unwrap_or_default() }

        fn set_preferred_edge(&self, edge: PanelEdge) { *self.edge.lock() = Some(edge); }

        fn accent_color(&self) -> AccentColor { self.color.lock().clone() }

        fn set_accent_color(&self, color: AccentColor) { *self.color.lock() = color; }
    }

    #[derive(Default)]
    struct FakeIndicator {
        calls: Mutex<Vec<String>>,
    }

    impl IndicatorSurface for Arc<FakeIndicator> {
        fn show(&self, edge: SnapEdge, _strip: PanelFrame, _color: &AccentColor) {
            self.calls.lock().push(format!("show:{edge:?}"));
        }

        fn hide(&self) { self.calls.lock().push("hide".into()); }

        fn set_intensity(&self, boosted: bool) {
            self.calls.lock().push(format!("intensity:{boosted}"));
        }
    }

    #[derive(Default)]
    struct FakeBeam {
        calls: Mutex<Vec<&'static str>>,
    }

    impl BeamSurface for Arc<FakeBeam> {
        fn start(&self, _edge: SnapEdge, _strip: PanelFrame, _color: &AccentColor) {
            self.calls.lock().push("start");
        }

        fn stop(&self) { self.calls.lock().push("stop"); }
    }

    #[derive(Default)]
    struct FakeImpact {
        plays: Mutex<Vec<(SnapEdge, PanelPoint)>>,
    }

    impl ImpactSurface for Arc<FakeImpact> {
        fn play(&self, edge: SnapEdge, at: PanelPoint, _color: &AccentColor) {
            self.plays.lock().push((edge, at));
        }
    }

    #[derive(Default)]
    struct FakeScheduler {
        scheduled: Mutex<Vec<(TimerPurpose, u64)>>,
    }

    impl FakeScheduler {
        fn last_generation(&self, purpose: TimerPurpose) -> u64 {
            self.scheduled
                .lock()
                .iter()
                .rev()
                .find(|(p, _)| *p == purpose)
                .map_or(0, |(_, generation)| *generation)
        }

        fn count(&self, purpose: TimerPurpose) -> usize {
            self.scheduled.lock().iter().filter(|(p, _)| *p == purpose).count()
        }
    }

    impl TimerScheduler for Arc<FakeScheduler> {
        fn schedule_once(&self, purpose: TimerPurpose, generation: u64, _delay: Duration) {
            self.scheduled.lock().push((purpose, generation));
        }

        fn schedule_repeating(&self, purpose: TimerPurpose, generation: u64, _interval: Duration) {
            self.scheduled.lock().push((purpose, generation));
        }

        fn cancel(&self, _purpose: TimerPurpose) {}
    }

    // ========================================================================
    // Harness
    // ========================================================================

    struct Harness {
        controller: DockingController,
        window: Arc<FakeWindow>,
        screens: Arc<FakeScreens>,
        pointer: Arc<FakePointer>,
        monitors: Arc<FakeMonitors>,
        settings: Arc<MemorySettings>,
        indicator: Arc<FakeIndicator>,
        beam: Arc<FakeBeam>,
        impact: Arc<FakeImpact>,
        scheduler: Arc<FakeScheduler>,
    }

    const WORK: WorkArea = WorkArea::new(0, 25, 800, 575);

    impl Harness {
        fn new() -> Self {
            let window = Arc::new(FakeWindow::default());
            *window.frame.lock() = PanelFrame::new(100, 100, 400, 500);

            let screens = Arc::new(FakeScreens::default());
            *screens.work.lock() = Some(WORK);

            let pointer = Arc::new(FakePointer::default());
            let monitors = Arc::new(FakeMonitors::default());
            let settings = Arc::new(MemorySettings::default());
            let indicator = Arc::new(FakeIndicator::default());
            let beam = Arc::new(FakeBeam::default());
            let impact = Arc::new(FakeImpact::default());
            let scheduler = Arc::new(FakeScheduler::default());

            let deps = DockingDeps {
                window: Box::new(Arc::clone(&window)),
                screens: Box::new(Arc::clone(&screens)),
                pointer: Box::new(Arc::clone(&pointer)),
                monitors: Box::new(Arc::clone(&monitors)),
                settings: Arc::new(Arc::clone(&settings)),
                indicator: Box::new(Arc::clone(&indicator)),
                effects: EffectRouter::new(
                    Box::new(Arc::clone(&beam)),
                    Box::new(Arc::clone(&impact)),
                ),
                timers: Timers::new(Arc::new(Arc::clone(&scheduler))),
            };

            let controller = DockingController::new(deps, &LedgeConfig::default());

            Self {
                controller,
                window,
                screens,
                pointer,
                monitors,
                settings,
                indicator,
                beam,
                impact,
                scheduler,
            }
        }

        fn drag_to(&mut self, x: i32, y: i32) {
            let mut frame = *self.window.frame.lock();
            frame.x = x;
            frame.y = y;
            *self.window.frame.lock() = frame;
            self.controller.handle_event(DockEvent::WindowMoved { frame });
        }

        fn release(&mut self) {
            let frame = *self.window.frame.lock();
            self.controller
                .handle_event(DockEvent::GlobalPointerUp { location: PanelPoint::new(frame.x, frame.y) });
        }

        fn complete_animation(&mut self) {
            let token = self.window.animations.lock().last().map(|(_, token)| *token);
            if let Some(token) = token {
                self.controller.handle_event(DockEvent::AnimationCompleted { token });
            }
        }

        fn fire_timer(&mut self, purpose: TimerPurpose) {
            let generation = self.scheduler.last_generation(purpose);
            self.controller.handle_event(DockEvent::TimerFired { purpose, generation });
        }

        /// Drags to within the snap threshold, releases, completes the snap
        /// alignment, fires the settle timer and completes the collapse.
        fn dock_right(&mut self) {
            self.drag_to(395, 100);
            self.release();
            self.complete_animation();
            self.fire_timer(TimerPurpose::SettleDelay);
            self.complete_animation();
        }

        /// Docks right and expands via the indicator, completing the
        /// expand animation.
        fn expand_docked(&mut self) {
            self.dock_right();
            self.controller.handle_event(DockEvent::IndicatorPointerEntered);
            self.complete_animation();
        }
    }

    // ========================================================================
    // Snap Detection Flow
    // ========================================================================

    #[test]
    fn test_release_within_threshold_snaps_then_collapses() {
        let mut harness = Harness::new();

        // Right window edge at 795, 5px from the 800px boundary
        harness.drag_to(395, 100);
        harness.release();

        assert_eq!(harness.controller.state(), WindowState::Snapped);
        assert_eq!(harness.controller.snap_edge(), SnapEdge::Right);
        assert_eq!(
            harness.window.animations.lock().last().map(|(frame, _)| *frame),
            Some(PanelFrame::new(400, 100, 400, 500))
        );

        harness.complete_animation();
        assert_eq!(harness.scheduler.count(TimerPurpose::SettleDelay), 1);

        harness.fire_timer(TimerPurpose::SettleDelay);
        assert_eq!(harness.controller.state(), WindowState::Collapsed);

        let (target, _) = *harness.window.animations.lock().last().unwrap();
        assert!(target.x >= 800, "collapsed frame must clear the work area, got x={}", target.x);
        assert_eq!(target.x, 850);
    }

    #[test]
    fn test_overshoot_collapses_without_alignment_phase() {
        let mut harness = Harness::new();

        // Right window edge at 830, past the boundary
        harness.drag_to(430, 100);
        harness.release();

        assert_eq!(harness.controller.state(), WindowState::Collapsed);
        assert_eq!(harness.scheduler.count(TimerPurpose::SettleDelay), 0);

        let (target, _) = *harness.window.animations.lock().last().unwrap();
        assert_eq!(target.x, 850);
    }

    #[test]
    fn test_release_far_from_edges_stays_floating() {
        let mut harness = Harness::new();

        harness.drag_to(200, 100);
        harness.release();

        assert_eq!(harness.controller.state(), WindowState::Floating);
        assert_eq!(harness.controller.snap_edge(), SnapEdge::None);
        assert!(harness.window.animations.lock().is_empty());
    }

    #[test]
    fn test_snap_persists_preferred_edge() {
        let mut harness = Harness::new();

        harness.drag_to(12, 100);
        harness.release();

        assert_eq!(*harness.settings.edge.lock(), Some(PanelEdge::Left));
    }

    // ========================================================================
    // Collapse Semantics
    // ========================================================================

    #[test]
    fn test_collapse_completion_disables_input_and_plays_impact() {
        let mut harness = Harness::new();
        harness.dock_right();

        assert_eq!(harness.window.interactive.lock().as_slice(), &[false]);
        assert_eq!(harness.window.opacity.lock().as_slice(), &[0.0]);
        assert_eq!(harness.impact.plays.lock().as_slice(), &[(
            SnapEdge::Right,
            PanelPoint::new(800, 350),
        )]);
        assert!(harness.indicator.calls.lock().contains(&"show:Right".to_string()));
    }

    #[test]
    fn test_collapse_is_idempotent() {
        let mut harness = Harness::new();
        harness.dock_right();

        let animations_before = harness.window.animations.lock().len();
        harness.controller.collapse();

        assert_eq!(harness.window.animations.lock().len(), animations_before);
        assert_eq!(harness.controller.state(), WindowState::Collapsed);
    }

    #[test]
    fn test_collapse_while_floating_is_a_no_op() {
        let mut harness = Harness::new();

        harness.controller.collapse();

        assert_eq!(harness.controller.state(), WindowState::Floating);
        assert!(harness.window.animations.lock().is_empty());
    }

    #[test]
    fn test_stale_settle_fire_is_rejected() {
        let mut harness = Harness::new();

        harness.drag_to(395, 100);
        harness.release();
        harness.complete_animation();

        let stale = harness.scheduler.last_generation(TimerPurpose::SettleDelay);

        // Drag away before the settle delay elapses
        harness.drag_to(300, 100);
        assert_eq!(harness.controller.state(), WindowState::Floating);

        harness.controller.handle_event(DockEvent::TimerFired {
            purpose: TimerPurpose::SettleDelay,
            generation: stale,
        });

        assert_eq!(harness.controller.state(), WindowState::Floating);
    }

    #[test]
    fn test_stale_animation_completion_is_rejected() {
        let mut harness = Harness::new();

        harness.drag_to(395, 100);
        harness.release();
        let stale = harness.window.animations.lock().last().map(|(_, token)| *token).unwrap();

        // Drag cancels the snap; the old completion must not arm the settle timer
        harness.drag_to(300, 100);
        harness.controller.handle_event(DockEvent::AnimationCompleted { token: stale });

        assert_eq!(harness.scheduler.count(TimerPurpose::SettleDelay), 0);
    }

    // ========================================================================
    // Drag Overrides Docking
    // ========================================================================

    #[test]
    fn test_drag_releases_dock_from_every_docked_state() {
        // Snapped
        let mut harness = Harness::new();
        harness.drag_to(395, 100);
        harness.release();
        harness.drag_to(300, 100);
        assert_eq!(harness.controller.state(), WindowState::Floating);
        assert_eq!(harness.controller.snap_edge(), SnapEdge::None);

        // Collapsed (moved programmatically from outside, e.g. by scripting)
        let mut harness = Harness::new();
        harness.dock_right();
        harness.drag_to(300, 100);
        assert_eq!(harness.controller.state(), WindowState::Floating);
        assert_eq!(harness.controller.snap_edge(), SnapEdge::None);

        // Expanded
        let mut harness = Harness::new();
        harness.expand_docked();
        harness.drag_to(300, 100);
        assert_eq!(harness.controller.state(), WindowState::Floating);

        // Locked
        let mut harness = Harness::new();
        harness.expand_docked();
        harness.controller.handle_event(DockEvent::LocalKeyDown);
        assert_eq!(harness.controller.state(), WindowState::Locked);
        harness.drag_to(300, 100);
        assert_eq!(harness.controller.state(), WindowState::Floating);
    }

    #[test]
    fn test_release_dock_restores_input_and_hides_indicator() {
        let mut harness = Harness::new();
        harness.dock_right();

        harness.drag_to(300, 100);

        assert_eq!(harness.window.interactive.lock().last(), Some(&true));
        assert_eq!(harness.window.opacity.lock().last(), Some(&1.0));
        assert_eq!(harness.indicator.calls.lock().last(), Some(&"hide".to_string()));
        assert!(*harness.window.cancels.lock() >= 1);
    }

    #[test]
    fn test_drag_begins_and_ends_pointer_watch() {
        let mut harness = Harness::new();

        harness.drag_to(200, 100);
        harness.drag_to(250, 100);
        harness.release();

        assert_eq!(harness.monitors.log.lock().as_slice(), &["begin_watch", "end_watch"]);
    }

    // ========================================================================
    // Expand and Auto-Collapse
    // ========================================================================

    #[test]
    fn test_indicator_enter_expands_collapsed_panel() {
        let mut harness = Harness::new();
        harness.dock_right();

        harness.controller.handle_event(DockEvent::IndicatorPointerEntered);

        assert_eq!(harness.controller.state(), WindowState::Expanded);
        // Interactive again before the animation lands
        assert_eq!(harness.window.interactive.lock().last(), Some(&true));
        assert_eq!(harness.window.opacity.lock().last(), Some(&1.0));
        assert_eq!(
            harness.window.animations.lock().last().map(|(frame, _)| *frame),
            Some(PanelFrame::new(400, 100, 400, 500))
        );

        harness.complete_animation();
        assert_eq!(harness.beam.calls.lock().as_slice(), &["start"]);
        assert_eq!(harness.scheduler.count(TimerPurpose::PointerPoll), 1);
    }

    #[test]
    fn test_pointer_leaving_buffer_collapses_expanded_panel() {
        let mut harness = Harness::new();
        harness.expand_docked();

        // Inside the 80px buffer: stays expanded
        *harness.pointer.location.lock() = PanelPoint::new(350, 300);
        harness.fire_timer(TimerPurpose::PointerPoll);
        assert_eq!(harness.controller.state(), WindowState::Expanded);

        // Well outside: collapses
        *harness.pointer.location.lock() = PanelPoint::new(100, 300);
        harness.fire_timer(TimerPurpose::PointerPoll);
        assert_eq!(harness.controller.state(), WindowState::Collapsed);
        assert_eq!(harness.beam.calls.lock().last(), Some(&"stop"));
    }

    #[test]
    fn test_interaction_locks_panel_against_auto_collapse() {
        let mut harness = Harness::new();
        harness.expand_docked();

        let poll = harness.scheduler.last_generation(TimerPurpose::PointerPoll);
        harness.controller.handle_event(DockEvent::LocalPointerDown);

        assert_eq!(harness.controller.state(), WindowState::Locked);

        // The poll was cancelled; its fires are stale now
        *harness.pointer.location.lock() = PanelPoint::new(100, 300);
        harness.controller.handle_event(DockEvent::TimerFired {
            purpose: TimerPurpose::PointerPoll,
            generation: poll,
        });
        assert_eq!(harness.controller.state(), WindowState::Locked);
    }

    #[test]
    fn test_outside_click_dismisses_locked_panel() {
        let mut harness = Harness::new();
        harness.expand_docked();
        harness.controller.handle_event(DockEvent::LocalKeyDown);

        harness
            .controller
            .handle_event(DockEvent::GlobalPointerDown { location: PanelPoint::new(50, 50) });

        assert_eq!(harness.controller.state(), WindowState::Collapsed);
    }

    #[test]
    fn test_inside_click_counts_as_interaction() {
        let mut harness = Harness::new();
        harness.expand_docked();

        harness
            .controller
            .handle_event(DockEvent::GlobalPointerDown { location: PanelPoint::new(500, 300) });

        assert_eq!(harness.controller.state(), WindowState::Locked);
    }

    // ========================================================================
    // External Reveal
    // ========================================================================

    #[test]
    fn test_force_expand_collapses_on_outside_click() {
        let mut harness = Harness::new();
        harness.dock_right();

        harness.controller.force_expand();
        harness.complete_animation();
        assert_eq!(harness.controller.state(), WindowState::Expanded);

        harness
            .controller
            .handle_event(DockEvent::GlobalPointerDown { location: PanelPoint::new(50, 50) });

        assert_eq!(harness.controller.state(), WindowState::Collapsed);
        assert!(!harness.controller.pending_external_reveal);
        assert!(!harness.controller.has_user_interaction);
    }

    #[test]
    fn test_external_reveal_survives_pointer_poll() {
        let mut harness = Harness::new();
        harness.dock_right();

        harness.controller.force_expand();
        harness.complete_animation();

        // Pointer well outside the exit buffer; the reveal must still hold
        // until an outside click dismisses it
        *harness.pointer.location.lock() = PanelPoint::new(100, 300);
        harness.fire_timer(TimerPurpose::PointerPoll);

        assert_eq!(harness.controller.state(), WindowState::Expanded);
        assert!(harness.controller.pending_external_reveal);
    }

    #[test]
    fn test_interaction_clears_external_reveal_flag() {
        let mut harness = Harness::new();
        harness.dock_right();

        harness.controller.force_expand();
        harness.complete_animation();
        harness.controller.handle_event(DockEvent::LocalKeyDown);

        assert_eq!(harness.controller.state(), WindowState::Locked);
        assert!(!harness.controller.pending_external_reveal);
        assert!(harness.controller.has_user_interaction);
    }

    #[test]
    fn test_force_expand_is_ignored_unless_collapsed() {
        let mut harness = Harness::new();

        harness.controller.force_expand();

        assert_eq!(harness.controller.state(), WindowState::Floating);
        assert!(!harness.controller.pending_external_reveal);
    }

    // ========================================================================
    // Size Restoration
    // ========================================================================

    #[test]
    fn test_externally_imposed_resize_is_undone() {
        let mut harness = Harness::new();

        // Initial user size is 400x500; the OS doubles the width
        let imposed = PanelFrame::new(100, 100, 800, 500);
        *harness.window.frame.lock() = imposed;
        harness.controller.handle_event(DockEvent::WindowMoved { frame: imposed });

        // Restored at the previous top-left, no drag started
        assert_eq!(
            harness.window.set_frames.lock().as_slice(),
            &[PanelFrame::new(100, 100, 400, 500)]
        );
        assert_eq!(harness.controller.state(), WindowState::Floating);
        assert!(harness.monitors.log.lock().is_empty());
    }

    #[test]
    fn test_resize_ended_updates_user_size() {
        let mut harness = Harness::new();

        let resized = PanelFrame::new(100, 100, 500, 400);
        *harness.window.frame.lock() = resized;
        harness.controller.handle_event(DockEvent::ResizeEnded { frame: resized });

        // A move at the new size no longer triggers a restore
        harness.drag_to(150, 100);
        assert!(harness.window.set_frames.lock().is_empty());
        assert!(harness.controller.is_dragging);
    }

    #[test]
    fn test_near_fullscreen_size_is_not_remembered() {
        let mut harness = Harness::new();

        let fullscreen = PanelFrame::new(0, 25, 790, 560);
        harness.controller.handle_event(DockEvent::ResizeEnded { frame: fullscreen });

        // The remembered size is still 400x500, so the oversize gets undone
        *harness.window.frame.lock() = fullscreen;
        harness.controller.handle_event(DockEvent::WindowMoved { frame: fullscreen });

        assert_eq!(
            harness.window.set_frames.lock().last(),
            Some(&PanelFrame::new(0, 25, 400, 500))
        );
    }

    // ========================================================================
    // Summon and Undock
    // ========================================================================

    #[test]
    fn test_deactivate_shows_summon_indicator() {
        let mut harness = Harness::new();

        harness.controller.handle_event(DockEvent::AppDeactivated);
        assert_eq!(harness.indicator.calls.lock().as_slice(), &["show:Right".to_string()]);

        harness.controller.handle_event(DockEvent::IndicatorPointerEntered);
        assert_eq!(*harness.window.activations.lock(), 1);
        assert_eq!(harness.indicator.calls.lock().last(), Some(&"hide".to_string()));
    }

    #[test]
    fn test_activate_hides_summon_indicator() {
        let mut harness = Harness::new();

        harness.controller.handle_event(DockEvent::AppDeactivated);
        harness.controller.handle_event(DockEvent::AppActivated);

        assert_eq!(harness.indicator.calls.lock().last(), Some(&"hide".to_string()));
    }

    #[test]
    fn test_undock_restores_remembered_floating_frame() {
        let mut harness = Harness::new();
        harness.dock_right();

        harness.controller.undock();

        assert_eq!(harness.controller.state(), WindowState::Floating);
        assert_eq!(harness.controller.snap_edge(), SnapEdge::None);
        assert_eq!(
            harness.window.animations.lock().last().map(|(frame, _)| *frame),
            Some(PanelFrame::new(395, 100, 400, 500))
        );
    }

    #[test]
    fn test_snap_to_preferred_edge_docks_directly() {
        let mut harness = Harness::new();
        harness.settings.set_preferred_edge(PanelEdge::Left);

        harness.controller.snap_to_preferred_edge();

        assert_eq!(harness.controller.state(), WindowState::Collapsed);
        assert_eq!(harness.controller.snap_edge(), SnapEdge::Left);

        let (target, _) = *harness.window.animations.lock().last().unwrap();
        assert_eq!(target.x, -450);
    }

    // ========================================================================
    // Ripple and Color
    // ========================================================================

    #[test]
    fn test_ripple_preview_cleans_itself_up() {
        let mut harness = Harness::new();
        harness.dock_right();

        harness.controller.start_ripple(&AccentColor::default(), true);
        assert_eq!(harness.beam.calls.lock().last(), Some(&"start"));
        assert_eq!(harness.scheduler.count(TimerPurpose::EffectCleanup), 1);

        harness.fire_timer(TimerPurpose::EffectCleanup);
        assert_eq!(harness.beam.calls.lock().last(), Some(&"stop"));
    }

    #[test]
    fn test_ripple_requires_collapsed_state() {
        let mut harness = Harness::new();

        harness.controller.start_ripple(&AccentColor::default(), true);

        assert!(harness.beam.calls.lock().is_empty());
    }

    #[test]
    fn test_color_change_refreshes_collapsed_indicator() {
        let mut harness = Harness::new();
        harness.dock_right();

        let shows_before =
            harness.indicator.calls.lock().iter().filter(|call| *call == "show:Right").count();

        harness.controller.handle_event(DockEvent::ColorPreferenceChanged);

        let shows_after =
            harness.indicator.calls.lock().iter().filter(|call| *call == "show:Right").count();
        assert_eq!(shows_after, shows_before + 1);
    }

    // ========================================================================
    // Missing Screen Edge Cases
    // ========================================================================

    #[test]
    fn test_release_without_screen_stays_floating() {
        let mut harness = Harness::new();
        *harness.screens.work.lock() = None;

        harness.drag_to(395, 100);
        harness.release();

        assert_eq!(harness.controller.state(), WindowState::Floating);
        assert!(harness.window.animations.lock().is_empty());
    }
}
