//! Frame animation engine.
//!
//! Animations interpolate the full window frame (position and size) from a
//! captured start to a precomputed target. Starting a new animation
//! supersedes the running one; a superseded or cancelled animation never
//! reports completion, so the controller can key its follow-up actions on
//! the [`AnimationToken`] it handed out.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ledge_shared::{AnimationSettings, EasingFunction};
use parking_lot::Mutex;

use super::events::{DockEvent, EventSender};
use super::geometry::PanelFrame;

/// Tick interval for the animation thread (roughly 120fps).
const TICK_INTERVAL: Duration = Duration::from_millis(8);

/// Identity of a started animation. Completion events carry the token so
/// stale completions from superseded animations can be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationToken(pub u64);

/// Applies the configured easing curve to linear progress in `0.0..=1.0`.
#[must_use]
pub fn apply_easing(easing: EasingFunction, t: f32) -> f32 {
    match easing {
        EasingFunction::Linear => t,
        EasingFunction::EaseIn => simple_easing::cubic_in(t),
        EasingFunction::EaseOut => simple_easing::cubic_out(t),
        EasingFunction::EaseInOut => simple_easing::cubic_in_out(t),
        EasingFunction::Spring => simple_easing::back_out(t),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn lerp_i32(from: i32, to: i32, t: f32) -> i32 {
    let value = (to - from) as f32;
    from + (value * t).round() as i32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn lerp_u32(from: u32, to: u32, t: f32) -> u32 {
    lerp_i32(from as i32, to as i32, t).max(0) as u32
}

/// A single in-flight frame interpolation.
#[derive(Debug, Clone)]
pub struct FrameAnimation {
    start_frame: PanelFrame,
    target_frame: PanelFrame,
    started_at: Instant,
    duration: Duration,
    easing: EasingFunction,
}

impl FrameAnimation {
    /// Starts an animation from `start_frame` toward `target_frame`.
    #[must_use]
    pub fn new(start_frame: PanelFrame, target_frame: PanelFrame, settings: &AnimationSettings) -> Self {
        Self {
            start_frame,
            target_frame,
            started_at: Instant::now(),
            duration: Duration::from_millis(u64::from(settings.duration)),
            easing: settings.easing,
        }
    }

    /// Returns the destination frame.
    #[must_use]
    pub const fn target(&self) -> PanelFrame { self.target_frame }

    /// Linear progress in `0.0..=1.0` at the given instant.
    #[must_use]
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }

        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Returns whether the animation has reached its target.
    #[must_use]
    pub fn is_complete(&self, now: Instant) -> bool { self.progress(now) >= 1.0 }

    /// Returns the interpolated frame at the given instant. At completion
    /// this is exactly the target frame, with no rounding drift.
    #[must_use]
    pub fn frame_at(&self, now: Instant) -> PanelFrame {
        let t = apply_easing(self.easing, self.progress(now));

        if self.progress(now) >= 1.0 {
            return self.target_frame;
        }

        PanelFrame {
            x: lerp_i32(self.start_frame.x, self.target_frame.x, t),
            y: lerp_i32(self.start_frame.y, self.target_frame.y, t),
            width: lerp_u32(self.start_frame.width, self.target_frame.width, t),
            height: lerp_u32(self.start_frame.height, self.target_frame.height, t),
        }
    }
}

struct ActiveAnimation {
    animation: FrameAnimation,
    token: AnimationToken,
}

/// Runs frame animations on a background thread.
///
/// The driver applies each interpolated frame through the `apply` callback
/// and posts [`DockEvent::AnimationCompleted`] when an animation lands.
pub struct AnimationDriver {
    active: Arc<Mutex<Option<ActiveAnimation>>>,
    apply: Arc<dyn Fn(PanelFrame) + Send + Sync>,
    sender: EventSender,
}

impl AnimationDriver {
    /// Creates a driver that moves the window through `apply`.
    #[must_use]
    pub fn new(sender: EventSender, apply: Arc<dyn Fn(PanelFrame) + Send + Sync>) -> Self {
        Self { active: Arc::new(Mutex::new(None)), apply, sender }
    }

    /// Starts an animation, superseding any running one. The superseded
    /// animation stops where it is and never reports completion.
    ///
    /// A zero duration applies the target immediately and completes
    /// synchronously.
    pub fn animate(
        &self,
        start_frame: PanelFrame,
        target_frame: PanelFrame,
        settings: &AnimationSettings,
        token: AnimationToken,
    ) {
        if settings.duration == 0 {
            *self.active.lock() = None;
            (self.apply)(target_frame);
            self.sender.post(DockEvent::AnimationCompleted { token });
            return;
        }

        let animation = FrameAnimation::new(start_frame, target_frame, settings);
        *self.active.lock() = Some(ActiveAnimation { animation, token });

        let active = Arc::clone(&self.active);
        let apply = Arc::clone(&self.apply);
        let sender = self.sender.clone();

        thread::spawn(move || {
            loop {
                thread::sleep(TICK_INTERVAL);

                let now = Instant::now();
                let step = {
                    let guard = active.lock();
                    match guard.as_ref() {
                        // Superseded or cancelled; exit without completing
                        Some(current) if current.token == token => {
                            Some((current.animation.frame_at(now), current.animation.is_complete(now)))
                        }
                        _ => None,
                    }
                };

                let Some((frame, complete)) = step else {
                    break;
                };

                apply(frame);

                if complete {
                    let mut guard = active.lock();
                    if guard.as_ref().is_some_and(|current| current.token == token) {
                        *guard = None;
                    }
                    drop(guard);

                    sender.post(DockEvent::AnimationCompleted { token });
                    break;
                }
            }
        });
    }

    /// Stops the running animation where it is, without completion.
    pub fn cancel(&self) { *self.active.lock() = None; }

    /// Returns whether an animation is currently running.
    #[must_use]
    pub fn is_animating(&self) -> bool { self.active.lock().is_some() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(duration: u32) -> AnimationSettings {
        AnimationSettings { duration, easing: EasingFunction::Linear }
    }

    fn drain_completions(sender: &EventSender) -> Vec<AnimationToken> {
        sender
            .queue()
            .take_all()
            .into_iter()
            .filter_map(|event| match event {
                DockEvent::AnimationCompleted { token } => Some(token),
                _ => None,
            })
            .collect()
    }

    // ========================================================================
    // Easing Tests
    // ========================================================================

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            EasingFunction::Linear,
            EasingFunction::EaseIn,
            EasingFunction::EaseOut,
            EasingFunction::EaseInOut,
            EasingFunction::Spring,
        ] {
            assert!(apply_easing(easing, 0.0).abs() < 1e-5);
            assert!((apply_easing(easing, 1.0) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_lerp_endpoints_are_exact() {
        assert_eq!(lerp_i32(100, 850, 0.0), 100);
        assert_eq!(lerp_i32(100, 850, 1.0), 850);
        assert_eq!(lerp_u32(400, 800, 1.0), 800);
    }

    // ========================================================================
    // Frame Animation Tests
    // ========================================================================

    #[test]
    fn test_frame_animation_interpolates() {
        let start = PanelFrame::new(0, 0, 400, 500);
        let target = PanelFrame::new(100, 50, 400, 500);
        let animation = FrameAnimation::new(start, target, &settings(100));

        let midpoint = animation.started_at + Duration::from_millis(50);
        let frame = animation.frame_at(midpoint);
        assert_eq!(frame.x, 50);
        assert_eq!(frame.y, 25);
    }

    #[test]
    fn test_frame_animation_lands_exactly_on_target() {
        let start = PanelFrame::new(3, 7, 401, 503);
        let target = PanelFrame::new(850, 100, 400, 500);
        let animation = FrameAnimation::new(start, target, &settings(50));

        let after = animation.started_at + Duration::from_millis(200);
        assert!(animation.is_complete(after));
        assert_eq!(animation.frame_at(after), target);
    }

    #[test]
    fn test_zero_duration_is_immediately_complete() {
        let start = PanelFrame::new(0, 0, 400, 500);
        let target = PanelFrame::new(850, 100, 400, 500);
        let animation = FrameAnimation::new(start, target, &settings(0));

        assert!(animation.is_complete(Instant::now()));
        assert_eq!(animation.frame_at(Instant::now()), target);
    }

    // ========================================================================
    // Driver Tests
    // ========================================================================

    #[test]
    fn test_driver_applies_target_and_completes() {
        let sender = EventSender::new();
        let applied = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&applied);
        let driver = AnimationDriver::new(
            sender.clone(),
            Arc::new(move |frame| sink.lock().push(frame)),
        );

        let target = PanelFrame::new(850, 100, 400, 500);
        driver.animate(PanelFrame::new(400, 100, 400, 500), target, &settings(30), AnimationToken(1));

        thread::sleep(Duration::from_millis(150));

        assert_eq!(applied.lock().last(), Some(&target));
        assert_eq!(drain_completions(&sender), vec![AnimationToken(1)]);
        assert!(!driver.is_animating());
    }

    #[test]
    fn test_zero_duration_applies_synchronously() {
        let sender = EventSender::new();
        let applied = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&applied);
        let driver = AnimationDriver::new(
            sender.clone(),
            Arc::new(move |frame| sink.lock().push(frame)),
        );

        let target = PanelFrame::new(0, 25, 400, 500);
        driver.animate(PanelFrame::new(30, 25, 400, 500), target, &settings(0), AnimationToken(9));

        assert_eq!(applied.lock().as_slice(), &[target]);
        assert_eq!(drain_completions(&sender), vec![AnimationToken(9)]);
    }

    #[test]
    fn test_superseded_animation_never_completes() {
        let sender = EventSender::new();
        let driver = AnimationDriver::new(sender.clone(), Arc::new(|_| {}));

        let start = PanelFrame::new(0, 0, 400, 500);
        driver.animate(start, PanelFrame::new(850, 0, 400, 500), &settings(80), AnimationToken(1));
        driver.animate(start, PanelFrame::new(400, 0, 400, 500), &settings(30), AnimationToken(2));

        thread::sleep(Duration::from_millis(200));

        assert_eq!(drain_completions(&sender), vec![AnimationToken(2)]);
    }

    #[test]
    fn test_cancel_suppresses_completion() {
        let sender = EventSender::new();
        let driver = AnimationDriver::new(sender.clone(), Arc::new(|_| {}));

        let start = PanelFrame::new(0, 0, 400, 500);
        driver.animate(start, PanelFrame::new(850, 0, 400, 500), &settings(50), AnimationToken(1));
        driver.cancel();

        thread::sleep(Duration::from_millis(150));

        assert!(drain_completions(&sender).is_empty());
        assert!(!driver.is_animating());
    }
}
