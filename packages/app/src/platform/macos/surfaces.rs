//! Effect surfaces backed by borderless overlay windows.
//!
//! The indicator, beam and impact surfaces are all click-through windows at
//! status level. None of them accept input; the indicator's hover detection
//! is a pointer poll against its strip frame.

use std::ptr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use ledge_shared::AccentColor;
use objc::runtime::{Class, Object};
use objc::{msg_send, sel, sel_impl};
use parking_lot::Mutex;

use super::monitors::pointer_location;
use super::{SendSyncPtr, main_screen_height, to_cocoa_rect};
use crate::docking::{
    BeamSurface, DockEvent, EventSender, ImpactSurface, IndicatorSurface, PanelFrame, PanelPoint,
    SnapEdge,
};

const BORDERLESS: u64 = 0;
const BACKING_STORE_BUFFERED: u64 = 2;

/// NSStatusWindowLevel; above normal windows and the dock.
const STATUS_WINDOW_LEVEL: i64 = 25;

/// Hover detection margin around the indicator strip.
const HOVER_MARGIN: i32 = 2;

const HOVER_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A click-through colored overlay window.
struct Overlay {
    window: SendSyncPtr,
}

impl Overlay {
    fn create(frame: PanelFrame, color: &AccentColor, alpha: f64) -> Option<Self> {
        let window_class = Class::get("NSWindow")?;
        let rect = to_cocoa_rect(frame, main_screen_height());

        let window: *mut Object = unsafe {
            let window: *mut Object = msg_send![window_class, alloc];
            msg_send![
                window,
                initWithContentRect: rect
                styleMask: BORDERLESS
                backing: BACKING_STORE_BUFFERED
                defer: false
            ]
        };

        if window.is_null() {
            return None;
        }

        let (r, g, b, a) = color.rgba();

        unsafe {
            let _: () = msg_send![window, setReleasedWhenClosed: false];
            let _: () = msg_send![window, setLevel: STATUS_WINDOW_LEVEL];
            let _: () = msg_send![window, setOpaque: false];
            let _: () = msg_send![window, setIgnoresMouseEvents: true];
            let _: () = msg_send![window, setHasShadow: false];

            if let Some(color_class) = Class::get("NSColor") {
                let ns_color: *mut Object = msg_send![
                    color_class,
                    colorWithSRGBRed: f64::from(r) / 255.0
                    green: f64::from(g) / 255.0
                    blue: f64::from(b) / 255.0
                    alpha: f64::from(a) / 255.0
                ];
                let _: () = msg_send![window, setBackgroundColor: ns_color];
            }

            let _: () = msg_send![window, setAlphaValue: alpha];
            let _: () = msg_send![window, orderFrontRegardless];
        }

        Some(Self { window: SendSyncPtr(window) })
    }

    fn set_frame(&self, frame: PanelFrame) {
        let rect = to_cocoa_rect(frame, main_screen_height());
        let _: () = unsafe { msg_send![self.window.0, setFrame: rect display: true] };
    }

    fn set_alpha(&self, alpha: f64) {
        let _: () = unsafe { msg_send![self.window.0, setAlphaValue: alpha] };
    }

    fn close(&self) {
        unsafe {
            let _: () = msg_send![self.window.0, orderOut: ptr::null::<Object>()];
            let _: () = msg_send![self.window.0, close];
        }
    }
}

/// The glowing strip along the docked edge.
pub struct MacIndicatorSurface {
    overlay: Mutex<Option<Overlay>>,
    strip: Arc<Mutex<Option<PanelFrame>>>,
    sender: EventSender,
    poll_started: AtomicBool,
}

impl MacIndicatorSurface {
    /// Creates a hidden indicator.
    #[must_use]
    pub fn new(sender: EventSender) -> Self {
        Self {
            overlay: Mutex::new(None),
            strip: Arc::new(Mutex::new(None)),
            sender,
            poll_started: AtomicBool::new(false),
        }
    }

    fn start_hover_poll(&self) {
        if self.poll_started.swap(true, Ordering::SeqCst) {
            return;
        }

        let strip = Arc::clone(&self.strip);
        let sender = self.sender.clone();

        thread::spawn(move || {
            let mut was_inside = false;

            loop {
                thread::sleep(HOVER_POLL_INTERVAL);

                let inside = strip
                    .lock()
                    .is_some_and(|strip| strip.inflated(HOVER_MARGIN).contains(pointer_location()));

                // Fire once per entry, not on every poll
                if inside && !was_inside {
                    sender.post(DockEvent::IndicatorPointerEntered);
                }

                was_inside = inside;
            }
        });
    }
}

impl IndicatorSurface for MacIndicatorSurface {
    fn show(&self, _edge: SnapEdge, strip: PanelFrame, color: &AccentColor) {
        let mut overlay = self.overlay.lock();

        if let Some(existing) = overlay.take() {
            existing.close();
        }

        *overlay = Overlay::create(strip, color, 0.6);
        drop(overlay);

        *self.strip.lock() = Some(strip);
        self.start_hover_poll();
    }

    fn hide(&self) {
        *self.strip.lock() = None;

        if let Some(overlay) = self.overlay.lock().take() {
            overlay.close();
        }
    }

    fn set_intensity(&self, boosted: bool) {
        if let Some(overlay) = self.overlay.lock().as_ref() {
            overlay.set_alpha(if boosted { 1.0 } else { 0.6 });
        }
    }
}

/// The pulsing glow along the edge strip.
pub struct MacBeamSurface {
    running: Mutex<Option<Arc<AtomicBool>>>,
}

impl MacBeamSurface {
    /// Creates a stopped beam.
    #[must_use]
    pub fn new() -> Self { Self { running: Mutex::new(None) } }
}

impl Default for MacBeamSurface {
    fn default() -> Self { Self::new() }
}

impl BeamSurface for MacBeamSurface {
    fn start(&self, _edge: SnapEdge, strip: PanelFrame, color: &AccentColor) {
        self.stop();

        let Some(overlay) = Overlay::create(strip, color, 0.0) else {
            return;
        };

        let flag = Arc::new(AtomicBool::new(true));
        *self.running.lock() = Some(Arc::clone(&flag));

        // The pulse thread owns the overlay and tears it down on stop
        thread::spawn(move || {
            let mut phase: f64 = 0.0;

            while flag.load(Ordering::Relaxed) {
                overlay.set_alpha(0.55 + 0.35 * phase.sin());
                phase += 0.2;
                thread::sleep(Duration::from_millis(33));
            }

            overlay.close();
        });
    }

    fn stop(&self) {
        if let Some(flag) = self.running.lock().take() {
            flag.store(false, Ordering::Relaxed);
        }
    }
}

const IMPACT_SIZE: u32 = 64;
const IMPACT_FADE_STEPS: u32 = 24;

/// The burst played where a collapse lands.
pub struct MacImpactSurface;

impl ImpactSurface for MacImpactSurface {
    fn play(&self, edge: SnapEdge, at: PanelPoint, color: &AccentColor) {
        // Keep the burst on-screen by growing inward from the edge
        #[allow(clippy::cast_possible_wrap)]
        let x = match edge {
            SnapEdge::Right => at.x - IMPACT_SIZE as i32,
            SnapEdge::Left | SnapEdge::None => at.x,
        };

        #[allow(clippy::cast_possible_wrap)]
        let frame = PanelFrame::new(x, at.y - (IMPACT_SIZE as i32) / 2, IMPACT_SIZE, IMPACT_SIZE);

        let Some(overlay) = Overlay::create(frame, color, 0.9) else {
            return;
        };

        thread::spawn(move || {
            for step in 0..IMPACT_FADE_STEPS {
                let progress = f64::from(step) / f64::from(IMPACT_FADE_STEPS);
                overlay.set_alpha(0.9 * (1.0 - progress));
                thread::sleep(Duration::from_millis(16));
            }

            overlay.close();
        });
    }
}
