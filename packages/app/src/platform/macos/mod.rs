//! macOS integration.
//!
//! Ties the platform pieces together: the panel `NSWindow`, the notification
//! observer, the global event tap, the effect overlays and the screen cache.
//! The docking controller itself runs on a dedicated thread and drains the
//! event queue; the main thread belongs to AppKit.

pub mod monitors;
pub mod observer;
pub mod screens;
pub mod surfaces;
pub mod window;

use std::ffi::CString;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use objc::runtime::{Class, Object};
use objc::{msg_send, sel, sel_impl};
use objc2::MainThreadMarker;

use crate::docking::InputMonitors as _;
use crate::docking::{
    DockingController, DockingDeps, EffectRouter, EventSender, PanelFrame, ScreenProvider,
    SettingsStore, ThreadScheduler, Timers, WorkArea,
};
use crate::settings::FileSettingsStore;

/// Interval at which the controller thread drains the event queue.
const PUMP_INTERVAL: Duration = Duration::from_millis(10);

const DEFAULT_PANEL_WIDTH: u32 = 400;
const DEFAULT_PANEL_HEIGHT: u32 = 520;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct NSPoint {
    pub x: f64,
    pub y: f64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct NSSize {
    pub width: f64,
    pub height: f64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct NSRect {
    pub origin: NSPoint,
    pub size: NSSize,
}

/// Wrapper for a raw ObjC pointer to be Send + Sync.
pub(crate) struct SendSyncPtr(pub *mut Object);
unsafe impl Send for SendSyncPtr {}
unsafe impl Sync for SendSyncPtr {}

/// Creates an autoreleased `NSString`. Returns null on interior NUL bytes.
pub(crate) fn ns_string(value: &str) -> *mut Object {
    let Ok(c_string) = CString::new(value) else {
        return std::ptr::null_mut();
    };

    let Some(string_class) = Class::get("NSString") else {
        return std::ptr::null_mut();
    };

    unsafe { msg_send![string_class, stringWithUTF8String: c_string.as_ptr()] }
}

/// Height of the main screen's full frame, used for coordinate flips.
pub(crate) fn main_screen_height() -> f64 {
    unsafe {
        let Some(screen_class) = Class::get("NSScreen") else {
            return 0.0;
        };

        let main_screen: *mut Object = msg_send![screen_class, mainScreen];
        if main_screen.is_null() {
            return 0.0;
        }

        let frame: NSRect = msg_send![main_screen, frame];
        frame.size.height
    }
}

/// Converts a top-left (Quartz) frame into a bottom-left (Cocoa) rect.
pub(crate) fn to_cocoa_rect(frame: PanelFrame, main_height: f64) -> NSRect {
    NSRect {
        origin: NSPoint {
            x: f64::from(frame.x),
            y: main_height - f64::from(frame.y) - f64::from(frame.height),
        },
        size: NSSize { width: f64::from(frame.width), height: f64::from(frame.height) },
    }
}

/// Converts a bottom-left (Cocoa) rect into a top-left (Quartz) frame.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn to_panel_frame(rect: NSRect, main_height: f64) -> PanelFrame {
    PanelFrame::new(
        rect.origin.x as i32,
        (main_height - rect.origin.y - rect.size.height) as i32,
        rect.size.width as u32,
        rect.size.height as u32,
    )
}

#[allow(clippy::cast_possible_wrap)]
fn initial_frame(work: Option<WorkArea>) -> PanelFrame {
    work.map_or_else(
        || PanelFrame::new(200, 200, DEFAULT_PANEL_WIDTH, DEFAULT_PANEL_HEIGHT),
        |work| {
            let width = DEFAULT_PANEL_WIDTH.min(work.width);
            let height = DEFAULT_PANEL_HEIGHT.min(work.height);

            PanelFrame::new(
                work.x + (work.width.saturating_sub(width) / 2) as i32,
                work.y + (work.height.saturating_sub(height) / 2) as i32,
                width,
                height,
            )
        },
    )
}

/// Starts the panel and runs the AppKit main loop. Never returns.
pub fn run() {
    let Some(mtm) = MainThreadMarker::new() else {
        eprintln!("ledge: must be started on the main thread");
        return;
    };

    crate::config::init();
    let config = crate::config::get_config();

    unsafe {
        if let Some(app_class) = Class::get("NSApplication") {
            let app: *mut Object = msg_send![app_class, sharedApplication];
            // NSApplicationActivationPolicyRegular
            let _: bool = msg_send![app, setActivationPolicy: 0i64];
        }
    }

    let sender = EventSender::new();
    let settings: Arc<dyn SettingsStore> = Arc::new(FileSettingsStore::new(&config));

    let screens = Arc::new(screens::MacScreenProvider::new());
    screens.refresh(mtm);

    let initial = initial_frame(screens.primary_work_area());
    let Some(panel) =
        window::MacPanelWindow::create(initial, config.animations.settings(), &sender)
    else {
        eprintln!("ledge: failed to create the panel window");
        return;
    };

    observer::install(sender.clone(), panel.handle(), Arc::clone(&screens));

    let input_monitors = monitors::MacInputMonitors::new(sender.clone());
    input_monitors.install();

    crate::config::watch_config_file(sender.clone(), Arc::clone(&settings));

    let deps = DockingDeps {
        window: Box::new(panel),
        screens: Box::new(Arc::clone(&screens)),
        pointer: Box::new(monitors::MacPointerSource),
        monitors: Box::new(input_monitors),
        settings,
        indicator: Box::new(surfaces::MacIndicatorSurface::new(sender.clone())),
        effects: EffectRouter::new(
            Box::new(surfaces::MacBeamSurface::new()),
            Box::new(surfaces::MacImpactSurface),
        ),
        timers: Timers::new(Arc::new(ThreadScheduler::new(sender.clone()))),
    };

    let mut controller = DockingController::new(deps, &config);
    let queue = Arc::clone(sender.queue());

    thread::spawn(move || {
        loop {
            thread::sleep(PUMP_INTERVAL);
            controller.pump(&queue);
        }
    });

    unsafe {
        if let Some(app_class) = Class::get("NSApplication") {
            let app: *mut Object = msg_send![app_class, sharedApplication];
            let _: () = msg_send![app, run];
        }
    }
}
