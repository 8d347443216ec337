//! Global input monitoring via a Quartz event tap.
//!
//! A single listen-only tap watches left mouse down/up and key down events.
//! Pointer-ups are only forwarded while a drag-end watch is active, and key
//! events only while the app is frontmost.

use std::ffi::c_void;
use std::ptr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use core_foundation::base::TCFType;
use core_foundation::mach_port::CFMachPort;
use core_foundation::runloop::{CFRunLoop, kCFRunLoopCommonModes};
use core_graphics::event::CGEvent;
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};

use super::observer;
use crate::docking::{DockEvent, EventSender, InputMonitors, PanelPoint, PointerSource};

// FFI declarations for the event tap; the core-graphics crate does not
// expose a safe tap API.
type CGEventRef = *mut c_void;
type CGEventTapProxy = *mut c_void;
type CFMachPortRef = *mut c_void;

type CGEventTapCallBack = extern "C" fn(
    proxy: CGEventTapProxy,
    event_type: u32,
    event: CGEventRef,
    user_info: *mut c_void,
) -> CGEventRef;

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGEventTapCreate(
        tap: u32,
        place: u32,
        options: u32,
        events_of_interest: u64,
        callback: CGEventTapCallBack,
        user_info: *mut c_void,
    ) -> CFMachPortRef;

    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
    fn CGEventGetLocation(event: CGEventRef) -> CGPoint;
}

/// Point structure for Core Graphics.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct CGPoint {
    x: f64,
    y: f64,
}

const K_CG_HID_EVENT_TAP: u32 = 0;
const K_CG_HEAD_INSERT_EVENT_TAP: u32 = 0;
const K_CG_EVENT_TAP_OPTION_LISTEN_ONLY: u32 = 1;

const K_CG_EVENT_LEFT_MOUSE_DOWN: u32 = 1;
const K_CG_EVENT_LEFT_MOUSE_UP: u32 = 2;
const K_CG_EVENT_KEY_DOWN: u32 = 10;
const K_CG_EVENT_TAP_DISABLED_BY_TIMEOUT: u32 = 0xFFFF_FFFE;

static SENDER: OnceLock<EventSender> = OnceLock::new();
static ENABLED: AtomicBool = AtomicBool::new(false);
static DRAG_WATCH: AtomicBool = AtomicBool::new(false);
static TAP_STARTED: AtomicBool = AtomicBool::new(false);

extern "C" fn event_tap_callback(
    _proxy: CGEventTapProxy,
    event_type: u32,
    event: CGEventRef,
    _user_info: *mut c_void,
) -> CGEventRef {
    if event_type >= K_CG_EVENT_TAP_DISABLED_BY_TIMEOUT
        || event.is_null()
        || !ENABLED.load(Ordering::Relaxed)
    {
        return event;
    }

    let Some(sender) = SENDER.get() else {
        return event;
    };

    match event_type {
        K_CG_EVENT_LEFT_MOUSE_DOWN => {
            let location = location_of(event);
            sender.post(DockEvent::GlobalPointerDown { location });
        }
        K_CG_EVENT_LEFT_MOUSE_UP if DRAG_WATCH.load(Ordering::Relaxed) => {
            let location = location_of(event);
            sender.post(DockEvent::GlobalPointerUp { location });
        }
        K_CG_EVENT_KEY_DOWN if observer::is_app_active() => {
            sender.post(DockEvent::LocalKeyDown);
        }
        _ => {}
    }

    event
}

#[allow(clippy::cast_possible_truncation)]
fn location_of(event: CGEventRef) -> PanelPoint {
    let location = unsafe { CGEventGetLocation(event) };
    PanelPoint::new(location.x as i32, location.y as i32)
}

fn start_tap_thread() {
    if TAP_STARTED.swap(true, Ordering::SeqCst) {
        return;
    }

    thread::spawn(|| {
        let event_mask = (1u64 << K_CG_EVENT_LEFT_MOUSE_DOWN)
            | (1u64 << K_CG_EVENT_LEFT_MOUSE_UP)
            | (1u64 << K_CG_EVENT_KEY_DOWN);

        unsafe {
            let tap = CGEventTapCreate(
                K_CG_HID_EVENT_TAP,
                K_CG_HEAD_INSERT_EVENT_TAP,
                K_CG_EVENT_TAP_OPTION_LISTEN_ONLY,
                event_mask,
                event_tap_callback,
                ptr::null_mut(),
            );

            if tap.is_null() {
                eprintln!("ledge: failed to create event tap (accessibility permission missing?)");
                return;
            }

            let tap_port = CFMachPort::wrap_under_create_rule(tap.cast());
            let Ok(run_loop_source) = tap_port.create_runloop_source(0) else {
                eprintln!("ledge: failed to create run loop source for event tap");
                return;
            };

            let run_loop = CFRunLoop::get_current();
            run_loop.add_source(&run_loop_source, kCFRunLoopCommonModes);
            CGEventTapEnable(tap, true);
            CFRunLoop::run_current();
        }
    });
}

/// Event-tap backed input monitors.
pub struct MacInputMonitors;

impl MacInputMonitors {
    /// Creates the monitors, wiring the tap to the given sender.
    #[must_use]
    pub fn new(sender: EventSender) -> Self {
        let _ = SENDER.set(sender);
        Self
    }
}

impl InputMonitors for MacInputMonitors {
    fn install(&self) {
        ENABLED.store(true, Ordering::Relaxed);
        start_tap_thread();
    }

    fn remove(&self) { ENABLED.store(false, Ordering::Relaxed); }

    fn begin_drag_end_watch(&self) { DRAG_WATCH.store(true, Ordering::Relaxed); }

    fn end_drag_end_watch(&self) { DRAG_WATCH.store(false, Ordering::Relaxed); }
}

/// Returns the pointer location in top-left screen coordinates.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn pointer_location() -> PanelPoint {
    CGEventSource::new(CGEventSourceStateID::CombinedSessionState)
        .ok()
        .and_then(|source| CGEvent::new(source).ok())
        .map_or_else(PanelPoint::default, |event| {
            let location = event.location();
            PanelPoint::new(location.x as i32, location.y as i32)
        })
}

/// Pointer source polled by the docking controller.
pub struct MacPointerSource;

impl PointerSource for MacPointerSource {
    fn pointer_location(&self) -> PanelPoint { pointer_location() }
}
