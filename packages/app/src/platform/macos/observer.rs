//! Window and application notification observer.
//!
//! A small `NSObject` subclass receives move, resize and activation
//! notifications and converts them into dock events. Programmatic moves are
//! filtered out here, so the state machine only ever sees user-initiated
//! frame changes.

use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use objc::declare::ClassDecl;
use objc::runtime::{Class, Object, Sel};
use objc::{msg_send, sel, sel_impl};
use objc2::MainThreadMarker;

use super::ns_string;
use super::screens::MacScreenProvider;
use super::window::WindowHandle;
use crate::docking::{DockEvent, EventSender};

static SENDER: OnceLock<EventSender> = OnceLock::new();
static WINDOW: OnceLock<Arc<WindowHandle>> = OnceLock::new();
static SCREENS: OnceLock<Arc<MacScreenProvider>> = OnceLock::new();
static APP_ACTIVE: AtomicBool = AtomicBool::new(true);

/// Returns whether the app currently owns key focus.
pub fn is_app_active() -> bool { APP_ACTIVE.load(Ordering::Relaxed) }

fn post(event: DockEvent) {
    if let Some(sender) = SENDER.get() {
        sender.post(event);
    }
}

extern "C" fn window_did_move(_this: &Object, _sel: Sel, _notification: *mut Object) {
    let Some(handle) = WINDOW.get() else {
        return;
    };

    if handle.is_programmatic_move() {
        return;
    }

    post(DockEvent::WindowMoved { frame: handle.frame() });
}

extern "C" fn window_did_end_live_resize(_this: &Object, _sel: Sel, _notification: *mut Object) {
    let Some(handle) = WINDOW.get() else {
        return;
    };

    post(DockEvent::ResizeEnded { frame: handle.frame() });
}

extern "C" fn app_did_become_active(_this: &Object, _sel: Sel, _notification: *mut Object) {
    APP_ACTIVE.store(true, Ordering::Relaxed);
    post(DockEvent::AppActivated);
}

extern "C" fn app_did_resign_active(_this: &Object, _sel: Sel, _notification: *mut Object) {
    APP_ACTIVE.store(false, Ordering::Relaxed);
    post(DockEvent::AppDeactivated);
}

extern "C" fn screens_did_change(_this: &Object, _sel: Sel, _notification: *mut Object) {
    // This notification is always delivered on the main thread
    if let (Some(screens), Some(mtm)) = (SCREENS.get(), MainThreadMarker::new()) {
        screens.refresh(mtm);
    }
}

fn observer_class() -> Option<&'static Class> {
    if let Some(existing) = Class::get("LedgeNotificationObserver") {
        return Some(existing);
    }

    let superclass = Class::get("NSObject")?;
    let mut decl = ClassDecl::new("LedgeNotificationObserver", superclass)?;

    type Callback = extern "C" fn(&Object, Sel, *mut Object);
    unsafe {
        decl.add_method(sel!(windowDidMove:), window_did_move as Callback);
        decl.add_method(sel!(windowDidEndLiveResize:), window_did_end_live_resize as Callback);
        decl.add_method(sel!(appDidBecomeActive:), app_did_become_active as Callback);
        decl.add_method(sel!(appDidResignActive:), app_did_resign_active as Callback);
        decl.add_method(sel!(screensDidChange:), screens_did_change as Callback);
    }

    Some(decl.register())
}

/// Registers for window, application and screen notifications.
pub fn install(sender: EventSender, handle: Arc<WindowHandle>, screens: Arc<MacScreenProvider>) {
    let _ = SENDER.set(sender);
    let window = handle.raw();
    let _ = WINDOW.set(handle);
    let _ = SCREENS.set(screens);

    let Some(class) = observer_class() else {
        eprintln!("ledge: failed to register notification observer class");
        return;
    };

    let Some(center_class) = Class::get("NSNotificationCenter") else {
        return;
    };

    unsafe {
        let observer: *mut Object = msg_send![class, new];
        let center: *mut Object = msg_send![center_class, defaultCenter];

        let subscriptions: [(Sel, &str, *mut Object); 5] = [
            (sel!(windowDidMove:), "NSWindowDidMoveNotification", window),
            (sel!(windowDidEndLiveResize:), "NSWindowDidEndLiveResizeNotification", window),
            (sel!(appDidBecomeActive:), "NSApplicationDidBecomeActiveNotification", ptr::null_mut()),
            (sel!(appDidResignActive:), "NSApplicationDidResignActiveNotification", ptr::null_mut()),
            (
                sel!(screensDidChange:),
                "NSApplicationDidChangeScreenParametersNotification",
                ptr::null_mut(),
            ),
        ];

        for (selector, name, object) in subscriptions {
            let _: () = msg_send![
                center,
                addObserver: observer
                selector: selector
                name: ns_string(name)
                object: object
            ];
        }
    }
}
