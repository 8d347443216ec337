//! The panel `NSWindow` and its frame animation wiring.
//!
//! All programmatic frame changes route through [`WindowHandle`], which
//! raises a flag around its own `setFrame:` calls. The notification observer
//! checks that flag, so only genuine user moves surface as
//! `DockEvent::WindowMoved`.

use std::ptr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ledge_shared::AnimationSettings;
use objc::runtime::{Class, Object};
use objc::{msg_send, sel, sel_impl};

use super::{NSRect, SendSyncPtr, main_screen_height, ns_string, to_cocoa_rect, to_panel_frame};
use crate::docking::{AnimationDriver, AnimationToken, EventSender, PanelFrame, PanelWindow};

const STYLE_TITLED: u64 = 1 << 0;
const STYLE_CLOSABLE: u64 = 1 << 1;
const STYLE_RESIZABLE: u64 = 1 << 3;

const BACKING_STORE_BUFFERED: u64 = 2;

/// Raw window access shared between the panel, the animation driver and the
/// notification observer.
pub struct WindowHandle {
    window: SendSyncPtr,
    programmatic: AtomicBool,
}

impl WindowHandle {
    /// Current frame in top-left screen coordinates.
    pub fn frame(&self) -> PanelFrame {
        let rect: NSRect = unsafe { msg_send![self.window.0, frame] };
        to_panel_frame(rect, main_screen_height())
    }

    /// Moves the window, flagging the move as programmatic so the observer
    /// does not feed it back into the state machine.
    pub fn set_frame_quiet(&self, frame: PanelFrame) {
        let rect = to_cocoa_rect(frame, main_screen_height());

        self.programmatic.store(true, Ordering::SeqCst);
        let _: () = unsafe { msg_send![self.window.0, setFrame: rect display: true] };
        self.programmatic.store(false, Ordering::SeqCst);
    }

    /// Returns whether a programmatic move is in flight.
    pub fn is_programmatic_move(&self) -> bool { self.programmatic.load(Ordering::SeqCst) }

    /// Raw `NSWindow` pointer, used to scope notification registration.
    pub fn raw(&self) -> *mut Object { self.window.0 }
}

/// The panel window.
pub struct MacPanelWindow {
    handle: Arc<WindowHandle>,
    driver: AnimationDriver,
    animation: AnimationSettings,
}

impl MacPanelWindow {
    /// Creates the titled, resizable panel window and orders it front.
    /// Main thread only.
    #[must_use]
    pub fn create(
        initial: PanelFrame,
        animation: AnimationSettings,
        sender: &EventSender,
    ) -> Option<Self> {
        let window_class = Class::get("NSWindow")?;
        let rect = to_cocoa_rect(initial, main_screen_height());
        let style = STYLE_TITLED | STYLE_CLOSABLE | STYLE_RESIZABLE;

        let window: *mut Object = unsafe {
            let window: *mut Object = msg_send![window_class, alloc];
            msg_send![
                window,
                initWithContentRect: rect
                styleMask: style
                backing: BACKING_STORE_BUFFERED
                defer: false
            ]
        };

        if window.is_null() {
            return None;
        }

        unsafe {
            let _: () = msg_send![window, setReleasedWhenClosed: false];
            let _: () = msg_send![window, setTitle: ns_string("Ledge")];
            let _: () = msg_send![window, makeKeyAndOrderFront: ptr::null::<Object>()];
        }

        let handle =
            Arc::new(WindowHandle { window: SendSyncPtr(window), programmatic: AtomicBool::new(false) });

        let apply_handle = Arc::clone(&handle);
        let driver = AnimationDriver::new(
            sender.clone(),
            Arc::new(move |frame| apply_handle.set_frame_quiet(frame)),
        );

        Some(Self { handle, driver, animation })
    }

    /// Shared handle for the notification observer.
    #[must_use]
    pub fn handle(&self) -> Arc<WindowHandle> { Arc::clone(&self.handle) }
}

impl PanelWindow for MacPanelWindow {
    fn frame(&self) -> PanelFrame { self.handle.frame() }

    fn set_frame(&self, frame: PanelFrame) { self.handle.set_frame_quiet(frame); }

    fn animate_frame(&self, target: PanelFrame, token: AnimationToken) {
        self.driver.animate(self.handle.frame(), target, &self.animation, token);
    }

    fn cancel_animation(&self) { self.driver.cancel(); }

    fn set_interactive(&self, interactive: bool) {
        let _: () = unsafe { msg_send![self.handle.raw(), setIgnoresMouseEvents: !interactive] };
    }

    fn set_opacity(&self, opacity: f64) {
        let _: () = unsafe { msg_send![self.handle.raw(), setAlphaValue: opacity] };
    }

    fn order_front_and_activate(&self) {
        unsafe {
            let _: () = msg_send![self.handle.raw(), makeKeyAndOrderFront: ptr::null::<Object>()];

            if let Some(app_class) = Class::get("NSApplication") {
                let app: *mut Object = msg_send![app_class, sharedApplication];
                let _: () = msg_send![app, activateIgnoringOtherApps: true];
            }
        }
    }
}
