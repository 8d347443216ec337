//! Screen and work-area discovery.
//!
//! `NSScreen` can only be queried on the main thread, while the docking
//! controller runs on its own thread. Work areas are therefore cached here:
//! the main thread refreshes the cache at startup and whenever screen
//! parameters change, and lookups read the cache.

use objc2::MainThreadMarker;
use objc2_app_kit::NSScreen;
use parking_lot::RwLock;

use crate::docking::{PanelFrame, ScreenProvider, WorkArea};

/// Cached screen provider.
#[derive(Default)]
pub struct MacScreenProvider {
    work_areas: RwLock<Vec<WorkArea>>,
}

impl MacScreenProvider {
    /// Creates an empty provider. Call [`Self::refresh`] before use.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Re-reads all screen work areas. Main thread only.
    pub fn refresh(&self, mtm: MainThreadMarker) {
        let main_height = NSScreen::mainScreen(mtm).map_or(0.0, |main| main.frame().size.height);

        let mut areas = Vec::new();
        for screen in NSScreen::screens(mtm) {
            let visible = screen.visibleFrame();

            // NSScreen reports bottom-left (Cocoa) origins; convert to the
            // top-left (Quartz) convention the rest of the app uses.
            let quartz_y = main_height - visible.origin.y - visible.size.height;

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            areas.push(WorkArea::new(
                visible.origin.x as i32,
                quartz_y as i32,
                visible.size.width as u32,
                visible.size.height as u32,
            ));
        }

        *self.work_areas.write() = areas;
    }
}

/// Overlap area between a frame and a work area, in square pixels.
fn overlap(frame: &PanelFrame, work: &WorkArea) -> i64 {
    let width = i64::from(frame.right().min(work.right()) - frame.x.max(work.x));
    let height = i64::from(frame.bottom().min(work.bottom()) - frame.y.max(work.y));

    if width <= 0 || height <= 0 { 0 } else { width * height }
}

impl ScreenProvider for MacScreenProvider {
    fn work_area_for(&self, frame: &PanelFrame) -> Option<WorkArea> {
        let areas = self.work_areas.read();

        areas
            .iter()
            .copied()
            .max_by_key(|work| overlap(frame, work))
            .filter(|work| overlap(frame, work) > 0)
            .or_else(|| areas.first().copied())
    }

    fn primary_work_area(&self) -> Option<WorkArea> { self.work_areas.read().first().copied() }
}

impl ScreenProvider for std::sync::Arc<MacScreenProvider> {
    fn work_area_for(&self, frame: &PanelFrame) -> Option<WorkArea> {
        self.as_ref().work_area_for(frame)
    }

    fn primary_work_area(&self) -> Option<WorkArea> { self.as_ref().primary_work_area() }
}
