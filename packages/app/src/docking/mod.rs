//! Edge-snap docking for the panel window.
//!
//! The panel floats freely until the user drags it close to a screen edge.
//! Releasing within the snap threshold aligns it flush against the edge,
//! and after a short settle delay it slides fully off-screen, leaving only
//! a thin indicator strip. Hovering the strip brings the panel back, and
//! dragging it away from the edge undoes the whole arrangement.
//!
//! [`controller::DockingController`] holds the entire state machine and is
//! driven exclusively by [`events::DockEvent`]s, which the platform layer
//! produces.

pub mod animation;
pub mod controller;
pub mod effects;
pub mod events;
pub mod geometry;
pub mod host;
pub mod state;
pub mod surfaces;
pub mod timer;

pub use animation::{AnimationDriver, AnimationToken};
pub use controller::{DockingController, DockingDeps};
pub use effects::EffectRouter;
pub use events::{DockEvent, EventQueue, EventSender};
pub use geometry::{PanelFrame, PanelPoint, PanelSize, WorkArea};
pub use host::{InputMonitors, PanelWindow, PointerSource, ScreenProvider, SettingsStore};
pub use state::{SnapEdge, WindowState};
pub use surfaces::{BeamSurface, ImpactSurface, IndicatorSurface};
pub use timer::{ThreadScheduler, TimerPurpose, TimerScheduler, Timers};
