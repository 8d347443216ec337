//! Routing between the state machine and the effect surfaces.

use ledge_shared::AccentColor;

use super::geometry::{PanelFrame, PanelPoint};
use super::state::SnapEdge;
use super::surfaces::{BeamSurface, ImpactSurface};

/// Owns the beam and impact surfaces and tracks whether the beam is running,
/// so starts supersede and stops are idempotent.
pub struct EffectRouter {
    beam: Box<dyn BeamSurface>,
    impact: Box<dyn ImpactSurface>,
    beam_running: bool,
}

impl EffectRouter {
    /// Creates a router over the given surfaces.
    #[must_use]
    pub fn new(beam: Box<dyn BeamSurface>, impact: Box<dyn ImpactSurface>) -> Self {
        Self { beam, impact, beam_running: false }
    }

    /// Starts the beam over the strip, superseding a running one.
    pub fn start_beam(&mut self, edge: SnapEdge, strip: PanelFrame, color: &AccentColor) {
        if self.beam_running {
            self.beam.stop();
        }

        self.beam.start(edge, strip, color);
        self.beam_running = true;
    }

    /// Stops the beam if it is running.
    pub fn stop_beam(&mut self) {
        if self.beam_running {
            self.beam.stop();
            self.beam_running = false;
        }
    }

    /// Plays the one-shot impact burst.
    pub fn play_impact(&self, edge: SnapEdge, at: PanelPoint, color: &AccentColor) {
        self.impact.play(edge, at, color);
    }

    /// Returns whether the beam is currently running.
    #[must_use]
    pub const fn is_beam_running(&self) -> bool { self.beam_running }
}
