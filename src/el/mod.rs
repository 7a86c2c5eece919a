//! Amplification-stage photon generation
//!
//! Takes a thermal electron offered by the host, drifts it towards
//! the amplification gap and, if it gets there, synthesizes the
//! secondary scintillation photons for the host to transport onwards.

use rand::prelude::*;

use crate::analysis::{ExcitationSink, SampleSink};
use crate::constants::PROMPT_TIME_CUTOFF;
use crate::drift::DriftTransport;
use crate::field::PiecewiseField;
use crate::particle::Particle;

mod gate;
mod locator;
mod photons;

pub use gate::*;
pub use locator::*;
pub use photons::*;

/// How often the running invocation count is reported
const REPORT_EVERY: u64 = 10_000;

/// Per-run state: the diagnostic trigger counter and the sinks the
/// current run feeds. One per worker; merged by the driver.
pub struct RunContext<'a> {
    pub triggered: u64,
    pub hits: &'a mut dyn ExcitationSink,
    pub prompt: &'a mut dyn SampleSink,
}

impl<'a> RunContext<'a> {
    pub fn new(hits: &'a mut dyn ExcitationSink, prompt: &'a mut dyn SampleSink) -> Self {
        Self {
            triggered: 0,
            hits,
            prompt,
        }
    }
}

/// What one invocation did with the offered track.
#[derive(Debug)]
pub enum Outcome {
    /// The gate rejected the track; the host keeps transporting it.
    Rejected,
    /// The model fired but the drift line never reached the gap.
    /// No secondaries; the primary is absorbed all the same.
    NoAmplification,
    /// The model fired and synthesized photons. Ownership of the
    /// secondaries passes to the host; the primary is absorbed.
    Photons(Vec<Particle>),
}

impl Outcome {
    /// Whether the host must stop transporting the primary.
    pub fn terminates_primary(&self) -> bool {
        !matches!(self, Outcome::Rejected)
    }
}

/// The model itself: gate thresholds, gap geometry and yield
/// parameters, fixed at construction.
pub struct ElModel {
    thermal_energy: f64,
    prompt_cutoff: f64,
    active_radius: f64,
    gap_top: f64,
    el_yield: ElYield,
}

impl ElModel {
    /// Builds the model for the given field geometry. `thermal_energy`
    /// is the gas's thermalization threshold, in eV.
    pub fn new(geometry: &PiecewiseField, el_yield: ElYield, thermal_energy: f64) -> Self {
        Self {
            thermal_energy,
            prompt_cutoff: PROMPT_TIME_CUTOFF,
            active_radius: geometry.active_radius(),
            gap_top: geometry.gap_top(),
            el_yield,
        }
    }

    pub fn el_yield(&self) -> &ElYield {
        &self.el_yield
    }

    /// Offers one candidate track to the model.
    ///
    /// Gate, drift, entry location and synthesis run to completion
    /// within this call; any non-[`Outcome::Rejected`] return obliges
    /// the host to terminate the primary, including the
    /// no-amplification case.
    pub fn process<D, R>(
        &self,
        track: &Particle,
        drift: &mut D,
        ctx: &mut RunContext,
        rng: &mut R,
    ) -> Outcome
    where
        D: DriftTransport,
        R: Rng,
    {
        if !should_fire(track, self.thermal_energy, self.prompt_cutoff, ctx.prompt) {
            return Outcome::Rejected;
        }

        // The track is absorbed from here on, whatever happens below.
        ctx.triggered += 1;
        if ctx.triggered % REPORT_EVERY == 0 {
            println!(
                "elver: {} thermal electrons fired, collisions so far: {}",
                ctx.triggered, drift.collision_counts(),
            );
        }

        let entry = {
            let line = drift.drift_electron(track.position(), track.time());
            locate_entry(line, self.gap_top, self.active_radius).copied()
        };

        let entry = match entry {
            Some(entry) => entry,
            None => return Outcome::NoAmplification,
        };

        // The gate guarantees this; a mismatch here means the gate and
        // the controller have come apart.
        assert!(
            is_applicable(track.species()),
            "{:?} track reached photon synthesis", track.species(),
        );

        Outcome::Photons(self.el_yield.synthesize(entry, ctx.hits, rng))
    }

    /// Run-boundary reset: clears retained sensor signal state and
    /// zeroes the per-run counters. Once per run, not per event.
    pub fn reset<D: DriftTransport>(&self, drift: &mut D, ctx: &mut RunContext) {
        drift.clear_signal();
        ctx.triggered = 0;
    }
}
