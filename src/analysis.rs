//! Bookkeeping sinks fed by the model
//!
//! Both sinks sit outside the model proper: the host hands them in
//! through the per-run context and owns whatever they accumulate.

use crate::geometry::ThreeVector;
use crate::particle::Species;

/// One record per synthesized photon, mirroring its creation point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ExcitationHit {
    pub r: ThreeVector,
    pub t: f64,
}

/// Receives excitation hits, append-only.
pub trait ExcitationSink {
    fn insert(&mut self, hit: ExcitationHit);
}

impl ExcitationSink for Vec<ExcitationHit> {
    fn insert(&mut self, hit: ExcitationHit) {
        self.push(hit);
    }
}

/// A prompt ("S1-like") timing/position sample, recorded for every
/// candidate track the gate sees early in the event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PromptSample {
    pub r: ThreeVector,
    pub t: f64,
    pub species: Species,
}

/// Receives prompt samples, append-only.
pub trait SampleSink {
    fn record(&mut self, sample: PromptSample);
}

impl SampleSink for Vec<PromptSample> {
    fn record(&mut self, sample: PromptSample) {
        self.push(sample);
    }
}
