//! Decides which tracks the model may consume

use crate::analysis::{PromptSample, SampleSink};
use crate::particle::{Particle, Species};

/// True only for the thermal-electron intermediate species. Raw
/// electrons and optical photons stay with the host's own transport.
pub fn is_applicable(species: Species) -> bool {
    species == Species::ThermalElectron
}

/// Whether the model fires for this track: the species must match and
/// the kinetic energy must sit below the thermalization threshold (eV).
///
/// Every evaluation also records one prompt sample when the track's
/// global time is below `prompt_cutoff` (ns). That bookkeeping happens
/// whatever the returned decision is, so it must not be folded into
/// the boolean short-circuit.
pub fn should_fire(
    track: &Particle,
    thermal_energy: f64,
    prompt_cutoff: f64,
    prompt: &mut dyn SampleSink,
) -> bool {
    if track.time() < prompt_cutoff {
        prompt.record(PromptSample {
            r: track.position(),
            t: track.time(),
            species: track.species(),
        });
    }

    is_applicable(track.species()) && track.energy() < thermal_energy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thermal(energy: f64, t: f64) -> Particle {
        Particle::create(Species::ThermalElectron, [0.0, 0.0, 0.0].into(), t)
            .with_energy(energy)
    }

    #[test]
    fn only_thermal_electrons_are_applicable() {
        assert!(is_applicable(Species::ThermalElectron));
        assert!(!is_applicable(Species::Electron));
        assert!(!is_applicable(Species::OpticalPhoton));
    }

    #[test]
    fn fires_below_threshold_only() {
        let mut prompt: Vec<PromptSample> = Vec::new();
        assert!(should_fire(&thermal(5.0, 0.0), 7.7, 10.0, &mut prompt));
        assert!(!should_fire(&thermal(7.7, 0.0), 7.7, 10.0, &mut prompt));
        assert!(!should_fire(&thermal(25.0, 0.0), 7.7, 10.0, &mut prompt));
    }

    #[test]
    fn wrong_species_never_fires() {
        let mut prompt: Vec<PromptSample> = Vec::new();
        let e = Particle::create(Species::Electron, [0.0, 0.0, 0.0].into(), 0.0)
            .with_energy(0.1);
        assert!(!should_fire(&e, 7.7, 10.0, &mut prompt));
    }

    #[test]
    fn prompt_sample_is_recorded_even_when_rejected() {
        let mut prompt: Vec<PromptSample> = Vec::new();
        should_fire(&thermal(100.0, 2.0), 7.7, 10.0, &mut prompt);
        assert_eq!(prompt.len(), 1);
        assert_eq!(prompt[0].t, 2.0);
        assert_eq!(prompt[0].species, Species::ThermalElectron);
    }

    #[test]
    fn late_tracks_leave_no_prompt_sample() {
        let mut prompt: Vec<PromptSample> = Vec::new();
        assert!(should_fire(&thermal(5.0, 50.0), 7.7, 10.0, &mut prompt));
        assert!(prompt.is_empty());
    }
}
