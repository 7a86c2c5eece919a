//! Physical constants and unit conversions
//!
//! The native unit system follows the drift-transport convention:
//! lengths in cm, times in ns, energies in eV, fields in V/cm,
//! pressures in bar.

/// One torr, in bar
pub const TORR: f64 = 1.0 / 760.0;
/// One bar, the native pressure unit
pub const BAR: f64 = 1.0;
/// One millimetre, in cm
pub const MM: f64 = 0.1;
/// One microsecond, in ns
pub const MICROSECOND: f64 = 1.0e3;

/// Energy of the xenon second-continuum emission line (172 nm), in eV
pub const XE_EMISSION_ENERGY: f64 = 7.2;

/// Default drift-region field, V/cm
pub const DEFAULT_DRIFT_FIELD: f64 = 438.0;
/// Default amplification-gap field, V/cm, roughly 25x the drift field
pub const DEFAULT_EL_FIELD: f64 = 11400.0;
/// Default amplification-gap length, cm
pub const DEFAULT_GAP_LENGTH: f64 = 0.7;

/// Slope of the linear EL yield law Y/p = a E/p - b, in photons/cm/bar
/// with E in V/cm and p in torr. JINST 2 P05001 (2007).
pub const DEFAULT_YIELD_SLOPE: f64 = 105.0;
/// Offset of the linear EL yield law, photons/cm/bar
pub const DEFAULT_YIELD_OFFSET: f64 = 116.0;

/// Relative shot-to-shot fluctuation of the EL yield
pub const DEFAULT_YIELD_FLUCTUATION: f64 = 0.01;

/// Electron drift velocity in the gap, cm/ns (2.4 mm/us, arXiv:1902.05544,
/// flat at the operating E/p so treated as field-independent)
pub const DEFAULT_DRIFT_VELOCITY: f64 = 2.4 * MM / MICROSECOND;

/// Tracks with global time below this count as prompt ("S1-like"), ns
pub const PROMPT_TIME_CUTOFF: f64 = 10.0;
