//! Electric-field geometry of the drift and amplification regions
//!
//! The drift integrator samples the field through [`ElectricField`],
//! dispatched over the closed [`FieldGeometry`] variant set.

use enum_dispatch::enum_dispatch;

use crate::geometry::ThreeVector;

/// Named regions of the detector volume. Derived purely from position,
/// never stored.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Region {
    /// Radially outside the field cage
    OutsideRadius,
    /// Above the top of the field cage
    AboveCathode,
    /// The main drift volume
    Drift,
    /// The amplification gap
    ElGap,
    /// Between the gap exit and the end cap
    BelowGap,
}

/// Evaluates the electric field at a point, in V/cm.
#[enum_dispatch]
pub trait ElectricField {
    fn field_at(&self, r: ThreeVector) -> ThreeVector;
}

/// The closed set of field geometries the drift integrator accepts.
#[enum_dispatch(ElectricField)]
#[derive(Copy, Clone, Debug)]
pub enum FieldGeometry {
    Piecewise(PiecewiseField),
    Uniform(UniformField),
}

/// A spatially constant field.
#[derive(Copy, Clone, Debug)]
pub struct UniformField {
    e: ThreeVector,
}

impl UniformField {
    pub fn new(e: ThreeVector) -> Self {
        Self {e}
    }
}

impl ElectricField for UniformField {
    fn field_at(&self, _r: ThreeVector) -> ThreeVector {
        self.e
    }
}

/// The axial piecewise field of a cylindrical TPC with an
/// amplification gap at the bottom of the active volume.
///
/// The gap spans `(gap_top - gap, gap_top]` in z, where
/// `gap_top = -active_length/2`; the top of the field cage sits at
/// `+active_length/2`.
#[derive(Copy, Clone, Debug)]
pub struct PiecewiseField {
    active_radius: f64,
    active_length: f64,
    gap: f64,
    drift_field: f64,
    el_field: f64,
}

impl PiecewiseField {
    pub fn new(active_radius: f64, active_length: f64, gap: f64, drift_field: f64, el_field: f64) -> Self {
        Self {active_radius, active_length, gap, drift_field, el_field}
    }

    /// Upper boundary of the amplification gap, cm
    pub fn gap_top(&self) -> f64 {
        -0.5 * self.active_length
    }

    /// Lower boundary of the amplification gap, cm
    pub fn gap_bottom(&self) -> f64 {
        self.gap_top() - self.gap
    }

    /// Top of the field cage, cm
    pub fn cathode_top(&self) -> f64 {
        0.5 * self.active_length
    }

    pub fn active_radius(&self) -> f64 {
        self.active_radius
    }

    /// Classifies a position. The regions partition the volume.
    pub fn region_of(&self, r: ThreeVector) -> Region {
        let z = r[2];
        if r.radius() > 0.5 * self.active_radius {
            Region::OutsideRadius
        } else if z > self.cathode_top() {
            Region::AboveCathode
        } else if z > self.gap_top() {
            Region::Drift
        } else if z > self.gap_bottom() {
            Region::ElGap
        } else {
            Region::BelowGap
        }
    }
}

impl ElectricField for PiecewiseField {
    // The rules deliberately overwrite one another in order; the last
    // matching assignment wins. In particular the gap assignment must
    // override the bulk z <= cathode_top assignment.
    fn field_at(&self, r: ThreeVector) -> ThreeVector {
        let z = r[2];

        // Only an Ez component anywhere
        let mut ez = 0.0;

        // Radially outside the field cage: drift charge away from the gap
        if r.radius() > 0.5 * self.active_radius {
            ez = -self.drift_field;
        }

        // Past the top of the field cage: drift charge away from the gap
        if z > self.cathode_top() {
            ez = -self.drift_field;
        }

        // Drift region
        if z <= self.cathode_top() {
            ez = self.drift_field;
        }

        // Amplification gap
        if z <= self.gap_top() && z > self.gap_bottom() {
            ez = self.el_field;
        }

        // Drift towards the end cap
        if z <= self.gap_bottom() {
            ez = self.drift_field;
        }

        ThreeVector::new(0.0, 0.0, ez)
    }
}
