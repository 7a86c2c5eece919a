//! Drift transport of ionization electrons
//!
//! The model consumes drift lines through the narrow [`DriftTransport`]
//! port; [`McDrift`] is the in-crate integrator behind it. The engine
//! returns its samples as a structured list rather than firing a
//! per-collision callback.

use rand::prelude::*;
use rand_xoshiro::Xoshiro256StarStar;

use crate::field::{ElectricField, FieldGeometry, Region};
use crate::geometry::ThreeVector;

/// One sampled point of a drift line: position (cm) and time (ns).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DriftPoint {
    pub r: ThreeVector,
    pub t: f64,
}

/// Time-ordered samples of one electron's drift. May be empty if the
/// electron never enters the active volume.
#[derive(Clone, Debug, Default)]
pub struct DriftLine {
    points: Vec<DriftPoint>,
}

impl DriftLine {
    pub fn new() -> Self {
        Self {points: Vec::new()}
    }

    pub fn push(&mut self, point: DriftPoint) {
        self.points.push(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, i: usize) -> Option<&DriftPoint> {
        self.points.get(i)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DriftPoint> {
        self.points.iter()
    }
}

impl From<Vec<DriftPoint>> for DriftLine {
    fn from(points: Vec<DriftPoint>) -> Self {
        Self {points}
    }
}

/// Electron collision statistics, cumulative over the run: the engine
/// does not reset them per drift call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CollisionCounts {
    pub elastic: u64,
    pub ionising: u64,
    pub attachment: u64,
    pub inelastic: u64,
    pub excitation: u64,
    pub superelastic: u64,
}

impl std::ops::Add for CollisionCounts {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            elastic: self.elastic + other.elastic,
            ionising: self.ionising + other.ionising,
            attachment: self.attachment + other.attachment,
            inelastic: self.inelastic + other.inelastic,
            excitation: self.excitation + other.excitation,
            superelastic: self.superelastic + other.superelastic,
        }
    }
}

impl std::fmt::Display for CollisionCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f,
            "elastic {}, ionising {}, attachment {}, inelastic {}, excitation {}, superelastic {}",
            self.elastic, self.ionising, self.attachment,
            self.inelastic, self.excitation, self.superelastic,
        )
    }
}

/// The transport engine boundary.
pub trait DriftTransport {
    /// Advances an electron from the given seed point and returns the
    /// sampled drift line. The line is owned by the engine and valid
    /// until the next call.
    fn drift_electron(&mut self, r: ThreeVector, t: f64) -> &DriftLine;

    /// Collision statistics, cumulative over the run.
    fn collision_counts(&self) -> CollisionCounts;

    /// Clears retained sensor-side accumulation state. Called at run
    /// boundaries, not per event.
    fn clear_signal(&mut self);
}

/// Stochastic drift integrator: fixed distance steps along the local
/// drift velocity, with optional attachment.
///
/// Velocity is `-mu E` with a constant mobility, valid in the operating
/// regime this model targets; the microscopic engine it stands in for
/// owns the real transport numerics.
pub struct McDrift {
    field: FieldGeometry,
    mobility: f64,
    distance_step: f64,
    attachment_rate: f64,
    area_radius: f64,
    area_half_length: f64,
    max_steps: usize,
    line: DriftLine,
    counts: CollisionCounts,
    rng: Xoshiro256StarStar,
}

impl McDrift {
    /// Creates an integrator for the given field geometry. `mobility`
    /// is in cm^2/(V ns); the sensor area defaults to a 25 cm radius,
    /// 30 cm half-length cylinder.
    pub fn new(field: FieldGeometry, mobility: f64, seed: u64) -> Self {
        Self {
            field,
            mobility,
            distance_step: 2.0e-2,
            attachment_rate: 0.0,
            area_radius: 25.0,
            area_half_length: 30.0,
            max_steps: 1_000_000,
            line: DriftLine::new(),
            counts: CollisionCounts::default(),
            rng: Xoshiro256StarStar::seed_from_u64(seed),
        }
    }

    /// Sets the sensor area, outside which drifting stops.
    pub fn with_area(self, radius: f64, half_length: f64) -> Self {
        Self {
            area_radius: radius,
            area_half_length: half_length,
            ..self
        }
    }

    /// Sets the spatial step length, in cm.
    pub fn with_distance_step(self, distance_step: f64) -> Self {
        Self {
            distance_step,
            ..self
        }
    }

    /// Enables attachment at the given rate, per ns.
    pub fn with_attachment(self, attachment_rate: f64) -> Self {
        Self {
            attachment_rate,
            ..self
        }
    }

    fn in_area(&self, r: ThreeVector) -> bool {
        r.radius() <= self.area_radius && r[2].abs() <= self.area_half_length
    }
}

impl DriftTransport for McDrift {
    fn drift_electron(&mut self, r: ThreeVector, t: f64) -> &DriftLine {
        self.line.clear();

        if !self.in_area(r) {
            return &self.line;
        }

        let mut r = r;
        let mut t = t;
        self.line.push(DriftPoint {r, t});

        for _ in 0..self.max_steps {
            let v = -self.mobility * self.field.field_at(r);
            let speed = v.norm_sqr().sqrt();
            if speed == 0.0 {
                break;
            }

            let dt = self.distance_step / speed;
            r = r + dt * v;
            t += dt;

            if !self.in_area(r) {
                break;
            }

            self.line.push(DriftPoint {r, t});

            self.counts.elastic += 1;
            if let FieldGeometry::Piecewise(pw) = &self.field {
                if pw.region_of(r) == Region::ElGap {
                    self.counts.excitation += 1;
                }
            }

            if self.attachment_rate > 0.0 && self.rng.gen::<f64>() < self.attachment_rate * dt {
                self.counts.attachment += 1;
                break;
            }
        }

        &self.line
    }

    fn collision_counts(&self) -> CollisionCounts {
        self.counts
    }

    fn clear_signal(&mut self) {
        self.line.clear();
        self.counts = CollisionCounts::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::field::PiecewiseField;

    fn geometry() -> PiecewiseField {
        PiecewiseField::new(16.0, 50.0, DEFAULT_GAP_LENGTH, DEFAULT_DRIFT_FIELD, DEFAULT_EL_FIELD)
    }

    fn integrator(seed: u64) -> McDrift {
        let mobility = DEFAULT_DRIFT_VELOCITY / DEFAULT_DRIFT_FIELD;
        McDrift::new(geometry().into(), mobility, seed).with_area(20.0, 30.0)
    }

    #[test]
    fn drifts_into_the_gap() {
        let pw = geometry();
        let mut drift = integrator(1);
        let line = drift.drift_electron(ThreeVector::new(0.5, -0.5, 10.0), 0.0);

        assert!(!line.is_empty());
        let entered = line.iter().any(|p| p.r[2] < pw.gap_top());
        assert!(entered, "drift line never reached the gap");

        // samples are time-ordered
        let times: Vec<f64> = line.iter().map(|p| p.t).collect();
        assert!(times.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn drifts_away_above_cathode() {
        let pw = geometry();
        let mut drift = integrator(2);
        let line = drift.drift_electron(ThreeVector::new(0.0, 0.0, pw.cathode_top() + 1.0), 0.0);

        assert!(!line.is_empty());
        assert!(line.iter().all(|p| p.r[2] > pw.gap_top()));
        // pushed out through the top of the sensor area
        let last = line.point(line.len() - 1).unwrap();
        assert!(last.r[2] > pw.cathode_top());
    }

    #[test]
    fn seed_outside_area_gives_empty_line() {
        let mut drift = integrator(3);
        let line = drift.drift_electron(ThreeVector::new(0.0, 0.0, 40.0), 0.0);
        assert!(line.is_empty());
    }

    #[test]
    fn attachment_terminates_the_line() {
        let mut drift = integrator(4).with_attachment(1.0e3);
        let line = drift.drift_electron(ThreeVector::new(0.0, 0.0, 10.0), 0.0);
        assert!(line.len() < 10);
        assert_eq!(drift.collision_counts().attachment, 1);
    }

    #[test]
    fn counts_accumulate_across_calls_until_cleared() {
        let mut drift = integrator(5);
        drift.drift_electron(ThreeVector::new(0.0, 0.0, 5.0), 0.0);
        let first = drift.collision_counts();
        drift.drift_electron(ThreeVector::new(0.0, 0.0, 5.0), 0.0);
        let second = drift.collision_counts();
        assert!(second.elastic > first.elastic);
        assert!(second.excitation >= first.excitation);

        drift.clear_signal();
        assert_eq!(drift.collision_counts(), CollisionCounts::default());
    }
}
