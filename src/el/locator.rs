//! Finds where a drift line enters the amplification gap

use crate::drift::{DriftLine, DriftPoint};

/// Scans the drift line in order and returns the first sample inside
/// the gap, i.e. below `gap_top` (cm) and radially within half the
/// active radius. `None` is a legitimate physics outcome: attached
/// electrons, or electrons drifted out of the active volume, never
/// reach the gap.
pub fn locate_entry<'a>(line: &'a DriftLine, gap_top: f64, active_radius: f64) -> Option<&'a DriftPoint> {
    line.iter().find(|p| p.r[2] < gap_top && p.r.radius() < 0.5 * active_radius)
}
