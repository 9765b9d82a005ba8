//! Spatial math shared by the sampler and the conflict detector.

use crate::models::{Position, TrajectoryPoint};

/// 3D Euclidean distance between two positions, in meters.
pub fn distance_3d(a: &Position, b: &Position) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Ground-plane distance between two positions, ignoring altitude.
pub fn distance_2d(a: &Position, b: &Position) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Linearly interpolate between two timed samples at `time_s`.
///
/// The time ratio is clamped to [0, 1], so a target outside the pair's span
/// returns the nearer endpoint, and a target at either sample's own time
/// returns that sample's coordinates unchanged.
pub fn interpolate_position(a: &TrajectoryPoint, b: &TrajectoryPoint, time_s: f64) -> Position {
    if a.time_s == b.time_s {
        return a.position();
    }

    let ratio = ((time_s - a.time_s) / (b.time_s - a.time_s)).clamp(0.0, 1.0);
    Position {
        x: a.x + ratio * (b.x - a.x),
        y: a.y + ratio * (b.y - a.y),
        z: a.z + ratio * (b.z - a.z),
    }
}

/// Bearing from `a` to `b` in degrees, normalized to [0, 360).
pub fn bearing_deg(a: &Position, b: &Position) -> f64 {
    let bearing = (b.y - a.y).atan2(b.x - a.x).to_degrees();
    (bearing + 360.0) % 360.0
}
