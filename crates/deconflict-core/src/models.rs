//! Core data models for the deconfliction system.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum |x| / |y| coordinate accepted by waypoint validation, in meters.
pub const MAX_COORDINATE_M: f64 = 10_000.0;
/// Maximum waypoint altitude accepted by waypoint validation, in meters.
pub const MAX_ALTITUDE_M: f64 = 1_000.0;

/// A raw mission control point in local ENU meters.
///
/// `z` and `time_s` may be absent in caller input: the sampler substitutes
/// its configured default altitude, and spreads waypoints evenly across the
/// mission window when the set carries no usable times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: Option<f64>,
    #[serde(default, alias = "time")]
    pub time_s: Option<f64>,
}

impl Waypoint {
    /// Waypoint with all fields present.
    pub fn new(x: f64, y: f64, z: f64, time_s: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            time_s: Some(time_s),
        }
    }
}

/// A 3D position in local ENU meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Time-stamped sample of a flight's realized path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub time_s: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub speed_mps: f64,
    /// Direction of travel of the segment containing this sample, degrees.
    pub heading_deg: f64,
}

impl TrajectoryPoint {
    /// Spatial coordinates of this sample.
    pub fn position(&self) -> Position {
        Position {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }
}

/// A sampled trajectory tagged with its flight identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub flight_id: String,
    pub trajectory: Vec<TrajectoryPoint>,
}

/// A waypoint mission realized over an absolute time window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub waypoints: Vec<Waypoint>,
    pub start_time_s: f64,
    pub end_time_s: f64,
}

impl Mission {
    pub fn duration_s(&self) -> f64 {
        self.end_time_s - self.start_time_s
    }
}

/// Another operator's mission, tagged with its flight identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightMission {
    pub flight_id: String,
    pub mission: Mission,
}

/// The traffic pattern a scenario was built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    ConflictFree,
    SpatialConflict,
    TemporalConflict,
    AltitudeConflict,
    Complex,
    Custom,
}

/// A complete analysis input: one primary mission plus background flights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub primary_mission: Mission,
    pub other_flights: Vec<FlightMission>,
    pub mission_duration_s: f64,
    pub description: String,
}

/// Category of a detected conflict.
///
/// Classification currently only ever produces `Spatial`; `Temporal` and
/// `Trajectory` are reserved for callers that filter on category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictType {
    /// Proximity violation at a shared instant
    Spatial,
    /// Reserved: same volume, overlapping windows
    Temporal,
    /// Reserved: path intersection irrespective of timing
    Trajectory,
}

/// Severity bands for proximity violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
}

/// A single separation violation between the primary and another flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub conflict_type: ConflictType,
    pub time_s: f64,
    /// Midpoint between the two aircraft at the conflict instant.
    pub location: Position,
    pub distance_m: f64,
    pub safety_buffer_m: f64,
    pub severity: ConflictSeverity,
    /// Normalized buffer penetration: 0 at the boundary, 1 at zero separation.
    pub severity_score: f64,
    pub other_flight_id: String,
    pub description: String,
    pub primary_position: Position,
    pub other_position: Position,
}

/// Aggregate counters for one `check_conflicts` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictSummary {
    /// |primary samples| x |other samples| summed over flight pairs.
    pub total_checks: u64,
    pub spatial_violations: u64,
    pub temporal_violations: u64,
    pub safe_segments: u64,
}

/// Full result of a deconfliction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Sorted by (severity_score, time) ascending.
    pub conflicts: Vec<Conflict>,
    pub summary: ConflictSummary,
    pub is_safe: bool,
    pub total_conflicts: usize,
}

/// Structural problems in caller-supplied waypoints.
///
/// Validation happens at the boundary. The sampler itself accepts anything
/// and degrades to empty output instead of raising.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaypointError {
    #[error("mission requires at least 2 waypoints, got {0}")]
    TooFew(usize),
    #[error("waypoint {0} has no altitude")]
    MissingAltitude(usize),
    #[error("waypoint {0} has a non-finite coordinate")]
    NonFinite(usize),
    #[error("waypoint {0} is outside the +/-{max:.0}m operating area", max = MAX_COORDINATE_M)]
    OutOfBounds(usize),
    #[error("waypoint {0} altitude must be within 0..={max:.0}m", max = MAX_ALTITUDE_M)]
    AltitudeOutOfRange(usize),
}

/// Validate waypoint structure and coordinate ranges.
///
/// Requires at least two waypoints, each with a present, finite x/y/z inside
/// the operating limits. A missing `time_s` is fine; a missing `z` is not,
/// even though the sampler would default it.
pub fn validate_waypoints(waypoints: &[Waypoint]) -> Result<(), WaypointError> {
    if waypoints.len() < 2 {
        return Err(WaypointError::TooFew(waypoints.len()));
    }

    for (index, wp) in waypoints.iter().enumerate() {
        let z = wp.z.ok_or(WaypointError::MissingAltitude(index))?;
        if !wp.x.is_finite() || !wp.y.is_finite() || !z.is_finite() {
            return Err(WaypointError::NonFinite(index));
        }
        if wp.x.abs() > MAX_COORDINATE_M || wp.y.abs() > MAX_COORDINATE_M {
            return Err(WaypointError::OutOfBounds(index));
        }
        if !(0.0..=MAX_ALTITUDE_M).contains(&z) {
            return Err(WaypointError::AltitudeOutOfRange(index));
        }
    }

    Ok(())
}

/// Boolean form of [`validate_waypoints`] for callers that only gate.
pub fn waypoints_valid(waypoints: &[Waypoint]) -> bool {
    validate_waypoints(waypoints).is_ok()
}
