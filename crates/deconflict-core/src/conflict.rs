//! Pairwise conflict detection between sampled trajectories.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{
    Conflict, ConflictReport, ConflictSeverity, ConflictSummary, ConflictType, Flight, Position,
    TrajectoryPoint,
};
use crate::rules::SafetyRules;
use crate::spatial;

/// Conflict zones extend this far (seconds) either side of the violation.
const ZONE_WINDOW_S: f64 = 10.0;

/// Detects separation violations between a primary trajectory and other
/// flights, each pair reconciled onto a merged time base.
pub struct ConflictDetector {
    rules: SafetyRules,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new(SafetyRules::default())
    }
}

impl ConflictDetector {
    pub fn new(rules: SafetyRules) -> Self {
        Self { rules }
    }

    /// The rules this detector classifies with.
    pub fn rules(&self) -> &SafetyRules {
        &self.rules
    }

    /// Check the primary trajectory against every other flight.
    ///
    /// Violations from all pairs are concatenated and stable-sorted by
    /// (severity_score, time) ascending, least severe and earliest first.
    /// `total_checks` counts |primary| x |other| per pair, not the merged
    /// instants actually probed.
    pub fn check_conflicts(
        &self,
        primary: &[TrajectoryPoint],
        other_flights: &[Flight],
        safety_buffer_m: f64,
    ) -> ConflictReport {
        let mut conflicts = Vec::new();
        let mut summary = ConflictSummary::default();

        for flight in other_flights {
            conflicts.extend(self.detect_pair_conflicts(
                primary,
                &flight.trajectory,
                &flight.flight_id,
                safety_buffer_m,
            ));
            summary.total_checks += (primary.len() * flight.trajectory.len()) as u64;
        }

        for conflict in &conflicts {
            match conflict.conflict_type {
                ConflictType::Spatial => summary.spatial_violations += 1,
                ConflictType::Temporal => summary.temporal_violations += 1,
                ConflictType::Trajectory => {}
            }
        }

        conflicts.sort_by(|a, b| {
            a.severity_score
                .partial_cmp(&b.severity_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.time_s.partial_cmp(&b.time_s).unwrap_or(Ordering::Equal))
        });

        ConflictReport {
            is_safe: conflicts.is_empty(),
            total_conflicts: conflicts.len(),
            summary,
            conflicts,
        }
    }

    fn detect_pair_conflicts(
        &self,
        primary: &[TrajectoryPoint],
        other: &[TrajectoryPoint],
        other_flight_id: &str,
        safety_buffer_m: f64,
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        for time_s in merged_time_base(primary, other) {
            let (Some(primary_pos), Some(other_pos)) = (
                position_at_time(primary, time_s),
                position_at_time(other, time_s),
            ) else {
                // No sample support on one side at this instant.
                continue;
            };

            let distance_m = spatial::distance_3d(&primary_pos, &other_pos);
            if distance_m < safety_buffer_m {
                conflicts.push(self.build_conflict(
                    primary_pos,
                    other_pos,
                    time_s,
                    distance_m,
                    other_flight_id,
                    safety_buffer_m,
                ));
            }
        }

        conflicts
    }

    fn build_conflict(
        &self,
        primary_pos: Position,
        other_pos: Position,
        time_s: f64,
        distance_m: f64,
        other_flight_id: &str,
        safety_buffer_m: f64,
    ) -> Conflict {
        Conflict {
            conflict_type: ConflictType::Spatial,
            time_s,
            location: Position {
                x: (primary_pos.x + other_pos.x) / 2.0,
                y: (primary_pos.y + other_pos.y) / 2.0,
                z: (primary_pos.z + other_pos.z) / 2.0,
            },
            distance_m,
            safety_buffer_m,
            severity: self.classify_severity(distance_m, safety_buffer_m),
            severity_score: Self::severity_score(distance_m, safety_buffer_m),
            other_flight_id: other_flight_id.to_string(),
            description: format!("Drones within {distance_m:.1}m at time {time_s:.0}s"),
            primary_position: primary_pos,
            other_position: other_pos,
        }
    }

    /// Normalized buffer penetration: 0 at the boundary, 1 at zero separation.
    pub fn severity_score(distance_m: f64, safety_buffer_m: f64) -> f64 {
        ((safety_buffer_m - distance_m) / safety_buffer_m).max(0.0)
    }

    /// Band a violation distance against the rules' buffer fractions.
    pub fn classify_severity(&self, distance_m: f64, safety_buffer_m: f64) -> ConflictSeverity {
        if distance_m < safety_buffer_m * self.rules.high_severity_fraction {
            ConflictSeverity::High
        } else if distance_m < safety_buffer_m * self.rules.medium_severity_fraction {
            ConflictSeverity::Medium
        } else {
            ConflictSeverity::Low
        }
    }
}

/// Union of both trajectories' sample times, strictly increasing.
fn merged_time_base(a: &[TrajectoryPoint], b: &[TrajectoryPoint]) -> Vec<f64> {
    let mut times: Vec<f64> = a.iter().chain(b.iter()).map(|p| p.time_s).collect();
    times.sort_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal));
    times.dedup();
    times
}

/// Position of a trajectory at an instant: an exact sample when one exists,
/// otherwise interpolation between the nearest earlier and nearest later
/// samples. One-sided support returns that sample unchanged; no support
/// returns `None` (no extrapolation).
fn position_at_time(trajectory: &[TrajectoryPoint], time_s: f64) -> Option<Position> {
    if let Some(exact) = trajectory.iter().find(|p| p.time_s == time_s) {
        return Some(exact.position());
    }

    let mut before: Option<&TrajectoryPoint> = None;
    let mut after: Option<&TrajectoryPoint> = None;
    for point in trajectory {
        if point.time_s < time_s {
            if before.map_or(true, |b| point.time_s > b.time_s) {
                before = Some(point);
            }
        } else if after.map_or(true, |a| point.time_s < a.time_s) {
            after = Some(point);
        }
    }

    match (before, after) {
        (Some(before), Some(after)) => Some(spatial::interpolate_position(before, after, time_s)),
        (Some(only), None) | (None, Some(only)) => Some(only.position()),
        (None, None) => None,
    }
}

/// Spherical region around a conflict, sized for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictZone {
    pub center: Position,
    pub radius_m: f64,
    pub severity: ConflictSeverity,
    pub time_start_s: f64,
    pub time_end_s: f64,
    pub conflict_id: String,
}

/// Expand each conflict into a renderable zone.
pub fn conflict_zones(conflicts: &[Conflict], buffer_expansion: f64) -> Vec<ConflictZone> {
    conflicts
        .iter()
        .map(|conflict| ConflictZone {
            center: conflict.location,
            radius_m: conflict.safety_buffer_m * buffer_expansion,
            severity: conflict.severity,
            time_start_s: (conflict.time_s - ZONE_WINDOW_S).max(0.0),
            time_end_s: conflict.time_s + ZONE_WINDOW_S,
            conflict_id: format!("{}_{}", conflict.other_flight_id, conflict.time_s),
        })
        .collect()
}

/// Remedy category for a resolution suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    AltitudeChange,
    TimeShift,
    RouteAdjustment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionPriority {
    Immediate,
    High,
    Normal,
}

/// A fixed remedy suggestion for one conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionSuggestion {
    pub kind: ResolutionKind,
    pub description: String,
    pub priority: ResolutionPriority,
    pub conflict_time_s: f64,
    pub affected_flight: String,
}

/// Map each conflict's severity to its fixed remedy. A lookup, not a planner.
pub fn suggest_resolutions(conflicts: &[Conflict]) -> Vec<ResolutionSuggestion> {
    conflicts
        .iter()
        .map(|conflict| {
            let (kind, description, priority) = match conflict.severity {
                ConflictSeverity::High => (
                    ResolutionKind::AltitudeChange,
                    "Recommend altitude separation of ±25m",
                    ResolutionPriority::Immediate,
                ),
                ConflictSeverity::Medium => (
                    ResolutionKind::TimeShift,
                    "Delay mission start by 30-60 seconds",
                    ResolutionPriority::High,
                ),
                ConflictSeverity::Low => (
                    ResolutionKind::RouteAdjustment,
                    "Minor route adjustment to increase separation",
                    ResolutionPriority::Normal,
                ),
            };

            ResolutionSuggestion {
                kind,
                description: description.to_string(),
                priority,
                conflict_time_s: conflict.time_s,
                affected_flight: conflict.other_flight_id.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(time_s: f64, x: f64, y: f64, z: f64) -> TrajectoryPoint {
        TrajectoryPoint {
            time_s,
            x,
            y,
            z,
            speed_mps: 10.0,
            heading_deg: 0.0,
        }
    }

    fn flight(id: &str, trajectory: Vec<TrajectoryPoint>) -> Flight {
        Flight {
            flight_id: id.to_string(),
            trajectory,
        }
    }

    #[test]
    fn no_other_flights_is_safe() {
        let primary = vec![sample(0.0, 0.0, 0.0, 50.0), sample(60.0, 100.0, 0.0, 50.0)];
        let report = ConflictDetector::default().check_conflicts(&primary, &[], 50.0);

        assert!(report.is_safe);
        assert!(report.conflicts.is_empty());
        assert_eq!(report.total_conflicts, 0);
        assert_eq!(report.summary.total_checks, 0);
    }

    #[test]
    fn crossing_at_shared_instant_yields_single_high_conflict() {
        let primary = vec![
            sample(0.0, -500.0, -500.0, 60.0),
            sample(120.0, 50.0, 50.0, 60.0),
            sample(240.0, 500.0, 500.0, 60.0),
        ];
        let other = flight("UAV_002", vec![sample(120.0, 50.0, 50.0, 55.0)]);

        let report = ConflictDetector::default().check_conflicts(&primary, &[other], 50.0);

        assert!(!report.is_safe);
        assert_eq!(report.total_conflicts, 1);
        let conflict = &report.conflicts[0];
        assert_relative_eq!(conflict.time_s, 120.0);
        assert_relative_eq!(conflict.distance_m, 5.0);
        assert_eq!(conflict.severity, ConflictSeverity::High);
        assert_eq!(conflict.conflict_type, ConflictType::Spatial);
        assert_relative_eq!(conflict.severity_score, 0.9);
        assert_relative_eq!(conflict.location.z, 57.5);
        assert_eq!(conflict.other_flight_id, "UAV_002");
        assert_eq!(report.summary.total_checks, 3);
        assert_eq!(report.summary.spatial_violations, 1);
        assert_eq!(report.summary.temporal_violations, 0);
    }

    #[test]
    fn conflict_found_at_interpolated_instant() {
        // The other flight only has a sample at t=120; the primary must be
        // interpolated onto that instant to see the violation.
        let primary = vec![sample(100.0, 0.0, 0.0, 60.0), sample(140.0, 100.0, 0.0, 60.0)];
        let other = flight("UAV_INTERP", vec![sample(120.0, 50.0, 0.0, 50.0)]);

        let report = ConflictDetector::default().check_conflicts(&primary, &[other], 50.0);

        assert_eq!(report.total_conflicts, 1);
        let conflict = &report.conflicts[0];
        assert_relative_eq!(conflict.time_s, 120.0);
        assert_relative_eq!(conflict.distance_m, 10.0);
        assert_relative_eq!(conflict.primary_position.x, 50.0);
    }

    #[test]
    fn separated_trajectories_are_safe() {
        let primary = vec![sample(0.0, 0.0, 0.0, 60.0), sample(100.0, 100.0, 0.0, 60.0)];
        let other = flight(
            "UAV_FAR",
            vec![sample(0.0, 0.0, 500.0, 60.0), sample(100.0, 100.0, 500.0, 60.0)],
        );

        let report = ConflictDetector::default().check_conflicts(&primary, &[other], 50.0);
        assert!(report.is_safe);
        assert_eq!(report.summary.total_checks, 4);
    }

    #[test]
    fn conflicts_sorted_by_score_then_time() {
        // Two flights: one grazing violation (low score) late in the
        // mission, one near-miss (high score) earlier.
        let primary = vec![
            sample(0.0, 0.0, 0.0, 60.0),
            sample(100.0, 1_000.0, 0.0, 60.0),
            sample(200.0, 2_000.0, 0.0, 60.0),
        ];
        let grazing = flight("UAV_GRAZE", vec![sample(200.0, 1_955.0, 0.0, 60.0)]);
        let near = flight("UAV_NEAR", vec![sample(100.0, 998.0, 0.0, 60.0)]);

        let report =
            ConflictDetector::default().check_conflicts(&primary, &[grazing, near], 50.0);

        assert_eq!(report.total_conflicts, 2);
        assert_eq!(report.conflicts[0].other_flight_id, "UAV_GRAZE");
        assert_eq!(report.conflicts[1].other_flight_id, "UAV_NEAR");
        for pair in report.conflicts.windows(2) {
            assert!(pair[0].severity_score <= pair[1].severity_score);
        }
    }

    #[test]
    fn severity_score_boundaries() {
        assert_relative_eq!(ConflictDetector::severity_score(50.0, 50.0), 0.0);
        assert_relative_eq!(ConflictDetector::severity_score(0.0, 50.0), 1.0);
        assert_relative_eq!(ConflictDetector::severity_score(80.0, 50.0), 0.0);
    }

    #[test]
    fn severity_bands_follow_buffer_fractions() {
        let detector = ConflictDetector::default();
        assert_eq!(detector.classify_severity(24.9, 50.0), ConflictSeverity::High);
        assert_eq!(detector.classify_severity(25.0, 50.0), ConflictSeverity::Medium);
        assert_eq!(detector.classify_severity(39.9, 50.0), ConflictSeverity::Medium);
        assert_eq!(detector.classify_severity(40.0, 50.0), ConflictSeverity::Low);
        assert_eq!(detector.classify_severity(49.9, 50.0), ConflictSeverity::Low);
    }

    #[test]
    fn unsupported_instants_are_skipped() {
        // Disjoint single-sample trajectories: every merged instant resolves
        // on both sides via one-sided support, but an empty other trajectory
        // resolves nowhere.
        let primary = vec![sample(0.0, 0.0, 0.0, 60.0)];
        let empty = flight("UAV_EMPTY", Vec::new());

        let report = ConflictDetector::default().check_conflicts(&primary, &[empty], 50.0);
        assert!(report.is_safe);
        assert_eq!(report.summary.total_checks, 0);
    }

    #[test]
    fn zones_expand_buffer_and_clamp_time() {
        let primary = vec![sample(0.0, 0.0, 0.0, 60.0), sample(8.0, 10.0, 0.0, 60.0)];
        let other = flight("UAV_Z", vec![sample(4.0, 5.0, 5.0, 60.0)]);
        let report = ConflictDetector::default().check_conflicts(&primary, &[other], 50.0);

        let zones = conflict_zones(&report.conflicts, 1.5);
        assert_eq!(zones.len(), report.total_conflicts);
        let zone = &zones[0];
        assert_relative_eq!(zone.radius_m, 75.0);
        assert_relative_eq!(zone.time_start_s, 0.0);
        assert!(zone.time_end_s > zone.time_start_s);
        assert!(zone.conflict_id.starts_with("UAV_Z_"));
    }

    #[test]
    fn resolutions_map_severity_to_fixed_remedies() {
        let primary = vec![sample(0.0, 0.0, 0.0, 60.0)];
        let high = flight("UAV_H", vec![sample(0.0, 2.0, 0.0, 60.0)]);
        let medium = flight("UAV_M", vec![sample(0.0, 30.0, 0.0, 60.0)]);
        let low = flight("UAV_L", vec![sample(0.0, 45.0, 0.0, 60.0)]);

        let report =
            ConflictDetector::default().check_conflicts(&primary, &[high, medium, low], 50.0);
        let suggestions = suggest_resolutions(&report.conflicts);

        assert_eq!(suggestions.len(), 3);
        let kinds: Vec<ResolutionKind> = suggestions.iter().map(|s| s.kind).collect();
        assert!(kinds.contains(&ResolutionKind::AltitudeChange));
        assert!(kinds.contains(&ResolutionKind::TimeShift));
        assert!(kinds.contains(&ResolutionKind::RouteAdjustment));

        for suggestion in &suggestions {
            match suggestion.kind {
                ResolutionKind::AltitudeChange => {
                    assert_eq!(suggestion.priority, ResolutionPriority::Immediate)
                }
                ResolutionKind::TimeShift => {
                    assert_eq!(suggestion.priority, ResolutionPriority::High)
                }
                ResolutionKind::RouteAdjustment => {
                    assert_eq!(suggestion.priority, ResolutionPriority::Normal)
                }
            }
        }
    }
}
