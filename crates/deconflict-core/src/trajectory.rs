//! Trajectory sampling: sparse waypoint missions to dense 4D paths.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{Position, TrajectoryPoint, Waypoint};
use crate::rules::SamplerConfig;
use crate::spatial;

/// A waypoint pinned to an absolute mission time.
#[derive(Debug, Clone)]
struct TimedWaypoint {
    time_s: f64,
    x: f64,
    y: f64,
    z: f64,
}

impl TimedWaypoint {
    fn position(&self) -> Position {
        Position {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }
}

/// Converts waypoint missions into dense, time-ordered trajectories.
pub struct TrajectorySampler {
    config: SamplerConfig,
}

impl Default for TrajectorySampler {
    fn default() -> Self {
        Self::new(SamplerConfig::default())
    }
}

impl TrajectorySampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// Sample a waypoint mission over `[start_time_s, end_time_s]`.
    ///
    /// Produces one point per `time_step_s` starting at `start_time_s`, plus
    /// a zero-speed point pinned to `end_time_s` whenever the stepped grid
    /// falls short of it. Fewer than two waypoints, or a degenerate step,
    /// yields an empty trajectory rather than an error.
    pub fn calculate_trajectory(
        &self,
        waypoints: &[Waypoint],
        start_time_s: f64,
        end_time_s: f64,
        time_step_s: f64,
    ) -> Vec<TrajectoryPoint> {
        if waypoints.len() < 2 || !time_step_s.is_finite() || time_step_s <= 0.0 {
            return Vec::new();
        }

        let normalized = self.normalize_waypoint_times(waypoints, start_time_s, end_time_s);

        let mut points = Vec::new();
        let mut time_s = start_time_s;
        while time_s <= end_time_s {
            if let Some(position) = position_at(&normalized, time_s) {
                points.push(TrajectoryPoint {
                    time_s,
                    x: position.x,
                    y: position.y,
                    z: position.z,
                    speed_mps: self.speed_at(&normalized, time_s),
                    heading_deg: heading_at(&normalized, time_s),
                });
            }
            time_s += time_step_s;
        }

        // The stepped grid usually falls short of the window end; pin the
        // final waypoint there as a stop point.
        if let (Some(last), Some(final_wp)) = (points.last(), normalized.last()) {
            if last.time_s < end_time_s {
                let heading_deg = last.heading_deg;
                points.push(TrajectoryPoint {
                    time_s: end_time_s,
                    x: final_wp.x,
                    y: final_wp.y,
                    z: final_wp.z,
                    speed_mps: 0.0,
                    heading_deg,
                });
            }
        }

        points
    }

    /// Rescale waypoint times into the mission window.
    ///
    /// When every waypoint carries a time, each is rescaled proportionally to
    /// the maximum raw time found in the set (anchored at zero, not at the
    /// earliest waypoint). Otherwise indices are spread evenly across the
    /// window. Output is sorted by normalized time.
    fn normalize_waypoint_times(
        &self,
        waypoints: &[Waypoint],
        start_time_s: f64,
        end_time_s: f64,
    ) -> Vec<TimedWaypoint> {
        let duration_s = end_time_s - start_time_s;
        let default_altitude_m = self.config.default_altitude_m;

        let raw_times: Option<Vec<f64>> = waypoints.iter().map(|wp| wp.time_s).collect();
        let max_raw = raw_times
            .as_ref()
            .map(|times| times.iter().copied().fold(f64::NEG_INFINITY, f64::max));

        let mut normalized: Vec<TimedWaypoint> = match (raw_times, max_raw) {
            (Some(times), Some(max_raw)) if max_raw > 0.0 => waypoints
                .iter()
                .zip(times)
                .map(|(wp, raw)| TimedWaypoint {
                    time_s: start_time_s + raw / max_raw * duration_s,
                    x: wp.x,
                    y: wp.y,
                    z: wp.z.unwrap_or(default_altitude_m),
                })
                .collect(),
            // Index spreading covers both missing times and raw times that
            // cannot anchor a rescale (max <= 0).
            _ => {
                let last_index = (waypoints.len() - 1).max(1) as f64;
                waypoints
                    .iter()
                    .enumerate()
                    .map(|(i, wp)| TimedWaypoint {
                        time_s: start_time_s + i as f64 / last_index * duration_s,
                        x: wp.x,
                        y: wp.y,
                        z: wp.z.unwrap_or(default_altitude_m),
                    })
                    .collect()
            }
        };

        normalized.sort_by(|a, b| a.time_s.partial_cmp(&b.time_s).unwrap_or(Ordering::Equal));
        normalized
    }

    /// Speed over the segment containing an instant, clamped to the
    /// configured limits. Instants outside every segment get the default.
    fn speed_at(&self, waypoints: &[TimedWaypoint], time_s: f64) -> f64 {
        if waypoints.len() < 2 {
            return self.config.default_speed_mps;
        }

        for pair in waypoints.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.time_s <= time_s && time_s <= b.time_s {
                let span_s = b.time_s - a.time_s;
                if span_s > 0.0 {
                    let distance_m = spatial::distance_3d(&a.position(), &b.position());
                    return (distance_m / span_s)
                        .clamp(self.config.min_speed_mps, self.config.max_speed_mps);
                }
            }
        }

        self.config.default_speed_mps
    }
}

/// Interpolated position at an instant, clamped to the waypoint span.
fn position_at(waypoints: &[TimedWaypoint], time_s: f64) -> Option<Position> {
    let first = waypoints.first()?;
    let last = waypoints.last()?;

    if time_s <= first.time_s {
        return Some(first.position());
    }
    if time_s >= last.time_s {
        return Some(last.position());
    }

    for pair in waypoints.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let span_s = b.time_s - a.time_s;
        if a.time_s <= time_s && time_s <= b.time_s && span_s > 0.0 {
            let ratio = (time_s - a.time_s) / span_s;
            return Some(Position {
                x: a.x + ratio * (b.x - a.x),
                y: a.y + ratio * (b.y - a.y),
                z: a.z + ratio * (b.z - a.z),
            });
        }
    }

    Some(last.position())
}

/// Direction of travel of the segment containing an instant, in degrees
/// (raw `atan2` range). 0 when no segment brackets the instant.
fn heading_at(waypoints: &[TimedWaypoint], time_s: f64) -> f64 {
    if waypoints.len() < 2 {
        return 0.0;
    }

    for pair in waypoints.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.time_s <= time_s && time_s <= b.time_s {
            return (b.y - a.y).atan2(b.x - a.x).to_degrees();
        }
    }

    0.0
}

/// Aggregate metrics for a sampled trajectory.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TrajectoryMetrics {
    pub total_distance_m: f64,
    pub duration_s: f64,
    pub average_speed_mps: f64,
    pub max_speed_mps: f64,
    pub average_altitude_m: f64,
    pub min_altitude_m: f64,
    pub max_altitude_m: f64,
    pub altitude_range_m: f64,
    pub total_points: usize,
}

/// Compute distance/speed/altitude aggregates over a trajectory.
///
/// Speeds are re-derived from consecutive samples rather than read from the
/// recorded `speed_mps` field. Fewer than two points yields the zero default.
pub fn trajectory_metrics(trajectory: &[TrajectoryPoint]) -> TrajectoryMetrics {
    if trajectory.len() < 2 {
        return TrajectoryMetrics::default();
    }

    let mut total_distance_m = 0.0;
    let mut max_speed_mps: f64 = 0.0;
    let mut min_altitude_m = f64::INFINITY;
    let mut max_altitude_m = f64::NEG_INFINITY;

    for pair in trajectory.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let segment_m = spatial::distance_3d(&a.position(), &b.position());
        total_distance_m += segment_m;

        let span_s = b.time_s - a.time_s;
        if span_s > 0.0 {
            max_speed_mps = max_speed_mps.max(segment_m / span_s);
        }

        min_altitude_m = min_altitude_m.min(a.z);
        max_altitude_m = max_altitude_m.max(a.z);
    }

    let last = &trajectory[trajectory.len() - 1];
    min_altitude_m = min_altitude_m.min(last.z);
    max_altitude_m = max_altitude_m.max(last.z);

    let duration_s = last.time_s - trajectory[0].time_s;
    let average_speed_mps = if duration_s > 0.0 {
        total_distance_m / duration_s
    } else {
        0.0
    };
    let average_altitude_m = trajectory.iter().map(|p| p.z).sum::<f64>() / trajectory.len() as f64;

    TrajectoryMetrics {
        total_distance_m,
        duration_s,
        average_speed_mps,
        max_speed_mps,
        average_altitude_m,
        min_altitude_m,
        max_altitude_m,
        altitude_range_m: max_altitude_m - min_altitude_m,
        total_points: trajectory.len(),
    }
}

/// Exponential three-point smoothing over interior points.
///
/// Endpoints stay untouched; only coordinates move, timing and kinematics
/// stay as sampled.
pub fn smooth_trajectory(
    trajectory: &[TrajectoryPoint],
    smoothing_factor: f64,
) -> Vec<TrajectoryPoint> {
    if trajectory.len() < 3 {
        return trajectory.to_vec();
    }

    let mut smoothed = Vec::with_capacity(trajectory.len());
    smoothed.push(trajectory[0].clone());

    for window in trajectory.windows(3) {
        let (prev, curr, next) = (&window[0], &window[1], &window[2]);
        let mut point = curr.clone();
        point.x = curr.x + smoothing_factor * ((prev.x + next.x) / 2.0 - curr.x);
        point.y = curr.y + smoothing_factor * ((prev.y + next.y) / 2.0 - curr.y);
        point.z = curr.z + smoothing_factor * ((prev.z + next.z) / 2.0 - curr.z);
        smoothed.push(point);
    }

    smoothed.push(trajectory[trajectory.len() - 1].clone());
    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sampler() -> TrajectorySampler {
        TrajectorySampler::default()
    }

    #[test]
    fn fewer_than_two_waypoints_yields_empty_trajectory() {
        let s = sampler();
        assert!(s.calculate_trajectory(&[], 0.0, 100.0, 5.0).is_empty());

        let one = vec![Waypoint::new(0.0, 0.0, 50.0, 0.0)];
        assert!(s.calculate_trajectory(&one, 0.0, 100.0, 5.0).is_empty());
    }

    #[test]
    fn degenerate_time_step_yields_empty_trajectory() {
        let waypoints = vec![
            Waypoint::new(0.0, 0.0, 50.0, 0.0),
            Waypoint::new(100.0, 0.0, 50.0, 100.0),
        ];
        let s = sampler();
        assert!(s.calculate_trajectory(&waypoints, 0.0, 100.0, 0.0).is_empty());
        assert!(s.calculate_trajectory(&waypoints, 0.0, 100.0, -5.0).is_empty());
    }

    #[test]
    fn samples_cover_window_and_interpolate_linearly() {
        let waypoints = vec![
            Waypoint::new(0.0, 0.0, 50.0, 0.0),
            Waypoint::new(100.0, 0.0, 50.0, 100.0),
        ];
        let trajectory = sampler().calculate_trajectory(&waypoints, 0.0, 100.0, 10.0);

        assert_eq!(trajectory.len(), 11);
        assert_relative_eq!(trajectory[0].time_s, 0.0);
        assert_relative_eq!(trajectory.last().unwrap().time_s, 100.0);
        assert_relative_eq!(trajectory[5].x, 50.0);
        assert_relative_eq!(trajectory[5].y, 0.0);

        for point in &trajectory {
            assert!((5.0..=30.0).contains(&point.speed_mps));
        }
    }

    #[test]
    fn appends_stop_point_when_grid_misses_window_end() {
        let waypoints = vec![
            Waypoint::new(0.0, 0.0, 60.0, 0.0),
            Waypoint::new(50.0, 50.0, 60.0, 100.0),
        ];
        let trajectory = sampler().calculate_trajectory(&waypoints, 0.0, 103.0, 10.0);

        let last = trajectory.last().unwrap();
        assert_relative_eq!(last.time_s, 103.0);
        assert_relative_eq!(last.x, 50.0);
        assert_relative_eq!(last.y, 50.0);
        assert_relative_eq!(last.speed_mps, 0.0);

        let previous = &trajectory[trajectory.len() - 2];
        assert_relative_eq!(last.heading_deg, previous.heading_deg);
        assert!(previous.time_s < last.time_s);
    }

    #[test]
    fn speed_clamped_to_limits() {
        // 1 m/s nominal -> clamped up to 5; 100 m/s nominal -> clamped to 30.
        let slow = vec![
            Waypoint::new(0.0, 0.0, 50.0, 0.0),
            Waypoint::new(100.0, 0.0, 50.0, 100.0),
        ];
        let fast = vec![
            Waypoint::new(0.0, 0.0, 50.0, 0.0),
            Waypoint::new(10_000.0, 0.0, 50.0, 100.0),
        ];

        let s = sampler();
        let slow_traj = s.calculate_trajectory(&slow, 0.0, 100.0, 20.0);
        let fast_traj = s.calculate_trajectory(&fast, 0.0, 100.0, 20.0);

        assert_relative_eq!(slow_traj[1].speed_mps, 5.0);
        assert_relative_eq!(fast_traj[1].speed_mps, 30.0);
    }

    #[test]
    fn normalization_is_anchored_at_max_raw_time() {
        // Raw times 50 and 100 over a 0..100 window land at 50 and 100, not
        // 0 and 100: the rescale divides by the max only.
        let waypoints = vec![
            Waypoint::new(0.0, 0.0, 50.0, 50.0),
            Waypoint::new(100.0, 0.0, 50.0, 100.0),
        ];
        let trajectory = sampler().calculate_trajectory(&waypoints, 0.0, 100.0, 10.0);

        // Before the first normalized waypoint the position clamps to it and
        // no segment brackets the instant, so speed falls back to the default.
        assert_relative_eq!(trajectory[0].x, 0.0);
        assert_relative_eq!(trajectory[4].x, 0.0);
        assert_relative_eq!(trajectory[0].speed_mps, 15.0);
        // Halfway through the 50..100 segment.
        assert_relative_eq!(trajectory[7].x, 40.0);
    }

    #[test]
    fn waypoints_without_times_spread_evenly() {
        let waypoints = vec![
            Waypoint {
                x: 0.0,
                y: 0.0,
                z: Some(50.0),
                time_s: None,
            },
            Waypoint {
                x: 100.0,
                y: 0.0,
                z: Some(50.0),
                time_s: None,
            },
            Waypoint {
                x: 100.0,
                y: 100.0,
                z: Some(50.0),
                time_s: None,
            },
        ];
        let trajectory = sampler().calculate_trajectory(&waypoints, 0.0, 200.0, 50.0);

        // Second waypoint lands at the window midpoint.
        assert_relative_eq!(trajectory[2].time_s, 100.0);
        assert_relative_eq!(trajectory[2].x, 100.0);
        assert_relative_eq!(trajectory[2].y, 0.0);
    }

    #[test]
    fn missing_altitude_defaults_during_sampling() {
        let waypoints = vec![
            Waypoint {
                x: 0.0,
                y: 0.0,
                z: None,
                time_s: Some(0.0),
            },
            Waypoint {
                x: 100.0,
                y: 0.0,
                z: None,
                time_s: Some(100.0),
            },
        ];
        let trajectory = sampler().calculate_trajectory(&waypoints, 0.0, 100.0, 25.0);
        for point in &trajectory {
            assert_relative_eq!(point.z, 50.0);
        }
    }

    #[test]
    fn heading_follows_segment_direction() {
        let waypoints = vec![
            Waypoint::new(0.0, 0.0, 50.0, 0.0),
            Waypoint::new(0.0, 100.0, 50.0, 100.0),
        ];
        let trajectory = sampler().calculate_trajectory(&waypoints, 0.0, 100.0, 50.0);
        assert_relative_eq!(trajectory[1].heading_deg, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn metrics_over_constant_speed_leg() {
        let trajectory = sampler().calculate_trajectory(
            &[
                Waypoint::new(0.0, 0.0, 50.0, 0.0),
                Waypoint::new(1_000.0, 0.0, 50.0, 100.0),
            ],
            0.0,
            100.0,
            10.0,
        );
        let metrics = trajectory_metrics(&trajectory);

        assert_relative_eq!(metrics.total_distance_m, 1_000.0, epsilon = 1e-6);
        assert_relative_eq!(metrics.duration_s, 100.0);
        assert_relative_eq!(metrics.average_speed_mps, 10.0, epsilon = 1e-6);
        assert_relative_eq!(metrics.min_altitude_m, 50.0);
        assert_relative_eq!(metrics.max_altitude_m, 50.0);
        assert_eq!(metrics.total_points, 11);
    }

    #[test]
    fn metrics_empty_for_short_trajectories() {
        assert_eq!(trajectory_metrics(&[]).total_points, 0);
    }

    #[test]
    fn smoothing_moves_interior_points_only() {
        let trajectory = vec![
            TrajectoryPoint {
                time_s: 0.0,
                x: 0.0,
                y: 0.0,
                z: 50.0,
                speed_mps: 10.0,
                heading_deg: 0.0,
            },
            TrajectoryPoint {
                time_s: 10.0,
                x: 10.0,
                y: 5.0,
                z: 50.0,
                speed_mps: 10.0,
                heading_deg: 0.0,
            },
            TrajectoryPoint {
                time_s: 20.0,
                x: 20.0,
                y: 0.0,
                z: 50.0,
                speed_mps: 10.0,
                heading_deg: 0.0,
            },
        ];

        let smoothed = smooth_trajectory(&trajectory, 0.1);
        assert_eq!(smoothed.len(), 3);
        assert_relative_eq!(smoothed[0].y, 0.0);
        assert_relative_eq!(smoothed[2].y, 0.0);
        // Interior point pulled a tenth of the way toward the neighbor mean.
        assert_relative_eq!(smoothed[1].y, 4.5);
        assert_relative_eq!(smoothed[1].x, 10.0);
    }

    #[test]
    fn smoothing_short_trajectory_is_identity() {
        let trajectory = vec![
            TrajectoryPoint {
                time_s: 0.0,
                x: 0.0,
                y: 0.0,
                z: 50.0,
                speed_mps: 10.0,
                heading_deg: 0.0,
            },
            TrajectoryPoint {
                time_s: 10.0,
                x: 10.0,
                y: 0.0,
                z: 50.0,
                speed_mps: 10.0,
                heading_deg: 0.0,
            },
        ];
        let smoothed = smooth_trajectory(&trajectory, 0.5);
        assert_eq!(smoothed.len(), 2);
        assert_relative_eq!(smoothed[1].x, 10.0);
    }
}
