//! Pre-defined mission scenarios for exercising the deconfliction pipeline.
//!
//! Each constructor returns a complete [`Scenario`]: a primary mission plus
//! background flights with known separation characteristics.

use deconflict_core::{FlightMission, Mission, Scenario, ScenarioKind, Waypoint};
use rand::Rng;

/// Operating volume for generated background traffic, in local meters.
#[derive(Debug, Clone, Copy)]
pub struct AirspaceBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl Default for AirspaceBounds {
    fn default() -> Self {
        Self {
            x_min: -200.0,
            x_max: 200.0,
            y_min: -200.0,
            y_max: 200.0,
            z_min: 30.0,
            z_max: 120.0,
        }
    }
}

fn mission(waypoints: Vec<Waypoint>, start_time_s: f64, end_time_s: f64) -> Mission {
    Mission {
        waypoints,
        start_time_s,
        end_time_s,
    }
}

fn flight(id: &str, waypoints: Vec<Waypoint>, start_time_s: f64, end_time_s: f64) -> FlightMission {
    FlightMission {
        flight_id: id.to_string(),
        mission: mission(waypoints, start_time_s, end_time_s),
    }
}

/// Well-separated trajectories with no conflicts.
pub fn create_conflict_free_scenario() -> Scenario {
    let primary = mission(
        vec![
            Waypoint::new(0.0, 0.0, 60.0, 0.0),
            Waypoint::new(80.0, 0.0, 60.0, 60.0),
            Waypoint::new(80.0, 80.0, 70.0, 120.0),
            Waypoint::new(0.0, 80.0, 70.0, 180.0),
            Waypoint::new(0.0, 0.0, 60.0, 240.0),
        ],
        0.0,
        240.0,
    );

    Scenario {
        kind: ScenarioKind::ConflictFree,
        mission_duration_s: primary.duration_s(),
        primary_mission: primary,
        other_flights: vec![
            flight(
                "UAV_002",
                vec![
                    Waypoint::new(-100.0, -50.0, 45.0, 0.0),
                    Waypoint::new(-100.0, 50.0, 45.0, 100.0),
                    Waypoint::new(-150.0, 50.0, 50.0, 200.0),
                ],
                30.0,
                230.0,
            ),
            flight(
                "UAV_003",
                vec![
                    Waypoint::new(150.0, 100.0, 90.0, 0.0),
                    Waypoint::new(120.0, 150.0, 90.0, 80.0),
                    Waypoint::new(180.0, 150.0, 85.0, 160.0),
                ],
                60.0,
                220.0,
            ),
        ],
        description: "Well-separated trajectories with no conflicts".to_string(),
    }
}

/// Trajectories crossing paths at overlapping times.
pub fn create_spatial_conflict_scenario() -> Scenario {
    let primary = mission(
        vec![
            Waypoint::new(-50.0, -50.0, 60.0, 0.0),
            Waypoint::new(0.0, 0.0, 60.0, 60.0),
            Waypoint::new(50.0, 50.0, 60.0, 120.0),
            Waypoint::new(100.0, 100.0, 65.0, 180.0),
        ],
        0.0,
        180.0,
    );

    Scenario {
        kind: ScenarioKind::SpatialConflict,
        mission_duration_s: primary.duration_s(),
        primary_mission: primary,
        other_flights: vec![
            flight(
                "UAV_CONFLICT",
                vec![
                    Waypoint::new(50.0, -50.0, 55.0, 0.0),
                    Waypoint::new(0.0, 0.0, 55.0, 60.0),
                    Waypoint::new(-50.0, 50.0, 55.0, 120.0),
                ],
                20.0,
                140.0,
            ),
            flight(
                "UAV_SAFE",
                vec![
                    Waypoint::new(-100.0, 100.0, 80.0, 0.0),
                    Waypoint::new(-80.0, 120.0, 80.0, 100.0),
                ],
                0.0,
                100.0,
            ),
        ],
        description: "Trajectories crossing with spatial conflicts".to_string(),
    }
}

/// Shared corridor used at overlapping and offset times.
pub fn create_temporal_conflict_scenario() -> Scenario {
    let primary = mission(
        vec![
            Waypoint::new(0.0, 0.0, 50.0, 0.0),
            Waypoint::new(40.0, 40.0, 50.0, 60.0),
            Waypoint::new(80.0, 80.0, 55.0, 120.0),
            Waypoint::new(120.0, 120.0, 55.0, 180.0),
        ],
        0.0,
        180.0,
    );

    Scenario {
        kind: ScenarioKind::TemporalConflict,
        mission_duration_s: primary.duration_s(),
        primary_mission: primary,
        other_flights: vec![
            flight(
                "UAV_EARLIER",
                vec![
                    Waypoint::new(120.0, 120.0, 45.0, 0.0),
                    Waypoint::new(80.0, 80.0, 45.0, 60.0),
                    Waypoint::new(40.0, 40.0, 50.0, 120.0),
                    Waypoint::new(0.0, 0.0, 50.0, 180.0),
                ],
                -60.0,
                120.0,
            ),
            flight(
                "UAV_OVERLAP",
                vec![
                    Waypoint::new(20.0, 20.0, 48.0, 0.0),
                    Waypoint::new(60.0, 60.0, 48.0, 80.0),
                    Waypoint::new(100.0, 100.0, 52.0, 160.0),
                ],
                40.0,
                200.0,
            ),
        ],
        description: "Temporal overlaps in shared corridor usage".to_string(),
    }
}

/// Flights stacked at similar altitudes over the same ground track.
pub fn create_altitude_conflict_scenario() -> Scenario {
    let primary = mission(
        vec![
            Waypoint::new(0.0, 0.0, 60.0, 0.0),
            Waypoint::new(50.0, 30.0, 65.0, 80.0),
            Waypoint::new(100.0, 0.0, 70.0, 160.0),
            Waypoint::new(100.0, -30.0, 65.0, 240.0),
        ],
        0.0,
        240.0,
    );

    Scenario {
        kind: ScenarioKind::AltitudeConflict,
        mission_duration_s: primary.duration_s(),
        primary_mission: primary,
        other_flights: vec![
            flight(
                "UAV_LOW",
                vec![
                    Waypoint::new(20.0, 10.0, 55.0, 0.0),
                    Waypoint::new(70.0, 20.0, 60.0, 100.0),
                    Waypoint::new(90.0, 10.0, 65.0, 180.0),
                ],
                30.0,
                210.0,
            ),
            flight(
                "UAV_HIGH",
                vec![
                    Waypoint::new(10.0, -10.0, 75.0, 0.0),
                    Waypoint::new(60.0, 0.0, 70.0, 120.0),
                    Waypoint::new(110.0, -20.0, 68.0, 200.0),
                ],
                60.0,
                260.0,
            ),
        ],
        description: "Altitude separation conflicts in 3D space".to_string(),
    }
}

/// Multiple flights with a mix of crossings and near misses.
pub fn create_complex_scenario() -> Scenario {
    let primary = mission(
        vec![
            Waypoint::new(0.0, 0.0, 50.0, 0.0),
            Waypoint::new(60.0, 40.0, 60.0, 80.0),
            Waypoint::new(40.0, 80.0, 70.0, 160.0),
            Waypoint::new(-20.0, 60.0, 65.0, 240.0),
            Waypoint::new(-40.0, 20.0, 55.0, 320.0),
            Waypoint::new(0.0, 0.0, 50.0, 400.0),
        ],
        0.0,
        400.0,
    );

    Scenario {
        kind: ScenarioKind::Complex,
        mission_duration_s: primary.duration_s(),
        primary_mission: primary,
        other_flights: vec![
            flight(
                "UAV_ALPHA",
                vec![
                    Waypoint::new(80.0, 20.0, 45.0, 0.0),
                    Waypoint::new(20.0, 60.0, 55.0, 120.0),
                    Waypoint::new(-30.0, 40.0, 60.0, 200.0),
                ],
                50.0,
                250.0,
            ),
            flight(
                "UAV_BETA",
                vec![
                    Waypoint::new(-60.0, -20.0, 80.0, 0.0),
                    Waypoint::new(0.0, 40.0, 75.0, 150.0),
                    Waypoint::new(60.0, 80.0, 70.0, 300.0),
                ],
                100.0,
                400.0,
            ),
            flight(
                "UAV_GAMMA",
                vec![
                    Waypoint::new(40.0, -40.0, 35.0, 0.0),
                    Waypoint::new(0.0, 0.0, 45.0, 80.0),
                    Waypoint::new(-40.0, 40.0, 50.0, 160.0),
                ],
                0.0,
                160.0,
            ),
        ],
        description: "Complex multi-drone scenario with various conflict types".to_string(),
    }
}

/// Wrap caller-provided waypoints in a scenario with random background traffic.
pub fn create_custom_scenario(
    waypoints: Vec<Waypoint>,
    start_time_s: f64,
    end_time_s: f64,
) -> Scenario {
    Scenario {
        kind: ScenarioKind::Custom,
        primary_mission: mission(waypoints, start_time_s, end_time_s),
        other_flights: generate_background_traffic(3),
        mission_duration_s: end_time_s - start_time_s,
        description: "Custom user-defined mission".to_string(),
    }
}

/// Random background flights inside the default airspace bounds.
pub fn generate_background_traffic(count: usize) -> Vec<FlightMission> {
    let bounds = AirspaceBounds::default();
    let mut rng = rand::rng();
    let mut flights = Vec::with_capacity(count);

    for i in 0..count {
        let waypoint_count = rng.random_range(3..=6);
        let mut waypoints = Vec::with_capacity(waypoint_count);
        for j in 0..waypoint_count {
            waypoints.push(Waypoint::new(
                rng.random_range(bounds.x_min..bounds.x_max),
                rng.random_range(bounds.y_min..bounds.y_max),
                rng.random_range(bounds.z_min..bounds.z_max),
                j as f64 * rng.random_range(60.0..120.0),
            ));
        }

        let last_time_s = waypoints
            .last()
            .and_then(|wp| wp.time_s)
            .unwrap_or_default();
        flights.push(flight(
            &format!("BG_{:03}", i + 1),
            waypoints,
            rng.random_range(-60.0..120.0),
            last_time_s + rng.random_range(30.0..90.0),
        ));
    }

    flights
}
