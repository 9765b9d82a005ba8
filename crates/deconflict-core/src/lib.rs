//! UAV strategic deconfliction: trajectory sampling and pairwise
//! spatial-temporal conflict detection over waypoint missions.

pub mod conflict;
pub mod models;
pub mod report;
pub mod rules;
pub mod spatial;
pub mod trajectory;

pub use conflict::{
    conflict_zones, suggest_resolutions, ConflictDetector, ConflictZone, ResolutionKind,
    ResolutionPriority, ResolutionSuggestion,
};
pub use models::{
    validate_waypoints, waypoints_valid, Conflict, ConflictReport, ConflictSeverity,
    ConflictSummary, ConflictType, Flight, FlightMission, Mission, Position, Scenario,
    ScenarioKind, TrajectoryPoint, Waypoint, WaypointError,
};
pub use report::{
    buffer_recommendations, export_mission_data, format_time, validate_mission_timing,
    AnalysisParameters, BufferRecommendation, ExportData, RecommendationKind,
};
pub use rules::{SafetyRules, SamplerConfig};
pub use spatial::{bearing_deg, distance_2d, distance_3d, interpolate_position};
pub use trajectory::{smooth_trajectory, trajectory_metrics, TrajectoryMetrics, TrajectorySampler};
