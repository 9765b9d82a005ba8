//! Reporting helpers: time formatting, buffer recommendations, mission
//! timing checks, and the export-data assembler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    Conflict, ConflictReport, ConflictSeverity, ConflictSummary, FlightMission, Mission, Scenario,
    ScenarioKind,
};

/// Version stamped into exported analyses.
pub const ANALYSIS_VERSION: &str = "1.0";

/// Format seconds as a human-readable `Nm Ss` string.
///
/// `format_time(125.0)` is `"2m 5s"`, `format_time(45.0)` is `"45s"`;
/// negative inputs are prefixed with `-`.
pub fn format_time(seconds: f64) -> String {
    if seconds < 0.0 {
        return format!("-{}", format_time(-seconds));
    }

    let minutes = (seconds / 60.0) as i64;
    let remaining = (seconds % 60.0) as i64;
    if minutes > 0 {
        format!("{minutes}m {remaining}s")
    } else {
        format!("{remaining}s")
    }
}

/// Direction of a safety-buffer recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Maintain,
    Increase,
    TemporalAdjustment,
}

/// A safety-buffer adjustment suggestion derived from detected conflicts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferRecommendation {
    pub kind: RecommendationKind,
    pub message: String,
    pub suggested_buffer_m: Option<f64>,
    pub reason: Option<String>,
}

/// Recommend buffer adjustments from a conflict list.
///
/// No conflicts: maintain. Any HIGH violation: grow the buffer to 2.5x the
/// closest observed approach. More than three conflicts: suggest temporal
/// separation or route changes.
pub fn buffer_recommendations(conflicts: &[Conflict]) -> Vec<BufferRecommendation> {
    if conflicts.is_empty() {
        return vec![BufferRecommendation {
            kind: RecommendationKind::Maintain,
            message: "Current safety buffer is adequate".to_string(),
            suggested_buffer_m: None,
            reason: None,
        }];
    }

    let mut recommendations = Vec::new();
    let min_distance_m = conflicts
        .iter()
        .map(|c| c.distance_m)
        .fold(f64::INFINITY, f64::min);

    if conflicts
        .iter()
        .any(|c| c.severity == ConflictSeverity::High)
    {
        let suggested = min_distance_m * 2.5;
        recommendations.push(BufferRecommendation {
            kind: RecommendationKind::Increase,
            message: format!(
                "High severity conflicts detected. Recommend increasing safety buffer to {suggested:.1}m"
            ),
            suggested_buffer_m: Some(suggested),
            reason: Some("Critical proximity violations".to_string()),
        });
    }

    if conflicts.len() > 3 {
        recommendations.push(BufferRecommendation {
            kind: RecommendationKind::TemporalAdjustment,
            message: "Multiple conflicts detected. Consider temporal separation or route modification"
                .to_string(),
            suggested_buffer_m: None,
            reason: Some("High conflict density".to_string()),
        });
    }

    recommendations
}

/// Validate timing across the primary mission and the other flights.
///
/// Returns warnings; empty means nothing suspicious. Overlapping windows are
/// not flagged: overlap is what conflict detection exists for.
pub fn validate_mission_timing(primary: &Mission, other_flights: &[FlightMission]) -> Vec<String> {
    let mut warnings = Vec::new();

    if primary.start_time_s >= primary.end_time_s {
        warnings.push("Primary mission start time must be before end time".to_string());
    }

    let duration_s = primary.duration_s();
    if duration_s < 60.0 {
        warnings.push("Primary mission duration is very short (< 1 minute)".to_string());
    } else if duration_s > 3600.0 {
        warnings.push("Primary mission duration is very long (> 1 hour)".to_string());
    }

    for flight in other_flights {
        if flight.mission.start_time_s >= flight.mission.end_time_s {
            warnings.push(format!("Flight {} has invalid timing", flight.flight_id));
        }
    }

    warnings
}

/// Parameters a conflict analysis ran with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalysisParameters {
    pub safety_buffer_m: f64,
    pub time_step_s: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub timestamp: DateTime<Utc>,
    pub scenario_kind: ScenarioKind,
    pub analysis_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisExport {
    pub parameters: AnalysisParameters,
    pub conflicts: Vec<Conflict>,
    pub summary: ConflictSummary,
    pub is_safe: bool,
}

/// Complete, serializable bundle of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportData {
    pub metadata: ExportMetadata,
    pub primary_mission: Mission,
    pub mission_duration_s: f64,
    pub other_flights: Vec<FlightMission>,
    pub analysis: AnalysisExport,
    pub recommendations: Vec<BufferRecommendation>,
}

/// Bundle scenario, conflict results, and parameters for export or reporting.
pub fn export_mission_data(
    scenario: &Scenario,
    report: &ConflictReport,
    parameters: AnalysisParameters,
) -> ExportData {
    ExportData {
        metadata: ExportMetadata {
            timestamp: Utc::now(),
            scenario_kind: scenario.kind,
            analysis_version: ANALYSIS_VERSION.to_string(),
        },
        primary_mission: scenario.primary_mission.clone(),
        mission_duration_s: scenario.mission_duration_s,
        other_flights: scenario.other_flights.clone(),
        analysis: AnalysisExport {
            parameters,
            conflicts: report.conflicts.clone(),
            summary: report.summary,
            is_safe: report.is_safe,
        },
        recommendations: buffer_recommendations(&report.conflicts),
    }
}
