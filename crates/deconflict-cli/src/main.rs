//! `deconflict` - run strategic deconfliction analysis over a scenario.

mod scenarios;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use deconflict_core::{
    conflict_zones, export_mission_data, format_time, suggest_resolutions, validate_mission_timing,
    validate_waypoints, waypoints_valid, AnalysisParameters, ConflictDetector, Flight, Scenario,
    TrajectorySampler, Waypoint,
};

/// Zone radius multiplier applied when listing conflict zones.
const ZONE_BUFFER_EXPANSION: f64 = 1.5;

#[derive(Parser)]
#[command(name = "deconflict", version, about = "UAV strategic deconfliction analysis")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the built-in scenarios
    Scenarios,
    /// Run conflict analysis over a built-in scenario
    Check {
        /// Scenario to analyze
        #[arg(long, value_enum, default_value_t = ScenarioArg::ConflictFree)]
        scenario: ScenarioArg,
        /// Add this many random background flights
        #[arg(long, default_value_t = 0)]
        background: usize,
        #[command(flatten)]
        params: AnalysisArgs,
    },
    /// Run conflict analysis over a custom mission read from a waypoint JSON file
    Custom {
        /// JSON file containing an array of waypoints
        waypoints: PathBuf,
        /// Mission start time in seconds
        #[arg(long, default_value_t = 0.0)]
        start_time: f64,
        /// Mission end time in seconds
        #[arg(long, default_value_t = 300.0)]
        end_time: f64,
        #[command(flatten)]
        params: AnalysisArgs,
    },
}

#[derive(Debug, Clone, clap::Args)]
struct AnalysisArgs {
    /// Minimum safe 3D separation in meters
    #[arg(long, default_value_t = 50.0)]
    safety_buffer: f64,
    /// Sampling step in seconds
    #[arg(long, default_value_t = 5.0)]
    time_step: f64,
    /// Write the full analysis to a JSON file
    #[arg(long)]
    export: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScenarioArg {
    ConflictFree,
    SpatialConflict,
    TemporalConflict,
    AltitudeConflict,
    Complex,
}

impl std::fmt::Display for ScenarioArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = self.to_possible_value().expect("cli variant");
        f.write_str(value.get_name())
    }
}

impl ScenarioArg {
    fn build(self) -> Scenario {
        match self {
            Self::ConflictFree => scenarios::create_conflict_free_scenario(),
            Self::SpatialConflict => scenarios::create_spatial_conflict_scenario(),
            Self::TemporalConflict => scenarios::create_temporal_conflict_scenario(),
            Self::AltitudeConflict => scenarios::create_altitude_conflict_scenario(),
            Self::Complex => scenarios::create_complex_scenario(),
        }
    }

    fn all() -> [ScenarioArg; 5] {
        [
            Self::ConflictFree,
            Self::SpatialConflict,
            Self::TemporalConflict,
            Self::AltitudeConflict,
            Self::Complex,
        ]
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deconflict=info".into()),
        )
        .init();

    match Cli::parse().command {
        Command::Scenarios => {
            for arg in ScenarioArg::all() {
                let scenario = arg.build();
                println!(
                    "{:<18} {} ({} other flights, {})",
                    arg,
                    scenario.description,
                    scenario.other_flights.len(),
                    format_time(scenario.mission_duration_s),
                );
            }
            Ok(())
        }
        Command::Check {
            scenario,
            background,
            params,
        } => {
            let mut scenario = scenario.build();
            if background > 0 {
                scenario
                    .other_flights
                    .extend(scenarios::generate_background_traffic(background));
            }
            run_analysis(scenario, &params)
        }
        Command::Custom {
            waypoints,
            start_time,
            end_time,
            params,
        } => {
            let json = std::fs::read_to_string(&waypoints)
                .with_context(|| format!("reading waypoints from {}", waypoints.display()))?;
            let waypoints: Vec<Waypoint> =
                serde_json::from_str(&json).context("parsing waypoint JSON")?;
            let scenario = scenarios::create_custom_scenario(waypoints, start_time, end_time);
            run_analysis(scenario, &params)
        }
    }
}

fn run_analysis(scenario: Scenario, params: &AnalysisArgs) -> Result<()> {
    let safety_buffer_m = params.safety_buffer;
    let time_step_s = params.time_step;

    // Boundary validation: the core itself accepts anything and degrades to
    // empty output, so malformed input is rejected or skipped here.
    validate_waypoints(&scenario.primary_mission.waypoints)
        .context("primary mission waypoints rejected")?;
    for warning in validate_mission_timing(&scenario.primary_mission, &scenario.other_flights) {
        tracing::warn!("{warning}");
    }

    let sampler = TrajectorySampler::default();
    let primary_trajectory = sampler.calculate_trajectory(
        &scenario.primary_mission.waypoints,
        scenario.primary_mission.start_time_s,
        scenario.primary_mission.end_time_s,
        time_step_s,
    );

    let other_flights: Vec<Flight> = scenario
        .other_flights
        .iter()
        .filter(|flight| {
            let valid = waypoints_valid(&flight.mission.waypoints);
            if !valid {
                tracing::warn!(flight_id = %flight.flight_id, "skipping flight with invalid waypoints");
            }
            valid
        })
        .map(|flight| Flight {
            flight_id: flight.flight_id.clone(),
            trajectory: sampler.calculate_trajectory(
                &flight.mission.waypoints,
                flight.mission.start_time_s,
                flight.mission.end_time_s,
                time_step_s,
            ),
        })
        .collect();

    tracing::info!(
        primary_samples = primary_trajectory.len(),
        other_flights = other_flights.len(),
        safety_buffer_m,
        "running conflict analysis"
    );

    let detector = ConflictDetector::default();
    let report = detector.check_conflicts(&primary_trajectory, &other_flights, safety_buffer_m);

    println!("Scenario: {}", scenario.description);
    println!(
        "Mission window: {} over {} samples",
        format_time(scenario.mission_duration_s),
        primary_trajectory.len()
    );
    println!();

    if report.is_safe {
        println!(
            "Mission is SAFE: no separation below {safety_buffer_m:.0}m across {} checks",
            report.summary.total_checks
        );
    } else {
        println!(
            "{} conflicts detected ({} spatial, {} checks):",
            report.total_conflicts,
            report.summary.spatial_violations,
            report.summary.total_checks
        );
        for conflict in &report.conflicts {
            println!(
                "  [{:?}] {} vs {}: {} (score {:.2})",
                conflict.severity,
                format_time(conflict.time_s),
                conflict.other_flight_id,
                conflict.description,
                conflict.severity_score,
            );
        }

        println!();
        println!("Suggested resolutions:");
        for suggestion in suggest_resolutions(&report.conflicts) {
            println!(
                "  {:?} [{:?}] at {}: {}",
                suggestion.kind,
                suggestion.priority,
                format_time(suggestion.conflict_time_s),
                suggestion.description,
            );
        }

        let zones = conflict_zones(&report.conflicts, ZONE_BUFFER_EXPANSION);
        println!();
        println!(
            "{} conflict zones (radius {:.0}m)",
            zones.len(),
            safety_buffer_m * ZONE_BUFFER_EXPANSION
        );
    }

    if let Some(path) = &params.export {
        let data = export_mission_data(
            &scenario,
            &report,
            AnalysisParameters {
                safety_buffer_m,
                time_step_s,
            },
        );
        let json = serde_json::to_string_pretty(&data).context("serializing analysis")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing analysis to {}", path.display()))?;
        tracing::info!(path = %path.display(), "analysis exported");
    }

    Ok(())
}
