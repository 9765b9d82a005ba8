//! Configuration for sampling and conflict classification.
//!
//! Tuning constants live here as explicit, injectable structs instead of
//! hidden module defaults.

use serde::{Deserialize, Serialize};

/// Kinematic defaults for the trajectory sampler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Speed assumed when no waypoint segment brackets an instant (m/s)
    pub default_speed_mps: f64,
    /// Lower clamp for derived segment speeds (m/s)
    pub min_speed_mps: f64,
    /// Upper clamp for derived segment speeds (m/s)
    pub max_speed_mps: f64,
    /// Altitude assigned to waypoints that omit one (meters)
    pub default_altitude_m: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            default_speed_mps: 15.0,
            min_speed_mps: 5.0,
            max_speed_mps: 30.0,
            default_altitude_m: 50.0,
        }
    }
}

/// Separation thresholds for conflict classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SafetyRules {
    /// Default minimum acceptable 3D separation (meters)
    pub safety_buffer_m: f64,
    /// Fraction of the buffer below which a violation is HIGH severity
    pub high_severity_fraction: f64,
    /// Fraction of the buffer below which a violation is MEDIUM severity
    pub medium_severity_fraction: f64,
}

impl Default for SafetyRules {
    fn default() -> Self {
        Self {
            safety_buffer_m: 50.0,
            high_severity_fraction: 0.5,
            medium_severity_fraction: 0.8,
        }
    }
}
