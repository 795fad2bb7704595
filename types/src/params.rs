//! Protocol parameters: TTLs, sensor thresholds, risk classification floors.

use serde::{Deserialize, Serialize};

/// Tunable parameters of the attestation protocol.
///
/// Defaults match the deployed protocol; tests and the config file may
/// override individual fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttestParams {
    /// How long an issued challenge stays valid.
    #[serde(default = "default_challenge_ttl")]
    pub challenge_ttl_secs: u64,

    /// How long an issued session token stays valid.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Minimum motion score counting as an active sensor (exclusive).
    #[serde(default = "default_motion_threshold")]
    pub motion_threshold: f64,

    /// Minimum touch score counting as an active sensor (exclusive).
    #[serde(default = "default_touch_threshold")]
    pub touch_threshold: f64,

    /// Minimum pattern score counting as an active sensor (exclusive).
    #[serde(default = "default_pattern_threshold")]
    pub pattern_threshold: f64,

    /// Average signal strength above which risk is classified Low (exclusive).
    #[serde(default = "default_low_risk_floor")]
    pub low_risk_floor: f64,

    /// Average signal strength above which risk is classified Medium (exclusive).
    #[serde(default = "default_medium_risk_floor")]
    pub medium_risk_floor: f64,

    /// Minimum count of active sensors required for a normal approval.
    #[serde(default = "default_min_active_sensors")]
    pub min_active_sensors: usize,
}

fn default_challenge_ttl() -> u64 {
    60
}

fn default_session_ttl() -> u64 {
    300
}

fn default_motion_threshold() -> f64 {
    0.15
}

fn default_touch_threshold() -> f64 {
    0.15
}

fn default_pattern_threshold() -> f64 {
    0.10
}

fn default_low_risk_floor() -> f64 {
    0.7
}

fn default_medium_risk_floor() -> f64 {
    0.4
}

fn default_min_active_sensors() -> usize {
    1
}

impl Default for AttestParams {
    fn default() -> Self {
        Self {
            challenge_ttl_secs: default_challenge_ttl(),
            session_ttl_secs: default_session_ttl(),
            motion_threshold: default_motion_threshold(),
            touch_threshold: default_touch_threshold(),
            pattern_threshold: default_pattern_threshold(),
            low_risk_floor: default_low_risk_floor(),
            medium_risk_floor: default_medium_risk_floor(),
            min_active_sensors: default_min_active_sensors(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol() {
        let p = AttestParams::default();
        assert_eq!(p.challenge_ttl_secs, 60);
        assert_eq!(p.session_ttl_secs, 300);
        assert_eq!(p.motion_threshold, 0.15);
        assert_eq!(p.touch_threshold, 0.15);
        assert_eq!(p.pattern_threshold, 0.10);
        assert_eq!(p.low_risk_floor, 0.7);
        assert_eq!(p.medium_risk_floor, 0.4);
        assert_eq!(p.min_active_sensors, 1);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let p: AttestParams = serde_json::from_str(r#"{"challenge_ttl_secs": 5}"#).unwrap();
        assert_eq!(p.challenge_ttl_secs, 5);
        assert_eq!(p.session_ttl_secs, 300);
    }
}
