//! Risk classification assigned to an approved attestation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse risk classification derived from behavioral signal strength,
/// or from duress signaling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskScore {
    /// Strong behavioral signals across the board.
    Low,
    /// Acceptable but middling signal strength.
    Medium,
    /// Weak signals — approved, but the caller should step up scrutiny.
    High,
    /// Duress was signaled. Never produced by signal strength alone.
    Critical,
}

impl RiskScore {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    /// Whether this score marks a duress session.
    pub fn is_duress(&self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_uppercase() {
        assert_eq!(serde_json::to_string(&RiskScore::Low).unwrap(), "\"LOW\"");
        assert_eq!(
            serde_json::to_string(&RiskScore::Critical).unwrap(),
            "\"CRITICAL\""
        );
        let back: RiskScore = serde_json::from_str("\"MEDIUM\"").unwrap();
        assert_eq!(back, RiskScore::Medium);
    }

    #[test]
    fn only_critical_is_duress() {
        assert!(RiskScore::Critical.is_duress());
        assert!(!RiskScore::Low.is_duress());
        assert!(!RiskScore::Medium.is_duress());
        assert!(!RiskScore::High.is_duress());
    }
}
