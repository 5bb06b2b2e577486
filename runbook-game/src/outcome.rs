//! Action result classification and score deltas
use crate::constants::{SCORE_DELTA_FAIL, SCORE_DELTA_OK, SCORE_DELTA_WARN};
use serde::{Deserialize, Serialize};

/// Result classification attached to every action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The right call for this step
    Ok,
    /// Plausible but not addressing the root cause
    Warn,
    /// Actively harmful or negligent
    Fail,
}

impl Outcome {
    pub const ALL: [Self; 3] = [Self::Ok, Self::Warn, Self::Fail];

    /// Score change applied before the zero floor.
    #[must_use]
    pub const fn score_delta(self) -> i32 {
        match self {
            Self::Ok => SCORE_DELTA_OK,
            Self::Warn => SCORE_DELTA_WARN,
            Self::Fail => SCORE_DELTA_FAIL,
        }
    }

    /// Stable lowercase key, matching the serialized form.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Apply `delta` to `score`, flooring at zero.
#[must_use]
pub const fn apply_delta(score: u32, delta: i32) -> u32 {
    score.saturating_add_signed(delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_match_classification() {
        assert_eq!(Outcome::Ok.score_delta(), 12);
        assert_eq!(Outcome::Warn.score_delta(), -4);
        assert_eq!(Outcome::Fail.score_delta(), -10);
    }

    #[test]
    fn apply_delta_floors_at_zero() {
        assert_eq!(apply_delta(0, Outcome::Fail.score_delta()), 0);
        assert_eq!(apply_delta(3, Outcome::Warn.score_delta()), 0);
        assert_eq!(apply_delta(15, Outcome::Fail.score_delta()), 5);
        assert_eq!(apply_delta(u32::MAX, Outcome::Ok.score_delta()), u32::MAX);
    }

    #[test]
    fn serde_uses_lowercase_keys() {
        for outcome in Outcome::ALL {
            let json = serde_json::to_string(&outcome).unwrap();
            assert_eq!(json, format!("\"{}\"", outcome.key()));
        }
        let parsed: Outcome = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(parsed, Outcome::Warn);
        assert!(serde_json::from_str::<Outcome>("\"meh\"").is_err());
    }
}
