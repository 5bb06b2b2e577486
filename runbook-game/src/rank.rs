//! Score badge tiers
use crate::constants::{RANK_CONFIRMED_MIN, RANK_EXPERT_MIN, RANK_INTERMEDIATE_MIN};
use serde::{Deserialize, Serialize};

/// Badge tier derived from the cumulative score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    /// Score below 40
    Novice,
    /// Score in 40..80
    Intermediate,
    /// Score in 80..120
    Confirmed,
    /// Score of 120 or more
    Expert,
}

impl Rank {
    #[must_use]
    pub const fn from_score(score: u32) -> Self {
        if score < RANK_INTERMEDIATE_MIN {
            Self::Novice
        } else if score < RANK_CONFIRMED_MIN {
            Self::Intermediate
        } else if score < RANK_EXPERT_MIN {
            Self::Confirmed
        } else {
            Self::Expert
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Novice => "Novice",
            Self::Intermediate => "Intermediate",
            Self::Confirmed => "Confirmed",
            Self::Expert => "Expert",
        }
    }

    /// Tongue-in-cheek title shown next to the label.
    #[must_use]
    pub const fn role(self) -> &'static str {
        match self {
            Self::Novice => "Log Padawan",
            Self::Intermediate => "Script Tuner",
            Self::Confirmed => "SRE in swim shorts",
            Self::Expert => "Prod Tamer",
        }
    }

    /// Styling hook for the presentation layer.
    #[must_use]
    pub const fn tone(self) -> &'static str {
        match self {
            Self::Novice => "rose",
            Self::Intermediate => "amber",
            Self::Confirmed => "emerald",
            Self::Expert => "indigo",
        }
    }

    /// Score needed to reach the next tier, if any.
    #[must_use]
    pub const fn next_threshold(self) -> Option<u32> {
        match self {
            Self::Novice => Some(RANK_INTERMEDIATE_MIN),
            Self::Intermediate => Some(RANK_CONFIRMED_MIN),
            Self::Confirmed => Some(RANK_EXPERT_MIN),
            Self::Expert => None,
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.label(), self.role())
    }
}
