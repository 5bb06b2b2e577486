//! Centralized scoring and pacing constants for the runbook simulator.
//!
//! Scoring math and transition cadence live here, not in the scenario JSON
//! assets.

// Scoring ------------------------------------------------------------------
pub const SCORE_DELTA_OK: i32 = 12;
pub const SCORE_DELTA_WARN: i32 = -4;
pub const SCORE_DELTA_FAIL: i32 = -10;

// Rank thresholds (inclusive lower bounds) ---------------------------------
pub const RANK_INTERMEDIATE_MIN: u32 = 40;
pub const RANK_CONFIRMED_MIN: u32 = 80;
pub const RANK_EXPERT_MIN: u32 = 120;

// Transitions --------------------------------------------------------------
/// Settling pause between a next-bearing action and the step change.
pub const TRANSITION_DELAY_MS: u64 = 550;

// Persistence --------------------------------------------------------------
/// Namespaced key of the persisted cumulative score.
pub const SCORE_STORAGE_KEY: &str = "rb-score";

// Transcript ---------------------------------------------------------------
pub const TRANSCRIPT_PROMPT: &str = "$ ";
pub const TRANSCRIPT_PLACEHOLDER: &str = "-- waiting for an action --";

// Automated runs -----------------------------------------------------------
/// Upper bound on actions per automated playthrough.
pub const DEFAULT_MAX_ACTIONS: usize = 32;
