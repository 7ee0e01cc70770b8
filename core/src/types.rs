//! Shared primitive types used across the entire audit pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable identifier for a simulated user.
pub type UserId = u32;

/// First user id handed out by the generator.
pub const FIRST_USER_ID: UserId = 1000;

/// Experimental cohort. A is the baseline design, B the nudging design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Group {
    A,
    B,
}

impl Group {
    pub const ALL: [Group; 2] = [Group::A, Group::B];

    pub fn label(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Self::A => "control",
            Self::B => "treatment",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The interface variables a record carries. Used to name the
/// offending field in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    OptOutDifficulty,
    UrgencyMessaging,
    ComprehensionScore,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OptOutDifficulty => "opt_out_difficulty",
            Self::UrgencyMessaging => "urgency_messaging",
            Self::ComprehensionScore => "comprehension_score",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One simulated user observation.
///
/// `nad_raw` and `nad_score` stay `None` until the scorer has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub user_id: UserId,
    pub group: Group,
    pub opt_out_difficulty: f64,
    pub urgency_messaging: f64,
    pub comprehension_score: f64,
    pub converted: bool,
    #[serde(default)]
    pub nad_raw: Option<f64>,
    #[serde(default)]
    pub nad_score: Option<f64>,
}

impl TrialRecord {
    pub fn field(&self, field: Field) -> f64 {
        match field {
            Field::OptOutDifficulty => self.opt_out_difficulty,
            Field::UrgencyMessaging => self.urgency_messaging,
            Field::ComprehensionScore => self.comprehension_score,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.nad_score.is_some()
    }
}
