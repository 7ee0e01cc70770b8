//! Audit configuration: dataset shape, per-group distributions,
//! field bounds and the NAD weights.
//!
//! `AuditConfig::default()` is the baseline nudge scenario;
//! `data/audit_config.json` ships the same values on disk.

use crate::{
    error::{AuditError, AuditResult},
    types::{Field, Group},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROWS: usize = 1000;
pub const DEFAULT_TREATMENT_SHARE: f64 = 0.5;
/// `10^decimals` must stay exact in an f64 for rounding to be meaningful.
pub const MAX_COMPREHENSION_DECIMALS: u32 = 15;

/// Weight of opt-out difficulty in the NAD formula.
pub const WEIGHT_OPT_OUT_DIFFICULTY: f64 = 0.4;
/// Weight of urgency messaging (urgency and default bias combined).
pub const WEIGHT_URGENCY_MESSAGING: f64 = 0.5;
/// Weight subtracted per point of user comprehension.
pub const WEIGHT_COMPREHENSION: f64 = 0.25;

/// Closed interval a field must lie in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Declared bounds of every interface variable. Shared by the
/// generator (draws are clamped into them) and the scorer (inputs are
/// validated against them).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    pub opt_out_difficulty: FieldRange,
    pub urgency_messaging: FieldRange,
    pub comprehension_score: FieldRange,
}

impl FieldBounds {
    pub fn range(&self, field: Field) -> FieldRange {
        match field {
            Field::OptOutDifficulty => self.opt_out_difficulty,
            Field::UrgencyMessaging => self.urgency_messaging,
            Field::ComprehensionScore => self.comprehension_score,
        }
    }

    pub fn validate(&self) -> AuditResult<()> {
        for field in [
            Field::OptOutDifficulty,
            Field::UrgencyMessaging,
            Field::ComprehensionScore,
        ] {
            let r = self.range(field);
            if !(r.min.is_finite() && r.max.is_finite()) || r.min >= r.max {
                return Err(AuditError::invalid_config(
                    "config",
                    format!("bounds for {field} must be finite with min < max, got [{}, {}]", r.min, r.max),
                ));
            }
        }
        Ok(())
    }
}

impl Default for FieldBounds {
    fn default() -> Self {
        Self {
            opt_out_difficulty: FieldRange::new(1.0, 10.0),
            urgency_messaging: FieldRange::new(1.0, 10.0),
            comprehension_score: FieldRange::new(1.0, 10.0),
        }
    }
}

/// How a single field is drawn before offset and clamping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDistribution {
    /// Integer draw, both ends inclusive.
    UniformInt { low: i64, high: i64 },
    Uniform { low: f64, high: f64 },
    Normal { mean: f64, std_dev: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub distribution: FieldDistribution,
    /// Added to every draw before clamping. This is where the nudge
    /// bias of the treatment group usually lives.
    #[serde(default)]
    pub offset: f64,
}

impl FieldSpec {
    pub fn uniform_int(low: i64, high: i64) -> Self {
        Self {
            distribution: FieldDistribution::UniformInt { low, high },
            offset: 0.0,
        }
    }

    pub fn normal(mean: f64, std_dev: f64) -> Self {
        Self {
            distribution: FieldDistribution::Normal { mean, std_dev },
            offset: 0.0,
        }
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    fn validate(&self, group: Group, field: Field) -> AuditResult<()> {
        let bad = |reason: String| {
            Err(AuditError::invalid_config(
                "generator",
                format!("group {group} {field}: {reason}"),
            ))
        };
        if !self.offset.is_finite() {
            return bad(format!("offset {} is not finite", self.offset));
        }
        match self.distribution {
            FieldDistribution::UniformInt { low, high } if low > high => {
                bad(format!("uniform_int low {low} > high {high}"))
            }
            FieldDistribution::Uniform { low, high }
                if !(high - low).is_finite() || low > high =>
            {
                bad(format!("uniform range [{low}, {high}) is invalid"))
            }
            FieldDistribution::Normal { mean, std_dev }
                if !(mean.is_finite() && std_dev.is_finite()) || std_dev < 0.0 =>
            {
                bad(format!("normal(mean={mean}, std_dev={std_dev}) is invalid"))
            }
            _ => Ok(()),
        }
    }
}

/// Generation parameters for one cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupProfile {
    pub opt_out_difficulty: FieldSpec,
    pub urgency_messaging: FieldSpec,
    pub comprehension_score: FieldSpec,
    /// Probability that a user takes the platform's desired action.
    pub conversion_rate: f64,
}

impl GroupProfile {
    pub fn spec(&self, field: Field) -> &FieldSpec {
        match field {
            Field::OptOutDifficulty => &self.opt_out_difficulty,
            Field::UrgencyMessaging => &self.urgency_messaging,
            Field::ComprehensionScore => &self.comprehension_score,
        }
    }

    /// Baseline interface: mid-range friction, ~25% conversion.
    pub fn control() -> Self {
        Self {
            opt_out_difficulty: FieldSpec::uniform_int(1, 9),
            urgency_messaging: FieldSpec::uniform_int(1, 9),
            comprehension_score: FieldSpec::normal(7.0, 1.5),
            conversion_rate: 0.25,
        }
    }

    /// Nudging interface: harder opt-out, more urgency, a point less
    /// comprehension, ~35% conversion.
    pub fn treatment() -> Self {
        Self {
            opt_out_difficulty: FieldSpec::uniform_int(3, 10),
            urgency_messaging: FieldSpec::uniform_int(1, 8).with_offset(2.0),
            comprehension_score: FieldSpec::normal(7.0, 1.5).with_offset(-1.0),
            conversion_rate: 0.35,
        }
    }

    fn validate(&self, group: Group) -> AuditResult<()> {
        for field in [
            Field::OptOutDifficulty,
            Field::UrgencyMessaging,
            Field::ComprehensionScore,
        ] {
            self.spec(field).validate(group, field)?;
        }
        if !(0.0..=1.0).contains(&self.conversion_rate) {
            return Err(AuditError::invalid_config(
                "generator",
                format!(
                    "group {group} conversion_rate {} outside [0, 1]",
                    self.conversion_rate
                ),
            ));
        }
        Ok(())
    }
}

/// How users are split between the two cohorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignment {
    /// Exactly round(rows * treatment_share) users land in B, in
    /// shuffled order.
    #[default]
    Exact,
    /// Each user independently lands in B with probability
    /// treatment_share. Either cohort may come out empty.
    Bernoulli,
}

/// Named weights of the NAD formula:
/// `raw = w_opt * opt_out + w_urg * urgency - w_comp * comprehension`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NadWeights {
    pub opt_out_difficulty: f64,
    pub urgency_messaging: f64,
    pub comprehension: f64,
}

impl NadWeights {
    /// Weights must be finite and non-negative, otherwise the score
    /// loses its monotonicity in each field.
    pub fn validate(&self) -> AuditResult<()> {
        let all = [
            ("opt_out_difficulty", self.opt_out_difficulty),
            ("urgency_messaging", self.urgency_messaging),
            ("comprehension", self.comprehension),
        ];
        for (name, w) in all {
            if !w.is_finite() || w < 0.0 {
                return Err(AuditError::invalid_config(
                    "scorer",
                    format!("weight {name} must be finite and >= 0, got {w}"),
                ));
            }
        }
        if all.iter().all(|(_, w)| *w == 0.0) {
            return Err(AuditError::invalid_config(
                "scorer",
                "at least one weight must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for NadWeights {
    fn default() -> Self {
        Self {
            opt_out_difficulty: WEIGHT_OPT_OUT_DIFFICULTY,
            urgency_messaging: WEIGHT_URGENCY_MESSAGING,
            comprehension: WEIGHT_COMPREHENSION,
        }
    }
}

/// Which unit the trade-off chart uses for its two bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMetric {
    /// Percent change of B relative to A.
    #[default]
    Relative,
    /// Conversion in percentage points, comprehension in score points.
    Absolute,
}

impl std::str::FromStr for ChartMetric {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relative" => Ok(Self::Relative),
            "absolute" => Ok(Self::Absolute),
            other => Err(AuditError::invalid_config(
                "config",
                format!("unknown chart metric '{other}', expected relative|absolute"),
            )),
        }
    }
}

fn default_decimals() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    pub rows: usize,
    pub treatment_share: f64,
    #[serde(default)]
    pub assignment: Assignment,
    #[serde(default)]
    pub bounds: FieldBounds,
    pub control: GroupProfile,
    pub treatment: GroupProfile,
    #[serde(default)]
    pub weights: NadWeights,
    #[serde(default)]
    pub chart_metric: ChartMetric,
    /// Decimal places kept on comprehension scores.
    #[serde(default = "default_decimals")]
    pub comprehension_decimals: u32,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            treatment_share: DEFAULT_TREATMENT_SHARE,
            assignment: Assignment::Exact,
            bounds: FieldBounds::default(),
            control: GroupProfile::control(),
            treatment: GroupProfile::treatment(),
            weights: NadWeights::default(),
            chart_metric: ChartMetric::Relative,
            comprehension_decimals: default_decimals(),
        }
    }
}

impl AuditConfig {
    /// Load from a JSON file.
    /// In tests, use AuditConfig::default().
    pub fn load(path: &str) -> AuditResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AuditError::invalid_config("config", format!("Cannot read {path}: {e}"))
        })?;
        let config: AuditConfig = serde_json::from_str(&content).map_err(|e| {
            AuditError::invalid_config("config", format!("Cannot parse {path}: {e}"))
        })?;
        Ok(config)
    }

    pub fn profile(&self, group: Group) -> &GroupProfile {
        match group {
            Group::A => &self.control,
            Group::B => &self.treatment,
        }
    }

    /// Checks everything the generator depends on.
    pub fn validate_generation(&self) -> AuditResult<()> {
        if self.rows == 0 {
            return Err(AuditError::invalid_config(
                "generator",
                "row count must be positive, got 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.treatment_share) {
            return Err(AuditError::invalid_config(
                "generator",
                format!("treatment_share {} outside [0, 1]", self.treatment_share),
            ));
        }
        if self.comprehension_decimals > MAX_COMPREHENSION_DECIMALS {
            return Err(AuditError::invalid_config(
                "generator",
                format!(
                    "comprehension_decimals {} exceeds {MAX_COMPREHENSION_DECIMALS}",
                    self.comprehension_decimals
                ),
            ));
        }
        self.bounds.validate()?;
        self.control.validate(Group::A)?;
        self.treatment.validate(Group::B)?;
        Ok(())
    }

    pub fn validate(&self) -> AuditResult<()> {
        self.validate_generation()?;
        self.weights.validate()
    }
}
