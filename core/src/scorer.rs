//! Autonomy scorer: the Nudge Autonomy Deficit of a single record.
//!
//! `raw = w_opt * opt_out + w_urg * urgency - w_comp * comprehension`,
//! then rescaled so the worst corner of the bounds box maps to 100 and
//! the best corner to 0. Higher means less user autonomy.
//!
//! Inputs outside the declared bounds are rejected, never clamped.

use crate::{
    config::{FieldBounds, NadWeights},
    error::{AuditError, AuditResult},
    types::{Field, TrialRecord},
};
use serde::{Deserialize, Serialize};

pub const NAD_MIN: f64 = 0.0;
pub const NAD_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NadScore {
    /// Weighted sum before normalization.
    pub raw: f64,
    /// Position of `raw` inside the attainable range, 0..=100.
    pub normalized: f64,
}

#[derive(Debug, Clone)]
pub struct AutonomyScorer {
    weights: NadWeights,
    bounds: FieldBounds,
    raw_min: f64,
    raw_max: f64,
}

impl AutonomyScorer {
    pub fn new(weights: NadWeights, bounds: FieldBounds) -> AuditResult<Self> {
        weights.validate()?;
        bounds.validate()?;

        // With non-negative weights the extremes sit on opposite corners.
        let raw_min = weights.opt_out_difficulty * bounds.opt_out_difficulty.min
            + weights.urgency_messaging * bounds.urgency_messaging.min
            - weights.comprehension * bounds.comprehension_score.max;
        let raw_max = weights.opt_out_difficulty * bounds.opt_out_difficulty.max
            + weights.urgency_messaging * bounds.urgency_messaging.max
            - weights.comprehension * bounds.comprehension_score.min;
        let span = raw_max - raw_min;
        if !(raw_min.is_finite() && raw_max.is_finite() && span.is_finite()) || span <= 0.0 {
            return Err(AuditError::invalid_config(
                "scorer",
                format!("raw NAD range [{raw_min}, {raw_max}] cannot be normalized"),
            ));
        }

        Ok(Self {
            weights,
            bounds,
            raw_min,
            raw_max,
        })
    }

    /// Attainable (min, max) of the raw weighted sum.
    pub fn raw_range(&self) -> (f64, f64) {
        (self.raw_min, self.raw_max)
    }

    /// Score one record. Pure: depends only on the record's interface
    /// fields and this scorer's configuration.
    pub fn score(&self, record: &TrialRecord) -> AuditResult<NadScore> {
        for field in [
            Field::OptOutDifficulty,
            Field::UrgencyMessaging,
            Field::ComprehensionScore,
        ] {
            let value = record.field(field);
            let range = self.bounds.range(field);
            if !range.contains(value) {
                return Err(AuditError::InvalidInput {
                    user_id: record.user_id,
                    field,
                    value,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        let raw = self.weights.opt_out_difficulty * record.opt_out_difficulty
            + self.weights.urgency_messaging * record.urgency_messaging
            - self.weights.comprehension * record.comprehension_score;
        let normalized = (NAD_MAX * (raw - self.raw_min) / (self.raw_max - self.raw_min))
            .clamp(NAD_MIN, NAD_MAX);

        Ok(NadScore { raw, normalized })
    }

    /// Score every record, filling `nad_raw` and `nad_score`.
    /// Already-scored records are overwritten with the same values.
    pub fn score_all(&self, mut records: Vec<TrialRecord>) -> AuditResult<Vec<TrialRecord>> {
        for record in &mut records {
            let score = self.score(record)?;
            record.nad_raw = Some(score.raw);
            record.nad_score = Some(score.normalized);
        }
        log::info!("scorer: scored {} records", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Group;

    fn record(opt_out: f64, urgency: f64, comprehension: f64) -> TrialRecord {
        TrialRecord {
            user_id: 1,
            group: Group::A,
            opt_out_difficulty: opt_out,
            urgency_messaging: urgency,
            comprehension_score: comprehension,
            converted: false,
            nad_raw: None,
            nad_score: None,
        }
    }

    fn scorer() -> AutonomyScorer {
        AutonomyScorer::new(NadWeights::default(), FieldBounds::default()).unwrap()
    }

    #[test]
    fn worst_corner_scores_100_best_corner_scores_0() {
        let s = scorer();
        assert_eq!(s.score(&record(10.0, 10.0, 1.0)).unwrap().normalized, 100.0);
        assert_eq!(s.score(&record(1.0, 1.0, 10.0)).unwrap().normalized, 0.0);
    }

    #[test]
    fn raw_uses_named_weights() {
        let s = scorer();
        let score = s.score(&record(5.0, 4.0, 8.0)).unwrap();
        let expected = 0.4 * 5.0 + 0.5 * 4.0 - 0.25 * 8.0;
        assert!((score.raw - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_comprehension_weight_ignores_comprehension() {
        let weights = NadWeights {
            comprehension: 0.0,
            ..NadWeights::default()
        };
        let s = AutonomyScorer::new(weights, FieldBounds::default()).unwrap();
        let score = s.score(&record(9.0, 9.0, 3.0)).unwrap();
        assert!((score.raw - 8.1).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_input_names_user_and_field() {
        let s = scorer();
        let err = s.score(&record(11.0, 5.0, 5.0)).unwrap_err();
        match err {
            AuditError::InvalidInput { user_id, field, value, .. } => {
                assert_eq!(user_id, 1);
                assert_eq!(field, Field::OptOutDifficulty);
                assert_eq!(value, 11.0);
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn overflowing_weights_are_rejected_up_front() {
        let weights = NadWeights {
            opt_out_difficulty: 1e308,
            ..NadWeights::default()
        };
        let err = AutonomyScorer::new(weights, FieldBounds::default()).unwrap_err();
        assert!(
            matches!(err, AuditError::InvalidConfiguration { stage: "scorer", .. }),
            "expected scorer InvalidConfiguration, got {err:?}"
        );
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn nan_input_is_rejected() {
        let s = scorer();
        assert!(matches!(
            s.score(&record(5.0, f64::NAN, 5.0)),
            Err(AuditError::InvalidInput { field: Field::UrgencyMessaging, .. })
        ));
    }
}
