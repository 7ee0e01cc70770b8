//! Dataset generator: synthetic A/B trial records with the nudge bias
//! baked into the treatment profile.
//!
//! Streams used (see rng.rs):
//!   - Assignment: cohort labels
//!   - Interface:  opt-out difficulty, urgency, comprehension
//!   - Outcome:    conversion
//!
//! Draw order within a stream is fixed by user id, so a given seed and
//! config always reproduce the same table.

use crate::{
    config::{Assignment, AuditConfig, FieldDistribution, FieldSpec},
    error::AuditResult,
    rng::{RngBank, StageRng, StreamSlot},
    types::{Field, Group, TrialRecord, UserId, FIRST_USER_ID},
};

pub struct DatasetGenerator<'a> {
    config: &'a AuditConfig,
}

impl<'a> DatasetGenerator<'a> {
    pub fn new(config: &'a AuditConfig) -> Self {
        Self { config }
    }

    /// Generate `config.rows` unscored records.
    pub fn generate(&self, bank: &RngBank) -> AuditResult<Vec<TrialRecord>> {
        self.config.validate_generation()?;

        let mut assignment_rng = bank.for_slot(StreamSlot::Assignment);
        let mut interface_rng = bank.for_slot(StreamSlot::Interface);
        let mut outcome_rng = bank.for_slot(StreamSlot::Outcome);
        log::debug!(
            "generator: streams {}, {}, {}",
            assignment_rng.name,
            interface_rng.name,
            outcome_rng.name
        );

        let groups = self.assign_groups(&mut assignment_rng);
        let mut records = Vec::with_capacity(groups.len());

        for (i, group) in groups.into_iter().enumerate() {
            let profile = self.config.profile(group);
            let opt_out_difficulty =
                self.draw(&profile.opt_out_difficulty, Field::OptOutDifficulty, &mut interface_rng)?;
            let urgency_messaging =
                self.draw(&profile.urgency_messaging, Field::UrgencyMessaging, &mut interface_rng)?;
            let comprehension_score = self.draw(
                &profile.comprehension_score,
                Field::ComprehensionScore,
                &mut interface_rng,
            )?;
            let converted = outcome_rng.chance(profile.conversion_rate);

            records.push(TrialRecord {
                user_id: FIRST_USER_ID + i as UserId,
                group,
                opt_out_difficulty,
                urgency_messaging,
                comprehension_score,
                converted,
                nad_raw: None,
                nad_score: None,
            });
        }

        let (a, b) = group_counts(&records);
        log::info!("generator: {} records (A={a}, B={b})", records.len());
        Ok(records)
    }

    fn assign_groups(&self, rng: &mut StageRng) -> Vec<Group> {
        let rows = self.config.rows;
        let share = self.config.treatment_share;
        match self.config.assignment {
            Assignment::Exact => {
                let treated = ((rows as f64) * share).round() as usize;
                let mut groups: Vec<Group> = std::iter::repeat(Group::A)
                    .take(rows - treated)
                    .chain(std::iter::repeat(Group::B).take(treated))
                    .collect();
                rng.shuffle(&mut groups);
                groups
            }
            Assignment::Bernoulli => (0..rows)
                .map(|_| if rng.chance(share) { Group::B } else { Group::A })
                .collect(),
        }
    }

    fn draw(&self, spec: &FieldSpec, field: Field, rng: &mut StageRng) -> AuditResult<f64> {
        let raw = match spec.distribution {
            FieldDistribution::UniformInt { low, high } => rng.uniform_int(low, high) as f64,
            FieldDistribution::Uniform { low, high } => rng.uniform(low, high),
            FieldDistribution::Normal { mean, std_dev } => rng.normal(mean, std_dev)?,
        };
        let range = self.config.bounds.range(field);
        let mut value = range.clamp(raw + spec.offset);
        if field == Field::ComprehensionScore {
            value = range.clamp(round_to(value, self.config.comprehension_decimals));
        }
        Ok(value)
    }
}

/// Convenience wrapper: build a bank from `seed` and generate.
pub fn generate_dataset(config: &AuditConfig, seed: u64) -> AuditResult<Vec<TrialRecord>> {
    DatasetGenerator::new(config).generate(&RngBank::new(seed))
}

/// Number of records in (A, B).
pub fn group_counts(records: &[TrialRecord]) -> (usize, usize) {
    let b = records.iter().filter(|r| r.group == Group::B).count();
    (records.len() - b, b)
}

/// `decimals` is bounded by `MAX_COMPREHENSION_DECIMALS` in config validation.
fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_keeps_one_decimal() {
        assert_eq!(round_to(6.849, 1), 6.8);
        assert_eq!(round_to(6.85001, 1), 6.9);
        assert_eq!(round_to(3.0, 0), 3.0);
    }

    #[test]
    fn user_ids_are_sequential_from_first_id() {
        let config = AuditConfig {
            rows: 10,
            ..AuditConfig::default()
        };
        let records = generate_dataset(&config, 1).unwrap();
        let ids: Vec<UserId> = records.iter().map(|r| r.user_id).collect();
        assert_eq!(ids, (1000..1010).collect::<Vec<_>>());
    }

    #[test]
    fn full_treatment_share_puts_everyone_in_b() {
        let config = AuditConfig {
            rows: 20,
            treatment_share: 1.0,
            ..AuditConfig::default()
        };
        let records = generate_dataset(&config, 5).unwrap();
        assert_eq!(group_counts(&records), (0, 20));
    }

    #[test]
    fn generated_records_start_unscored() {
        let config = AuditConfig {
            rows: 5,
            ..AuditConfig::default()
        };
        let records = generate_dataset(&config, 9).unwrap();
        assert!(records.iter().all(|r| !r.is_scored()));
    }
}
