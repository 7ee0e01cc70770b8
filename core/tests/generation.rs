//! Dataset generator: bounds, split, and the designed nudge bias.

use nudge_audit_core::{
    config::{Assignment, AuditConfig, FieldSpec},
    error::AuditError,
    generator::{generate_dataset, group_counts},
    types::{Field, Group},
};

const FIELDS: [Field; 3] = [
    Field::OptOutDifficulty,
    Field::UrgencyMessaging,
    Field::ComprehensionScore,
];

#[test]
fn every_field_stays_inside_its_bounds() {
    let config = AuditConfig::default();
    for seed in [1, 42, 1234, 0xFFFF_FFFF] {
        let records = generate_dataset(&config, seed).unwrap();
        assert_eq!(records.len(), config.rows);
        for r in &records {
            assert!(matches!(r.group, Group::A | Group::B));
            for field in FIELDS {
                let range = config.bounds.range(field);
                let v = r.field(field);
                assert!(
                    range.contains(v),
                    "seed {seed} user {} {field} = {v} outside [{}, {}]",
                    r.user_id,
                    range.min,
                    range.max
                );
            }
        }
    }
}

#[test]
fn comprehension_keeps_one_decimal() {
    let records = generate_dataset(&AuditConfig::default(), 11).unwrap();
    for r in &records {
        let scaled = r.comprehension_score * 10.0;
        assert!(
            (scaled - scaled.round()).abs() < 1e-9,
            "comprehension {} has more than one decimal",
            r.comprehension_score
        );
    }
}

#[test]
fn exact_split_is_exact() {
    for (rows, share, expected_b) in [(100, 0.5, 50), (101, 0.5, 51), (10, 0.3, 3), (7, 0.0, 0)] {
        let config = AuditConfig {
            rows,
            treatment_share: share,
            ..AuditConfig::default()
        };
        let records = generate_dataset(&config, 42).unwrap();
        assert_eq!(
            group_counts(&records),
            (rows - expected_b, expected_b),
            "rows={rows} share={share}"
        );
    }
}

#[test]
fn exact_split_interleaves_groups() {
    let config = AuditConfig {
        rows: 100,
        ..AuditConfig::default()
    };
    let records = generate_dataset(&config, 42).unwrap();
    let first_half_b = records[..50].iter().filter(|r| r.group == Group::B).count();
    assert!(
        first_half_b > 0 && first_half_b < 50,
        "groups should be shuffled, first half has {first_half_b} B records"
    );
}

#[test]
fn bernoulli_split_is_roughly_balanced() {
    let config = AuditConfig {
        assignment: Assignment::Bernoulli,
        ..AuditConfig::default()
    };
    let (a, b) = group_counts(&generate_dataset(&config, 2024).unwrap());
    assert_eq!(a + b, 1000);
    assert!((400..=600).contains(&b), "expected ~500 B users, got {b}");
}

#[test]
fn treatment_is_biased_toward_nudging() {
    let records = generate_dataset(&AuditConfig::default(), 42).unwrap();
    let mean = |group: Group, field: Field| {
        let xs: Vec<f64> = records
            .iter()
            .filter(|r| r.group == group)
            .map(|r| r.field(field))
            .collect();
        xs.iter().sum::<f64>() / xs.len() as f64
    };
    let conv = |group: Group| {
        let xs: Vec<&_> = records.iter().filter(|r| r.group == group).collect();
        xs.iter().filter(|r| r.converted).count() as f64 / xs.len() as f64
    };

    assert!(mean(Group::B, Field::OptOutDifficulty) > mean(Group::A, Field::OptOutDifficulty));
    assert!(mean(Group::B, Field::UrgencyMessaging) > mean(Group::A, Field::UrgencyMessaging));
    assert!(mean(Group::B, Field::ComprehensionScore) < mean(Group::A, Field::ComprehensionScore));
    assert!(conv(Group::B) > conv(Group::A));
}

#[test]
fn zero_rows_fails_with_invalid_configuration() {
    let config = AuditConfig {
        rows: 0,
        ..AuditConfig::default()
    };
    assert!(matches!(
        generate_dataset(&config, 42),
        Err(AuditError::InvalidConfiguration { stage: "generator", .. })
    ));
}

#[test]
fn out_of_range_split_fails_with_invalid_configuration() {
    let config = AuditConfig {
        treatment_share: 1.2,
        ..AuditConfig::default()
    };
    let err = generate_dataset(&config, 42).unwrap_err();
    assert!(matches!(err, AuditError::InvalidConfiguration { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn draws_are_clamped_into_bounds() {
    let mut config = AuditConfig::default();
    config.treatment.urgency_messaging = FieldSpec::uniform_int(8, 10).with_offset(5.0);
    config.control.comprehension_score = FieldSpec::normal(-50.0, 1.0);
    let records = generate_dataset(&config, 5).unwrap();
    for r in &records {
        match r.group {
            Group::B => assert_eq!(r.urgency_messaging, 10.0),
            Group::A => assert_eq!(r.comprehension_score, 1.0),
        }
    }
}

#[test]
fn full_width_integer_range_generates_without_overflow() {
    let mut config = AuditConfig::default();
    config.control.opt_out_difficulty = FieldSpec::uniform_int(-1, i64::MAX);
    config.treatment.urgency_messaging = FieldSpec::uniform_int(i64::MIN, i64::MAX);
    let records = generate_dataset(&config, 11).unwrap();
    for r in &records {
        for field in FIELDS {
            let range = config.bounds.range(field);
            assert!(
                range.contains(r.field(field)),
                "user {} {field} = {} escaped bounds",
                r.user_id,
                r.field(field)
            );
        }
    }
}
