//! Reporter: per-group aggregates, the ethical trade-off, the textual
//! summary and the chart model.

use crate::{
    chart::{Bar, BarKind, TradeOffChart, TRADEOFF_TITLE},
    config::ChartMetric,
    error::{AuditError, AuditResult},
    types::{Group, TrialRecord},
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: Group,
    pub count: usize,
    /// Mean normalized NAD, 0..=100.
    pub mean_nad_score: f64,
    pub mean_nad_raw: f64,
    /// Fraction of users that converted, 0..=1.
    pub conversion_rate: f64,
    pub mean_comprehension: f64,
    pub mean_opt_out_difficulty: f64,
    pub mean_urgency_messaging: f64,
}

impl GroupSummary {
    /// Aggregate every record labelled `group`. Records of the other
    /// group are ignored.
    pub fn from_records(group: Group, records: &[TrialRecord]) -> AuditResult<Self> {
        let members: Vec<&TrialRecord> = records.iter().filter(|r| r.group == group).collect();
        if members.is_empty() {
            return Err(AuditError::EmptyDataset { group });
        }

        let mut nad_score = 0.0;
        let mut nad_raw = 0.0;
        let mut converted = 0usize;
        let mut comprehension = 0.0;
        let mut opt_out = 0.0;
        let mut urgency = 0.0;
        for r in &members {
            let (Some(score), Some(raw)) = (r.nad_score, r.nad_raw) else {
                return Err(AuditError::Unscored { user_id: r.user_id });
            };
            nad_score += score;
            nad_raw += raw;
            converted += usize::from(r.converted);
            comprehension += r.comprehension_score;
            opt_out += r.opt_out_difficulty;
            urgency += r.urgency_messaging;
        }

        let n = members.len() as f64;
        Ok(Self {
            group,
            count: members.len(),
            mean_nad_score: nad_score / n,
            mean_nad_raw: nad_raw / n,
            conversion_rate: converted as f64 / n,
            mean_comprehension: comprehension / n,
            mean_opt_out_difficulty: opt_out / n,
            mean_urgency_messaging: urgency / n,
        })
    }
}

/// B measured against A.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOff {
    /// (rate_B - rate_A) in percentage points.
    pub conversion_lift_points: f64,
    /// Lift relative to A's rate, in percent. None when A never converts.
    pub conversion_lift_pct: Option<f64>,
    /// mean_A - mean_B in comprehension score points.
    pub comprehension_drop_points: f64,
    /// Drop relative to A's mean, in percent. None when A's mean is zero.
    pub comprehension_drop_pct: Option<f64>,
}

impl TradeOff {
    pub fn between(control: &GroupSummary, treatment: &GroupSummary) -> Self {
        let relative = |delta: f64, base: f64| (base != 0.0).then(|| delta / base * 100.0);

        let conversion_delta = treatment.conversion_rate - control.conversion_rate;
        let comprehension_delta = control.mean_comprehension - treatment.mean_comprehension;
        let tradeoff = Self {
            conversion_lift_points: conversion_delta * 100.0,
            conversion_lift_pct: relative(conversion_delta, control.conversion_rate),
            comprehension_drop_points: comprehension_delta,
            comprehension_drop_pct: relative(comprehension_delta, control.mean_comprehension),
        };
        if tradeoff.conversion_lift_pct.is_none() {
            log::warn!("reporter: control conversion rate is zero, relative lift undefined");
        }
        tradeoff
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub control: GroupSummary,
    pub treatment: GroupSummary,
    pub tradeoff: TradeOff,
}

impl AuditReport {
    /// Aggregate a scored dataset. Fails with EmptyDataset if either
    /// cohort has no records.
    pub fn build(records: &[TrialRecord]) -> AuditResult<Self> {
        let control = GroupSummary::from_records(Group::A, records)?;
        let treatment = GroupSummary::from_records(Group::B, records)?;
        for s in [&control, &treatment] {
            log::debug!(
                "reporter: group {} n={} nad={:.2} conv={:.3} comp={:.2}",
                s.group,
                s.count,
                s.mean_nad_score,
                s.conversion_rate,
                s.mean_comprehension
            );
        }
        let tradeoff = TradeOff::between(&control, &treatment);
        log::info!(
            "reporter: conversion lift {:+.2} pts, comprehension drop {:.2} pts",
            tradeoff.conversion_lift_points,
            tradeoff.comprehension_drop_points
        );
        Ok(Self {
            control,
            treatment,
            tradeoff,
        })
    }

    pub fn summary(&self, group: Group) -> &GroupSummary {
        match group {
            Group::A => &self.control,
            Group::B => &self.treatment,
        }
    }

    /// Two opposing bars: conversion lift (gain) and comprehension
    /// drop (cost).
    pub fn tradeoff_chart(&self, metric: ChartMetric) -> AuditResult<TradeOffChart> {
        let t = &self.tradeoff;
        let (gain, cost, gain_label, cost_label, y_label) = match metric {
            ChartMetric::Relative => (
                t.conversion_lift_pct
                    .ok_or(AuditError::UndefinedBaseline { metric: "conversion rate" })?,
                t.comprehension_drop_pct
                    .ok_or(AuditError::UndefinedBaseline { metric: "comprehension" })?,
                "Conversion Lift (% vs A)",
                "Comprehension Drop (% vs A)",
                "Relative Change (%)",
            ),
            ChartMetric::Absolute => (
                t.conversion_lift_points,
                t.comprehension_drop_points,
                "Platform Goal Increase (%)",
                "User Comprehension Drop (Points)",
                "Magnitude of Change",
            ),
        };
        Ok(TradeOffChart {
            title: TRADEOFF_TITLE.into(),
            x_label: "Metric".into(),
            y_label: y_label.into(),
            bars: vec![
                Bar {
                    label: gain_label.into(),
                    value: gain,
                    kind: BarKind::Gain,
                },
                Bar {
                    label: cost_label.into(),
                    value: cost,
                    kind: BarKind::Cost,
                },
            ],
        })
    }
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:+.1}%"))
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b) = (&self.control, &self.treatment);
        writeln!(f, "--- Average Nudge Autonomy Deficit (NAD) Scores ---")?;
        let [head_a, head_b] = Group::ALL.map(|g| format!("{g} ({})", g.role()));
        writeln!(f, "  {:<22} {:>14} {:>14}", "", head_a, head_b)?;
        writeln!(f, "  {:<22} {:>14} {:>14}", "users", a.count, b.count)?;
        writeln!(
            f,
            "  {:<22} {:>14.2} {:>14.2}",
            "mean NAD (0-100)", a.mean_nad_score, b.mean_nad_score
        )?;
        writeln!(
            f,
            "  {:<22} {:>14.2} {:>14.2}",
            "mean NAD (raw)", a.mean_nad_raw, b.mean_nad_raw
        )?;
        writeln!(
            f,
            "  {:<22} {:>13.1}% {:>13.1}%",
            "conversion rate",
            a.conversion_rate * 100.0,
            b.conversion_rate * 100.0
        )?;
        writeln!(
            f,
            "  {:<22} {:>14.2} {:>14.2}",
            "mean comprehension", a.mean_comprehension, b.mean_comprehension
        )?;
        writeln!(f)?;
        writeln!(f, "--- Ethical Trade-Off (B vs A) ---")?;
        let t = &self.tradeoff;
        writeln!(
            f,
            "  conversion lift:     {:+.2} pts ({})",
            t.conversion_lift_points,
            fmt_pct(t.conversion_lift_pct)
        )?;
        write!(
            f,
            "  comprehension drop:  {:+.2} pts ({})",
            t.comprehension_drop_points,
            fmt_pct(t.comprehension_drop_pct)
        )
    }
}
