//! The audit engine: runs the pipeline once, start to finish.
//!
//! EXECUTION ORDER (fixed):
//!   1. Generator  : synthetic trial records
//!   2. Scorer     : NAD per record
//!   3. Reporter   : per-group aggregates and trade-off
//!   4. Chart      : only when a renderer is supplied
//!
//! RULES:
//!   - All randomness flows through the RngBank.
//!   - Every stage milestone, and the first failure, lands in the event log.
//!   - The first error ends the run. There is no partial result.

use crate::{
    chart::{ChartRenderer, TradeOffChart},
    config::AuditConfig,
    error::{AuditError, AuditResult},
    event::{AuditEvent, EventLogEntry},
    generator::{group_counts, DatasetGenerator},
    reporter::AuditReport,
    rng::RngBank,
    scorer::AutonomyScorer,
    types::TrialRecord,
};

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub seed: u64,
    pub records: Vec<TrialRecord>,
    pub report: AuditReport,
    pub chart: Option<TradeOffChart>,
}

pub struct AuditEngine {
    pub run_id: String,
    pub config: AuditConfig,
    pub rng_bank: RngBank,
    events: Vec<EventLogEntry>,
}

impl AuditEngine {
    pub fn new(config: AuditConfig, seed: u64) -> Self {
        Self {
            run_id: format!("audit-{seed}"),
            config,
            rng_bank: RngBank::new(seed),
            events: Vec::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.rng_bank.master_seed()
    }

    /// Run the whole pipeline. Pass a renderer to also draw the chart.
    pub fn run(&mut self, renderer: Option<&dyn ChartRenderer>) -> AuditResult<AuditOutcome> {
        self.events.clear();
        self.record(
            "engine",
            AuditEvent::RunInitialized {
                run_id: self.run_id.clone(),
                seed: self.seed(),
                rows: self.config.rows,
            },
        )?;

        let generated = DatasetGenerator::new(&self.config).generate(&self.rng_bank);
        let records = self.stage("generator", generated)?;
        let (control, treatment) = group_counts(&records);
        self.record("generator", AuditEvent::DatasetGenerated { control, treatment })?;

        let scored = AutonomyScorer::new(self.config.weights, self.config.bounds.clone())
            .and_then(|scorer| scorer.score_all(records));
        let records = self.stage("scorer", scored)?;
        let mean_nad_score = records.iter().filter_map(|r| r.nad_score).sum::<f64>()
            / records.len() as f64;
        self.record(
            "scorer",
            AuditEvent::RecordsScored {
                count: records.len(),
                mean_nad_score,
            },
        )?;

        let report = self.stage("reporter", AuditReport::build(&records))?;
        self.record(
            "reporter",
            AuditEvent::ReportBuilt {
                mean_nad_a: report.control.mean_nad_score,
                mean_nad_b: report.treatment.mean_nad_score,
                conversion_lift_points: report.tradeoff.conversion_lift_points,
                comprehension_drop_points: report.tradeoff.comprehension_drop_points,
            },
        )?;

        let chart = match renderer {
            Some(renderer) => {
                let built = report.tradeoff_chart(self.config.chart_metric);
                let chart = self.stage("reporter", built)?;
                let rendered = renderer.render(&chart);
                self.stage("chart", rendered)?;
                self.record(
                    "chart",
                    AuditEvent::ChartRendered {
                        renderer: renderer.name().to_string(),
                        bars: chart.bars.len(),
                    },
                )?;
                Some(chart)
            }
            None => None,
        };

        Ok(AuditOutcome {
            seed: self.seed(),
            records,
            report,
            chart,
        })
    }

    pub fn events(&self) -> &[EventLogEntry] {
        &self.events
    }

    /// One JSON object per line, in order.
    pub fn event_log_json(&self) -> AuditResult<String> {
        let lines = self
            .events
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }

    /// Pass a stage result through, logging and recording a failure.
    fn stage<T>(&mut self, stage: &'static str, result: AuditResult<T>) -> AuditResult<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                log::error!("{stage} failed: {err}");
                let group = match &err {
                    AuditError::EmptyDataset { group } => Some(*group),
                    _ => None,
                };
                self.record(
                    stage,
                    AuditEvent::StageFailed {
                        stage: stage.to_string(),
                        group,
                        message: err.to_string(),
                    },
                )?;
                Err(err)
            }
        }
    }

    fn record(&mut self, stage: &'static str, event: AuditEvent) -> AuditResult<()> {
        let entry = EventLogEntry {
            seq: self.events.len() as u64,
            stage: stage.to_string(),
            event_type: event.type_name().to_string(),
            payload: serde_json::to_string(&event)?,
        };
        log::debug!("event #{} {} {}", entry.seq, entry.stage, entry.event_type);
        self.events.push(entry);
        Ok(())
    }
}
