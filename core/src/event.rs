//! The run's event log: one entry per pipeline stage milestone.
//!
//! Kept in memory only. Serialized payloads are what the determinism
//! tests compare, so field order here is part of the contract.

use crate::types::Group;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    RunInitialized {
        run_id: String,
        seed: u64,
        rows: usize,
    },
    DatasetGenerated {
        control: usize,
        treatment: usize,
    },
    RecordsScored {
        count: usize,
        mean_nad_score: f64,
    },
    ReportBuilt {
        mean_nad_a: f64,
        mean_nad_b: f64,
        conversion_lift_points: f64,
        comprehension_drop_points: f64,
    },
    ChartRendered {
        renderer: String,
        bars: usize,
    },
    StageFailed {
        stage: String,
        group: Option<Group>,
        message: String,
    },
}

impl AuditEvent {
    /// Stable string name of the variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. } => "run_initialized",
            Self::DatasetGenerated { .. } => "dataset_generated",
            Self::RecordsScored { .. } => "records_scored",
            Self::ReportBuilt { .. } => "report_built",
            Self::ChartRendered { .. } => "chart_rendered",
            Self::StageFailed { .. } => "stage_failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub seq: u64,
    pub stage: String,
    pub event_type: String,
    pub payload: String,
}
