//! Chart model and the renderer seam.
//!
//! The core only describes *what* to draw. Backends (the plotters SVG
//! renderer in the runner, recording renderers in tests) implement
//! ChartRenderer and decide where pixels go.

use crate::error::AuditResult;
use serde::{Deserialize, Serialize};

pub const TRADEOFF_TITLE: &str = "Ethical Trade-Off: Platform Optimization vs. User Autonomy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarKind {
    /// Platform-favorable movement (drawn green).
    Gain,
    /// User harm (drawn red).
    Cost,
}

impl BarKind {
    pub fn legend(&self) -> &'static str {
        match self {
            Self::Gain => "Platform Gain (Desired)",
            Self::Cost => "User Cost (Ethical Concern)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub kind: BarKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOffChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

impl TradeOffChart {
    /// (min, max) of the value axis, always containing zero and padded
    /// so value labels above the bars stay inside the plot.
    pub fn value_range(&self) -> (f64, f64) {
        let lo = self.bars.iter().map(|b| b.value).fold(0.0_f64, f64::min);
        let hi = self.bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
        let pad = ((hi - lo) * 0.15).max(1.0);
        (if lo < 0.0 { lo - pad } else { 0.0 }, hi + pad)
    }
}

/// Anything that can put a trade-off chart somewhere.
pub trait ChartRenderer {
    fn name(&self) -> &'static str;

    fn render(&self, chart: &TradeOffChart) -> AuditResult<()>;
}
