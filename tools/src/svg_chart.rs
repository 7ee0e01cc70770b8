//! plotters-backed renderer for the trade-off chart.

use nudge_audit_core::{
    chart::{BarKind, ChartRenderer, TradeOffChart},
    error::{AuditError, AuditResult},
};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};

pub const DEFAULT_CHART_PATH: &str = "nudge_tradeoff.svg";

pub struct SvgChartRenderer {
    path: PathBuf,
    size: (u32, u32),
}

impl SvgChartRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            size: (1000, 600),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn bar_color(kind: BarKind) -> RGBColor {
    match kind {
        BarKind::Gain => RGBColor(46, 139, 87),
        BarKind::Cost => RGBColor(200, 40, 40),
    }
}

fn chart_err<E: std::fmt::Display>(e: E) -> AuditError {
    AuditError::Chart(e.to_string())
}

impl ChartRenderer for SvgChartRenderer {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn render(&self, chart: &TradeOffChart) -> AuditResult<()> {
        let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let (lo, hi) = chart.value_range();
        let n = chart.bars.len() as u32;
        let labels: Vec<&str> = chart.bars.iter().map(|b| b.label.as_str()).collect();

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 22))
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..n).into_segmented(), lo..hi)
            .map_err(chart_err)?;

        let label_of = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) => labels
                .get(*i as usize)
                .map(|s| s.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        };
        ctx.configure_mesh()
            .disable_x_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .x_label_formatter(&label_of)
            .draw()
            .map_err(chart_err)?;

        let value_style = ("sans-serif", 16)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom));

        for (i, bar) in chart.bars.iter().enumerate() {
            let i = i as u32;
            let color = bar_color(bar.kind);

            let mut rect = Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0.0),
                    (SegmentValue::Exact(i + 1), bar.value),
                ],
                color.filled(),
            );
            rect.set_margin(0, 0, 60, 60);
            ctx.draw_series(std::iter::once(rect))
                .map_err(chart_err)?
                .label(bar.kind.legend())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));

            ctx.draw_series(std::iter::once(Text::new(
                format!("{:.2}", bar.value),
                (SegmentValue::CenterOf(i), bar.value.max(0.0)),
                value_style.clone(),
            )))
            .map_err(chart_err)?;
        }

        ctx.configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
        log::info!("chart: wrote {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nudge_audit_core::{chart::TRADEOFF_TITLE, config::AuditConfig, engine::AuditEngine};

    #[test]
    fn audit_run_writes_titled_svg() {
        let path = std::env::temp_dir().join(format!("nudge-tradeoff-{}.svg", std::process::id()));
        let renderer = SvgChartRenderer::new(&path);
        let config = AuditConfig {
            rows: 60,
            ..AuditConfig::default()
        };

        AuditEngine::new(config, 42)
            .run(Some(&renderer as &dyn ChartRenderer))
            .expect("audit with chart");

        let svg = std::fs::read_to_string(&path).expect("chart file written");
        std::fs::remove_file(&path).ok();
        assert!(svg.contains("<svg"), "not an SVG document");
        assert!(svg.contains(TRADEOFF_TITLE), "title missing from chart");
    }
}
