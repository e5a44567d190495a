//! Extraction quality of the source reports

use report_model::{AnalysisDocument, QualitySummary};
use std::sync::Arc;

use crate::chart::ChartRegistry;
use crate::event::PanelId;
use crate::format::{join_or_dash, or_dash, percent, rate, rate_class};
use crate::views::View;
use crate::widget::{Widget, WidgetKind};

pub struct QualityReport {
    doc: Arc<AnalysisDocument>,
    good_threshold: f64,
}

impl QualityReport {
    pub fn new(doc: Arc<AnalysisDocument>, good_threshold: f64) -> Self {
        Self { doc, good_threshold }
    }

    fn quality(&self) -> &QualitySummary {
        &self.doc.quality
    }

    /// Successful extractions as a percentage of all reports
    pub fn success_rate(&self) -> f64 {
        let q = self.quality();
        rate(q.successful_extractions as f64, q.total_reports as f64)
    }

    /// Reports with a holdings table as a percentage of all reports
    pub fn holdings_coverage(&self) -> f64 {
        let q = self.quality();
        rate(q.reports_with_holdings as f64, q.total_reports as f64)
    }

    fn stat(&self, title: &str, value: f64) -> Widget {
        Widget::panel("quality-stat")
            .with_child(Widget::label(title))
            .with_child(
                Widget::text(percent(value))
                    .with_class("stat-value")
                    .with_class(rate_class(value, self.good_threshold)),
            )
    }
}

fn list_cell(items: &[String]) -> Widget {
    Widget::cell(join_or_dash(items)).with_class(if items.is_empty() { "" } else { "highlight" })
}

impl View for QualityReport {
    fn panel(&self) -> PanelId {
        PanelId::Quality
    }

    fn render(&self, _charts: &mut ChartRegistry) -> Widget {
        let q = self.quality();
        let stats = Widget::panel("quality-stats")
            .with_child(
                Widget::panel("quality-stat")
                    .with_child(Widget::label("Reports"))
                    .with_child(Widget::text(q.total_reports.to_string()).with_class("stat-value")),
            )
            .with_child(self.stat("Extraction success", self.success_rate()))
            .with_child(self.stat("Holdings coverage", self.holdings_coverage()));

        let header = Widget::new(WidgetKind::Row).with_children(
            ["Month", "Status", "Extracted", "Missing", "Issues"]
                .into_iter()
                .map(|h| Widget::new(WidgetKind::HeaderCell).with_text(h)),
        );
        let rows = q.per_report.iter().map(|report| {
            let (status, class) = if report.success {
                ("✓", "status-ok")
            } else {
                ("✗", "status-failed")
            };
            Widget::new(WidgetKind::Row)
                .with_child(Widget::cell(or_dash(&report.month)))
                .with_child(Widget::cell(status).with_class(class))
                .with_child(Widget::cell(join_or_dash(&report.extracted_fields)))
                .with_child(list_cell(&report.missing_fields))
                .with_child(list_cell(&report.issues))
        });

        Widget::panel("quality")
            .with_child(Widget::heading("Data quality"))
            .with_child(stats)
            .with_child(
                Widget::new(WidgetKind::Table)
                    .with_class("quality-table")
                    .with_child(header)
                    .with_children(rows),
            )
    }
}
