//! Rolling backtest of the candidate ranking

use report_model::AnalysisDocument;
use std::sync::Arc;

use crate::chart::ChartRegistry;
use crate::event::PanelId;
use crate::format::{join_or_dash, or_dash, percent, DASH};
use crate::views::View;
use crate::widget::{Widget, WidgetKind};

/// Metrics key shown in the per-period table
const PERIOD_TOP_K: &str = "top_5";

pub struct BacktestReport {
    doc: Arc<AnalysisDocument>,
}

impl BacktestReport {
    pub fn new(doc: Arc<AnalysisDocument>) -> Self {
        Self { doc }
    }
}

fn header_row(titles: &[&str]) -> Widget {
    Widget::new(WidgetKind::Row).with_children(
        titles
            .iter()
            .map(|t| Widget::new(WidgetKind::HeaderCell).with_text(*t)),
    )
}

impl View for BacktestReport {
    fn panel(&self) -> PanelId {
        PanelId::Backtest
    }

    fn render(&self, _charts: &mut ChartRegistry) -> Widget {
        let backtest = &self.doc.backtest;
        let mut panel = Widget::panel("backtest").with_child(Widget::heading("Backtest"));

        if !backtest.error.trim().is_empty() {
            panel = panel.with_child(Widget::text(backtest.error.clone()).with_class("notice"));
        }
        if backtest.summary.is_empty() && backtest.results.is_empty() {
            return panel.with_child(Widget::placeholder("No backtest results"));
        }

        let summary_rows = backtest.summary_by_k().into_iter().map(|(k, s)| {
            Widget::new(WidgetKind::Row)
                .with_child(Widget::cell(format!("Top {}", k)))
                .with_child(Widget::cell(percent(s.avg_hit_rate * 100.0)))
                .with_child(Widget::cell(percent(s.avg_precision * 100.0)))
                .with_child(Widget::cell(percent(s.avg_recall * 100.0)))
                .with_child(Widget::cell(s.total_periods.to_string()))
        });
        let summary = Widget::new(WidgetKind::Table)
            .with_class("backtest-summary")
            .with_child(header_row(&["K", "Hit rate", "Precision", "Recall", "Periods"]))
            .with_children(summary_rows);

        let period_rows = backtest.results.iter().map(|period| {
            let hits = period
                .metrics
                .get(PERIOD_TOP_K)
                .map(|m| join_or_dash(&m.hits))
                .unwrap_or_else(|| DASH.to_string());
            Widget::new(WidgetKind::Row)
                .with_child(Widget::cell(or_dash(&period.train_until)))
                .with_child(Widget::cell(or_dash(&period.predicted_month)))
                .with_child(Widget::cell(join_or_dash(&period.actual_new_entries)))
                .with_child(Widget::cell(hits))
        });
        let periods = Widget::new(WidgetKind::Table)
            .with_class("backtest-periods")
            .with_child(header_row(&["Trained until", "Predicted month", "Actual new entries", "Top-5 hits"]))
            .with_children(period_rows);

        panel.with_child(summary).with_child(periods)
    }
}
