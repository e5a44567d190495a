//! Header and KPI cards

use report_model::AnalysisDocument;
use std::sync::Arc;

use crate::chart::ChartRegistry;
use crate::event::PanelId;
use crate::format::{or_dash, percent, timestamp, DASH};
use crate::views::View;
use crate::widget::{Widget, WidgetKind};

pub struct SummaryPanel {
    doc: Arc<AnalysisDocument>,
}

impl SummaryPanel {
    pub fn new(doc: Arc<AnalysisDocument>) -> Self {
        Self { doc }
    }

    /// `start 〜 end (n months)`, or a dash without a period
    pub fn period_label(&self) -> String {
        let period = &self.doc.data_period;
        if period.start.is_empty() && period.end.is_empty() {
            return DASH.to_string();
        }
        format!(
            "{} 〜 {} ({} months)",
            or_dash(&period.start),
            or_dash(&period.end),
            period.total_months
        )
    }
}

fn kpi(title: &str, value: String) -> Widget {
    Widget::panel("kpi-card")
        .with_child(Widget::label(title))
        .with_child(Widget::text(value).with_class("kpi-value"))
}

impl View for SummaryPanel {
    fn panel(&self) -> PanelId {
        PanelId::Summary
    }

    fn render(&self, _charts: &mut ChartRegistry) -> Widget {
        let doc = &self.doc;
        let kpis = &doc.summary_kpi;

        let header = Widget::panel("fund-header")
            .with_child(Widget::heading(or_dash(&doc.fund_name)))
            .with_child(Widget::text(or_dash(&doc.management_company)).with_class("company"))
            .with_child(Widget::text(self.period_label()).with_class("period"))
            .with_child(Widget::text(format!("Analyzed {}", timestamp(&doc.analyzed_at))).with_class("analyzed-at"));

        let top_themes = Widget::new(WidgetKind::List).with_class("top-themes").with_children(
            kpis.top_themes
                .iter()
                .map(|t| Widget::new(WidgetKind::Item).with_text(format!("{} ({:.1})", t.theme, t.score))),
        );

        let cards = Widget::panel("kpis")
            .with_child(kpi("Reports analyzed", kpis.total_reports.to_string()))
            .with_child(kpi("Holding changes (latest)", kpis.recent_change_count.to_string()))
            .with_child(kpi("Top-5 hit rate", percent(kpis.backtest_top5_hit_rate * 100.0)))
            .with_child(Widget::panel("kpi-card").with_child(Widget::label("Top themes")).with_child(top_themes));

        let panel = Widget::panel("summary").with_child(header).with_child(cards);
        if doc.disclaimer.trim().is_empty() {
            panel
        } else {
            panel.with_child(Widget::text(doc.disclaimer.clone()).with_class("disclaimer"))
        }
    }
}
