//! Monthly top-holdings table with change badges and per-stock drill-down

use report_model::{AnalysisDocument, HoldingChange, ReportText};
use std::sync::Arc;

use crate::chart::{ChartOptions, ChartRegistry, ChartSeries, YAxis};
use crate::event::{DashboardEvent, PanelId};
use crate::format::{or_dash, DASH};
use crate::views::{month_nav, MonthCursor, View};
use crate::widget::{Widget, WidgetKind};

pub const RANK_CHART: &str = "holdings-rank-chart";

/// Change marker shown next to a holding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeBadge {
    New,
    Up(i64),
    Down(i64),
    Unchanged,
    /// Dropped out of the list this month
    Excluded,
}

impl ChangeBadge {
    /// Precedence: new entry, then rank-up, then rank-down.
    pub fn for_holding(change: &HoldingChange, name: &str) -> Self {
        if change.is_new(name) {
            ChangeBadge::New
        } else if let Some(delta) = change.rank_up_of(name) {
            ChangeBadge::Up(delta)
        } else if let Some(delta) = change.rank_down_of(name) {
            ChangeBadge::Down(delta)
        } else {
            ChangeBadge::Unchanged
        }
    }

    pub fn label(&self) -> String {
        match self {
            ChangeBadge::New => "NEW".to_string(),
            ChangeBadge::Up(delta) => format!("▲{}", delta),
            ChangeBadge::Down(delta) => format!("▼{}", delta.abs()),
            ChangeBadge::Unchanged => DASH.to_string(),
            ChangeBadge::Excluded => "excluded".to_string(),
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            ChangeBadge::New => "badge-new",
            ChangeBadge::Up(_) => "badge-up",
            ChangeBadge::Down(_) => "badge-down",
            ChangeBadge::Unchanged => "badge-same",
            ChangeBadge::Excluded => "badge-excluded",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoldingRow {
    /// `None` for excluded stocks
    pub rank: Option<u32>,
    pub name: String,
    pub weight: String,
    pub badge: ChangeBadge,
}

pub struct HoldingsNavigator {
    doc: Arc<AnalysisDocument>,
    cursor: MonthCursor,
    selected: Option<String>,
    history_window: usize,
}

impl HoldingsNavigator {
    pub fn new(doc: Arc<AnalysisDocument>, history_window: usize) -> Self {
        let cursor = MonthCursor::new(doc.holding_changes.len());
        Self {
            doc,
            cursor,
            selected: None,
            history_window,
        }
    }

    pub fn month_index(&self) -> usize {
        self.cursor.index()
    }

    pub fn prev(&mut self) -> bool {
        self.cursor.prev()
    }

    pub fn next(&mut self) -> bool {
        self.cursor.next()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select_stock(&mut self, name: &str) {
        self.selected = Some(name.to_string());
    }

    fn current(&self) -> (Option<&HoldingChange>, Option<&ReportText>) {
        let i = self.cursor.index();
        (self.doc.holding_changes.get(i), self.doc.reports_text.get(i))
    }

    fn month_label(&self) -> &str {
        match self.current() {
            (Some(change), _) if !change.month.is_empty() => change.month.as_str(),
            (_, Some(report)) => or_dash(&report.month),
            _ => DASH,
        }
    }

    /// Held stocks in report order followed by this month's exclusions.
    ///
    /// Changes and holdings are joined by position in their series, not by
    /// month string.
    pub fn rows(&self) -> Vec<HoldingRow> {
        let (change, report) = self.current();
        let empty_change = HoldingChange::default();
        let change = change.unwrap_or(&empty_change);
        let holdings = report.map(|r| r.holdings.as_slice()).unwrap_or_default();

        let held = holdings.iter().map(|h| HoldingRow {
            rank: Some(h.rank),
            name: h.name.clone(),
            weight: h.weight.clone(),
            badge: ChangeBadge::for_holding(change, &h.name),
        });

        let excluded = change
            .removed
            .iter()
            .filter(|name| !holdings.iter().any(|h| &h.name == *name))
            .map(|name| HoldingRow {
                rank: None,
                name: name.clone(),
                weight: String::new(),
                badge: ChangeBadge::Excluded,
            });

        held.chain(excluded).collect()
    }

    fn render_table(&self) -> Widget {
        let header = Widget::new(WidgetKind::Row).with_children(
            ["Rank", "Stock", "Weight", "Change"]
                .into_iter()
                .map(|h| Widget::new(WidgetKind::HeaderCell).with_text(h)),
        );

        let rows = self.rows().into_iter().map(|row| {
            let rank = row.rank.map(|r| r.to_string()).unwrap_or_else(|| DASH.to_string());
            let weight = if row.weight.is_empty() {
                DASH.to_string()
            } else {
                format!("{}%", row.weight)
            };
            let excluded = row.badge == ChangeBadge::Excluded;

            Widget::new(WidgetKind::Row)
                .with_class(if excluded { "removed" } else { "held" })
                .on_click(DashboardEvent::SelectStock(row.name.clone()))
                .with_child(Widget::cell(rank))
                .with_child(Widget::cell(row.name.clone()))
                .with_child(Widget::cell(weight))
                .with_child(
                    Widget::new(WidgetKind::Cell)
                        .with_child(Widget::badge(row.badge.label()).with_class(row.badge.class())),
                )
        });

        Widget::new(WidgetKind::Table)
            .with_class("holdings-table")
            .with_child(header)
            .with_children(rows)
    }

    fn render_detail(&self, charts: &mut ChartRegistry) -> Widget {
        let detail = Widget::panel("stock-detail");
        let Some(name) = self.selected.as_deref() else {
            return detail.with_child(Widget::placeholder("Select a stock to see its history"));
        };

        let history = self
            .doc
            .holdings_history
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if history.is_empty() {
            return detail
                .with_child(Widget::heading(name))
                .with_child(Widget::placeholder("No history for this stock"));
        }

        let stats = self.doc.holdings_analysis.get(name);
        let stat = |label: &str, value: Option<String>| {
            Widget::panel("stat")
                .with_child(Widget::label(label))
                .with_child(Widget::text(value.unwrap_or_else(|| DASH.to_string())).with_class("stat-value"))
        };
        let stats_row = Widget::panel("stock-stats")
            .with_child(stat("Appearances", stats.map(|s| s.total_appearances.to_string())))
            .with_child(stat("Avg rank", stats.map(|s| format!("{:.1}", s.avg_rank))))
            .with_child(stat("Consecutive months", stats.map(|s| s.consecutive_months.to_string())))
            .with_child(stat(
                "Best rank",
                stats.filter(|s| s.best_rank > 0).map(|s| s.best_rank.to_string()),
            ))
            .with_child(stat("Appearance rate", stats.map(|s| format!("{:.1}%", s.appearance_rate))));

        let recent = &history[history.len().saturating_sub(self.history_window)..];
        charts.render(
            RANK_CHART,
            &ChartOptions {
                title: Some(format!("{} rank", name)),
                x_axis: recent.iter().map(|e| e.month.clone()).collect(),
                y_axis: YAxis {
                    name: Some("Rank".to_string()),
                    inverse: true,
                    min: Some(1.0),
                },
                series: vec![ChartSeries {
                    name: name.to_string(),
                    data: recent.iter().map(|e| e.rank as f64).collect(),
                }],
                legend: false,
            },
        );

        let entries = Widget::new(WidgetKind::List).with_class("history-list").with_children(
            history.iter().rev().map(|e| {
                let weight = if e.weight.is_empty() {
                    String::new()
                } else {
                    format!(" ({}%)", e.weight)
                };
                Widget::new(WidgetKind::Item).with_text(format!("{}  #{}{}", e.month, e.rank, weight))
            }),
        );

        detail
            .with_child(Widget::heading(name))
            .with_child(stats_row)
            .with_child(Widget::chart(RANK_CHART))
            .with_child(entries)
    }
}

impl View for HoldingsNavigator {
    fn panel(&self) -> PanelId {
        PanelId::Holdings
    }

    fn render(&self, charts: &mut ChartRegistry) -> Widget {
        let panel = Widget::panel("holdings").with_child(Widget::heading("Top holdings"));
        if self.cursor.is_empty() {
            return panel.with_child(Widget::placeholder("No holdings data"));
        }

        tracing::debug!("Rendering holdings for month index {}", self.cursor.index());
        panel
            .with_child(month_nav(
                &self.cursor,
                self.month_label(),
                DashboardEvent::HoldingsPrev,
                DashboardEvent::HoldingsNext,
            ))
            .with_child(self.render_table())
            .with_child(self.render_detail(charts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::MemoryChartBackend;
    use crate::views::fixtures;
    use serde_json::json;

    fn registry() -> (MemoryChartBackend, ChartRegistry) {
        let backend = MemoryChartBackend::new();
        let registry = ChartRegistry::new(Box::new(backend.clone()));
        (backend, registry)
    }

    #[test]
    fn test_starts_at_latest_month_and_clamps() {
        let mut nav = HoldingsNavigator::new(fixtures::sample(), 12);
        assert_eq!(nav.month_index(), 2);
        assert!(!nav.next());
        assert_eq!(nav.month_index(), 2);

        assert!(nav.prev());
        assert!(nav.prev());
        assert!(!nav.prev());
        assert_eq!(nav.month_index(), 0);

        let (_, mut charts) = registry();
        nav.render(&mut charts);
        assert!(nav.next());
        assert_eq!(nav.month_index(), 1);
    }

    #[test]
    fn test_bounds_render_without_panic() {
        let (_, mut charts) = registry();
        let mut nav = HoldingsNavigator::new(fixtures::sample(), 12);
        let last = nav.render(&mut charts);
        assert!(last.find_action(&DashboardEvent::HoldingsNext).unwrap().disabled);
        assert!(!last.find_action(&DashboardEvent::HoldingsPrev).unwrap().disabled);

        while nav.prev() {}
        let first = nav.render(&mut charts);
        assert!(first.find_action(&DashboardEvent::HoldingsPrev).unwrap().disabled);
        assert!(first.contains_text("2024-01 (1/3)"));
    }

    #[test]
    fn test_badges_for_latest_month() {
        let nav = HoldingsNavigator::new(fixtures::sample(), 12);
        let rows = nav.rows();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "Advantest");
        assert_eq!(rows[0].badge.label(), "▲2");
        assert_eq!(rows[1].name, "Disco");
        assert_eq!(rows[1].badge.label(), "▼1");
        assert_eq!(rows[1].weight, "7");
        assert_eq!(rows[2].name, "Tokyo Electron");
        assert_eq!(rows[2].badge, ChangeBadge::Excluded);
        assert_eq!(rows[2].rank, None);
    }

    #[test]
    fn test_new_entry_takes_precedence_over_rank_up() {
        let mut nav = HoldingsNavigator::new(fixtures::sample(), 12);
        nav.prev();
        let disco = nav.rows().into_iter().find(|r| r.name == "Disco").unwrap();
        assert_eq!(disco.badge, ChangeBadge::New);
        assert_eq!(disco.badge.label(), "NEW");
    }

    #[test]
    fn test_removed_stock_still_held_is_not_duplicated() {
        let doc = fixtures::document(json!({
            "holding_changes": [{ "month": "2024-01", "removed": ["A", "B"] }],
            "reports_text": [{ "month": "2024-01", "holdings": [{ "rank": 1, "name": "A" }] }]
        }));
        let rows = HoldingsNavigator::new(doc, 12).rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].badge, ChangeBadge::Unchanged);
        assert_eq!(rows[1].name, "B");
        assert_eq!(rows[1].badge, ChangeBadge::Excluded);
    }

    #[test]
    fn test_excluded_rows_are_de_emphasized() {
        let (_, mut charts) = registry();
        let widget = HoldingsNavigator::new(fixtures::sample(), 12).render(&mut charts);
        let removed = widget.find_all("removed");
        assert_eq!(removed.len(), 1);
        assert!(removed[0].contains_text("excluded"));
        assert!(removed[0].find("badge-excluded").is_some());
    }

    #[test]
    fn test_empty_document() {
        let (_, mut charts) = registry();
        let mut nav = HoldingsNavigator::new(fixtures::document(json!({})), 12);
        assert!(!nav.prev());
        assert!(!nav.next());
        assert_eq!(nav.month_index(), 0);
        assert!(nav.rows().is_empty());
        assert!(nav.render(&mut charts).contains_text("No holdings data"));
    }

    #[test]
    fn test_short_reports_series_yields_no_holdings() {
        let doc = fixtures::document(json!({
            "holding_changes": [{ "month": "2024-01" }, { "month": "2024-02", "removed": ["X"] }],
            "reports_text": [{ "month": "2024-01", "holdings": [{ "rank": 1, "name": "Y" }] }]
        }));
        let rows = HoldingsNavigator::new(doc, 12).rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "X");
    }

    #[test]
    fn test_select_stock_without_history_shows_placeholder() {
        let (backend, mut charts) = registry();
        let mut nav = HoldingsNavigator::new(fixtures::sample(), 12);
        nav.select_stock("Tokyo Electron");

        let widget = nav.render(&mut charts);
        assert!(widget.contains_text("No history for this stock"));
        assert!(backend.record(RANK_CHART).is_none());
    }

    #[test]
    fn test_select_stock_renders_stats_chart_and_history() {
        let (backend, mut charts) = registry();
        let mut nav = HoldingsNavigator::new(fixtures::sample(), 12);
        nav.select_stock("Disco");

        let detail = nav.render(&mut charts);
        let detail = detail.find("stock-detail").unwrap();
        // Disco has history but no aggregate stats
        let values: Vec<&str> = detail.find_all("stat-value").into_iter().flat_map(|w| w.texts()).collect();
        assert_eq!(values, vec!["-", "-", "-", "-", "-"]);

        let items: Vec<&str> = detail.find("history-list").unwrap().texts();
        assert_eq!(items[0], "2024-03  #2 (7.0%)");
        assert_eq!(items[1], "2024-02  #2 (6.8%)");

        let options = backend.options(RANK_CHART).unwrap();
        assert!(options.y_axis.inverse);
        assert_eq!(options.x_axis, vec!["2024-02", "2024-03"]);
    }

    #[test]
    fn test_rank_chart_uses_most_recent_window() {
        let history: Vec<_> = (1..=15)
            .map(|i| json!({ "month": format!("2023-{:02}", (i - 1) % 12 + 1), "rank": i }))
            .collect();
        let doc = fixtures::document(json!({
            "holding_changes": [{ "month": "2024-01" }],
            "holdings_history": { "A": history },
            "holdings_analysis": { "A": { "total_appearances": 15, "avg_rank": 8.0 } }
        }));
        let (backend, mut charts) = registry();
        let mut nav = HoldingsNavigator::new(doc, 12);
        nav.select_stock("A");
        let widget = nav.render(&mut charts);

        let options = backend.options(RANK_CHART).unwrap();
        assert_eq!(options.series[0].data.len(), 12);
        assert_eq!(options.series[0].data[0], 4.0);
        assert_eq!(options.series[0].data[11], 15.0);
        assert_eq!(widget.find("history-list").unwrap().children.len(), 15);
        assert!(widget.contains_text("8.0"));
    }
}
