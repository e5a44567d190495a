//! Monthly policy excerpts with keyword cloud, keyword delta and signals

use report_model::{AnalysisDocument, ReportText};
use std::sync::Arc;

use crate::chart::ChartRegistry;
use crate::event::{DashboardEvent, PanelId};
use crate::format::or_dash;
use crate::views::{month_nav, MonthCursor, View};
use crate::widget::{Widget, WidgetKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    Large,
    Medium,
    Small,
}

impl SizeTier {
    pub fn class(&self) -> &'static str {
        match self {
            SizeTier::Large => "size-large",
            SizeTier::Medium => "size-medium",
            SizeTier::Small => "size-small",
        }
    }
}

/// Tier of `count` relative to the month's largest keyword count.
///
/// Large is strictly above 70% of the max; medium is 40% and up.
pub fn size_tier(count: f64, max: f64) -> SizeTier {
    if max <= 0.0 {
        return SizeTier::Small;
    }
    let ratio = count / max;
    if ratio > 0.7 {
        SizeTier::Large
    } else if ratio >= 0.4 {
        SizeTier::Medium
    } else {
        SizeTier::Small
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordEntry {
    pub keyword: String,
    /// Count of the keyword's theme, shared by every keyword of that theme
    pub count: f64,
    pub theme: String,
    pub tier: SizeTier,
}

/// Flatten a report's theme keywords into cloud entries, largest first.
pub fn keyword_cloud(report: &ReportText) -> Vec<KeywordEntry> {
    let mut entries: Vec<(String, f64, String)> = report
        .theme_keywords
        .iter()
        .flat_map(|(theme, keywords)| {
            keywords
                .found_keywords
                .iter()
                .map(move |kw| (kw.clone(), keywords.count, theme.clone()))
        })
        .collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));

    let max = entries.iter().map(|e| e.1).fold(0.0, f64::max);
    entries
        .into_iter()
        .map(|(keyword, count, theme)| KeywordEntry {
            tier: size_tier(count, max),
            keyword,
            count,
            theme,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordDelta {
    pub theme: String,
    pub current: f64,
    pub previous: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeltaState {
    /// First month; nothing to compare against
    NoPrevious,
    NoChange,
    Changes(Vec<KeywordDelta>),
}

/// Per-theme keyword count change for every theme present in `current`.
pub fn keyword_delta(current: &ReportText, previous: Option<&ReportText>) -> DeltaState {
    let Some(previous) = previous else {
        return DeltaState::NoPrevious;
    };

    let mut changes: Vec<KeywordDelta> = current
        .theme_keywords
        .iter()
        .map(|(theme, keywords)| {
            let before = previous.keyword_count(theme);
            KeywordDelta {
                theme: theme.clone(),
                current: keywords.count,
                previous: before,
                delta: keywords.count - before,
            }
        })
        .filter(|d| d.delta != 0.0)
        .collect();

    if changes.is_empty() {
        return DeltaState::NoChange;
    }
    changes.sort_by(|a, b| b.delta.abs().total_cmp(&a.delta.abs()));
    DeltaState::Changes(changes)
}

fn signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

pub struct PolicyTextNavigator {
    doc: Arc<AnalysisDocument>,
    cursor: MonthCursor,
}

impl PolicyTextNavigator {
    pub fn new(doc: Arc<AnalysisDocument>) -> Self {
        let cursor = MonthCursor::new(doc.reports_text.len());
        Self { doc, cursor }
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

    pub fn current(&self) -> Option<&ReportText> {
        self.doc.reports_text.get(self.cursor.index())
    }

    pub fn delta(&self) -> DeltaState {
        let i = self.cursor.index();
        let previous = i.checked_sub(1).and_then(|p| self.doc.reports_text.get(p));
        match self.current() {
            Some(current) => keyword_delta(current, previous),
            None => DeltaState::NoPrevious,
        }
    }

    fn render_cloud(report: &ReportText) -> Widget {
        let cloud = keyword_cloud(report);
        if cloud.is_empty() {
            return Widget::panel("keyword-cloud").with_child(Widget::placeholder("No keywords"));
        }
        Widget::panel("keyword-cloud").with_children(cloud.into_iter().map(|entry| {
            Widget::label(entry.keyword)
                .with_class("keyword")
                .with_class(entry.tier.class())
        }))
    }

    fn render_delta(&self) -> Widget {
        let panel = Widget::panel("keyword-delta").with_child(Widget::label("Change from previous month"));
        match self.delta() {
            DeltaState::NoPrevious => panel.with_child(Widget::placeholder("No previous-month data")),
            DeltaState::NoChange => panel.with_child(Widget::placeholder("No change")),
            DeltaState::Changes(changes) => panel.with_child(
                Widget::new(WidgetKind::List).with_children(changes.into_iter().map(|d| {
                    Widget::new(WidgetKind::Item)
                        .with_class(if d.delta > 0.0 { "delta-up" } else { "delta-down" })
                        .with_text(format!("{} {}", d.theme, signed(d.delta)))
                })),
            ),
        }
    }

    fn render_signals(report: &ReportText) -> Widget {
        let signals = &report.signals;
        let mut panel = Widget::panel("signals");
        if signals.positive.is_empty() && signals.cautious.is_empty() {
            return panel.with_child(Widget::placeholder("No signals"));
        }

        let group = |class: &str, title: &str, words: &[String]| {
            Widget::panel(class)
                .with_child(Widget::label(title))
                .with_children(words.iter().map(|w| Widget::badge(w.clone()).with_class("signal")))
        };
        if !signals.positive.is_empty() {
            panel = panel.with_child(group("signals-positive", "Positive", &signals.positive));
        }
        if !signals.cautious.is_empty() {
            panel = panel.with_child(group("signals-cautious", "Cautious", &signals.cautious));
        }
        panel
    }
}

impl View for PolicyTextNavigator {
    fn panel(&self) -> PanelId {
        PanelId::Policy
    }

    fn render(&self, _charts: &mut ChartRegistry) -> Widget {
        let panel = Widget::panel("policy").with_child(Widget::heading("Investment policy"));
        let Some(report) = self.current() else {
            return panel.with_child(Widget::placeholder("No report text"));
        };

        tracing::debug!("Rendering policy text for {}", or_dash(&report.month));
        let excerpt = if report.sections.future_policy.trim().is_empty() {
            Widget::placeholder("No policy text for this month")
        } else {
            Widget::text(report.sections.future_policy.clone()).with_class("policy-text")
        };

        panel
            .with_child(month_nav(
                &self.cursor,
                or_dash(&report.month),
                DashboardEvent::PolicyPrev,
                DashboardEvent::PolicyNext,
            ))
            .with_child(excerpt)
            .with_child(Self::render_cloud(report))
            .with_child(self.render_delta())
            .with_child(Self::render_signals(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::MemoryChartBackend;
    use crate::views::fixtures;
    use serde_json::json;

    fn charts() -> ChartRegistry {
        ChartRegistry::new(Box::new(MemoryChartBackend::new()))
    }

    #[test]
    fn test_size_tier_boundaries() {
        assert_eq!(size_tier(10.0, 10.0), SizeTier::Large);
        assert_eq!(size_tier(7.0, 10.0), SizeTier::Medium);
        assert_eq!(size_tier(7.1, 10.0), SizeTier::Large);
        assert_eq!(size_tier(4.0, 10.0), SizeTier::Medium);
        assert_eq!(size_tier(3.9, 10.0), SizeTier::Small);
        assert_eq!(size_tier(0.0, 0.0), SizeTier::Small);
    }

    #[test]
    fn test_keyword_cloud_uses_theme_count() {
        let nav = PolicyTextNavigator::new(fixtures::sample());
        let cloud = keyword_cloud(nav.current().unwrap());

        let keywords: Vec<&str> = cloud.iter().map(|e| e.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["AI", "データセンター", "ロボット"]);
        assert_eq!(cloud[1].count, 9.0);
        assert_eq!(cloud[1].theme, "AI");
        assert_eq!(cloud[1].tier, SizeTier::Large);
        assert_eq!(cloud[2].tier, SizeTier::Small);
    }

    #[test]
    fn test_zero_counts_render_small() {
        let doc = fixtures::document(json!({
            "reports_text": [{ "month": "2024-01", "theme_keywords": {
                "AI": { "count": 0, "found_keywords": ["AI"] }
            } }]
        }));
        let cloud = keyword_cloud(&doc.reports_text[0]);
        assert_eq!(cloud[0].tier, SizeTier::Small);
    }

    #[test]
    fn test_delta_sorted_by_magnitude() {
        let doc = fixtures::document(json!({
            "reports_text": [
                { "theme_keywords": { "AI": { "count": 10 }, "EV": { "count": 5 }, "Chips": { "count": 2 } } },
                { "theme_keywords": { "AI": { "count": 11 }, "EV": { "count": 1 }, "Chips": { "count": 2 },
                                      "Robotics": { "count": 3 } } }
            ]
        }));
        let DeltaState::Changes(changes) = keyword_delta(&doc.reports_text[1], doc.reports_text.first())
        else {
            panic!("expected changes");
        };

        let themes: Vec<&str> = changes.iter().map(|d| d.theme.as_str()).collect();
        assert_eq!(themes, vec!["EV", "Robotics", "AI"]);
        assert_eq!(changes[0].delta, -4.0);
        assert_eq!(changes[1].previous, 0.0);
    }

    #[test]
    fn test_delta_states_across_months() {
        let mut nav = PolicyTextNavigator::new(fixtures::sample());
        assert!(matches!(nav.delta(), DeltaState::Changes(ref c) if c.len() == 2));

        nav.prev();
        let DeltaState::Changes(changes) = nav.delta() else {
            panic!("expected changes");
        };
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].theme, "AI");
        assert_eq!(changes[0].delta, 2.0);

        nav.prev();
        assert_eq!(nav.delta(), DeltaState::NoPrevious);
    }

    #[test]
    fn test_unchanged_counts_report_no_change() {
        let doc = fixtures::document(json!({
            "reports_text": [
                { "theme_keywords": { "AI": { "count": 3 } } },
                { "theme_keywords": { "AI": { "count": 3 } } }
            ]
        }));
        let nav = PolicyTextNavigator::new(doc);
        assert_eq!(nav.delta(), DeltaState::NoChange);
        assert!(nav.render(&mut charts()).contains_text("No change"));
    }

    #[test]
    fn test_single_report_navigation_is_noop() {
        let doc = fixtures::document(json!({
            "reports_text": [{ "month": "2024-01", "sections": { "future_policy": "Stay the course." } }]
        }));
        let mut nav = PolicyTextNavigator::new(doc);
        assert!(!nav.prev());
        assert!(!nav.next());
        assert_eq!(nav.month_index(), 0);

        let widget = nav.render(&mut charts());
        assert!(widget.contains_text("No previous-month data"));
        assert!(widget.contains_text("Stay the course."));
        assert!(widget.find_action(&DashboardEvent::PolicyPrev).unwrap().disabled);
        assert!(widget.find_action(&DashboardEvent::PolicyNext).unwrap().disabled);
    }

    #[test]
    fn test_signal_groups_render_only_when_present() {
        let mut nav = PolicyTextNavigator::new(fixtures::sample());
        let latest = nav.render(&mut charts());
        assert_eq!(latest.find("signals-positive").unwrap().find_all("signal").len(), 2);
        assert!(latest.find("signals-cautious").is_some());

        nav.prev();
        let february = nav.render(&mut charts());
        assert!(february.find("signals").unwrap().contains_text("No signals"));
        assert!(february.contains_text("No policy text for this month"));

        nav.prev();
        let january = nav.render(&mut charts());
        assert!(january.find("signals-positive").is_some());
        assert!(january.find("signals-cautious").is_none());
    }

    #[test]
    fn test_empty_document() {
        let mut nav = PolicyTextNavigator::new(fixtures::document(json!({})));
        assert!(!nav.next());
        assert!(nav.current().is_none());
        assert!(nav.render(&mut charts()).contains_text("No report text"));
    }
}
