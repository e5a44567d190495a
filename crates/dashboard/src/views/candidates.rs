//! Ranked candidate cards with score breakdown and CSV export

use chrono::NaiveDate;
use report_model::{AnalysisDocument, Candidate, ScoreDimension};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::chart::ChartRegistry;
use crate::error::DashboardResult;
use crate::event::{DashboardEvent, PanelId};
use crate::export::{candidates_csv, CsvExport};
use crate::format::ratio_percent;
use crate::views::View;
use crate::widget::{Widget, WidgetKind};

/// Denominator floor for the score bars
const MIN_MAX_SCORE: f64 = 0.01;

pub struct CandidateRanker {
    doc: Arc<AnalysisDocument>,
    limit: usize,
    /// 1-based ranks of expanded cards
    expanded: BTreeSet<usize>,
}

impl CandidateRanker {
    pub fn new(doc: Arc<AnalysisDocument>, limit: usize) -> Self {
        Self {
            doc,
            limit,
            expanded: BTreeSet::new(),
        }
    }

    /// Candidates not currently held, in document order, truncated to the limit.
    pub fn displayed(&self) -> Vec<&Candidate> {
        self.doc
            .candidates
            .iter()
            .filter(|c| !c.is_current_holding)
            .take(self.limit)
            .collect()
    }

    /// Highest score over every candidate, held ones included
    pub fn max_score(&self) -> f64 {
        self.doc
            .candidates
            .iter()
            .map(|c| c.total_score)
            .fold(MIN_MAX_SCORE, f64::max)
    }

    pub fn toggle(&mut self, rank: usize) {
        if !self.expanded.remove(&rank) {
            self.expanded.insert(rank);
        }
    }

    pub fn is_expanded(&self, rank: usize) -> bool {
        self.expanded.contains(&rank)
    }

    pub fn export(&self, today: NaiveDate) -> DashboardResult<CsvExport> {
        candidates_csv(&self.displayed(), today)
    }

    fn render_card(&self, rank: usize, candidate: &Candidate, max: f64) -> Widget {
        let tier = if rank <= 3 { "rank-top" } else { "rank-standard" };
        let confidence = candidate.confidence_level();
        let expanded = self.is_expanded(rank);

        let header = Widget::panel("candidate-header")
            .on_click(DashboardEvent::ToggleCandidate(rank))
            .with_child(Widget::badge(rank.to_string()).with_class(tier))
            .with_child(Widget::label(candidate.name.clone()).with_class("candidate-name"))
            // displayed() drops held candidates
            .with_child(Widget::label("Not held").with_class("holding-status"))
            .with_child(
                Widget::badge(if candidate.confidence.is_empty() {
                    confidence.as_str().to_string()
                } else {
                    candidate.confidence.clone()
                })
                .with_class("confidence")
                .with_class(&format!("confidence-{}", confidence.as_str())),
            );

        let score = Widget::panel("candidate-score")
            .with_child(Widget::meter(candidate.total_score / max * 100.0))
            .with_child(Widget::text(format!("{:.2}", candidate.total_score)).with_class("score-value"));

        let card = Widget::panel("candidate-card")
            .with_class(if expanded { "expanded" } else { "collapsed" })
            .with_child(header)
            .with_child(score);
        if !expanded {
            return card;
        }

        let breakdown = Widget::panel("score-breakdown").with_children(ScoreDimension::ALL.iter().map(|dim| {
            let ratio = candidate.breakdown(*dim);
            Widget::panel("dimension")
                .with_child(Widget::label(dim.label()))
                .with_child(Widget::meter(ratio * 100.0))
                .with_child(Widget::text(ratio_percent(ratio)).with_class("dimension-value"))
        }));
        let explanations = Widget::new(WidgetKind::List)
            .with_class("explanations")
            .with_children(
                candidate
                    .explanations
                    .iter()
                    .map(|e| Widget::new(WidgetKind::Item).with_text(e.clone())),
            );

        card.with_child(breakdown).with_child(explanations)
    }
}

impl View for CandidateRanker {
    fn panel(&self) -> PanelId {
        PanelId::Candidates
    }

    fn render(&self, _charts: &mut ChartRegistry) -> Widget {
        let displayed = self.displayed();
        let panel = Widget::panel("candidates")
            .with_child(Widget::heading("Candidate stocks"))
            .with_child(Widget::button("Export CSV", DashboardEvent::ExportCandidates).with_class("export"));
        if displayed.is_empty() {
            return panel.with_child(Widget::placeholder("No candidates"));
        }

        let max = self.max_score();
        tracing::debug!("Rendering {} candidate cards", displayed.len());
        panel.with_children(
            displayed
                .into_iter()
                .enumerate()
                .map(|(i, candidate)| self.render_card(i + 1, candidate, max)),
        )
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

    fn many(count: usize) -> Arc<AnalysisDocument> {
        let candidates: Vec<_> = (0..count)
            .map(|i| json!({
                "name": format!("Stock {}", i),
                "total_score": 1.0 - i as f64 * 0.01,
                "is_current_holding": i % 5 == 0
            }))
            .collect();
        fixtures::document(json!({ "candidates": candidates }))
    }

    #[test]
    fn test_held_candidates_are_filtered_in_order() {
        let ranker = CandidateRanker::new(fixtures::sample(), 15);
        let names: Vec<&str> = ranker.displayed().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Lasertec", "Sumco"]);
        // the held Advantest still sets the bar scale
        assert_eq!(ranker.max_score(), 0.9);
    }

    #[test]
    fn test_limit_and_export_row_count() {
        let ranker = CandidateRanker::new(many(30), 15);
        assert_eq!(ranker.displayed().len(), 15);
        assert_eq!(ranker.displayed()[0].name, "Stock 1");

        let export = ranker.export(NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()).unwrap();
        assert_eq!(export.text().lines().count(), 16);

        let few = CandidateRanker::new(many(6), 15);
        assert_eq!(few.displayed().len(), 4);
    }

    #[test]
    fn test_empty_candidates() {
        let ranker = CandidateRanker::new(fixtures::document(json!({ "candidates": [] })), 15);
        let widget = ranker.render(&mut charts());
        assert!(widget.find_all("candidate-card").is_empty());
        assert!(widget.contains_text("No candidates"));
        assert_eq!(ranker.max_score(), MIN_MAX_SCORE);

        let export = ranker.export(NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()).unwrap();
        assert_eq!(export.text().lines().count(), 1);
    }

    #[test]
    fn test_card_score_bar_and_rank_tier() {
        let widget = CandidateRanker::new(many(10), 15).render(&mut charts());
        let cards = widget.find_all("candidate-card");
        assert_eq!(cards.len(), 8);
        assert!(cards[2].find("rank-top").is_some());
        assert!(cards[3].find("rank-standard").is_some());

        let first = CandidateRanker::new(fixtures::sample(), 15).render(&mut charts());
        let meter = &first.find("candidate-score").unwrap().children[0];
        match meter.kind {
            WidgetKind::Meter { percent } => assert!((percent - 50.666).abs() < 0.01),
            ref other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_toggle_expands_independently() {
        let mut ranker = CandidateRanker::new(fixtures::sample(), 15);
        let collapsed = ranker.render(&mut charts());
        assert!(collapsed.find("score-breakdown").is_none());

        ranker.toggle(1);
        let widget = ranker.render(&mut charts());
        let cards = widget.find_all("candidate-card");
        assert!(cards[0].has_class("expanded"));
        assert!(cards[1].has_class("collapsed"));

        let values: Vec<&str> = cards[0]
            .find_all("dimension-value")
            .into_iter()
            .flat_map(|w| w.texts())
            .collect();
        assert_eq!(values, vec!["80%", "33%", "0%", "0%", "0%", "0%"]);
        assert_eq!(cards[0].find("explanations").unwrap().children.len(), 2);
        assert!(cards[0].find("confidence-medium").is_some());

        ranker.toggle(1);
        assert!(!ranker.is_expanded(1));
    }

    #[test]
    fn test_unrecognized_confidence_keeps_text_with_unknown_class() {
        let ranker = CandidateRanker::new(
            fixtures::document(json!({
                "candidates": [
                    { "name": "Disco", "total_score": 0.7, "confidence": "Very high" },
                    { "name": "Sumco", "total_score": 0.2 }
                ]
            })),
            15,
        );
        let widget = ranker.render(&mut charts());
        let badges = widget.find_all("confidence-unknown");
        assert_eq!(badges.len(), 2);
        assert_eq!(badges[0].text.as_deref(), Some("Very high"));
        assert_eq!(badges[1].text.as_deref(), Some("unknown"));

        let statuses = widget.find_all("holding-status");
        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(|s| s.text.as_deref() == Some("Not held")));
    }

    #[test]
    fn test_header_dispatches_toggle() {
        let widget = CandidateRanker::new(fixtures::sample(), 15).render(&mut charts());
        assert!(widget.find_action(&DashboardEvent::ToggleCandidate(2)).is_some());
        assert!(widget.find_action(&DashboardEvent::ExportCandidates).is_some());
    }
}
