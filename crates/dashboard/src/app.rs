//! Dashboard shell: load state, event dispatch and per-panel re-render

use chrono::{Local, NaiveDate};
use report_loader::LoadResult;
use report_model::AnalysisDocument;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::chart::{ChartBackend, ChartRegistry};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::event::{DashboardEvent, Effect, PanelId};
use crate::views::{
    BacktestReport, CandidateRanker, HoldingsNavigator, PolicyTextNavigator, QualityReport,
    SummaryPanel, ThemeTimeSeriesView, View,
};
use crate::widget::Widget;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState<T> {
    #[default]
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Every view, each owning its own UI state
pub struct Views {
    pub summary: SummaryPanel,
    pub themes: ThemeTimeSeriesView,
    pub holdings: HoldingsNavigator,
    pub policy: PolicyTextNavigator,
    pub candidates: CandidateRanker,
    pub backtest: BacktestReport,
    pub quality: QualityReport,
}

impl Views {
    pub fn new(doc: Arc<AnalysisDocument>, config: &DashboardConfig) -> Self {
        Self {
            summary: SummaryPanel::new(Arc::clone(&doc)),
            themes: ThemeTimeSeriesView::new(Arc::clone(&doc)),
            holdings: HoldingsNavigator::new(Arc::clone(&doc), config.history_window),
            policy: PolicyTextNavigator::new(Arc::clone(&doc)),
            candidates: CandidateRanker::new(Arc::clone(&doc), config.candidate_limit),
            backtest: BacktestReport::new(Arc::clone(&doc)),
            quality: QualityReport::new(doc, config.good_rate_threshold),
        }
    }

    pub fn view(&self, panel: PanelId) -> &dyn View {
        match panel {
            PanelId::Summary => &self.summary,
            PanelId::Themes => &self.themes,
            PanelId::Holdings => &self.holdings,
            PanelId::Policy => &self.policy,
            PanelId::Candidates => &self.candidates,
            PanelId::Backtest => &self.backtest,
            PanelId::Quality => &self.quality,
        }
    }

    /// Route an interaction to the view that owns it.
    fn apply(&mut self, event: &DashboardEvent) {
        match event {
            DashboardEvent::SetPeriod(period) => self.themes.set_period(*period),
            DashboardEvent::ToggleTheme(theme) => self.themes.toggle_theme(theme),
            DashboardEvent::HoldingsPrev => {
                self.holdings.prev();
            }
            DashboardEvent::HoldingsNext => {
                self.holdings.next();
            }
            DashboardEvent::SelectStock(name) => self.holdings.select_stock(name),
            DashboardEvent::PolicyPrev => {
                self.policy.prev();
            }
            DashboardEvent::PolicyNext => {
                self.policy.next();
            }
            DashboardEvent::ToggleCandidate(rank) => self.candidates.toggle(*rank),
            DashboardEvent::ExportCandidates | DashboardEvent::Resize => {}
        }
    }
}

pub struct Dashboard {
    config: DashboardConfig,
    charts: ChartRegistry,
    state: LoadState<Views>,
    panels: BTreeMap<PanelId, Widget>,
}

impl Dashboard {
    pub fn new(backend: Box<dyn ChartBackend>, config: DashboardConfig) -> Self {
        Self {
            config,
            charts: ChartRegistry::new(backend),
            state: LoadState::Loading,
            panels: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> &LoadState<Views> {
        &self.state
    }

    pub fn views(&self) -> Option<&Views> {
        match &self.state {
            LoadState::Loaded(views) => Some(views),
            _ => None,
        }
    }

    /// Finish startup with the loader's result. A failure is terminal.
    pub fn on_load(&mut self, result: LoadResult<Arc<AnalysisDocument>>) {
        if !self.state.is_loading() {
            tracing::warn!("Ignoring repeated load result");
            return;
        }

        match result {
            Ok(doc) => {
                let views = Views::new(doc, &self.config);
                for panel in PanelId::ALL {
                    let widget = views.view(panel).render(&mut self.charts);
                    self.panels.insert(panel, widget);
                }
                tracing::info!("Dashboard ready: {} panels, {} charts", self.panels.len(), self.charts.len());
                self.state = LoadState::Loaded(views);
            }
            Err(e) => {
                tracing::error!("Dashboard initialization halted: {}", e);
                self.state = LoadState::Error(e.user_message());
            }
        }
    }

    pub fn handle(&mut self, event: DashboardEvent) -> DashboardResult<Option<Effect>> {
        self.handle_at(event, Local::now().date_naive())
    }

    /// Apply `event`, re-rendering only the panel it belongs to. `today`
    /// stamps export filenames.
    pub fn handle_at(&mut self, event: DashboardEvent, today: NaiveDate) -> DashboardResult<Option<Effect>> {
        let LoadState::Loaded(views) = &mut self.state else {
            return Err(DashboardError::NotReady);
        };

        match &event {
            DashboardEvent::Resize => {
                self.charts.resize_all();
                return Ok(None);
            }
            DashboardEvent::ExportCandidates => {
                let export = views.candidates.export(today)?;
                return Ok(Some(Effect::Download(export)));
            }
            _ => views.apply(&event),
        }

        if let Some(panel) = event.panel() {
            tracing::debug!("Re-rendering {} after {}", panel.key(), event.action());
            let widget = views.view(panel).render(&mut self.charts);
            self.panels.insert(panel, widget);
        }
        Ok(None)
    }

    /// Dispatch a widget action string, e.g. from a click in the HTML page.
    pub fn handle_action(&mut self, action: &str) -> DashboardResult<Option<Effect>> {
        match DashboardEvent::from_action(action) {
            Some(event) => self.handle(event),
            None => {
                tracing::warn!("Unknown action {:?}", action);
                Ok(None)
            }
        }
    }

    pub fn panel(&self, id: PanelId) -> Option<&Widget> {
        self.panels.get(&id)
    }

    /// Shown until the first full render, or with the load error.
    pub fn loading_indicator(&self) -> Option<Widget> {
        match &self.state {
            LoadState::Loading => Some(Widget::panel("loading").with_child(Widget::text("Loading analysis data…"))),
            LoadState::Error(message) => Some(
                Widget::panel("loading")
                    .with_class("error")
                    .with_children(message.lines().map(|line| Widget::text(line.to_string()))),
            ),
            LoadState::Loaded(_) => None,
        }
    }

    /// The whole page: indicator (if any) followed by every rendered panel.
    pub fn root(&self) -> Widget {
        let root = Widget::panel("dashboard");
        match self.loading_indicator() {
            Some(indicator) => root.with_child(indicator),
            None => root.with_children(PanelId::ALL.iter().filter_map(|id| self.panels.get(id).cloned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::MemoryChartBackend;
    use crate::event::Period;
    use crate::views::fixtures;
    use crate::views::themes::THEME_CHART;
    use report_loader::LoadError;

    fn loaded() -> (MemoryChartBackend, Dashboard) {
        let backend = MemoryChartBackend::new();
        let mut dashboard = Dashboard::new(Box::new(backend.clone()), DashboardConfig::default());
        dashboard.on_load(Ok(fixtures::sample()));
        (backend, dashboard)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()
    }

    #[test]
    fn test_loading_then_ready() {
        let mut dashboard = Dashboard::new(Box::new(MemoryChartBackend::new()), DashboardConfig::default());
        assert!(dashboard.state().is_loading());
        assert!(dashboard.root().find("loading").is_some());

        dashboard.on_load(Ok(fixtures::sample()));
        assert!(dashboard.state().is_loaded());
        assert!(dashboard.loading_indicator().is_none());

        let root = dashboard.root();
        assert_eq!(root.children.len(), PanelId::ALL.len());
        assert!(root.find("themes").is_some());
        assert!(root.find("quality").is_some());
    }

    #[test]
    fn test_load_failure_is_terminal() {
        let mut dashboard = Dashboard::new(Box::new(MemoryChartBackend::new()), DashboardConfig::default());
        dashboard.on_load(Err(LoadError::HttpStatus {
            url: "http://localhost/data/analysis_results.json".to_string(),
            status: 404,
        }));

        let message = dashboard.state().error().unwrap();
        assert!(message.contains("HTTP 404"));
        assert!(message.contains("python src/analyze.py"));

        let root = dashboard.root();
        assert_eq!(root.children.len(), 1);
        assert!(root.find("error").is_some());
        assert!(dashboard.panel(PanelId::Summary).is_none());

        assert!(matches!(
            dashboard.handle_at(DashboardEvent::HoldingsPrev, date()),
            Err(DashboardError::NotReady)
        ));

        // a late success does not resurrect the session
        dashboard.on_load(Ok(fixtures::sample()));
        assert!(dashboard.state().error().is_some());
    }

    #[test]
    fn test_event_rerenders_only_its_panel() {
        let (backend, mut dashboard) = loaded();
        let policy_before = dashboard.panel(PanelId::Policy).cloned();

        dashboard.handle_at(DashboardEvent::HoldingsPrev, date()).unwrap();
        assert!(dashboard.panel(PanelId::Holdings).unwrap().contains_text("2024-02 (2/3)"));
        assert_eq!(dashboard.panel(PanelId::Policy).cloned(), policy_before);
        assert_eq!(dashboard.views().unwrap().policy.month_index(), 2);

        dashboard.handle_at(DashboardEvent::SetPeriod(Period::YearToDate), date()).unwrap();
        assert_eq!(backend.record(THEME_CHART).unwrap().updates, 2);
    }

    #[test]
    fn test_views_keep_independent_month_state() {
        let (_, mut dashboard) = loaded();
        dashboard.handle_at(DashboardEvent::PolicyPrev, date()).unwrap();
        dashboard.handle_at(DashboardEvent::PolicyPrev, date()).unwrap();
        dashboard.handle_at(DashboardEvent::PolicyPrev, date()).unwrap();

        let views = dashboard.views().unwrap();
        assert_eq!(views.policy.month_index(), 0);
        assert_eq!(views.holdings.month_index(), 2);
        assert!(dashboard.panel(PanelId::Policy).unwrap().contains_text("No previous-month data"));
    }

    #[test]
    fn test_export_returns_download_effect() {
        let (_, mut dashboard) = loaded();
        let effect = dashboard.handle_at(DashboardEvent::ExportCandidates, date()).unwrap();
        let Some(Effect::Download(export)) = effect else {
            panic!("expected a download");
        };
        assert_eq!(export.filename, "candidates_2024-04-02.csv");
        assert_eq!(export.text().lines().count(), 3);
    }

    #[test]
    fn test_resize_reaches_created_charts() {
        let (backend, mut dashboard) = loaded();
        assert_eq!(dashboard.handle_at(DashboardEvent::Resize, date()).unwrap(), None);
        assert_eq!(backend.record(THEME_CHART).unwrap().resizes, 1);
    }

    #[test]
    fn test_action_strings_dispatch() {
        let (_, mut dashboard) = loaded();
        dashboard.handle_action("toggle-candidate:1").unwrap();
        assert!(dashboard.views().unwrap().candidates.is_expanded(1));
        assert!(dashboard.panel(PanelId::Candidates).unwrap().find("expanded").is_some());

        assert_eq!(dashboard.handle_action("no-such-action").unwrap(), None);
    }
}
