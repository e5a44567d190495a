//! Theme intensity over time

use report_model::{AnalysisDocument, ThemeIntensity, TrendDirection, YearMonth};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::chart::{ChartOptions, ChartRegistry, ChartSeries, YAxis};
use crate::event::{DashboardEvent, PanelId, Period};
use crate::views::View;
use crate::widget::Widget;

pub const THEME_CHART: &str = "theme-chart";

/// Months of `series` inside `period`, measured back from the last entry.
///
/// Months that do not parse as `YYYY-MM` are dropped from every window except
/// [`Period::All`]; if the last month itself is malformed only `All` shows data.
pub fn filter_by_period(series: &[ThemeIntensity], period: Period) -> Vec<&ThemeIntensity> {
    if period == Period::All {
        return series.iter().collect();
    }

    let Some(last) = series.last() else {
        return Vec::new();
    };
    let latest: YearMonth = match last.month.parse() {
        Ok(ym) => ym,
        Err(e) => {
            tracing::warn!("Cannot apply {} window: {}", period.key(), e);
            return Vec::new();
        }
    };

    series
        .iter()
        .filter(|entry| {
            let Ok(month) = entry.month.parse::<YearMonth>() else {
                tracing::debug!("Skipping malformed month {:?}", entry.month);
                return false;
            };
            match period.max_distance() {
                Some(max) => month.months_until(&latest) <= max,
                None => month.year == latest.year,
            }
        })
        .collect()
}

pub struct ThemeTimeSeriesView {
    doc: Arc<AnalysisDocument>,
    period: Period,
    active_themes: BTreeSet<String>,
}

impl ThemeTimeSeriesView {
    pub fn new(doc: Arc<AnalysisDocument>) -> Self {
        let period = Period::default();
        let active_themes = filter_by_period(&doc.theme_intensity, period)
            .first()
            .map(|bucket| bucket.scores.keys().cloned().collect())
            .unwrap_or_default();

        Self {
            doc,
            period,
            active_themes,
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn active_themes(&self) -> &BTreeSet<String> {
        &self.active_themes
    }

    pub fn set_period(&mut self, period: Period) {
        self.period = period;
    }

    pub fn toggle_theme(&mut self, theme: &str) {
        if !self.active_themes.remove(theme) {
            self.active_themes.insert(theme.to_string());
        }
    }

    pub fn visible_months(&self) -> Vec<&ThemeIntensity> {
        filter_by_period(&self.doc.theme_intensity, self.period)
    }

    /// Every theme that appears in any month, for the toggle row
    pub fn available_themes(&self) -> BTreeSet<&str> {
        self.doc
            .theme_intensity
            .iter()
            .flat_map(|entry| entry.scores.keys().map(String::as_str))
            .collect()
    }

    pub fn chart_options(&self) -> ChartOptions {
        let months = self.visible_months();

        ChartOptions {
            title: None,
            x_axis: months.iter().map(|m| m.month.clone()).collect(),
            y_axis: YAxis {
                name: Some("Intensity".to_string()),
                inverse: false,
                min: Some(0.0),
            },
            series: self
                .active_themes
                .iter()
                .map(|theme| ChartSeries {
                    name: theme.clone(),
                    data: months.iter().map(|m| m.score(theme)).collect(),
                })
                .collect(),
            legend: true,
        }
    }

    fn trend_arrow(&self, theme: &str) -> Option<&'static str> {
        let point = self.doc.theme_trends.get(theme)?.last()?;
        Some(match point.direction {
            TrendDirection::Up => "↑",
            TrendDirection::Down => "↓",
            TrendDirection::Stable => "→",
        })
    }
}

impl View for ThemeTimeSeriesView {
    fn panel(&self) -> PanelId {
        PanelId::Themes
    }

    fn render(&self, charts: &mut ChartRegistry) -> Widget {
        let periods = Widget::panel("period-filter").with_children(Period::ALL.iter().map(|p| {
            Widget::button(p.label(), DashboardEvent::SetPeriod(*p))
                .with_class(if *p == self.period { "active" } else { "" })
        }));

        let toggles = Widget::panel("theme-toggles").with_children(
            self.available_themes().into_iter().map(|theme| {
                let label = match self.trend_arrow(theme) {
                    Some(arrow) => format!("{} {}", theme, arrow),
                    None => theme.to_string(),
                };
                let state = if self.active_themes.contains(theme) {
                    "active"
                } else {
                    "inactive"
                };
                Widget::button(label, DashboardEvent::ToggleTheme(theme.to_string()))
                    .with_class("theme-toggle")
                    .with_class(state)
            }),
        );

        let options = self.chart_options();
        tracing::debug!(
            "Rendering theme chart: {} months x {} themes",
            options.x_axis.len(),
            options.series.len()
        );
        charts.render(THEME_CHART, &options);

        let body = if options.x_axis.is_empty() {
            Widget::placeholder("No theme data for this period")
        } else {
            Widget::chart(THEME_CHART)
        };

        Widget::panel("themes")
            .with_child(Widget::heading("Theme intensity"))
            .with_child(periods)
            .with_child(toggles)
            .with_child(body)
    }
}
