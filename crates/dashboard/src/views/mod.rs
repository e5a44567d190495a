//! One module per dashboard section.
//!
//! Each view owns its own UI state and renders only itself; all of them read
//! from the same immutable [`report_model::AnalysisDocument`].

pub mod backtest;
pub mod candidates;
pub mod holdings;
pub mod policy;
pub mod quality;
pub mod summary;
pub mod themes;

pub use backtest::BacktestReport;
pub use candidates::CandidateRanker;
pub use holdings::{ChangeBadge, HoldingRow, HoldingsNavigator};
pub use policy::{DeltaState, KeywordDelta, KeywordEntry, PolicyTextNavigator, SizeTier};
pub use quality::QualityReport;
pub use summary::SummaryPanel;
pub use themes::ThemeTimeSeriesView;

use crate::chart::ChartRegistry;
use crate::event::{DashboardEvent, PanelId};
use crate::widget::Widget;

pub trait View {
    fn panel(&self) -> PanelId;

    /// Build the panel's widget tree, pushing chart options to `charts`.
    fn render(&self, charts: &mut ChartRegistry) -> Widget;
}

/// Clamped month cursor shared by the month-indexed views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    index: usize,
    len: usize,
}

impl MonthCursor {
    /// Starts at the most recent month.
    pub fn new(len: usize) -> Self {
        Self {
            index: len.saturating_sub(1),
            len,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.len
    }

    /// Step back one month; returns false (and does nothing) at the start.
    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Step forward one month; returns false (and does nothing) at the end.
    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.index += 1;
            true
        } else {
            false
        }
    }
}

/// `‹ month ›` navigation bar
pub(crate) fn month_nav(
    cursor: &MonthCursor,
    month: &str,
    prev: DashboardEvent,
    next: DashboardEvent,
) -> Widget {
    Widget::panel("month-nav")
        .with_child(Widget::button("‹", prev).disabled(!cursor.has_prev()))
        .with_child(
            Widget::label(format!("{} ({}/{})", month, cursor.index() + 1, cursor.len()))
                .with_class("month-label"),
        )
        .with_child(Widget::button("›", next).disabled(!cursor.has_next()))
}
