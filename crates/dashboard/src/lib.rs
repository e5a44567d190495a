//! Fund Report Dashboard
//!
//! Turns a loaded analysis document into an abstract widget tree and
//! declarative chart options. Each view keeps its own navigation or filter
//! state and re-renders only itself; the [`Dashboard`] shell owns the load
//! state, routes [`DashboardEvent`]s and hands export files back to the host.

pub mod app;
pub mod chart;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod format;
pub mod html;
pub mod views;
pub mod widget;

pub use app::{Dashboard, LoadState, Views};
pub use chart::{ChartBackend, ChartHandle, ChartOptions, ChartRegistry, ChartSeries, MemoryChartBackend, YAxis};
pub use config::DashboardConfig;
pub use error::{DashboardError, DashboardResult};
pub use event::{DashboardEvent, Effect, PanelId, Period};
pub use export::{candidates_csv, CsvExport, CSV_HEADER};
pub use html::render_page;
pub use views::View;
pub use widget::{Widget, WidgetKind};
