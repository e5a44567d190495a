//! UI events, panels and the effects returned to the host.

use serde::{Deserialize, Serialize};

use crate::export::CsvExport;

/// Time window of the theme chart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "3y")]
    ThreeYears,
    #[serde(rename = "ytd")]
    YearToDate,
}

impl Period {
    pub const ALL: [Period; 4] = [
        Period::All,
        Period::OneYear,
        Period::ThreeYears,
        Period::YearToDate,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Period::All => "all",
            Period::OneYear => "1y",
            Period::ThreeYears => "3y",
            Period::YearToDate => "ytd",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Period::ALL.into_iter().find(|p| p.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::All => "All",
            Period::OneYear => "1Y",
            Period::ThreeYears => "3Y",
            Period::YearToDate => "YTD",
        }
    }

    /// Largest month distance from the latest month kept by the window
    pub fn max_distance(&self) -> Option<i32> {
        match self {
            Period::OneYear => Some(12),
            Period::ThreeYears => Some(36),
            Period::All | Period::YearToDate => None,
        }
    }
}

/// Independently rendered sections of the dashboard, in page order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PanelId {
    Summary,
    Themes,
    Holdings,
    Policy,
    Candidates,
    Backtest,
    Quality,
}

impl PanelId {
    pub const ALL: [PanelId; 7] = [
        PanelId::Summary,
        PanelId::Themes,
        PanelId::Holdings,
        PanelId::Policy,
        PanelId::Candidates,
        PanelId::Backtest,
        PanelId::Quality,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PanelId::Summary => "summary",
            PanelId::Themes => "themes",
            PanelId::Holdings => "holdings",
            PanelId::Policy => "policy",
            PanelId::Candidates => "candidates",
            PanelId::Backtest => "backtest",
            PanelId::Quality => "quality",
        }
    }
}

/// A user interaction routed to exactly one view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    SetPeriod(Period),
    ToggleTheme(String),
    HoldingsPrev,
    HoldingsNext,
    SelectStock(String),
    PolicyPrev,
    PolicyNext,
    /// 1-based rank of the card in the displayed list
    ToggleCandidate(usize),
    ExportCandidates,
    Resize,
}

impl DashboardEvent {
    /// The panel re-rendered by this event; `None` for events that only
    /// touch charts or produce an effect.
    pub fn panel(&self) -> Option<PanelId> {
        match self {
            DashboardEvent::SetPeriod(_) | DashboardEvent::ToggleTheme(_) => Some(PanelId::Themes),
            DashboardEvent::HoldingsPrev
            | DashboardEvent::HoldingsNext
            | DashboardEvent::SelectStock(_) => Some(PanelId::Holdings),
            DashboardEvent::PolicyPrev | DashboardEvent::PolicyNext => Some(PanelId::Policy),
            DashboardEvent::ToggleCandidate(_) => Some(PanelId::Candidates),
            DashboardEvent::ExportCandidates | DashboardEvent::Resize => None,
        }
    }

    /// Stable action string attached to widgets, e.g. `set-period:1y`.
    pub fn action(&self) -> String {
        match self {
            DashboardEvent::SetPeriod(p) => format!("set-period:{}", p.key()),
            DashboardEvent::ToggleTheme(theme) => format!("toggle-theme:{}", theme),
            DashboardEvent::HoldingsPrev => "holdings-prev".to_string(),
            DashboardEvent::HoldingsNext => "holdings-next".to_string(),
            DashboardEvent::SelectStock(name) => format!("select-stock:{}", name),
            DashboardEvent::PolicyPrev => "policy-prev".to_string(),
            DashboardEvent::PolicyNext => "policy-next".to_string(),
            DashboardEvent::ToggleCandidate(rank) => format!("toggle-candidate:{}", rank),
            DashboardEvent::ExportCandidates => "export-candidates".to_string(),
            DashboardEvent::Resize => "resize".to_string(),
        }
    }

    /// Inverse of [`DashboardEvent::action`].
    pub fn from_action(action: &str) -> Option<Self> {
        let (name, arg) = match action.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (action, None),
        };

        match (name, arg) {
            ("set-period", Some(p)) => Period::parse(p).map(DashboardEvent::SetPeriod),
            ("toggle-theme", Some(theme)) => Some(DashboardEvent::ToggleTheme(theme.to_string())),
            ("holdings-prev", None) => Some(DashboardEvent::HoldingsPrev),
            ("holdings-next", None) => Some(DashboardEvent::HoldingsNext),
            ("select-stock", Some(name)) => Some(DashboardEvent::SelectStock(name.to_string())),
            ("policy-prev", None) => Some(DashboardEvent::PolicyPrev),
            ("policy-next", None) => Some(DashboardEvent::PolicyNext),
            ("toggle-candidate", Some(rank)) => rank.parse().ok().map(DashboardEvent::ToggleCandidate),
            ("export-candidates", None) => Some(DashboardEvent::ExportCandidates),
            ("resize", None) => Some(DashboardEvent::Resize),
            _ => None,
        }
    }
}

/// Side effect the host must perform after handling an event
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Offer a client-side file download
    Download(CsvExport),
}
