use serde::{Deserialize, Serialize};

/// Display settings for the dashboard views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Maximum candidate cards shown (and exported)
    pub candidate_limit: usize,
    /// Months of history plotted in the stock drill-down chart
    pub history_window: usize,
    /// Percentage at or above which a quality rate is shown as good
    pub good_rate_threshold: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            candidate_limit: 15,
            history_window: 12,
            good_rate_threshold: 80.0,
        }
    }
}
