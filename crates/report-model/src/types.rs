use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Treat an explicit `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Holding weights arrive as text (`"8.5"`) from extracted reports and as
/// numbers from hand-built documents.
fn weight_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawWeight {
        Text(String),
        Number(f64),
    }

    Ok(match Option::<RawWeight>::deserialize(deserializer)? {
        Some(RawWeight::Text(text)) => text,
        Some(RawWeight::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

/// The full analysis document consumed by the dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisDocument {
    #[serde(deserialize_with = "nullable")]
    pub fund_name: String,
    #[serde(deserialize_with = "nullable")]
    pub management_company: String,
    #[serde(deserialize_with = "nullable")]
    pub analyzed_at: String,
    #[serde(deserialize_with = "nullable")]
    pub data_period: DataPeriod,
    #[serde(deserialize_with = "nullable")]
    pub summary_kpi: SummaryKpi,
    #[serde(deserialize_with = "nullable")]
    pub theme_intensity: Vec<ThemeIntensity>,
    #[serde(deserialize_with = "nullable")]
    pub theme_trends: BTreeMap<String, Vec<TrendPoint>>,
    #[serde(deserialize_with = "nullable")]
    pub holdings_analysis: BTreeMap<String, HoldingStats>,
    #[serde(deserialize_with = "nullable")]
    pub holdings_history: BTreeMap<String, Vec<HistoryEntry>>,
    #[serde(deserialize_with = "nullable")]
    pub holding_changes: Vec<HoldingChange>,
    #[serde(deserialize_with = "nullable")]
    pub candidates: Vec<Candidate>,
    #[serde(deserialize_with = "nullable")]
    pub backtest: Backtest,
    #[serde(deserialize_with = "nullable")]
    pub quality: QualitySummary,
    #[serde(deserialize_with = "nullable")]
    pub reports_text: Vec<ReportText>,
    #[serde(deserialize_with = "nullable")]
    pub disclaimer: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPeriod {
    #[serde(deserialize_with = "nullable")]
    pub start: String,
    #[serde(deserialize_with = "nullable")]
    pub end: String,
    #[serde(deserialize_with = "nullable")]
    pub total_months: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryKpi {
    #[serde(deserialize_with = "nullable")]
    pub total_reports: u32,
    #[serde(deserialize_with = "nullable")]
    pub top_themes: Vec<ThemeScore>,
    #[serde(deserialize_with = "nullable")]
    pub recent_change_count: u32,
    #[serde(deserialize_with = "nullable")]
    pub backtest_top5_hit_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeScore {
    #[serde(deserialize_with = "nullable")]
    pub theme: String,
    #[serde(deserialize_with = "nullable")]
    pub score: f64,
}

/// Normalized keyword intensity (0-100) per theme for one report month
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeIntensity {
    #[serde(deserialize_with = "nullable")]
    pub month: String,
    #[serde(deserialize_with = "nullable")]
    pub scores: BTreeMap<String, f64>,
    #[serde(deserialize_with = "nullable")]
    pub total_keywords: f64,
}

impl ThemeIntensity {
    pub fn score(&self, theme: &str) -> f64 {
        self.scores.get(theme).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    #[default]
    #[serde(other)]
    Stable,
}

/// Moving-average trend point for a theme
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendPoint {
    #[serde(deserialize_with = "nullable")]
    pub month: String,
    #[serde(deserialize_with = "nullable")]
    pub value: f64,
    #[serde(deserialize_with = "nullable")]
    pub ma: f64,
    #[serde(deserialize_with = "nullable")]
    pub delta: f64,
    #[serde(deserialize_with = "nullable")]
    pub direction: TrendDirection,
}

/// Aggregate appearance statistics for one stock
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldingStats {
    #[serde(deserialize_with = "nullable")]
    pub total_appearances: u32,
    #[serde(deserialize_with = "nullable")]
    pub appearance_rate: f64,
    #[serde(deserialize_with = "nullable")]
    pub avg_rank: f64,
    #[serde(deserialize_with = "nullable")]
    pub best_rank: u32,
    #[serde(deserialize_with = "nullable")]
    pub consecutive_months: u32,
    #[serde(deserialize_with = "nullable")]
    pub rank_volatility: f64,
}

/// One appearance of a stock in a monthly top-holdings list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryEntry {
    #[serde(deserialize_with = "nullable")]
    pub month: String,
    #[serde(deserialize_with = "nullable")]
    pub rank: u32,
    #[serde(deserialize_with = "weight_text")]
    pub weight: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RankMove {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Positions moved; positive for rank-up, negative for rank-down.
    #[serde(deserialize_with = "nullable")]
    pub change: i64,
}

/// Month-over-month change in the top-holdings list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldingChange {
    #[serde(deserialize_with = "nullable")]
    pub month: String,
    #[serde(deserialize_with = "nullable")]
    pub new_entries: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub removed: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub rank_up: Vec<RankMove>,
    #[serde(deserialize_with = "nullable")]
    pub rank_down: Vec<RankMove>,
}

impl HoldingChange {
    pub fn is_new(&self, name: &str) -> bool {
        self.new_entries.iter().any(|n| n == name)
    }

    pub fn is_removed(&self, name: &str) -> bool {
        self.removed.iter().any(|n| n == name)
    }

    pub fn rank_up_of(&self, name: &str) -> Option<i64> {
        self.rank_up.iter().find(|m| m.name == name).map(|m| m.change)
    }

    pub fn rank_down_of(&self, name: &str) -> Option<i64> {
        self.rank_down.iter().find(|m| m.name == name).map(|m| m.change)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Holding {
    #[serde(deserialize_with = "nullable")]
    pub rank: u32,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "weight_text")]
    pub weight: String,
    #[serde(deserialize_with = "nullable")]
    pub sector: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSections {
    #[serde(deserialize_with = "nullable")]
    pub future_policy: String,
    #[serde(deserialize_with = "nullable")]
    pub operation_review: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeKeywords {
    #[serde(deserialize_with = "nullable")]
    pub count: f64,
    #[serde(deserialize_with = "nullable")]
    pub found_keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Signals {
    #[serde(deserialize_with = "nullable")]
    pub positive: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub cautious: Vec<String>,
}

/// Extracted text and keyword data for one report month
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportText {
    #[serde(deserialize_with = "nullable")]
    pub month: String,
    #[serde(deserialize_with = "nullable")]
    pub holdings: Vec<Holding>,
    #[serde(deserialize_with = "nullable")]
    pub sections: ReportSections,
    #[serde(deserialize_with = "nullable")]
    pub theme_keywords: BTreeMap<String, ThemeKeywords>,
    #[serde(deserialize_with = "nullable")]
    pub signals: Signals,
}

impl ReportText {
    pub fn keyword_count(&self, theme: &str) -> f64 {
        self.theme_keywords.get(theme).map(|k| k.count).unwrap_or(0.0)
    }

    pub fn holds(&self, name: &str) -> bool {
        self.holdings.iter().any(|h| h.name == name)
    }
}

/// Scoring dimensions of a candidate, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreDimension {
    ThemeMatch,
    PastFrequency,
    DescriptionSimilarity,
    SectorTrend,
    SignalMatch,
    CycleTendency,
}

impl ScoreDimension {
    pub const ALL: [ScoreDimension; 6] = [
        ScoreDimension::ThemeMatch,
        ScoreDimension::PastFrequency,
        ScoreDimension::DescriptionSimilarity,
        ScoreDimension::SectorTrend,
        ScoreDimension::SignalMatch,
        ScoreDimension::CycleTendency,
    ];

    /// Key used in `score_breakdown`
    pub fn key(&self) -> &'static str {
        match self {
            ScoreDimension::ThemeMatch => "theme_match",
            ScoreDimension::PastFrequency => "past_frequency",
            ScoreDimension::DescriptionSimilarity => "description_sim",
            ScoreDimension::SectorTrend => "sector_trend",
            ScoreDimension::SignalMatch => "signal_match",
            ScoreDimension::CycleTendency => "cycle_tendency",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreDimension::ThemeMatch => "Theme match",
            ScoreDimension::PastFrequency => "Past frequency",
            ScoreDimension::DescriptionSimilarity => "Description similarity",
            ScoreDimension::SectorTrend => "Sector trend",
            ScoreDimension::SignalMatch => "Signal match",
            ScoreDimension::CycleTendency => "Cycle tendency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
    Unknown,
}

impl Confidence {
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            "low" => Confidence::Low,
            _ => Confidence::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
            Confidence::Unknown => "unknown",
        }
    }
}

/// A predicted future holding with its explainable score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Candidate {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub total_score: f64,
    #[serde(deserialize_with = "nullable")]
    pub confidence: String,
    #[serde(deserialize_with = "nullable")]
    pub is_current_holding: bool,
    #[serde(deserialize_with = "nullable")]
    pub score_breakdown: BTreeMap<String, f64>,
    #[serde(deserialize_with = "nullable")]
    pub explanations: Vec<String>,
}

impl Candidate {
    /// Ratio in [0, 1] for a dimension; missing dimensions score 0.
    pub fn breakdown(&self, dimension: ScoreDimension) -> f64 {
        self.score_breakdown
            .get(dimension.key())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn confidence_level(&self) -> Confidence {
        Confidence::parse(&self.confidence)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSummary {
    #[serde(deserialize_with = "nullable")]
    pub avg_hit_rate: f64,
    #[serde(deserialize_with = "nullable")]
    pub avg_precision: f64,
    #[serde(deserialize_with = "nullable")]
    pub avg_recall: f64,
    #[serde(deserialize_with = "nullable")]
    pub total_periods: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopKMetrics {
    #[serde(deserialize_with = "nullable")]
    pub predicted: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub hits: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub hit_count: u32,
    #[serde(deserialize_with = "nullable")]
    pub precision: f64,
    #[serde(deserialize_with = "nullable")]
    pub recall: f64,
    #[serde(deserialize_with = "nullable")]
    pub hit_rate: f64,
}

/// One rolling backtest period
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestPeriod {
    #[serde(deserialize_with = "nullable")]
    pub train_until: String,
    #[serde(deserialize_with = "nullable")]
    pub predicted_month: String,
    #[serde(deserialize_with = "nullable")]
    pub actual_new_entries: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub metrics: BTreeMap<String, TopKMetrics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Backtest {
    #[serde(deserialize_with = "nullable")]
    pub summary: BTreeMap<String, BacktestSummary>,
    #[serde(deserialize_with = "nullable")]
    pub results: Vec<BacktestPeriod>,
    #[serde(deserialize_with = "nullable")]
    pub error: String,
}

impl Backtest {
    /// Summary entries ordered by their numeric k (`top_3` before `top_10`).
    pub fn summary_by_k(&self) -> Vec<(u32, &BacktestSummary)> {
        let mut entries: Vec<(u32, &BacktestSummary)> = self
            .summary
            .iter()
            .filter_map(|(key, summary)| top_k_of(key).map(|k| (k, summary)))
            .collect();
        entries.sort_by_key(|(k, _)| *k);
        entries
    }
}

/// Parse the `k` out of a `"top_k"` metrics key.
pub fn top_k_of(key: &str) -> Option<u32> {
    key.strip_prefix("top_")?.parse().ok()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportQuality {
    #[serde(deserialize_with = "nullable")]
    pub month: String,
    #[serde(deserialize_with = "nullable")]
    pub success: bool,
    #[serde(deserialize_with = "nullable")]
    pub extracted_fields: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub missing_fields: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub issues: Vec<String>,
}

/// Extraction quality of the source reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QualitySummary {
    #[serde(deserialize_with = "nullable")]
    pub total_reports: u32,
    #[serde(deserialize_with = "nullable")]
    pub successful_extractions: u32,
    #[serde(deserialize_with = "nullable")]
    pub reports_with_holdings: u32,
    #[serde(deserialize_with = "nullable")]
    pub per_report: Vec<ReportQuality>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document_defaults() {
        let doc: AnalysisDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.theme_intensity.is_empty());
        assert!(doc.candidates.is_empty());
        assert_eq!(doc.quality.total_reports, 0);
        assert_eq!(doc.summary_kpi.backtest_top5_hit_rate, 0.0);
    }

    #[test]
    fn test_nulls_default_to_empty() {
        let doc: AnalysisDocument = serde_json::from_value(json!({
            "fund_name": null,
            "candidates": null,
            "quality": { "total_reports": null, "per_report": [{ "month": "2024-01", "issues": null }] },
            "reports_text": [{ "month": "2024-01", "signals": null, "sections": { "future_policy": null } }],
        }))
        .unwrap();

        assert_eq!(doc.fund_name, "");
        assert!(doc.candidates.is_empty());
        assert_eq!(doc.quality.total_reports, 0);
        assert!(doc.quality.per_report[0].issues.is_empty());
        assert!(doc.reports_text[0].signals.positive.is_empty());
        assert_eq!(doc.reports_text[0].sections.future_policy, "");
    }

    #[test]
    fn test_weight_accepts_text_or_number() {
        let holdings: Vec<Holding> = serde_json::from_value(json!([
            { "rank": 1, "name": "Tokyo Electron", "weight": "8.5" },
            { "rank": 2, "name": "Advantest", "weight": 7.25 },
            { "rank": 3, "name": "Lasertec", "weight": null },
        ]))
        .unwrap();

        assert_eq!(holdings[0].weight, "8.5");
        assert_eq!(holdings[1].weight, "7.25");
        assert_eq!(holdings[2].weight, "");
    }

    #[test]
    fn test_candidate_breakdown_defaults_missing_dimension() {
        let candidate: Candidate = serde_json::from_value(json!({
            "name": "Renesas",
            "total_score": 0.42,
            "confidence": "Medium",
            "score_breakdown": { "theme_match": 0.8 },
        }))
        .unwrap();

        assert_eq!(candidate.breakdown(ScoreDimension::ThemeMatch), 0.8);
        assert_eq!(candidate.breakdown(ScoreDimension::CycleTendency), 0.0);
        assert_eq!(candidate.confidence_level(), Confidence::Medium);
        assert!(!candidate.is_current_holding);
    }

    #[test]
    fn test_holding_change_lookups() {
        let change: HoldingChange = serde_json::from_value(json!({
            "month": "2024-02",
            "new_entries": ["Disco"],
            "removed": ["Sumco"],
            "rank_up": [{ "name": "Advantest", "change": 2 }],
            "rank_down": [{ "name": "Lasertec", "change": -3 }],
        }))
        .unwrap();

        assert!(change.is_new("Disco"));
        assert!(change.is_removed("Sumco"));
        assert_eq!(change.rank_up_of("Advantest"), Some(2));
        assert_eq!(change.rank_down_of("Lasertec"), Some(-3));
        assert_eq!(change.rank_up_of("Lasertec"), None);
    }

    #[test]
    fn test_unknown_trend_direction_is_stable() {
        let point: TrendPoint =
            serde_json::from_value(json!({ "month": "2024-01", "direction": "sideways" })).unwrap();
        assert_eq!(point.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_backtest_summary_sorted_by_k() {
        let backtest: Backtest = serde_json::from_value(json!({
            "summary": {
                "top_10": { "avg_hit_rate": 0.5 },
                "top_3": { "avg_hit_rate": 0.2 },
                "top_5": { "avg_hit_rate": 0.3 },
            }
        }))
        .unwrap();

        let ks: Vec<u32> = backtest.summary_by_k().iter().map(|(k, _)| *k).collect();
        assert_eq!(ks, vec![3, 5, 10]);
    }
}
