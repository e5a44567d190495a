//! CSV export of the displayed candidate list

use chrono::NaiveDate;
use report_model::{Candidate, ScoreDimension};

use crate::error::DashboardResult;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header row: rank, name, total score, confidence, the six score dimensions
/// in display order, explanations.
pub const CSV_HEADER: [&str; 11] = [
    "順位",
    "銘柄名",
    "総合スコア",
    "信頼度",
    "テーマ一致度",
    "過去採用頻度",
    "解説文類似度",
    "業種配分変化",
    "売買示唆整合",
    "入替サイクル",
    "説明",
];

/// A file handed to the host for download
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub content: Vec<u8>,
}

impl CsvExport {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// Text field wrapped in double quotes, inner quotes doubled.
fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Serialize `candidates` (already filtered and truncated) as UTF-8 CSV with a
/// byte-order mark so spreadsheet apps detect the encoding.
///
/// Text columns are always quoted, even when they look numeric (stock codes);
/// numbers are written raw. Quoting is applied per field, so the writer itself
/// never adds quotes.
pub fn candidates_csv(candidates: &[&Candidate], today: NaiveDate) -> DashboardResult<CsvExport> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(BOM.to_vec());

    writer.write_record(CSV_HEADER.iter().map(|h| quoted(h)))?;
    for (i, candidate) in candidates.iter().enumerate() {
        let mut row = vec![
            (i + 1).to_string(),
            quoted(&candidate.name),
            candidate.total_score.to_string(),
            quoted(&candidate.confidence),
        ];
        row.extend(
            ScoreDimension::ALL
                .iter()
                .map(|dim| candidate.breakdown(*dim).to_string()),
        );
        row.push(quoted(&candidate.explanations.join("; ")));
        writer.write_record(&row)?;
    }

    let content = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;

    tracing::info!("Exported {} candidates", candidates.len());
    Ok(CsvExport {
        filename: format!("candidates_{}.csv", today.format("%Y-%m-%d")),
        content,
    })
}
