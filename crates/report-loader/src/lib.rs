//! Analysis document loader
//!
//! Performs the single startup fetch of the analysis document. A failure is
//! terminal: callers surface [`LoadError::user_message`] and stop.

pub mod error;
pub mod source;

pub use error::{LoadError, LoadResult};
pub use source::{DocumentSource, FileSource, HttpSource};

use report_model::AnalysisDocument;
use std::path::Path;
use std::sync::Arc;

/// Fixed path of the analysis document relative to the dashboard root
pub const DEFAULT_RESOURCE_PATH: &str = "data/analysis_results.json";

pub struct DataLoader {
    source: Box<dyn DocumentSource>,
}

impl DataLoader {
    pub fn new(source: Box<dyn DocumentSource>) -> Self {
        Self { source }
    }

    /// Resolve `resource_path` against `base`, which is either an
    /// `http(s)://` URL or a local directory.
    pub fn from_location(base: &str, resource_path: &str) -> Self {
        if base.starts_with("http://") || base.starts_with("https://") {
            let url = format!(
                "{}/{}",
                base.trim_end_matches('/'),
                resource_path.trim_start_matches('/')
            );
            Self::new(Box::new(HttpSource::new(url)))
        } else {
            Self::new(Box::new(FileSource::new(Path::new(base).join(resource_path))))
        }
    }

    pub fn location(&self) -> String {
        self.source.location()
    }

    /// Fetch and parse the document.
    pub async fn load(&self) -> LoadResult<Arc<AnalysisDocument>> {
        let location = self.source.location();
        tracing::debug!("Fetching analysis document from {}", location);

        let bytes = match self.source.fetch().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Analysis document load failed: {}", e);
                return Err(e);
            }
        };

        let document = parse_document(&bytes).inspect_err(|e| {
            tracing::warn!("Analysis document at {} is malformed: {}", location, e);
        })?;

        tracing::info!(
            "Loaded analysis document from {}: {} months, {} candidates",
            location,
            document.theme_intensity.len(),
            document.candidates.len()
        );

        Ok(Arc::new(document))
    }
}

/// Parse raw bytes into the document; a leading UTF-8 BOM is tolerated.
pub fn parse_document(bytes: &[u8]) -> LoadResult<AnalysisDocument> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    Ok(serde_json::from_slice(bytes)?)
}
