use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain or parse the analysis document.
///
/// Every variant is terminal for the session: the dashboard shows the
/// message together with [`LoadError::remediation`] and renders nothing else.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to fetch {url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Analysis document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LoadError {
    /// What the user should do to recover.
    pub fn remediation(&self) -> &'static str {
        match self {
            LoadError::Transport { .. } => {
                "Serve the dashboard directory over HTTP (for example `python -m http.server`) \
                 and open it through that server, then reload the page."
            }
            LoadError::HttpStatus { .. } | LoadError::Io { .. } => {
                "Run the analysis pipeline (`python src/analyze.py`) to generate \
                 data/analysis_results.json, then reload the page."
            }
            LoadError::Parse(_) => {
                "The analysis output is corrupt. Re-run the analysis pipeline \
                 (`python src/analyze.py`) and reload the page."
            }
        }
    }

    /// Message shown in place of the dashboard.
    pub fn user_message(&self) -> String {
        format!("Could not load the analysis data. {self}\n{}", self.remediation())
    }
}

pub type LoadResult<T> = Result<T, LoadError>;
