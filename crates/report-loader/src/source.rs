//! Where the analysis document comes from.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::path::PathBuf;

use crate::{LoadError, LoadResult};

/// A location that yields the raw bytes of the analysis document
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self) -> LoadResult<Vec<u8>>;

    /// Human-readable location for logs and error messages
    fn location(&self) -> String;
}

/// Fetches the document with a single HTTP GET
#[derive(Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        let client = Self::client_builder().build().unwrap_or_else(|_| Client::new());
        Self::with_client(client, url)
    }

    /// Client settings for document fetches. No request timeout is set: the
    /// load waits for however long the server takes.
    pub fn client_builder() -> ClientBuilder {
        Client::builder().user_agent(concat!("report-loader/", env!("CARGO_PKG_VERSION")))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self) -> LoadResult<Vec<u8>> {
        let transport = |source| LoadError::Transport {
            url: self.url.clone(),
            source,
        };

        let response = self.client.get(&self.url).send().await.map_err(transport)?;

        if !response.status().is_success() {
            return Err(LoadError::HttpStatus {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        Ok(body.to_vec())
    }

    fn location(&self) -> String {
        self.url.clone()
    }
}

/// Reads the document from the local filesystem
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    async fn fetch(&self) -> LoadResult<Vec<u8>> {
        tokio::fs::read(&self.path).await.map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
