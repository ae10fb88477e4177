//! Remote fetcher.
//!
//! [`ArtifactSource`] is the seam between the pipeline and the network: the
//! CLI uses [`HttpSource`], offline runs and tests use [`FileSource`] or
//! [`StaticSource`]. Every source decodes strictly as UTF-8 and normalises
//! CRLF to LF so that the `\n`-based rewrite anchors hold.

use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("received response code {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("response from {origin} is not valid UTF-8: {source}")]
    Decode {
        origin: String,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("cannot read upstream copy {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Something that can produce the raw upstream artifact text.
pub trait ArtifactSource {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Single blocking GET, no retry, transport-default timeout.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl ArtifactSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        info!(url, "fetching upstream artifact");
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(transport)?;
        let status = response.status();
        info!(status = status.as_u16(), "received response");
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(transport)?;
        let text = decode(url, &body)?;
        info!(length = text.len(), "decoded upstream artifact");
        Ok(text)
    }
}

/// Reads the upstream text from a local file instead of the network.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ArtifactSource for FileSource {
    fn fetch(&self, _url: &str) -> Result<String, FetchError> {
        info!(path = %self.path.display(), "reading upstream artifact from file");
        let bytes = fs::read(&self.path).map_err(|source| FetchError::Io {
            path: self.path.clone(),
            source,
        })?;
        decode(&self.path.display().to_string(), &bytes)
    }
}

/// Fixed in-memory upstream text.
#[derive(Debug, Clone)]
pub struct StaticSource(pub String);

impl ArtifactSource for StaticSource {
    fn fetch(&self, _url: &str) -> Result<String, FetchError> {
        Ok(normalize_newlines(&self.0))
    }
}

fn decode(origin: &str, bytes: &[u8]) -> Result<String, FetchError> {
    let text = std::str::from_utf8(bytes).map_err(|source| FetchError::Decode {
        origin: origin.to_string(),
        source,
    })?;
    Ok(normalize_newlines(text))
}

/// Convert CRLF line endings to LF.
pub(crate) fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}
