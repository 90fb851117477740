//! Document fetch seam and the HTTP fetcher.
//!
//! Sources are addressed by URL. `http(s)://` URLs go through `reqwest`;
//! `file://` URLs are read from disk, which is how statute snapshots are
//! tracked offline.

use std::path::Path;
use std::time::Duration;

use akta_config::RefreshConfig;
use async_trait::async_trait;

use crate::error::FetchError;

/// Raw bytes of one fetched source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub url: String,
    /// `Content-Type` as reported by the server, or inferred from the file
    /// extension for local sources.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Fetched {
    /// Whether the body should be parsed as HTML.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("html"))
    }
}

/// Fetches the current bytes of a source document.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, source_url: &str) -> Result<Fetched, FetchError>;
}

/// `reqwest` fetcher for `http(s)://` sources, with `file://` support.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    /// # Panics
    ///
    /// Panics if the `reqwest` client cannot be built (TLS backend failure).
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("akta/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .expect("reqwest client should build");
        Self {
            client,
            timeout_secs: timeout.as_secs(),
        }
    }

    #[must_use]
    pub fn from_config(config: &RefreshConfig) -> Self {
        Self::new(Duration::from_secs(config.fetch_timeout_secs))
    }

    async fn fetch_http(&self, url: &str) -> Result<Fetched, FetchError> {
        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    secs: self.timeout_secs,
                }
            } else {
                FetchError::Http(e)
            }
        })?;
        let resp = check_response(resp, url)?;
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await?.to_vec();
        Ok(Fetched {
            url: url.to_string(),
            content_type,
            body,
        })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, source_url: &str) -> Result<Fetched, FetchError> {
        if let Some(path) = source_url.strip_prefix("file://") {
            return fetch_file(source_url, path).await;
        }
        if source_url.starts_with("http://") || source_url.starts_with("https://") {
            return self.fetch_http(source_url).await;
        }
        Err(FetchError::UnsupportedScheme {
            url: source_url.to_string(),
        })
    }
}

async fn fetch_file(url: &str, path: &str) -> Result<Fetched, FetchError> {
    let body = tokio::fs::read(path).await.map_err(|source| FetchError::Io {
        path: path.to_string(),
        source,
    })?;
    Ok(Fetched {
        url: url.to_string(),
        content_type: content_type_for(Path::new(path)),
        body,
    })
}

/// Content type of a local file, from its extension.
#[must_use]
pub fn content_type_for(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let ct = match ext.as_str() {
        "html" | "htm" | "xhtml" => "text/html",
        "txt" | "md" => "text/plain",
        _ => return None,
    };
    Some(ct.to_string())
}

/// Map a non-success status to [`FetchError::Status`].
fn check_response(resp: reqwest::Response, url: &str) -> Result<reqwest::Response, FetchError> {
    if !resp.status().is_success() {
        return Err(FetchError::Status {
            status: resp.status().as_u16(),
            url: url.to_string(),
        });
    }
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use akta_core::ErrorKind;
    use pretty_assertions::assert_eq;

    fn mock_response(status: u16) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body("")
                .unwrap(),
        )
    }

    #[test]
    fn success_passes_through() {
        assert!(check_response(mock_response(200), "https://example.test").is_ok());
    }

    #[test]
    fn not_found_status_maps_to_not_found() {
        let err = check_response(mock_response(404), "https://example.test/act").unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn server_error_is_transient() {
        let err = check_response(mock_response(502), "https://example.test/act").unwrap_err();
        assert!(err.kind().is_transient());
    }

    #[tokio::test]
    async fn reads_file_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("act.html");
        std::fs::write(&path, "<h1>Act</h1>").unwrap();
        let url = format!("file://{}", path.display());

        let fetched = HttpFetcher::new(Duration::from_secs(5)).fetch(&url).await.unwrap();
        assert_eq!(fetched.url, url);
        assert_eq!(fetched.body, b"<h1>Act</h1>");
        assert!(fetched.is_html());
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = HttpFetcher::new(Duration::from_secs(5))
            .fetch("file:///definitely/not/here/act.txt")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn rejects_other_schemes() {
        let err = HttpFetcher::new(Duration::from_secs(5))
            .fetch("ftp://example.test/act")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedScheme { .. }));
    }

    #[test]
    fn infers_local_content_types() {
        assert_eq!(content_type_for(Path::new("a/ACT.HTM")).as_deref(), Some("text/html"));
        assert_eq!(content_type_for(Path::new("act.txt")).as_deref(), Some("text/plain"));
        assert_eq!(content_type_for(Path::new("act.pdf")), None);
        assert_eq!(content_type_for(Path::new("act")), None);
    }
}
