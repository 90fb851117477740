//! In-memory [`DocumentFetcher`] double for tests across the workspace.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::fetch::{DocumentFetcher, Fetched};

#[derive(Debug, Clone)]
enum Page {
    Body { content_type: String, body: String },
    Failing { status: u16 },
}

/// Serves pages set by the test. Unknown URLs answer HTTP 404.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    pages: Mutex<HashMap<String, Page>>,
    calls: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_html(&self, url: &str, html: &str) {
        self.set(url, Page::Body {
            content_type: "text/html; charset=utf-8".into(),
            body: html.into(),
        });
    }

    pub fn set_text(&self, url: &str, text: &str) {
        self.set(url, Page::Body {
            content_type: "text/plain".into(),
            body: text.into(),
        });
    }

    /// Make `url` answer with HTTP `status`.
    pub fn fail(&self, url: &str, status: u16) {
        self.set(url, Page::Failing { status });
    }

    pub fn remove(&self, url: &str) {
        if let Ok(mut pages) = self.pages.lock() {
            pages.remove(url);
        }
    }

    /// URLs fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn set(&self, url: &str, page: Page) {
        if let Ok(mut pages) = self.pages.lock() {
            pages.insert(url.to_string(), page);
        }
    }
}

#[async_trait]
impl DocumentFetcher for MemoryFetcher {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self, source_url: &str) -> Result<Fetched, FetchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(source_url.to_string());
        }
        let page = self
            .pages
            .lock()
            .ok()
            .and_then(|pages| pages.get(source_url).cloned())
            .unwrap_or(Page::Failing { status: 404 });
        match page {
            Page::Body { content_type, body } => Ok(Fetched {
                url: source_url.to_string(),
                content_type: Some(content_type),
                body: body.into_bytes(),
            }),
            Page::Failing { status } => Err(FetchError::Status {
                status,
                url: source_url.to_string(),
            }),
        }
    }
}
