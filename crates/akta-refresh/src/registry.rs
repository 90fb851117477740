//! Tracked statutory sources.

use akta_config::RefreshConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedSource {
    pub url: String,
    pub title: String,
}

impl TrackedSource {
    /// A source titled `title`, or by its URL when the title is blank.
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        let url = url.into();
        let title = title.into();
        let title = if title.trim().is_empty() {
            url.clone()
        } else {
            title.trim().to_string()
        };
        Self { url, title }
    }
}

/// The set of sources the scheduler refreshes, in configured order.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<TrackedSource>,
}

impl SourceRegistry {
    /// Build a registry. A URL listed twice is tracked once, under its first title.
    pub fn new(sources: impl IntoIterator<Item = TrackedSource>) -> Self {
        let mut kept: Vec<TrackedSource> = Vec::new();
        for source in sources {
            let url = source.url.trim();
            if url.is_empty() {
                continue;
            }
            if kept.iter().any(|s| s.url == url) {
                tracing::debug!(url, "registry: duplicate source ignored");
                continue;
            }
            kept.push(TrackedSource::new(url, source.title));
        }
        Self { sources: kept }
    }

    #[must_use]
    pub fn from_config(config: &RefreshConfig) -> Self {
        Self::new(
            config
                .sources
                .iter()
                .map(|s| TrackedSource::new(&s.url, &s.title)),
        )
    }

    #[must_use]
    pub fn get(&self, url: &str) -> Option<&TrackedSource> {
        let url = url.trim();
        self.sources.iter().find(|s| s.url == url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedSource> {
        self.sources.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use akta_config::SourceConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn from_config_keeps_order_and_dedupes() {
        let config = RefreshConfig {
            sources: vec![
                SourceConfig {
                    url: "https://example.test/ea1955".into(),
                    title: "Employment Act 1955".into(),
                },
                SourceConfig {
                    url: "https://example.test/epf".into(),
                    title: String::new(),
                },
                SourceConfig {
                    url: " https://example.test/ea1955 ".into(),
                    title: "Duplicate".into(),
                },
                SourceConfig {
                    url: "  ".into(),
                    title: "Blank".into(),
                },
            ],
            ..RefreshConfig::default()
        };
        let registry = SourceRegistry::from_config(&config);

        assert_eq!(registry.len(), 2);
        let titles: Vec<&str> = registry.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Employment Act 1955", "https://example.test/epf"]);
        assert!(registry.get("https://example.test/epf").is_some());
        assert!(registry.get("https://example.test/other").is_none());
    }

    #[test]
    fn empty_registry() {
        assert!(SourceRegistry::default().is_empty());
    }
}
