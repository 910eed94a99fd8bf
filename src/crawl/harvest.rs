//! Ordered result collection for one resolution.

use serde::Serialize;

/// Artifact class a harvested URL was collected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// The article's main full-text artifact (typically a PDF).
    FullText,
    /// A supplementary-material attachment.
    Supplementary,
}

/// URLs collected by a crawl, in insertion order.
///
/// Entries are tagged with their [`ArtifactKind`] but never deduplicated:
/// publishers that expose the same link twice yield it twice. The only gate is
/// [`Harvest::claim_full_text`], which implements "first match wins" for
/// publishers with several competing full-text selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Harvest {
    entries: Vec<(ArtifactKind, String)>,
}

impl Harvest {
    /// Creates an empty harvest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a URL for `kind`.
    pub fn push(&mut self, kind: ArtifactKind, url: impl Into<String>) {
        self.entries.push((kind, url.into()));
    }

    /// Appends a full-text URL.
    pub fn push_full_text(&mut self, url: impl Into<String>) {
        self.push(ArtifactKind::FullText, url);
    }

    /// Appends a supplementary URL.
    pub fn push_supplementary(&mut self, url: impl Into<String>) {
        self.push(ArtifactKind::Supplementary, url);
    }

    /// Appends a full-text URL only if none has been collected yet.
    ///
    /// Returns true if the URL was kept.
    pub fn claim_full_text(&mut self, url: impl Into<String>) -> bool {
        if self.has_full_text() {
            return false;
        }
        self.push_full_text(url);
        true
    }

    /// Returns true if at least one full-text URL was collected.
    #[must_use]
    pub fn has_full_text(&self) -> bool {
        self.entries
            .iter()
            .any(|(kind, _)| *kind == ArtifactKind::FullText)
    }

    /// Iterates over full-text URLs in insertion order.
    pub fn full_text(&self) -> impl Iterator<Item = &str> {
        self.of_kind(ArtifactKind::FullText)
    }

    /// Iterates over supplementary URLs in insertion order.
    pub fn supplementary(&self) -> impl Iterator<Item = &str> {
        self.of_kind(ArtifactKind::Supplementary)
    }

    fn of_kind(&self, wanted: ArtifactKind) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(kind, _)| *kind == wanted)
            .map(|(_, url)| url.as_str())
    }

    /// Iterates over all tagged entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (ArtifactKind, &str)> {
        self.entries.iter().map(|(kind, url)| (*kind, url.as_str()))
    }

    /// Number of collected URLs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flattens into the ordered URL list handed back to callers.
    #[must_use]
    pub fn into_urls(self) -> Vec<String> {
        self.entries.into_iter().map(|(_, url)| url).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvest_preserves_insertion_order_across_kinds() {
        let mut harvest = Harvest::new();
        harvest.push_supplementary("https://a/s1");
        harvest.push_full_text("https://a/ft");
        harvest.push_supplementary("https://a/s2");
        assert_eq!(
            harvest.into_urls(),
            vec!["https://a/s1", "https://a/ft", "https://a/s2"]
        );
    }

    #[test]
    fn test_harvest_keeps_duplicates() {
        let mut harvest = Harvest::new();
        harvest.push_full_text("https://a/ft.pdf");
        harvest.push_full_text("https://a/ft.pdf");
        assert_eq!(harvest.len(), 2);
    }

    #[test]
    fn test_claim_full_text_first_wins() {
        let mut harvest = Harvest::new();
        assert!(harvest.claim_full_text("https://a/first.pdf"));
        assert!(!harvest.claim_full_text("https://a/second.pdf"));
        assert_eq!(harvest.full_text().collect::<Vec<_>>(), vec!["https://a/first.pdf"]);
    }

    #[test]
    fn test_claim_full_text_ignores_supplementary_entries() {
        let mut harvest = Harvest::new();
        harvest.push_supplementary("https://a/s1");
        assert!(harvest.claim_full_text("https://a/ft.pdf"));
        assert_eq!(harvest.supplementary().count(), 1);
        assert_eq!(harvest.full_text().count(), 1);
    }

    #[test]
    fn test_empty_harvest() {
        let harvest = Harvest::new();
        assert!(harvest.is_empty());
        assert!(!harvest.has_full_text());
        assert!(harvest.into_urls().is_empty());
    }
}
