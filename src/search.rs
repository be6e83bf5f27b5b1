use crate::apis::doab::OffsetPage;
use crate::apis::doaj_articles::CursorPage;
use crate::apis::DisplayRecord;
use crate::config::Sources;

/// Everything one dispatch brings back, already normalized. A failed
/// source arm is represented by its empty sentinel (`results` empty,
/// pagination `None`), never by an error.
pub struct CombinedResponse {
    pub local: Vec<DisplayRecord>,
    pub articles: CursorPage,
    pub journals: CursorPage,
    pub books: OffsetPage,
}

/// Fan one query out to all four sources in parallel. Per-source failures
/// are absorbed and logged; one slow or broken source never blocks the
/// others. The caller passes a trimmed, non-empty query.
pub async fn combined_search(sources: &Sources, query: &str, doab_limit: u32) -> CombinedResponse {
    let (local, articles, journals, books) = tokio::join!(
        sources.catalog.fetch_all(),
        sources.articles.search(query, 1),
        sources.journals.search(query, 1),
        sources.books.search(query, 1, doab_limit),
    );

    CombinedResponse {
        local: local.unwrap_or_else(|err| {
            tracing::warn!(%err, "local catalog fetch failed");
            Vec::new()
        }),
        articles: articles.unwrap_or_else(|err| {
            tracing::warn!(%err, "DOAJ article search failed");
            CursorPage::default()
        }),
        journals: journals.unwrap_or_else(|err| {
            tracing::warn!(%err, "DOAJ journal search failed");
            CursorPage::default()
        }),
        books: books.unwrap_or_else(|err| {
            tracing::warn!(%err, "DOAB search failed");
            OffsetPage::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::time::Duration;

    #[tokio::test]
    async fn failed_sources_resolve_to_empty_sentinels() {
        // Port 1 refuses connections; every arm fails, none panics, and
        // each resolves to its empty sentinel.
        let config = Config {
            local_base_url: "http://127.0.0.1:1".to_string(),
            doaj_base_url: "http://127.0.0.1:1".to_string(),
            doab_limit: 20,
            doab_timeout: Duration::from_secs(2),
            doab_fallback_timeout: Duration::from_secs(1),
        };
        let sources = config.build_sources();
        let response = combined_search(&sources, "anything", config.doab_limit).await;

        assert!(response.local.is_empty());
        assert!(response.articles.results.is_empty());
        assert!(response.articles.pagination.is_none());
        assert!(response.journals.results.is_empty());
        assert!(response.journals.pagination.is_none());
        assert!(response.books.results.is_empty());
        assert!(response.books.pagination.is_none());
    }
}
