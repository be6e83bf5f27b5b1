use super::{
    expand_year, http_client, split_name, CursorPagination, DisplayRecord, RecordDetail,
    RecordSubject, SourceError, SourceFlag,
};
use serde::Deserialize;

/// DOAJ article search. Paging beyond page 1 follows the literal
/// `prev`/`next`/`last` URLs returned in the response envelope.
pub struct DoajArticlesClient {
    client: reqwest::Client,
    base_url: String,
}

/// One fetched page of a cursor-paged source. `pagination` is `None` only
/// for the empty-failure sentinel.
#[derive(Debug, Default)]
pub struct CursorPage {
    pub results: Vec<DisplayRecord>,
    pub pagination: Option<CursorPagination>,
}

#[derive(Deserialize)]
struct DoajEnvelope {
    results: Option<Vec<RawArticle>>,
    prev: Option<String>,
    next: Option<String>,
    page: Option<u32>,
    #[serde(rename = "pageSize")]
    page_size: Option<u32>,
    total: Option<u64>,
    last: Option<String>,
}

#[derive(Deserialize)]
pub struct RawArticle {
    id: Option<String>,
    bibjson: Option<ArticleBibJson>,
}

#[derive(Deserialize, Default)]
struct ArticleBibJson {
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    author: Option<Vec<RawAuthor>>,
    year: Option<String>,
    journal: Option<RawJournalRef>,
    keywords: Option<Vec<String>>,
    link: Option<Vec<RawLink>>,
    subject: Option<Vec<RawSubject>>,
}

#[derive(Deserialize)]
struct RawAuthor {
    name: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawJournalRef {
    title: Option<String>,
    issns: Option<Vec<String>>,
    publisher: Option<String>,
}

#[derive(Deserialize)]
struct RawLink {
    url: Option<String>,
    #[serde(rename = "type")]
    link_type: Option<String>,
}

#[derive(Deserialize)]
struct RawSubject {
    term: Option<String>,
}

/// Map one raw DOAJ article onto the display model. Idempotent, id
/// included: the upstream id is carried through as-is.
pub fn normalize_article(raw: &RawArticle) -> DisplayRecord {
    let default_bib = ArticleBibJson::default();
    let bib = raw.bibjson.as_ref().unwrap_or(&default_bib);
    let journal = bib.journal.as_ref();
    let date = bib.year.as_deref().map(expand_year).unwrap_or_default();

    DisplayRecord {
        id: raw.id.clone().unwrap_or_default(),
        source_flag: SourceFlag::DoajArticle,
        record_type: "Open Access Article".to_string(),
        detail: RecordDetail {
            title: bib.title.clone().unwrap_or_default(),
            abstract_text: bib.abstract_text.clone().unwrap_or_default(),
            creators: bib
                .author
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|a| split_name(a.name.as_deref().unwrap_or_default()))
                .collect(),
            publication_date: date.clone(),
            date,
            issn: journal
                .and_then(|j| j.issns.as_ref())
                .and_then(|i| i.first())
                .cloned()
                .unwrap_or_default(),
            journal_or_publication_title: journal
                .and_then(|j| j.title.clone())
                .unwrap_or_default(),
            keywords: bib.keywords.as_deref().unwrap_or_default().join(", "),
            publisher: journal.and_then(|j| j.publisher.clone()).unwrap_or_default(),
            status: "Open Access".to_string(),
            official_url: bib
                .link
                .as_deref()
                .unwrap_or_default()
                .iter()
                .find(|l| l.link_type.as_deref() == Some("fulltext"))
                .and_then(|l| l.url.clone())
                .unwrap_or_default(),
            doi: None,
        },
        subject: RecordSubject {
            subject_name: bib
                .subject
                .as_deref()
                .unwrap_or_default()
                .first()
                .and_then(|s| s.term.clone())
                .unwrap_or_default(),
        },
    }
}

impl DoajArticlesClient {
    pub fn new(base_url: String) -> Self {
        Self { client: http_client(), base_url }
    }

    /// Search articles; the query is a path segment, percent-encoded.
    pub async fn search(&self, query: &str, page: u32) -> Result<CursorPage, SourceError> {
        let url = format!(
            "{}/api/v2/search/articles/{}?page={}",
            self.base_url,
            urlencoding::encode(query),
            page
        );
        self.fetch_page(&url).await
    }

    /// Fetch an arbitrary envelope URL (used to follow prev/next/last).
    pub async fn fetch_page(&self, url: &str) -> Result<CursorPage, SourceError> {
        tracing::debug!(url, "fetching DOAJ articles page");
        let body = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let envelope: DoajEnvelope =
            serde_json::from_str(&body).map_err(|e| SourceError::Parse(e.to_string()))?;
        Ok(envelope_to_page(envelope))
    }
}

fn envelope_to_page(envelope: DoajEnvelope) -> CursorPage {
    let results = envelope
        .results
        .unwrap_or_default()
        .iter()
        .map(normalize_article)
        .collect();
    CursorPage {
        results,
        pagination: Some(CursorPagination {
            prev: envelope.prev,
            next: envelope.next,
            page: envelope.page.unwrap_or(1),
            page_size: envelope.page_size.unwrap_or(10),
            total: envelope.total.unwrap_or(0),
            last: envelope.last,
        }),
    }
}
