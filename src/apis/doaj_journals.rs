use super::{
    expand_year, http_client, split_name, CursorPagination, DisplayRecord, RecordDetail,
    RecordSubject, SourceError, SourceFlag,
};
use crate::apis::doaj_articles::CursorPage;
use serde::Deserialize;

/// DOAJ journal search. Same envelope and cursor-following contract as the
/// article endpoint, but on the v1 journals path.
pub struct DoajJournalsClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct DoajEnvelope {
    results: Option<Vec<RawJournal>>,
    prev: Option<String>,
    next: Option<String>,
    page: Option<u32>,
    #[serde(rename = "pageSize")]
    page_size: Option<u32>,
    total: Option<u64>,
    last: Option<String>,
}

#[derive(Deserialize)]
pub struct RawJournal {
    id: Option<String>,
    bibjson: Option<JournalBibJson>,
}

#[derive(Deserialize, Default)]
struct JournalBibJson {
    title: Option<String>,
    description: Option<String>,
    editorial: Option<RawEditorial>,
    publisher: Option<RawPublisher>,
    subject: Option<Vec<RawSubject>>,
    keywords: Option<Vec<String>>,
    pissn: Option<String>,
    eissn: Option<String>,
    oa_start: Option<u32>,
    #[serde(rename = "ref")]
    refs: Option<RawRefs>,
}

#[derive(Deserialize)]
struct RawEditorial {
    description: Option<String>,
}

#[derive(Deserialize)]
struct RawPublisher {
    name: Option<String>,
}

#[derive(Deserialize)]
struct RawSubject {
    term: Option<String>,
}

#[derive(Deserialize)]
struct RawRefs {
    journal: Option<String>,
}

/// Map one raw DOAJ journal onto the display model. The journal itself has
/// no author list; the publisher name stands in as the single creator.
pub fn normalize_journal(raw: &RawJournal) -> DisplayRecord {
    let default_bib = JournalBibJson::default();
    let bib = raw.bibjson.as_ref().unwrap_or(&default_bib);
    let title = bib
        .title
        .clone()
        .unwrap_or_else(|| "Untitled Journal".to_string());
    let publisher = bib
        .publisher
        .as_ref()
        .and_then(|p| p.name.clone())
        .unwrap_or_default();
    let date = bib
        .oa_start
        .map(|y| expand_year(&y.to_string()))
        .unwrap_or_default();
    let issn = format!(
        "{} {}",
        bib.pissn.as_deref().unwrap_or_default(),
        bib.eissn.as_deref().unwrap_or_default()
    )
    .trim()
    .to_string();

    DisplayRecord {
        id: raw.id.clone().unwrap_or_default(),
        source_flag: SourceFlag::DoajJournal,
        record_type: "Open Access Journal".to_string(),
        detail: RecordDetail {
            journal_or_publication_title: title.clone(),
            abstract_text: bib
                .description
                .clone()
                .or_else(|| bib.editorial.as_ref().and_then(|e| e.description.clone()))
                .unwrap_or_default(),
            creators: if publisher.is_empty() {
                Vec::new()
            } else {
                vec![split_name(&publisher)]
            },
            publication_date: date.clone(),
            date,
            issn,
            keywords: bib.keywords.as_deref().unwrap_or_default().join(", "),
            publisher,
            status: "Open Access Journal".to_string(),
            official_url: bib
                .refs
                .as_ref()
                .and_then(|r| r.journal.clone())
                .unwrap_or_default(),
            doi: None,
            title,
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

impl DoajJournalsClient {
    pub fn new(base_url: String) -> Self {
        Self { client: http_client(), base_url }
    }

    pub async fn search(&self, query: &str, page: u32) -> Result<CursorPage, SourceError> {
        let url = format!(
            "{}/api/search/journals/{}?page={}",
            self.base_url,
            urlencoding::encode(query),
            page
        );
        self.fetch_page(&url).await
    }

    pub async fn fetch_page(&self, url: &str) -> Result<CursorPage, SourceError> {
        tracing::debug!(url, "fetching DOAJ journals page");
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
        let results = envelope
            .results
            .unwrap_or_default()
            .iter()
            .map(normalize_journal)
            .collect();
        Ok(CursorPage {
            results,
            pagination: Some(CursorPagination {
                prev: envelope.prev,
                next: envelope.next,
                page: envelope.page.unwrap_or(1),
                page_size: envelope.page_size.unwrap_or(10),
                total: envelope.total.unwrap_or(0),
                last: envelope.last,
            }),
        })
    }
}
