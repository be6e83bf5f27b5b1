use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    expand_year, http_client, split_name, DisplayRecord, RecordDetail, RecordSubject,
    SourceError, SourceFlag,
};

/// DOAB book search, proxied through the local base URL. The primary
/// request asks for expanded metadata with a 30s budget; on a timeout or a
/// gateway-failure status it retries once without `expand`, with the limit
/// capped at 10 and a 15s budget. The only retry in the system.
pub struct DoabClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    fallback_timeout: Duration,
}

/// Offset-style pagination envelope owned by the Books tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetPagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub has_previous: bool,
    pub has_more: bool,
    pub limit: u32,
}

/// One fetched page of the offset-paged book source.
#[derive(Debug, Default)]
pub struct OffsetPage {
    pub results: Vec<DisplayRecord>,
    pub pagination: Option<OffsetPagination>,
}

#[derive(Deserialize)]
struct DoabEnvelope {
    results: Option<Vec<RawBook>>,
    pagination: Option<OffsetPagination>,
}

/// A raw DOAB book. Two shapes arrive here: expanded books carry a
/// `metadata` key/value list; basic books spread the same information over
/// loosely named top-level fields, captured in `extra` for probing.
#[derive(Deserialize)]
pub struct RawBook {
    handle: Option<String>,
    link: Option<String>,
    metadata: Option<Vec<MetadataEntry>>,
    #[serde(flatten)]
    extra: serde_json::Map<String, Value>,
}

#[derive(Deserialize)]
struct MetadataEntry {
    key: Option<String>,
    value: Option<Value>,
}

// Candidate keys for the basic shape, probed in priority order; the first
// non-empty value wins.
const TITLE_KEYS: &[&str] = &["title", "name", "dc_title", "dc.title"];
const ABSTRACT_KEYS: &[&str] = &["description", "abstract", "dc_description", "dc.description"];
const EDITOR_KEYS: &[&str] = &["author", "editor", "creator", "dc_creator", "dc.creator"];
const DATE_KEYS: &[&str] = &["year", "date", "dc_date", "dc.date"];
const DOI_KEYS: &[&str] = &["doi", "identifier"];
const PUBLISHER_KEYS: &[&str] = &["publisher", "dc_publisher", "dc.publisher"];
const SUBJECT_KEYS: &[&str] = &["subject", "dc_subject", "dc.subject"];

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn probe(extra: &serde_json::Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| extra.get(*k))
        .map(value_to_string)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn metadata_value(metadata: &[MetadataEntry], key: &str) -> String {
    metadata
        .iter()
        .find(|m| m.key.as_deref() == Some(key))
        .and_then(|m| m.value.as_ref())
        .map(value_to_string)
        .unwrap_or_default()
}

/// Stable synthetic id for books without a handle: a hash over fields that
/// identify the work, so repeated fetches of the same payload normalize to
/// the same record.
fn synthetic_id(title: &str, publisher: &str, date: &str) -> String {
    let mut hasher = DefaultHasher::new();
    (title, publisher, date).hash(&mut hasher);
    format!("doab-{:016x}", hasher.finish())
}

/// Map one raw DOAB book onto the display model.
pub fn normalize_book(book: &RawBook) -> DisplayRecord {
    let (title, abstract_text, editor, date_issued, doi, publisher, subject) =
        match book.metadata.as_deref() {
            Some(metadata) => (
                metadata_value(metadata, "dc.title"),
                metadata_value(metadata, "dc.description.abstract"),
                metadata_value(metadata, "dc.contributor.editor"),
                metadata_value(metadata, "dc.date.issued"),
                metadata_value(metadata, "oapen.identifier.doi"),
                metadata_value(metadata, "publisher.name"),
                metadata_value(metadata, "dc.subject.other"),
            ),
            None => (
                probe(&book.extra, TITLE_KEYS),
                probe(&book.extra, ABSTRACT_KEYS),
                probe(&book.extra, EDITOR_KEYS),
                probe(&book.extra, DATE_KEYS),
                probe(&book.extra, DOI_KEYS),
                probe(&book.extra, PUBLISHER_KEYS),
                probe(&book.extra, SUBJECT_KEYS),
            ),
        };

    let date = expand_year(&date_issued);
    let id = book
        .handle
        .clone()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| synthetic_id(&title, &publisher, &date));

    DisplayRecord {
        id,
        source_flag: SourceFlag::DoabBook,
        record_type: "Open Access Book".to_string(),
        detail: RecordDetail {
            title,
            abstract_text,
            creators: if editor.is_empty() {
                Vec::new()
            } else {
                vec![split_name(&editor)]
            },
            publication_date: date.clone(),
            date,
            issn: String::new(),
            journal_or_publication_title: publisher.clone(),
            keywords: subject.clone(),
            publisher,
            status: "Open Access".to_string(),
            official_url: book
                .link
                .as_deref()
                .filter(|l| !l.is_empty())
                .map(|l| format!("https://directory.doabooks.org{l}"))
                .unwrap_or_default(),
            doi: if doi.is_empty() { None } else { Some(doi) },
        },
        subject: RecordSubject { subject_name: subject },
    }
}

/// Fallback caps the page size so the upstream can answer in time.
fn fallback_limit(limit: u32) -> u32 {
    limit.min(10)
}

impl DoabClient {
    pub fn new(base_url: String, timeout: Duration, fallback_timeout: Duration) -> Self {
        Self { client: http_client(), base_url, timeout, fallback_timeout }
    }

    pub async fn search(&self, query: &str, page: u32, limit: u32) -> Result<OffsetPage, SourceError> {
        match self.request(query, page, limit, true, self.timeout).await {
            Ok(page) => Ok(page),
            Err(err) if err.is_timeout_class() => {
                tracing::warn!(%err, "DOAB request timed out, retrying without metadata");
                self.request(query, page, fallback_limit(limit), false, self.fallback_timeout)
                    .await
            }
            Err(err) => Err(err),
        }
    }

    async fn request(
        &self,
        query: &str,
        page: u32,
        limit: u32,
        expand: bool,
        timeout: Duration,
    ) -> Result<OffsetPage, SourceError> {
        let url = format!("{}/api/doab-search", self.base_url);
        let mut req = self
            .client
            .get(&url)
            .query(&[("query", query)])
            .timeout(timeout);
        if expand {
            req = req.query(&[("expand", "metadata")]);
        }
        let envelope: DoabEnvelope = req
            .query(&[("page", page.to_string()), ("limit", limit.to_string())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let results = envelope
            .results
            .unwrap_or_default()
            .iter()
            .map(normalize_book)
            .collect();
        Ok(OffsetPage { results, pagination: envelope.pagination })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(value: serde_json::Value) -> RawBook {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn normalize_expanded_book_uses_metadata() {
        let book = raw(serde_json::json!({
            "handle": "20.500.12657/1234",
            "link": "/handle/20.500.12657/1234",
            "metadata": [
                {"key": "dc.title", "value": "Open Methods"},
                {"key": "dc.description.abstract", "value": "A book."},
                {"key": "dc.contributor.editor", "value": "Maria del Sol"},
                {"key": "dc.date.issued", "value": "2018"},
                {"key": "oapen.identifier.doi", "value": "10.5555/om"},
                {"key": "publisher.name", "value": "Open Press"},
                {"key": "dc.subject.other", "value": "methodology"}
            ]
        }));
        let rec = normalize_book(&book);
        assert_eq!(rec.id, "20.500.12657/1234");
        assert_eq!(rec.source_flag, SourceFlag::DoabBook);
        assert_eq!(rec.detail.title, "Open Methods");
        assert_eq!(rec.detail.date, "2018-01-01");
        assert_eq!(rec.detail.doi.as_deref(), Some("10.5555/om"));
        assert_eq!(rec.detail.creators[0].first_name, "Maria");
        assert_eq!(rec.detail.creators[0].last_name, "del Sol");
        assert_eq!(
            rec.detail.official_url,
            "https://directory.doabooks.org/handle/20.500.12657/1234"
        );
        assert_eq!(rec.subject.subject_name, "methodology");
        assert_eq!(rec.detail.keywords, "methodology");
    }

    #[test]
    fn normalize_basic_book_probes_candidate_keys() {
        let book = raw(serde_json::json!({
            "dc.title": "Fallback Shapes",
            "creator": "Ana Bell",
            "dc.date": 2020,
            "dc_publisher": "Another Press"
        }));
        let rec = normalize_book(&book);
        assert_eq!(rec.detail.title, "Fallback Shapes");
        assert_eq!(rec.detail.creators[0].first_name, "Ana");
        assert_eq!(rec.detail.date, "2020-01-01");
        assert_eq!(rec.detail.publisher, "Another Press");
        assert_eq!(rec.detail.official_url, "");
    }

    #[test]
    fn probe_priority_takes_first_non_empty() {
        let book = raw(serde_json::json!({
            "title": "",
            "name": "Second Choice",
            "dc.title": "Third Choice"
        }));
        assert_eq!(normalize_book(&book).detail.title, "Second Choice");
    }

    #[test]
    fn synthetic_id_is_deterministic() {
        let payload = serde_json::json!({
            "title": "No Handle",
            "publisher": "P",
            "year": "2001"
        });
        let one = normalize_book(&raw(payload.clone()));
        let two = normalize_book(&raw(payload));
        assert!(one.id.starts_with("doab-"));
        assert_eq!(one.id, two.id);

        let other = normalize_book(&raw(serde_json::json!({
            "title": "Different Book",
            "publisher": "P",
            "year": "2001"
        })));
        assert_ne!(one.id, other.id);
    }

    #[test]
    fn fallback_caps_limit_at_ten() {
        assert_eq!(fallback_limit(20), 10);
        assert_eq!(fallback_limit(10), 10);
        assert_eq!(fallback_limit(5), 5);
    }

    #[tokio::test]
    async fn timeout_falls_back_without_expand() {
        use std::sync::{Arc, Mutex};
        use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let request_lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let seen = request_lines.clone();

        tokio::spawn(async move {
            // First request: record the request line, then stall past the
            // primary timeout without answering.
            let (stream, _) = listener.accept().await.unwrap();
            let mut stalled = BufReader::new(stream);
            let mut line = String::new();
            stalled.read_line(&mut line).await.unwrap();
            seen.lock().unwrap().push(line.trim_end().to_string());

            // Second request: record and answer with an empty envelope.
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            seen.lock().unwrap().push(line.trim_end().to_string());
            let body = r#"{"results": [], "pagination": null}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            reader
                .into_inner()
                .write_all(response.as_bytes())
                .await
                .unwrap();
        });

        let client = DoabClient::new(
            format!("http://{addr}"),
            Duration::from_millis(300),
            Duration::from_secs(5),
        );
        let page = client.search("climate", 1, 20).await.unwrap();
        assert!(page.results.is_empty());

        let lines = request_lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("expand=metadata"));
        assert!(lines[0].contains("limit=20"));
        assert!(!lines[1].contains("expand"));
        assert!(lines[1].contains("limit=10"));
        assert!(lines[1].contains("query=climate"));
    }

    #[test]
    fn pagination_envelope_deserializes_camel_case() {
        let envelope: DoabEnvelope = serde_json::from_value(serde_json::json!({
            "results": [],
            "pagination": {
                "currentPage": 2,
                "totalPages": 7,
                "totalResults": 130,
                "hasPrevious": true,
                "hasMore": true,
                "limit": 20
            }
        }))
        .unwrap();
        let p = envelope.pagination.unwrap();
        assert_eq!(p.current_page, 2);
        assert_eq!(p.total_pages, 7);
        assert!(p.has_previous && p.has_more);
    }
}
