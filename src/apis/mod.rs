pub mod catalog;
pub mod doab;
pub mod doaj_articles;
pub mod doaj_journals;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One record of the unified display model. The serde layout matches the
/// local catalog's `/api/journal` payload exactly; the external sources are
/// normalized into this shape. Missing data is an empty string or empty
/// vec, never an absent key, so downstream code can index fields
/// unconditionally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayRecord {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "sourceFlag", default)]
    pub source_flag: SourceFlag,
    #[serde(rename = "type", default)]
    pub record_type: String,
    #[serde(default)]
    pub detail: RecordDetail,
    #[serde(default)]
    pub subject: RecordSubject,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDetail {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub creators: Vec<Creator>,
    /// Empty or a parseable date string (bare years are expanded to
    /// `YYYY-01-01` during normalization).
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub publication_date: String,
    #[serde(default)]
    pub issn: String,
    #[serde(default)]
    pub journal_or_publication_title: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "officialURL", default)]
    pub official_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSubject {
    #[serde(rename = "subjectName", default)]
    pub subject_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceFlag {
    DoajArticle,
    DoajJournal,
    DoabBook,
    #[default]
    Local,
}

/// Cursor-style pagination envelope shared by the DOAJ article and journal
/// endpoints. Paging follows the literal upstream URLs; no page arithmetic
/// happens on this shape beyond a total-page count for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPagination {
    pub prev: Option<String>,
    pub next: Option<String>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub last: Option<String>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SourceError {
    /// Timeouts and gateway-failure statuses (502/503/504), the class of
    /// errors that triggers the DOAB fallback request.
    pub fn is_timeout_class(&self) -> bool {
        match self {
            SourceError::Http(e) => {
                e.is_timeout() || e.status().is_some_and(|s| matches!(s.as_u16(), 502 | 503 | 504))
            }
            _ => false,
        }
    }
}

/// Split a full-name string on whitespace: first token becomes the first
/// name, the rest joined by single spaces becomes the last name. Lossy and
/// locale-naive, kept for compatibility with the existing deployment.
pub(crate) fn split_name(full: &str) -> Creator {
    let mut parts = full.split_whitespace();
    let first_name = parts.next().unwrap_or_default().to_string();
    let last_name = parts.collect::<Vec<_>>().join(" ");
    Creator { first_name, last_name }
}

/// Expand a bare 4-digit year to `YYYY-01-01`; other strings pass through.
pub(crate) fn expand_year(date: &str) -> String {
    let trimmed = date.trim();
    if trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        format!("{trimmed}-01-01")
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("oa-search/0.1")
        .build()
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_name_first_and_rest() {
        let c = split_name("Ada Augusta Lovelace");
        assert_eq!(c.first_name, "Ada");
        assert_eq!(c.last_name, "Augusta Lovelace");
    }

    #[test]
    fn split_name_reconstructs_single_spaced_names() {
        for s in ["Marie Curie", "Jean-Luc Picard", "A B C D"] {
            let c = split_name(s);
            assert_eq!(format!("{} {}", c.first_name, c.last_name), s);
        }
    }

    #[test]
    fn split_name_single_token() {
        let c = split_name("Plato");
        assert_eq!(c.first_name, "Plato");
        assert_eq!(c.last_name, "");
    }

    #[test]
    fn expand_year_only() {
        assert_eq!(expand_year("2019"), "2019-01-01");
        assert_eq!(expand_year("2019-05-06"), "2019-05-06");
        assert_eq!(expand_year(""), "");
    }

    #[test]
    fn display_record_round_trips_catalog_json() {
        let raw = serde_json::json!({
            "_id": "abc123",
            "type": "Thesis",
            "detail": {
                "title": "A Study",
                "abstract": "Text",
                "creators": [{"firstName": "Jo", "lastName": "Doe"}],
                "date": "2021-03-01",
                "publicationDate": "2021-03-01",
                "issn": "",
                "journalOrPublicationTitle": "Proc.",
                "keywords": "a, b",
                "publisher": "Uni Press",
                "status": "Published",
                "officialURL": "https://example.org/1"
            },
            "subject": {"subjectName": "History"}
        });
        let rec: DisplayRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(rec.source_flag, SourceFlag::Local);
        assert_eq!(rec.detail.creators[0].first_name, "Jo");
        assert_eq!(rec.detail.official_url, "https://example.org/1");
        assert!(rec.detail.doi.is_none());

        let out = serde_json::to_value(&rec).unwrap();
        assert_eq!(out["_id"], "abc123");
        assert_eq!(out["detail"]["officialURL"], "https://example.org/1");
        assert_eq!(out["detail"]["abstract"], "Text");
        // Absent doi stays absent; everything else is always present.
        assert!(out["detail"].get("doi").is_none());
    }
}
