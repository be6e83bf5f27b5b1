use chrono::{Datelike, NaiveDate};

use crate::apis::DisplayRecord;

/// Facet-filter selections. An empty string means "no constraint".
/// Filters persist across tab switches and are cleared only by explicit
/// user action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub record_type: String,
    pub publisher: String,
    pub subject: String,
    pub date_from: String,
    pub date_to: String,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        !(self.record_type.is_empty()
            && self.publisher.is_empty()
            && self.subject.is_empty()
            && self.date_from.is_empty()
            && self.date_to.is_empty())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Does `record` survive the free-text query and every active facet?
/// Free-text is OR-ed across the display fields; facets are AND-ed.
pub fn matches(record: &DisplayRecord, query: &str, filters: &FilterState) -> bool {
    matches_query(record, query)
        && matches_facet(&record.record_type, &filters.record_type)
        && matches_facet(&record.detail.publisher, &filters.publisher)
        && matches_facet(&record.subject.subject_name, &filters.subject)
        && matches_date_from(record, &filters.date_from)
        && matches_date_to(record, &filters.date_to)
}

fn matches_query(record: &DisplayRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    [
        &record.detail.title,
        &record.detail.journal_or_publication_title,
        &record.detail.publisher,
        &record.subject.subject_name,
        &record.record_type,
        &record.detail.abstract_text,
        &record.detail.keywords,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}

fn matches_facet(field: &str, filter: &str) -> bool {
    filter.is_empty() || field.to_lowercase().contains(&filter.to_lowercase())
}

/// `date_from` carries dual semantics inherited from the UI: it is both a
/// discrete year facet (exact year-string match) and a range lower bound.
/// A record matches when either branch does.
fn matches_date_from(record: &DisplayRecord, date_from: &str) -> bool {
    if date_from.is_empty() {
        return true;
    }
    let Some(date) = record_date(record) else {
        return false;
    };
    if date.year().to_string() == date_from {
        return true;
    }
    parse_date(date_from).is_some_and(|bound| date >= bound)
}

fn matches_date_to(record: &DisplayRecord, date_to: &str) -> bool {
    if date_to.is_empty() {
        return true;
    }
    let Some(date) = record_date(record) else {
        return false;
    };
    parse_date(date_to).is_some_and(|bound| date <= bound)
}

/// The record's effective date: `detail.date`, falling back to
/// `detail.publicationDate`.
pub fn record_date(record: &DisplayRecord) -> Option<NaiveDate> {
    let field = if record.detail.date.is_empty() {
        &record.detail.publication_date
    } else {
        &record.detail.date
    };
    parse_date(field)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    // Timestamp strings: take the date prefix.
    if let Some(prefix) = s.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date);
        }
    }
    // A bare year bounds from January 1, matching the original UI.
    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        return NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1);
    }
    None
}
