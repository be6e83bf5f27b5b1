use chrono::Datelike;

use crate::apis::doab::OffsetPagination;
use crate::apis::{CursorPagination, DisplayRecord};
use crate::config::Sources;
use crate::filter::{self, FilterState};
use crate::paging::{self, PageAction, PageControls};
use crate::search::{combined_search, CombinedResponse};

/// The four result tabs. Each owns one result list and one pagination
/// state in the store; nothing is ever merged across tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Articles,
    Journals,
    Books,
    Home,
}

impl Tab {
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Articles => "articles",
            Tab::Journals => "journals",
            Tab::Books => "books",
            Tab::Home => "home",
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "articles" => Ok(Tab::Articles),
            "journals" => Ok(Tab::Journals),
            "books" => Ok(Tab::Books),
            "home" => Ok(Tab::Home),
            other => Err(format!("unknown tab: {other}")),
        }
    }
}

/// Per-source results, pagination, and totals. Each pagination state is
/// mutated only by its own tab's handler.
#[derive(Default)]
pub struct ResultStore {
    pub articles: Vec<DisplayRecord>,
    pub journals: Vec<DisplayRecord>,
    pub books: Vec<DisplayRecord>,
    pub local: Vec<DisplayRecord>,
    pub article_pagination: Option<CursorPagination>,
    pub journal_pagination: Option<CursorPagination>,
    pub book_pagination: Option<OffsetPagination>,
    pub article_total: u64,
    pub journal_total: u64,
    pub book_total: u64,
}

/// One facet value with its occurrence count on the active tab's page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetOption {
    pub value: String,
    pub count: usize,
}

/// The whole page state as one explicit value: query, active tab, filters,
/// per-source store, the shared loading flag, and the dispatch generation
/// counter that guards against stale responses.
pub struct SearchView {
    pub query: String,
    pub active_tab: Tab,
    pub filters: FilterState,
    /// Home-tab client-side page number.
    pub local_page: u32,
    pub loading: bool,
    pub store: ResultStore,
    generation: u64,
}

impl Default for SearchView {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchView {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            active_tab: Tab::Articles,
            filters: FilterState::default(),
            local_page: 1,
            loading: false,
            store: ResultStore::default(),
            generation: 0,
        }
    }

    /// Start a new dispatch: bump the generation, reset the store, and
    /// return the token the eventual response must present.
    pub fn begin_search(&mut self, query: &str) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.query = query.trim().to_string();
        self.local_page = 1;
        self.store = ResultStore::default();
        self.generation
    }

    /// Store a dispatch result. A response from a superseded dispatch is
    /// discarded; returns whether the response was applied.
    pub fn apply_search(&mut self, generation: u64, response: CombinedResponse) -> bool {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "discarding stale response");
            return false;
        }
        let store = &mut self.store;
        store.local = response.local;
        store.articles = response.articles.results;
        store.article_pagination = response.articles.pagination;
        store.journals = response.journals.results;
        store.journal_pagination = response.journals.pagination;
        store.books = response.books.results;
        store.book_pagination = response.books.pagination;
        store.article_total = store.article_pagination.as_ref().map_or(0, |p| p.total);
        store.journal_total = store.journal_pagination.as_ref().map_or(0, |p| p.total);
        store.book_total = store.book_pagination.as_ref().map_or(0, |p| p.total_results);
        self.loading = false;
        if self.tab_results(self.active_tab).is_empty() {
            self.active_tab = self.default_tab();
        }
        true
    }

    /// Dispatch the query to all four sources and apply the outcome.
    pub async fn run_search(&mut self, sources: &Sources, query: &str, doab_limit: u32) {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return;
        }
        let generation = self.begin_search(trimmed);
        let response = combined_search(sources, trimmed, doab_limit).await;
        self.apply_search(generation, response);
    }

    /// First tab with results, in display order. Falls back to Articles.
    pub fn default_tab(&self) -> Tab {
        [Tab::Articles, Tab::Journals, Tab::Books, Tab::Home]
            .into_iter()
            .find(|tab| !self.tab_results(*tab).is_empty())
            .unwrap_or(Tab::Articles)
    }

    /// Switching tabs resets the Home page cursor but keeps the filters:
    /// facet selections apply across sources.
    pub fn switch_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        self.local_page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    fn tab_results(&self, tab: Tab) -> &[DisplayRecord] {
        match tab {
            Tab::Articles => &self.store.articles,
            Tab::Journals => &self.store.journals,
            Tab::Books => &self.store.books,
            Tab::Home => &self.store.local,
        }
    }

    pub fn active_results(&self) -> &[DisplayRecord] {
        self.tab_results(self.active_tab)
    }

    fn filtered_results(&self) -> Vec<&DisplayRecord> {
        self.active_results()
            .iter()
            .filter(|rec| filter::matches(rec, &self.query, &self.filters))
            .collect()
    }

    /// The records currently on screen: the active tab's fetched page run
    /// through the free-text and facet filters, and, on the Home tab,
    /// sliced into 10-record pages.
    pub fn visible_results(&self) -> Vec<&DisplayRecord> {
        let filtered = self.filtered_results();
        match self.active_tab {
            Tab::Home => paging::slice_page(&filtered, self.local_page).to_vec(),
            _ => filtered,
        }
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered_results().len()
    }

    /// The Previous/Next/Last contract for the active tab. Tabs whose
    /// source failed (no pagination state) render a single disabled page.
    pub fn controls(&self) -> PageControls {
        match self.active_tab {
            Tab::Articles => cursor_or_single(&self.store.article_pagination, self.filtered_count()),
            Tab::Journals => cursor_or_single(&self.store.journal_pagination, self.filtered_count()),
            Tab::Books => match &self.store.book_pagination {
                Some(p) => paging::offset_controls(p),
                None => paging::local_controls(self.filtered_count(), 1),
            },
            Tab::Home => paging::local_controls(self.filtered_count(), self.local_page),
        }
    }

    /// Act on a pagination control for the active tab. No-op while a fetch
    /// is in flight or when the requested direction is unavailable. A
    /// failed fetch keeps the last successfully fetched page on screen.
    pub async fn change_page(&mut self, sources: &Sources, action: PageAction) {
        if self.loading {
            return;
        }
        match self.active_tab {
            Tab::Articles => {
                let Some(url) = cursor_target(&self.store.article_pagination, action) else {
                    return;
                };
                self.loading = true;
                match sources.articles.fetch_page(&url).await {
                    Ok(page) => {
                        self.store.articles = page.results;
                        self.store.article_pagination = page.pagination;
                    }
                    Err(err) => tracing::warn!(%err, "DOAJ article page fetch failed"),
                }
                self.loading = false;
            }
            Tab::Journals => {
                let Some(url) = cursor_target(&self.store.journal_pagination, action) else {
                    return;
                };
                self.loading = true;
                match sources.journals.fetch_page(&url).await {
                    Ok(page) => {
                        self.store.journals = page.results;
                        self.store.journal_pagination = page.pagination;
                    }
                    Err(err) => tracing::warn!(%err, "DOAJ journal page fetch failed"),
                }
                self.loading = false;
            }
            Tab::Books => {
                let Some((page, limit)) = offset_target(&self.store.book_pagination, action) else {
                    return;
                };
                self.loading = true;
                match sources.books.search(&self.query, page, limit).await {
                    Ok(result) => {
                        self.store.books = result.results;
                        self.store.book_pagination = result.pagination;
                    }
                    Err(err) => tracing::warn!(%err, "DOAB page fetch failed"),
                }
                self.loading = false;
            }
            Tab::Home => {
                let controls = paging::local_controls(self.filtered_count(), self.local_page);
                let target = match action {
                    PageAction::Previous => self.local_page.saturating_sub(1),
                    PageAction::Next => self.local_page + 1,
                    PageAction::Last => controls.total_pages,
                    PageAction::Goto(n) => n,
                };
                self.local_page = target.clamp(1, controls.total_pages);
            }
        }
    }

    /// Unique record types on the active tab's page, with counts.
    pub fn unique_types(&self) -> Vec<FacetOption> {
        facet_options(self.active_results(), |rec| rec.record_type.clone())
    }

    pub fn unique_publishers(&self) -> Vec<FacetOption> {
        facet_options(self.active_results(), |rec| rec.detail.publisher.clone())
    }

    pub fn unique_subjects(&self) -> Vec<FacetOption> {
        facet_options(self.active_results(), |rec| rec.subject.subject_name.clone())
    }

    /// Unique publication years on the active tab's page, newest first.
    pub fn unique_years(&self) -> Vec<FacetOption> {
        let mut years = facet_options(self.active_results(), |rec| {
            filter::record_date(rec)
                .map(|d| d.year().to_string())
                .unwrap_or_default()
        });
        years.sort_by_key(|y| std::cmp::Reverse(y.value.parse::<i32>().unwrap_or_default()));
        years
    }
}

/// Cursor pagination follows the upstream URL for the requested direction;
/// there is nothing to do when the upstream offered no such URL.
fn cursor_target(pagination: &Option<CursorPagination>, action: PageAction) -> Option<String> {
    let p = pagination.as_ref()?;
    match action {
        PageAction::Previous => p.prev.clone(),
        PageAction::Next => p.next.clone(),
        PageAction::Last => p.last.clone(),
        PageAction::Goto(_) => None,
    }
}

/// Offset pagination computes the target page number from the stored
/// state, gated by the upstream's direction flags.
fn offset_target(pagination: &Option<OffsetPagination>, action: PageAction) -> Option<(u32, u32)> {
    let p = pagination.as_ref()?;
    let page = match action {
        PageAction::Previous if p.has_previous => p.current_page.saturating_sub(1).max(1),
        PageAction::Next if p.has_more => p.current_page + 1,
        PageAction::Last if p.total_pages > 1 && p.current_page < p.total_pages => p.total_pages,
        _ => return None,
    };
    Some((page, p.limit))
}

fn cursor_or_single(pagination: &Option<CursorPagination>, filtered_len: usize) -> PageControls {
    match pagination {
        Some(p) => paging::cursor_controls(p),
        None => paging::local_controls(filtered_len, 1),
    }
}

fn facet_options<F>(records: &[DisplayRecord], key: F) -> Vec<FacetOption>
where
    F: Fn(&DisplayRecord) -> String,
{
    let mut options: Vec<FacetOption> = Vec::new();
    for record in records {
        let value = key(record);
        if value.is_empty() {
            continue;
        }
        match options.iter_mut().find(|o| o.value == value) {
            Some(option) => option.count += 1,
            None => options.push(FacetOption { value, count: 1 }),
        }
    }
    options
}
