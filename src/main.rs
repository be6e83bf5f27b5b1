use clap::Parser;
use tracing_subscriber::EnvFilter;

mod apis;
mod config;
mod filter;
mod paging;
mod search;
mod view;

use config::Config;
use paging::{PageAction, PageItem};
use view::{SearchView, Tab};

/// Search open-access article, journal, and book indexes plus the local
/// catalog, and show one tab of normalized, filtered results.
#[derive(Parser)]
#[command(name = "oa-search", version)]
struct Cli {
    /// Search term, as it would appear in the page path
    query: String,

    /// Tab to display: articles, journals, books, home.
    /// Defaults to the first tab with results.
    #[arg(long)]
    tab: Option<Tab>,

    /// Facet filter on record type
    #[arg(long = "type")]
    record_type: Option<String>,

    /// Facet filter on publisher
    #[arg(long)]
    publisher: Option<String>,

    /// Facet filter on subject
    #[arg(long)]
    subject: Option<String>,

    /// Year facet or lower date bound (YYYY or YYYY-MM-DD)
    #[arg(long)]
    date_from: Option<String>,

    /// Upper date bound (YYYY or YYYY-MM-DD)
    #[arg(long)]
    date_to: Option<String>,

    /// Follow this many Next pages on the selected tab after the search
    #[arg(long, default_value_t = 0)]
    follow: u32,

    /// Print visible records as JSON instead of a text summary
    #[arg(long)]
    json: bool,

    /// Base URL of the local deployment (overrides OA_SEARCH_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(base) = cli.base_url {
        config.local_base_url = base;
    }
    let sources = config.build_sources();

    let mut view = SearchView::new();
    view.run_search(&sources, &cli.query, config.doab_limit).await;

    if let Some(tab) = cli.tab {
        view.switch_tab(tab);
    }
    if let Some(t) = cli.record_type {
        view.filters.record_type = t;
    }
    if let Some(p) = cli.publisher {
        view.filters.publisher = p;
    }
    if let Some(s) = cli.subject {
        view.filters.subject = s;
    }
    if let Some(from) = cli.date_from {
        view.filters.date_from = from;
    }
    if let Some(to) = cli.date_to {
        view.filters.date_to = to;
    }

    for _ in 0..cli.follow {
        view.change_page(&sources, PageAction::Next).await;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&view.visible_results())?);
    } else {
        print_summary(&view);
    }

    Ok(())
}

fn print_summary(view: &SearchView) {
    println!(
        "Results for \"{}\": articles {}, journals {}, books {}, home {}",
        view.query,
        view.store.article_total,
        view.store.journal_total,
        view.store.book_total,
        view.store.local.len(),
    );

    let controls = view.controls();
    println!(
        "[{}] page {} of {} ({} filtered on this page{})",
        view.active_tab.label(),
        controls.current_page,
        controls.total_pages,
        view.filtered_count(),
        if view.filters.is_active() { ", filters active" } else { "" },
    );

    if view.active_tab == Tab::Home && controls.total_pages > 1 {
        let strip: Vec<String> = paging::page_window(controls.current_page, controls.total_pages)
            .iter()
            .map(|item| match item {
                PageItem::Page(p) => p.to_string(),
                PageItem::Ellipsis => "...".to_string(),
            })
            .collect();
        println!("Pages: {}", strip.join(" "));
    }

    let visible = view.visible_results();
    if visible.is_empty() {
        println!("No results found.");
        return;
    }
    for record in &visible {
        let title = if record.detail.title.is_empty() {
            &record.detail.journal_or_publication_title
        } else {
            &record.detail.title
        };
        let creators: Vec<String> = record
            .detail
            .creators
            .iter()
            .map(|c| format!("{} {}", c.first_name, c.last_name).trim().to_string())
            .collect();
        println!("- {} [{}]", title, record.record_type);
        if !creators.is_empty() {
            println!("    {}", creators.join(", "));
        }
        if !record.detail.date.is_empty() || !record.detail.publisher.is_empty() {
            println!(
                "    {} {}",
                record.detail.date, record.detail.publisher
            );
        }
    }

    let publishers = view.unique_publishers();
    if !publishers.is_empty() {
        let facets: Vec<String> = publishers
            .iter()
            .take(10)
            .map(|f| format!("{} ({})", f.value, f.count))
            .collect();
        println!("Publishers on this page: {}", facets.join(", "));
    }
}
