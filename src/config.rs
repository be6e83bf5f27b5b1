use std::time::Duration;

use crate::apis::catalog::CatalogClient;
use crate::apis::doab::DoabClient;
use crate::apis::doaj_articles::DoajArticlesClient;
use crate::apis::doaj_journals::DoajJournalsClient;

const DEFAULT_DOAJ_BASE: &str = "https://doaj.org";
const DEFAULT_LOCAL_BASE: &str = "http://localhost:3000";

/// Configuration loaded from environment variables, with CLI overrides
/// applied by the caller.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the local deployment serving `/api/journal` and the
    /// DOAB proxy `/api/doab-search`.
    pub local_base_url: String,
    pub doaj_base_url: String,
    /// Page size requested from DOAB on the first dispatch.
    pub doab_limit: u32,
    pub doab_timeout: Duration,
    pub doab_fallback_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let local_base_url = std::env::var("OA_SEARCH_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_LOCAL_BASE.to_string());
        let doaj_base_url =
            std::env::var("OA_SEARCH_DOAJ_URL").unwrap_or_else(|_| DEFAULT_DOAJ_BASE.to_string());
        let doab_limit = std::env::var("OA_SEARCH_DOAB_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        Self {
            local_base_url,
            doaj_base_url,
            doab_limit,
            doab_timeout: Duration::from_secs(30),
            doab_fallback_timeout: Duration::from_secs(15),
        }
    }

    /// Construct the four source clients.
    pub fn build_sources(&self) -> Sources {
        Sources {
            catalog: CatalogClient::new(self.local_base_url.clone()),
            articles: DoajArticlesClient::new(self.doaj_base_url.clone()),
            journals: DoajJournalsClient::new(self.doaj_base_url.clone()),
            books: DoabClient::new(
                self.local_base_url.clone(),
                self.doab_timeout,
                self.doab_fallback_timeout,
            ),
        }
    }
}

/// The four source clients one dispatch fans out to.
pub struct Sources {
    pub catalog: CatalogClient,
    pub articles: DoajArticlesClient,
    pub journals: DoajJournalsClient,
    pub books: DoabClient,
}
