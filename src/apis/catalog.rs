use serde::Deserialize;

use super::{http_client, DisplayRecord, SourceError, SourceFlag};

/// Local catalog. `/api/journal` returns records already in the display
/// shape; the whole catalog is fetched in one request and paged client-side.
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    journals: Vec<DisplayRecord>,
}

impl CatalogClient {
    pub fn new(base_url: String) -> Self {
        Self { client: http_client(), base_url }
    }

    pub async fn fetch_all(&self) -> Result<Vec<DisplayRecord>, SourceError> {
        let url = format!("{}/api/journal", self.base_url);
        tracing::debug!(url, "fetching local catalog");
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Api(format!(
                "catalog returned {}",
                resp.status()
            )));
        }
        let body: CatalogResponse = resp.json().await?;
        // Upstream records carry no source flag; stamp them as local.
        Ok(body
            .journals
            .into_iter()
            .map(|mut rec| {
                rec.source_flag = SourceFlag::Local;
                rec
            })
            .collect())
    }
}
