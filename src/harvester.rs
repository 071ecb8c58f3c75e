// Catalog harvester: walks the card backend's paginated listing for every
// configured query and turns the raw card objects into a catalog.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use url::Url;

use crate::card::Card;
use crate::catalog::CardCatalog;
use crate::config::HarvestConfig;
use crate::error::Result;

// --- Structs for Deserializing API Response ---
#[derive(Deserialize, Debug)]
struct HydraView {
    #[serde(rename = "hydra:next")]
    next: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiResponse {
    #[serde(rename = "hydra:member", default)]
    members: Vec<serde_json::Value>,
    #[serde(rename = "hydra:view")]
    view: Option<HydraView>,
}

/// Resolves the page's `hydra:next` link, which may be relative, against
/// the URL the page was served from.
fn next_page(response_url: &Url, view: Option<HydraView>) -> Result<Option<String>> {
    match view.and_then(|v| v.next) {
        Some(next) => Ok(Some(response_url.join(&next)?.to_string())),
        None => Ok(None),
    }
}

pub struct Harvester {
    client: Client,
    query_urls: Vec<String>,
    request_delay: Duration,
}

impl Harvester {
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let client = Client::builder().user_agent(config.user_agent.as_str()).build()?;
        Ok(Harvester {
            client,
            query_urls: config.query_urls(),
            request_delay: config.request_delay(),
        })
    }

    /// Fetches every page of every query. Raw objects are returned as-is so
    /// they can be backed up before ingestion.
    pub fn harvest(&self) -> Result<Vec<serde_json::Value>> {
        let mut all_cards = Vec::new();

        for (index, start_url) in self.query_urls.iter().enumerate() {
            log::info!("Harvesting query {}/{}", index + 1, self.query_urls.len());
            let mut next_page_url = Some(start_url.clone());
            let mut page_count = 0;

            while let Some(url) = next_page_url {
                page_count += 1;
                log::info!("Fetching page {}: {}", page_count, url);
                let response = self.client.get(&url).send()?.error_for_status()?;
                let response_url = response.url().clone();
                let page: ApiResponse = response.json()?;

                all_cards.extend(page.members);
                next_page_url = next_page(&response_url, page.view)?;
                if !self.request_delay.is_zero() {
                    sleep(self.request_delay);
                }
            }
        }

        log::info!("Harvest complete: {} raw card objects", all_cards.len());
        Ok(all_cards)
    }
}

/// Ingests raw backend objects. Objects without an id are logged and
/// skipped; duplicates keep the last one seen.
pub fn build_catalog(raw: &[serde_json::Value]) -> CardCatalog {
    let mut catalog = CardCatalog::new();
    let mut skipped = 0;
    for value in raw {
        match Card::from_json(value) {
            Some(card) => {
                catalog.insert(card);
            }
            None => {
                skipped += 1;
                log::debug!("Skipping card object without an id: {}", value);
            }
        }
    }
    if skipped > 0 {
        log::warn!("Skipped {} card objects without an id", skipped);
    }
    log::info!("Catalog built with {} unique cards", catalog.len());
    catalog
}

/// Pretty JSON backup of the raw harvest.
pub fn save_raw(path: impl AsRef<Path>, raw: &[serde_json::Value]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(BufWriter::new(file), raw)?;
    log::info!("Raw data saved to '{}'", path.as_ref().display());
    Ok(())
}
