use crate::rows::{RawCityRow, RawProductRow, validate_rows};
use landing_kit_core::{Dataset, Error, RemoteConfig, Result};
use reqwest::header;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// Ceiling on pagination rounds per table. Hitting it means the endpoint
/// keeps returning full pages and the fetch cannot prove it has seen every
/// row, so we refuse the truncated data instead of building from it.
const MAX_PAGES: u32 = 1_000;

/// Client for a PostgREST-style dataset endpoint.
///
/// Each table is fetched in full with `limit`/`offset` pagination; the
/// API key rides on every request as both `apikey` and a bearer token.
#[derive(Debug)]
pub struct RemoteSource {
    client: reqwest::Client,
    endpoint: String,
    cities_table: String,
    products_table: String,
    page_size: u32,
}

impl RemoteSource {
    pub fn new(config: &RemoteConfig, api_key: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();

        let mut key_value = header::HeaderValue::from_str(api_key)
            .map_err(|_| Error::DataSource("API key contains invalid characters".to_string()))?;
        key_value.set_sensitive(true);
        headers.insert("apikey", key_value);

        let mut auth_value = header::HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| Error::DataSource("API key contains invalid characters".to_string()))?;
        auth_value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::DataSource(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            cities_table: config.cities_table.clone(),
            products_table: config.products_table.clone(),
            page_size: config.page_size,
        })
    }

    /// Fetch both tables and validate their rows.
    ///
    /// Returns the dataset plus the number of rows dropped by validation.
    pub async fn fetch_dataset(&self) -> Result<(Dataset, usize)> {
        let cities: Vec<RawCityRow> = self.fetch_table(&self.cities_table).await?;
        let products: Vec<RawProductRow> = self.fetch_table(&self.products_table).await?;
        info!(
            cities = cities.len(),
            products = products.len(),
            "fetched dataset tables"
        );
        Ok(validate_rows(cities, products))
    }

    /// Fetch every row of one table, paging until a short page arrives.
    async fn fetch_table<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>> {
        let mut rows: Vec<T> = Vec::new();
        let mut offset: u32 = 0;

        for _ in 0..MAX_PAGES {
            let url = self.table_url(table, offset);
            debug!(url = url.as_str(), "fetching page");

            let response = self.client.get(&url).send().await.map_err(|e| {
                Error::DataSource(format!("fetching table '{}': {}", table, e))
            })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::DataSource(format!(
                    "table '{}' returned {}: {}",
                    table, status, body
                )));
            }

            let page: Vec<T> = response.json().await.map_err(|e| {
                Error::DataSource(format!("decoding table '{}': {}", table, e))
            })?;

            let short_page = (page.len() as u32) < self.page_size;
            rows.extend(page);
            if short_page {
                return Ok(rows);
            }
            offset += self.page_size;
        }

        Err(Error::DataSource(format!(
            "table '{}' did not finish paginating after {} pages; refusing truncated data",
            table, MAX_PAGES
        )))
    }

    fn table_url(&self, table: &str, offset: u32) -> String {
        format!(
            "{}/{}?select=*&limit={}&offset={}",
            self.endpoint, table, self.page_size, offset
        )
    }
}
