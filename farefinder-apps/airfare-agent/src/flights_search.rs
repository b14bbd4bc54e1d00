//!  Farefinder Airfare Agent
//!
//!  Copyright (C) 2026  Farefinder contributors
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # Partner Flights Search Client
//!
//! Effectful (time, network) operations against the partner flights API.
//! One outbound request per search; the caller decides whether a failure is
//! surfaced or retried.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::error::{Result, SearchError};
use crate::flights_query_builder::FlightSearchParams;
use crate::flights_results_parser::FlightSearchResult;

#[derive(Clone)]
pub struct SkyFaresClient {
    client: Arc<wreq::Client>,
    config: ProviderConfig,
}

impl SkyFaresClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = wreq::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SearchError::Transport)?;
        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    /// One GET against the provider. 200 yields the raw body; anything else
    /// is an explicit failure. No retry loop.
    pub async fn fetch_raw(&self, url: &str) -> Result<String> {
        let http_start = std::time::Instant::now();
        tracing::trace!("[fetch_raw] Starting HTTP request to: {}", url);

        let response = self
            .client
            .get(url)
            .header("x-rapidapi-key", &self.config.api_key)
            .header("x-rapidapi-host", &self.config.api_host)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::ProviderTimeout
                } else {
                    SearchError::Transport(e)
                }
            })?;
        tracing::trace!(
            "[fetch_raw] HTTP request completed in {:?}",
            http_start.elapsed()
        );

        let status = response.status();
        tracing::debug!("[fetch_raw] HTTP Status: {}", status.as_u16());

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::ProviderTimeout
            } else {
                SearchError::Transport(e)
            }
        })?;
        tracing::debug!("[fetch_raw] Response body: {} KB", body.len() / 1024);

        if !status.is_success() {
            return Err(SearchError::ProviderUnavailable {
                status: status.as_u16(),
                body_preview: body.chars().take(500).collect(),
            });
        }

        Ok(body)
    }

    /// Validate, build the query, fetch once, normalize. Malformed
    /// individual offers never fail the search; they are skipped or carried
    /// with sentinel fields by the normalizer.
    pub async fn search_flights(&self, params: &FlightSearchParams) -> Result<FlightSearchResult> {
        let overall_start = std::time::Instant::now();
        params.validate()?;

        let url = params.search_url(&self.config.api_host);
        tracing::info!("Search URL built: {}", redact_query(&url));

        let fetch_start = std::time::Instant::now();
        let body = self.fetch_raw(&url).await?;
        tracing::info!(
            "HTTP fetch completed in {:?}, got {} KB",
            fetch_start.elapsed(),
            body.len() / 1024
        );

        let result = FlightSearchResult::from_json(&body, params.clone())?;
        tracing::info!(
            "Normalized {} offers ({} skipped) in {:?} total",
            result.offers.len(),
            result.skipped_offers,
            overall_start.elapsed()
        );
        Ok(result)
    }
}

/// Log-safe rendition of a request URL (drops the query string).
fn redact_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
