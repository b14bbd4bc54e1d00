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

//! # Provider Configuration
//!
//! Credentials and endpoint host come from the environment only.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{Result, SearchError};

pub const DEFAULT_API_HOST: &str = "skyfares.p.rapidapi.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API key for the partner flights API. Required.
    pub api_key: String,
    /// Hostname of the partner endpoint, also sent as the host header.
    pub api_host: String,
    /// Request and connect timeout.
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Read configuration from `FAREFINDER_API_KEY`, `FAREFINDER_API_HOST`
    /// and `FAREFINDER_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("FAREFINDER_API_KEY").map_err(|_| {
            SearchError::invalid("FAREFINDER_API_KEY is not set; export your provider API key")
        })?;
        Ok(Self {
            api_key,
            api_host: try_load("FAREFINDER_API_HOST", DEFAULT_API_HOST.to_string()),
            timeout_secs: try_load("FAREFINDER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_host: DEFAULT_API_HOST.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Invalid {} value '{}': {}; using {}", key, raw, e, default);
                default
            }
        },
        Err(_) => {
            tracing::debug!("{} not set, using default: {}", key, default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_key_defaults() {
        let cfg = ProviderConfig::with_key("k");
        assert_eq!(cfg.api_host, DEFAULT_API_HOST);
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
