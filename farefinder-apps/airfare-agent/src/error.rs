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

//! # Search Error Taxonomy
//!
//! Only request building and the provider call abort a search. Malformed
//! individual offers degrade per-offer inside the normalizer instead.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Bad user input, fixable by the user.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Provider answered with a non-200 status. Retryable by the user,
    /// never retried automatically.
    #[error("provider unavailable: HTTP {status}: {body_preview}")]
    ProviderUnavailable { status: u16, body_preview: String },

    /// The request exceeded the configured timeout.
    #[error("provider timed out")]
    ProviderTimeout,

    /// Transport-level failure other than a timeout.
    #[error("transport error: {0}")]
    Transport(#[from] wreq::Error),

    /// Response body was not JSON at all. Partially-present JSON is fine
    /// and handled downstream; this fires only when decoding fails outright.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl SearchError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }
}
