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

//! # Booking Links
//!
//! Resolves a booking URL for an offer. Total function: known airline site,
//! else the provider's own deep link, else a Google Flights query built from
//! the search parameters.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::FlightSearchParams;

/// Immutable airline-to-booking-site table, passed explicitly so callers can
/// substitute their own mapping.
#[derive(Debug, Clone)]
pub struct BookingLinkTable {
    sites: HashMap<&'static str, &'static str>,
}

static DEFAULT_SITES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Air Canada", "https://www.aircanada.com"),
        ("Delta", "https://www.delta.com"),
        ("JetBlue", "https://www.jetblue.com"),
        ("United", "https://www.united.com"),
        ("American Airlines", "https://www.aa.com"),
        ("Southwest", "https://www.southwest.com"),
        ("Alaska Airlines", "https://www.alaskaair.com"),
        ("WestJet", "https://www.westjet.com"),
    ])
});

impl Default for BookingLinkTable {
    fn default() -> Self {
        Self {
            sites: DEFAULT_SITES.clone(),
        }
    }
}

impl BookingLinkTable {
    pub fn new(sites: HashMap<&'static str, &'static str>) -> Self {
        Self { sites }
    }

    /// Always returns some URL.
    pub fn resolve(
        &self,
        airline: &str,
        offer_url: Option<&str>,
        params: &FlightSearchParams,
    ) -> String {
        if let Some(site) = self.sites.get(airline) {
            return (*site).to_string();
        }
        if let Some(url) = offer_url {
            return url.to_string();
        }
        fallback_search_url(params)
    }
}

/// Generic flight-query deep link when neither the airline nor the provider
/// gives us anything better.
fn fallback_search_url(params: &FlightSearchParams) -> String {
    let mut query = format!(
        "Flights from {} to {} on {}",
        params.from_airport, params.to_airport, params.depart_date
    );
    if let Some(ret) = params.return_date {
        query.push_str(&format!(" returning on {}", ret));
    }
    format!(
        "https://www.google.com/travel/flights?q={}",
        urlencoding::encode(&query)
    )
}
