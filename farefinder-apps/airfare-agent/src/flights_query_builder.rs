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

//! # Flights Query Builder
//!
//! Side-effect free construction of the partner API query string from
//! validated search parameters.

use chrono::NaiveDate;

use crate::error::{Result, SearchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trip {
    OneWay,
    RoundTrip,
}

impl Trip {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trip::OneWay => "one-way",
            Trip::RoundTrip => "round-trip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl Seat {
    /// Wire value the partner API expects for `cabinClass`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Seat::Economy => "economy",
            Seat::PremiumEconomy => "premium_economy",
            Seat::Business => "business",
            Seat::First => "first",
        }
    }
}

/// Stop tolerance. Filtering happens client-side in the ranker; the wire
/// query is identical either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopPreference {
    #[default]
    Any,
    NonstopOnly,
}

#[derive(Debug, Clone)]
pub struct FlightSearchParams {
    pub from_airport: String,
    pub to_airport: String,
    pub depart_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub trip_type: Trip,
    pub cabin_class: Seat,
    pub adults: u32,
    pub children: u32,
    pub currency: String,
    pub market: String,
    pub locale: String,
    pub stop_preference: StopPreference,
}

impl FlightSearchParams {
    pub fn builder(
        from_airport: String,
        to_airport: String,
        depart_date: NaiveDate,
    ) -> FlightSearchParamsBuilder {
        FlightSearchParamsBuilder {
            from_airport,
            to_airport,
            depart_date,
            return_date: None,
            trip_type: Trip::OneWay,
            cabin_class: Seat::Economy,
            adults: 1,
            children: 0,
            currency: "USD".to_string(),
            market: "US".to_string(),
            locale: "en-US".to_string(),
            stop_preference: StopPreference::Any,
        }
    }

    /// Checks everything the provider cannot be trusted to reject cheaply.
    /// "Today" counts as a valid departure day.
    pub fn validate(&self) -> Result<()> {
        self.validate_against(chrono::Local::now().date_naive())
    }

    fn validate_against(&self, today: NaiveDate) -> Result<()> {
        if self.from_airport.trim().is_empty() {
            return Err(SearchError::invalid("origin airport is required"));
        }
        if self.to_airport.trim().is_empty() {
            return Err(SearchError::invalid("destination airport is required"));
        }
        if self.from_airport.eq_ignore_ascii_case(&self.to_airport) {
            return Err(SearchError::invalid(format!(
                "origin and destination are both '{}'",
                self.from_airport
            )));
        }
        if self.adults == 0 {
            return Err(SearchError::invalid("at least one adult is required"));
        }
        if self.depart_date < today {
            return Err(SearchError::invalid(format!(
                "departure date {} is in the past",
                self.depart_date
            )));
        }
        match (self.trip_type, self.return_date) {
            (Trip::RoundTrip, None) => Err(SearchError::invalid(
                "round-trip selected but no return date given",
            )),
            (Trip::OneWay, Some(_)) => Err(SearchError::invalid(
                "return date given for a one-way trip",
            )),
            (Trip::RoundTrip, Some(ret)) if ret < self.depart_date => {
                Err(SearchError::invalid(format!(
                    "return date {} is before departure {}",
                    ret, self.depart_date
                )))
            }
            _ => Ok(()),
        }
    }

    /// Endpoint path under the provider host for this trip type.
    pub fn endpoint_path(&self) -> &'static str {
        match self.trip_type {
            Trip::OneWay => "flights/one-way/list",
            Trip::RoundTrip => "flights/roundtrip/list",
        }
    }

    /// Query pairs in the shape the partner API expects. Pure; assumes the
    /// params already validated.
    pub fn provider_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("from", self.from_airport.to_uppercase()),
            ("to", self.to_airport.to_uppercase()),
            ("depart", self.depart_date.format("%Y-%m-%d").to_string()),
        ];
        if let Some(ret) = self.return_date {
            pairs.push(("return", ret.format("%Y-%m-%d").to_string()));
        }
        pairs.push(("adults", self.adults.to_string()));
        if self.children > 0 {
            pairs.push(("children", self.children.to_string()));
        }
        pairs.push(("currency", self.currency.clone()));
        pairs.push(("market", self.market.clone()));
        pairs.push(("locale", self.locale.clone()));
        pairs.push(("cabinClass", self.cabin_class.as_str().to_string()));
        pairs
    }

    /// Full request URL against the given provider host.
    pub fn search_url(&self, host: &str) -> String {
        let query = self
            .provider_query()
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("https://{}/{}?{}", host, self.endpoint_path(), query)
    }
}

#[derive(Clone)]
pub struct FlightSearchParamsBuilder {
    from_airport: String,
    to_airport: String,
    depart_date: NaiveDate,
    return_date: Option<NaiveDate>,
    trip_type: Trip,
    cabin_class: Seat,
    adults: u32,
    children: u32,
    currency: String,
    market: String,
    locale: String,
    stop_preference: StopPreference,
}

impl FlightSearchParamsBuilder {
    pub fn cabin_class(mut self, cabin_class: Seat) -> Self {
        self.cabin_class = cabin_class;
        self
    }

    pub fn adults(mut self, adults: u32) -> Self {
        self.adults = adults;
        self
    }

    pub fn children(mut self, children: u32) -> Self {
        self.children = children;
        self
    }

    pub fn trip_type(mut self, trip_type: Trip) -> Self {
        self.trip_type = trip_type;
        self
    }

    pub fn return_date(mut self, return_date: NaiveDate) -> Self {
        self.return_date = Some(return_date);
        self.trip_type = Trip::RoundTrip;
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn market(mut self, market: impl Into<String>) -> Self {
        self.market = market.into();
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn stop_preference(mut self, stop_preference: StopPreference) -> Self {
        self.stop_preference = stop_preference;
        self
    }

    pub fn build(self) -> Result<FlightSearchParams> {
        let params = FlightSearchParams {
            from_airport: self.from_airport,
            to_airport: self.to_airport,
            depart_date: self.depart_date,
            return_date: self.return_date,
            trip_type: self.trip_type,
            cabin_class: self.cabin_class,
            adults: self.adults,
            children: self.children,
            currency: self.currency,
            market: self.market,
            locale: self.locale,
            stop_preference: self.stop_preference,
        };
        params.validate()?;
        Ok(params)
    }
}
