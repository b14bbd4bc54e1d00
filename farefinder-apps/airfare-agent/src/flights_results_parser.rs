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

//! # Flights Results Parser
//!
//! Side-effect free normalization of provider JSON into flat offer records.
//! The provider payload is untrusted: any field may be missing, and the
//! nesting differs between provider generations. Offers missing airline or
//! price are skipped (counted, never fatal); unparsable price strings keep
//! the offer with an infinite sentinel so it sorts last; unparsable
//! durations map to zero minutes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::FlightSearchParams;
use crate::error::{Result, SearchError};

/// Prices that failed to parse carry this sentinel and sort last.
pub const PRICE_UNPARSABLE: f64 = f64::INFINITY;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedOffer {
    pub airline: String,
    /// Non-negative, or [`PRICE_UNPARSABLE`] when the provider sent a price
    /// field we could not read a number out of.
    pub price: f64,
    pub currency: Option<String>,
    /// Total minutes; 0 when the provider format was unrecognized.
    pub duration_minutes: i32,
    pub stops: i32,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    /// Provider deep link for this offer, when present.
    pub offer_url: Option<String>,
}

impl NormalizedOffer {
    pub fn has_parsable_price(&self) -> bool {
        self.price.is_finite()
    }
}

#[derive(Debug, Clone)]
pub struct FlightSearchResult {
    pub search_params: FlightSearchParams,
    pub offers: Vec<NormalizedOffer>,
    /// Offers dropped for missing airline/price. Surfaced for diagnostics.
    pub skipped_offers: usize,
    pub raw_response: String,
}

impl FlightSearchResult {
    /// Parse a raw provider body. Fails only when the body is not JSON;
    /// an empty or unrecognized offer list yields an empty result.
    pub fn from_json(body: &str, search_params: FlightSearchParams) -> Result<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| SearchError::MalformedResponse(e.to_string()))?;
        let batch = normalize_offers(&value);
        if batch.skipped > 0 {
            tracing::warn!(
                "Skipped {} offers missing airline or price",
                batch.skipped
            );
        }
        Ok(Self {
            search_params,
            offers: batch.offers,
            skipped_offers: batch.skipped,
            raw_response: body.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub offers: Vec<NormalizedOffer>,
    pub skipped: usize,
}

/// Walk the provider JSON and flatten every offer found. Never fails;
/// a shape with no recognizable offer array yields an empty batch.
pub fn normalize_offers(value: &Value) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    let Some(raw_offers) = find_offer_array(value) else {
        tracing::debug!("No offer array found in provider response");
        return batch;
    };
    for raw in raw_offers {
        match normalize_single_offer(raw) {
            Some(offer) => batch.offers.push(offer),
            None => batch.skipped += 1,
        }
    }
    batch
}

/// Locate the offer list under any of the known provider nestings.
fn find_offer_array(value: &Value) -> Option<&Vec<Value>> {
    if let Some(arr) = value.as_array() {
        return Some(arr);
    }
    let candidates: [&[&str]; 3] = [
        &["flights", "results"],
        &["itineraries", "results"],
        &["itineraries"],
    ];
    for path in candidates {
        if let Some(arr) = walk(value, path).and_then(Value::as_array) {
            return Some(arr);
        }
    }
    // Scraping-era responses bury the list one page deeper under "results".
    if let Some(arr) = walk(value, &["results"])
        .and_then(|v| v.as_array())
        .and_then(|pages| pages.first())
        .and_then(|page| walk(page, &["content", "results", "flights", "results"]))
        .and_then(Value::as_array)
    {
        return Some(arr);
    }
    walk(value, &["results"]).and_then(Value::as_array)
}

fn walk<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(key))
}

fn normalize_single_offer(raw: &Value) -> Option<NormalizedOffer> {
    let airline = extract_airline(raw)?;
    let price = extract_price(raw)?;
    Some(NormalizedOffer {
        airline,
        price,
        currency: extract_currency(raw),
        duration_minutes: extract_duration_minutes(raw),
        stops: extract_stops(raw),
        departure_time: extract_str(raw, &["departure", "departure_time", "departureTime"]),
        arrival_time: extract_str(raw, &["arrival", "arrival_time", "arrivalTime"]),
        offer_url: extract_str(raw, &["url", "deeplink", "link"]),
    })
}

fn extract_str(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| raw.get(k))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn extract_airline(raw: &Value) -> Option<String> {
    if let Some(name) = raw.get("airline").and_then(Value::as_str) {
        return Some(name.to_string());
    }
    if let Some(name) = walk(raw, &["airline", "name"]).and_then(Value::as_str) {
        return Some(name.to_string());
    }
    // Segment-based shape: marketing carrier of the first leg.
    walk(raw, &["legs"])
        .and_then(|v| v.as_array())
        .and_then(|legs| legs.first())
        .and_then(|leg| walk(leg, &["carriers", "marketing"]))
        .and_then(|v| v.as_array())
        .and_then(|carriers| carriers.first())
        .and_then(|c| c.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// `None` means the offer carries no price at all (or a negative one) and
/// must be skipped. A present-but-unparsable display string keeps the offer
/// with the infinite sentinel.
fn extract_price(raw: &Value) -> Option<f64> {
    let price_field = raw.get("price")?;
    price_from_value(price_field)
}

fn price_from_value(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => {
            let amount = n.as_f64()?;
            (amount >= 0.0).then_some(amount)
        }
        Value::String(s) => Some(parse_price_str(s)),
        Value::Object(_) => {
            let amount = v.get("amount")?;
            price_from_value(amount)
        }
        _ => None,
    }
}

/// Strip currency symbols and thousands separators, then parse. Display
/// strings with no digits at all ("N/A", "Call us") map to the sentinel.
pub fn parse_price_str(s: &str) -> f64 {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        tracing::debug!("Could not parse price from: '{}'", s);
        return PRICE_UNPARSABLE;
    }
    cleaned.parse().unwrap_or_else(|_| {
        tracing::debug!("Could not parse price from: '{}'", s);
        PRICE_UNPARSABLE
    })
}

fn extract_currency(raw: &Value) -> Option<String> {
    if let Some(code) = walk(raw, &["price", "currency"]).and_then(Value::as_str) {
        return Some(code.to_string());
    }
    extract_str(raw, &["currency"])
}

fn extract_duration_minutes(raw: &Value) -> i32 {
    for key in ["duration", "durationInMinutes", "duration_minutes"] {
        match raw.get(key) {
            Some(Value::String(s)) => return parse_duration(s),
            Some(Value::Number(n)) => return clamp_minutes(n.as_i64().unwrap_or(0)),
            _ => {}
        }
    }
    walk(raw, &["legs"])
        .and_then(|v| v.as_array())
        .and_then(|legs| legs.first())
        .and_then(|leg| leg.get("durationInMinutes"))
        .and_then(Value::as_i64)
        .map(clamp_minutes)
        .unwrap_or(0)
}

fn extract_stops(raw: &Value) -> i32 {
    if let Some(label) = raw.get("type").and_then(Value::as_str) {
        return parse_stops_label(label);
    }
    if let Some(n) = raw.get("stops").and_then(Value::as_i64) {
        return i32::try_from(n.max(0)).unwrap_or(0);
    }
    if let Some(n) = walk(raw, &["legs"])
        .and_then(|v| v.as_array())
        .and_then(|legs| legs.first())
        .and_then(|leg| leg.get("stopCount"))
        .and_then(Value::as_i64)
    {
        return i32::try_from(n.max(0)).unwrap_or(0);
    }
    // Last resort: stops = segments - 1, floored at zero.
    raw.get("segments")
        .and_then(Value::as_array)
        .map(|segs| segs.len().saturating_sub(1) as i32)
        .unwrap_or(0)
}

/// "Nonstop" / "1 stop" / "2 stops" labels from the scraping-era payloads.
fn parse_stops_label(label: &str) -> i32 {
    if label.to_ascii_lowercase().contains("nonstop") {
        return 0;
    }
    label
        .split_whitespace()
        .next()
        .and_then(|tok| tok.trim_end_matches("-stop").parse().ok())
        .unwrap_or_else(|| {
            tracing::warn!("Could not parse number of stops from: '{}'", label);
            1
        })
}

static DURATION_D_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*d").unwrap());
static DURATION_H_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*h").unwrap());
static DURATION_M_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*m").unwrap());

/// No itinerary takes a year. Anything past this is garbage data,
/// treated the same as an unrecognized format.
const DURATION_CEILING_MINUTES: i64 = 365 * 1440;

fn clamp_minutes(total: i64) -> i32 {
    if !(0..=DURATION_CEILING_MINUTES).contains(&total) {
        tracing::warn!("Implausible duration of {} minutes, ignoring", total);
        return 0;
    }
    total as i32
}

/// Parse "Xh Ym" and "Nd Xh Ym" style durations into total minutes.
/// Unrecognized formats map to 0 rather than failing the offer.
pub fn parse_duration(s: &str) -> i32 {
    let s = s.trim();
    if s.is_empty() {
        return 0;
    }

    let component = |re: &Regex| {
        re.captures(s)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .unwrap_or(0)
    };

    let days = component(&DURATION_D_RE);
    let hours = component(&DURATION_H_RE);
    let minutes = component(&DURATION_M_RE);

    if days == 0 && hours == 0 && minutes == 0 {
        tracing::debug!("Could not parse duration from: '{}'", s);
    }

    clamp_minutes(
        days.saturating_mul(1440)
            .saturating_add(hours.saturating_mul(60))
            .saturating_add(minutes),
    )
}
