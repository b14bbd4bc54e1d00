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

//! Normalizer integration tests against snapshots of the provider JSON
//! shapes we have seen in the wild. Catches regressions when field lookup
//! paths drift out of date.

use chrono::NaiveDate;
use farefinder_airfare_agent::flights_results_parser::PRICE_UNPARSABLE;
use farefinder_airfare_agent::{FlightSearchParams, FlightSearchResult, normalize_offers};

/// Scraping-era shape: offers under results[0].content.results.flights.results
/// with display-string prices and "Nonstop"/"1 stop" type labels.
const SCRAPE_SHAPE: &str = r#"{
  "results": [{
    "content": {
      "results": {
        "flights": {
          "results": [
            {
              "airline": "Air Canada",
              "price": "$199",
              "type": "Nonstop",
              "duration": "5h 30m",
              "url": "https://flights.example/offer/ac-1"
            },
            {
              "airline": "Delta",
              "price": "$250",
              "type": "1 stop",
              "duration": "7h 45m"
            },
            {
              "airline": "Fiji Airways",
              "price": "$1,234",
              "type": "2 stops",
              "duration": "1d 3h 10m"
            },
            {
              "airline": "Mystery Air",
              "price": "N/A",
              "type": "Nonstop",
              "duration": "6h"
            },
            {
              "price": "$99"
            }
          ]
        }
      }
    }
  }]
}"#;

/// Partner-API shape: itineraries.results with structured price and legs.
const PARTNER_SHAPE: &str = r#"{
  "itineraries": {
    "results": [
      {
        "price": { "amount": 412.50, "currency": "CAD" },
        "legs": [{
          "durationInMinutes": 505,
          "stopCount": 1,
          "carriers": { "marketing": [{ "name": "WestJet" }] }
        }],
        "departure": "2030-07-15T08:05:00",
        "arrival": "2030-07-15T16:30:00",
        "deeplink": "https://partner.example/offer/ws-9"
      },
      {
        "price": { "amount": 287, "currency": "CAD" },
        "legs": [{
          "durationInMinutes": 175,
          "stopCount": 0,
          "carriers": { "marketing": [{ "name": "Porter Airlines" }] }
        }]
      }
    ]
  }
}"#;

fn params() -> FlightSearchParams {
    FlightSearchParams::builder(
        "SFO".to_string(),
        "JFK".to_string(),
        NaiveDate::from_ymd_opt(2030, 7, 15).unwrap(),
    )
    .build()
    .unwrap()
}

#[test]
fn test_scrape_shape_normalization() {
    let result = FlightSearchResult::from_json(SCRAPE_SHAPE, params()).unwrap();

    // Airline-less entry is skipped, everything else survives.
    assert_eq!(result.offers.len(), 4);
    assert_eq!(result.skipped_offers, 1);

    let ac = &result.offers[0];
    assert_eq!(ac.airline, "Air Canada");
    assert_eq!(ac.price, 199.0);
    assert_eq!(ac.duration_minutes, 330);
    assert_eq!(ac.stops, 0);
    assert_eq!(ac.offer_url.as_deref(), Some("https://flights.example/offer/ac-1"));

    let fiji = &result.offers[2];
    assert_eq!(fiji.price, 1234.0);
    assert_eq!(fiji.duration_minutes, 1630); // 1d 3h 10m
    assert_eq!(fiji.stops, 2);

    // Present-but-unparsable price keeps the offer with the sentinel.
    let mystery = &result.offers[3];
    assert_eq!(mystery.price, PRICE_UNPARSABLE);
}

#[test]
fn test_partner_shape_normalization() {
    let result = FlightSearchResult::from_json(PARTNER_SHAPE, params()).unwrap();
    assert_eq!(result.offers.len(), 2);
    assert_eq!(result.skipped_offers, 0);

    let ws = &result.offers[0];
    assert_eq!(ws.airline, "WestJet");
    assert_eq!(ws.price, 412.5);
    assert_eq!(ws.currency.as_deref(), Some("CAD"));
    assert_eq!(ws.stops, 1);
    assert_eq!(ws.departure_time.as_deref(), Some("2030-07-15T08:05:00"));
    assert_eq!(ws.arrival_time.as_deref(), Some("2030-07-15T16:30:00"));

    let porter = &result.offers[1];
    assert_eq!(porter.airline, "Porter Airlines");
    assert_eq!(porter.stops, 0);
    assert!(porter.departure_time.is_none());
}

#[test]
fn test_empty_offer_list_is_not_an_error() {
    let result =
        FlightSearchResult::from_json(r#"{"itineraries": {"results": []}}"#, params()).unwrap();
    assert!(result.is_empty());
    assert_eq!(result.skipped_offers, 0);
}

#[test]
fn test_unrecognized_shape_yields_empty_batch() {
    let value: serde_json::Value =
        serde_json::from_str(r#"{"message": "quota exceeded"}"#).unwrap();
    let batch = normalize_offers(&value);
    assert!(batch.offers.is_empty());
    assert_eq!(batch.skipped, 0);
}

#[test]
fn test_non_json_body_is_malformed_response() {
    let err = FlightSearchResult::from_json("<html>502</html>", params());
    assert!(matches!(
        err,
        Err(farefinder_airfare_agent::SearchError::MalformedResponse(_))
    ));
}

#[test]
fn test_normalizing_same_body_twice_is_identical() {
    let a = FlightSearchResult::from_json(SCRAPE_SHAPE, params()).unwrap();
    let b = FlightSearchResult::from_json(SCRAPE_SHAPE, params()).unwrap();
    assert_eq!(a.offers, b.offers);
}
