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

//! End-to-end normalize-then-rank checks over raw provider JSON, including
//! the ordering and labeling properties the pipeline guarantees.

use farefinder_airfare_agent::{RankOptions, StopPreference, normalize_offers, rank_offers};
use serde_json::json;

fn options(nonstop: bool, top: usize) -> RankOptions {
    RankOptions {
        stop_preference: if nonstop {
            StopPreference::NonstopOnly
        } else {
            StopPreference::Any
        },
        max_results: top,
    }
}

#[test]
fn test_two_offer_scenario_orders_and_labels() {
    let raw = json!([
        { "airline": "Air Canada", "price": "$199", "type": "nonstop", "duration": "5h 30m" },
        { "airline": "Delta", "price": "$250", "type": "1-stop", "duration": "7h 45m" },
    ]);
    let batch = normalize_offers(&raw);
    let ranked = rank_offers(batch.offers, &options(false, 3));

    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].offer.airline, "Air Canada");
    assert_eq!(ranked[0].offer.price, 199.0);
    assert_eq!(
        ranked[0].pros,
        vec!["No layovers", "Short travel time", "Cheapest option"]
    );
    assert_eq!(ranked[1].offer.airline, "Delta");
    assert_eq!(ranked[1].cons, vec!["Has layovers"]);
    assert!(ranked[1].pros.is_empty());
}

#[test]
fn test_prices_non_decreasing_and_nonstop_only() {
    let raw = json!([
        { "airline": "A", "price": "$410", "type": "Nonstop", "duration": "6h 30m" },
        { "airline": "B", "price": "$120", "type": "2 stops", "duration": "14h" },
        { "airline": "C", "price": "$380", "type": "Nonstop", "duration": "6h 20m" },
        { "airline": "D", "price": "N/A", "type": "Nonstop", "duration": "6h" },
        { "airline": "E", "price": "$395", "type": "1 stop", "duration": "9h" },
    ]);
    let batch = normalize_offers(&raw);
    let ranked = rank_offers(batch.offers, &options(true, 10));

    assert!(ranked.iter().all(|a| a.offer.stops == 0));
    assert!(
        ranked
            .windows(2)
            .all(|w| w[0].offer.price <= w[1].offer.price)
    );
    // Sentinel-priced offer is retained but last.
    assert_eq!(ranked.last().unwrap().offer.airline, "D");
    assert!(!ranked.last().unwrap().offer.has_parsable_price());
}

#[test]
fn test_empty_provider_list_renders_empty() {
    let raw = json!({ "flights": { "results": [] } });
    let batch = normalize_offers(&raw);
    let ranked = rank_offers(batch.offers, &options(false, 3));
    assert!(ranked.is_empty());
}

#[test]
fn test_expensive_label_boundary() {
    let raw = json!([
        { "airline": "Cheap", "price": "$100", "type": "Nonstop", "duration": "7h" },
        { "airline": "Edge", "price": "$150", "type": "Nonstop", "duration": "7h" },
        { "airline": "Over", "price": "$151", "type": "Nonstop", "duration": "7h" },
    ]);
    let batch = normalize_offers(&raw);
    let ranked = rank_offers(batch.offers, &options(false, 10));

    let expensive = "Expensive compared to cheapest";
    assert!(ranked[0].pros.iter().any(|p| p == "Cheapest option"));
    assert!(!ranked[1].cons.iter().any(|c| c == expensive));
    assert!(ranked[2].cons.iter().any(|c| c == expensive));
}

#[test]
fn test_top_n_truncation_keeps_cheapest() {
    let raw = json!(
        (0..8)
            .map(|i| json!({
                "airline": format!("A{i}"),
                "price": format!("${}", 900 - i * 100),
                "type": "Nonstop",
                "duration": "5h",
            }))
            .collect::<Vec<_>>()
    );
    let batch = normalize_offers(&raw);
    let ranked = rank_offers(batch.offers, &options(false, 3));

    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].offer.price, 200.0);
    assert_eq!(ranked[2].offer.price, 400.0);
}
