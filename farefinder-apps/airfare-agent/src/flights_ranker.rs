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

//! # Flights Ranker
//!
//! Filters, sorts and annotates normalized offers. Pure; an empty input
//! yields an empty output and there is no failure path.

use crate::StopPreference;
use crate::flights_results_parser::NormalizedOffer;

/// Below this an offer earns "Short travel time".
const SHORT_TRIP_MINUTES: i32 = 6 * 60;
/// Above this an offer earns "Long travel time".
const LONG_TRIP_MINUTES: i32 = 12 * 60;
/// Offers costing more than this multiple of the cheapest earn the
/// "Expensive compared to cheapest" con. Strictly above: exactly 1.5x is
/// not flagged.
const OVERPRICED_RATIO: f64 = 1.5;

pub const DEFAULT_MAX_RESULTS: usize = 3;
const MAX_RESULTS_CAP: usize = 10;

#[derive(Debug, Clone)]
pub struct RankOptions {
    pub stop_preference: StopPreference,
    /// How many offers to keep, clamped to 1..=10.
    pub max_results: usize,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            stop_preference: StopPreference::Any,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AnnotatedOffer {
    pub offer: NormalizedOffer,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

/// Filter by stop preference, sort by price ascending (stable, ties keep
/// provider order), truncate to the configured count, then derive the
/// pros/cons labels against the filtered set's cheapest finite price.
pub fn rank_offers(offers: Vec<NormalizedOffer>, options: &RankOptions) -> Vec<AnnotatedOffer> {
    let mut filtered: Vec<NormalizedOffer> = match options.stop_preference {
        StopPreference::Any => offers,
        StopPreference::NonstopOnly => offers.into_iter().filter(|o| o.stops == 0).collect(),
    };

    // total_cmp puts the unparsable-price sentinel (infinity) last.
    filtered.sort_by(|a, b| a.price.total_cmp(&b.price));

    let min_price = filtered
        .iter()
        .map(|o| o.price)
        .find(|p| p.is_finite());

    filtered.truncate(options.max_results.clamp(1, MAX_RESULTS_CAP));
    filtered
        .into_iter()
        .map(|offer| annotate(offer, min_price))
        .collect()
}

fn annotate(offer: NormalizedOffer, min_price: Option<f64>) -> AnnotatedOffer {
    let mut pros = Vec::new();
    let mut cons = Vec::new();

    if offer.stops == 0 {
        pros.push("No layovers".to_string());
    } else {
        cons.push("Has layovers".to_string());
    }

    // Zero means the duration could not be parsed; no travel-time label then.
    if offer.duration_minutes > 0 {
        if offer.duration_minutes < SHORT_TRIP_MINUTES {
            pros.push("Short travel time".to_string());
        } else if offer.duration_minutes > LONG_TRIP_MINUTES {
            cons.push("Long travel time".to_string());
        }
    }

    if let Some(min) = min_price {
        if offer.price == min {
            pros.push("Cheapest option".to_string());
        } else if offer.price > min * OVERPRICED_RATIO {
            cons.push("Expensive compared to cheapest".to_string());
        }
    }

    AnnotatedOffer { offer, pros, cons }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(airline: &str, price: f64, duration_minutes: i32, stops: i32) -> NormalizedOffer {
        NormalizedOffer {
            airline: airline.to_string(),
            price,
            currency: Some("USD".to_string()),
            duration_minutes,
            stops,
            departure_time: None,
            arrival_time: None,
            offer_url: None,
        }
    }

    #[test]
    fn test_sorted_ascending_with_annotations() {
        let offers = vec![
            offer("Delta", 250.0, 465, 1),
            offer("Air Canada", 199.0, 330, 0),
        ];
        let ranked = rank_offers(offers, &RankOptions::default());
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].offer.airline, "Air Canada");
        assert_eq!(
            ranked[0].pros,
            vec!["No layovers", "Short travel time", "Cheapest option"]
        );
        assert!(ranked[0].cons.is_empty());
        assert_eq!(ranked[1].offer.airline, "Delta");
        assert_eq!(ranked[1].cons, vec!["Has layovers"]);
    }

    #[test]
    fn test_empty_input_empty_output() {
        let ranked = rank_offers(Vec::new(), &RankOptions::default());
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_nonstop_filter() {
        let offers = vec![
            offer("Delta", 100.0, 400, 1),
            offer("United", 300.0, 400, 0),
            offer("JetBlue", 200.0, 400, 2),
        ];
        let ranked = rank_offers(
            offers,
            &RankOptions {
                stop_preference: StopPreference::NonstopOnly,
                max_results: 10,
            },
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].offer.airline, "United");
        assert!(ranked.iter().all(|a| a.offer.stops == 0));
    }

    #[test]
    fn test_sentinel_price_sorts_last() {
        let offers = vec![
            offer("Mystery Air", f64::INFINITY, 400, 0),
            offer("Delta", 500.0, 400, 0),
            offer("United", 120.0, 400, 0),
        ];
        let ranked = rank_offers(
            offers,
            &RankOptions {
                stop_preference: StopPreference::Any,
                max_results: 10,
            },
        );
        assert_eq!(ranked[0].offer.airline, "United");
        assert_eq!(ranked[2].offer.airline, "Mystery Air");
        // Cheapest label comes from the finite minimum, not the sentinel.
        assert!(ranked[0].pros.iter().any(|p| p == "Cheapest option"));
    }

    #[test]
    fn test_overpriced_threshold_is_strict() {
        let offers = vec![
            offer("A", 100.0, 400, 0),
            offer("B", 150.0, 400, 0),
            offer("C", 151.0, 400, 0),
        ];
        let ranked = rank_offers(
            offers,
            &RankOptions {
                stop_preference: StopPreference::Any,
                max_results: 10,
            },
        );
        let expensive = "Expensive compared to cheapest";
        assert!(!ranked[1].cons.iter().any(|c| c == expensive));
        assert!(ranked[2].cons.iter().any(|c| c == expensive));
    }

    #[test]
    fn test_stable_order_on_price_ties() {
        let offers = vec![
            offer("First", 200.0, 400, 0),
            offer("Second", 200.0, 400, 0),
            offer("Third", 100.0, 400, 0),
        ];
        let ranked = rank_offers(
            offers,
            &RankOptions {
                stop_preference: StopPreference::Any,
                max_results: 10,
            },
        );
        assert_eq!(ranked[1].offer.airline, "First");
        assert_eq!(ranked[2].offer.airline, "Second");
    }

    #[test]
    fn test_long_duration_con() {
        let offers = vec![offer("A", 100.0, 13 * 60, 0)];
        let ranked = rank_offers(offers, &RankOptions::default());
        assert!(ranked[0].cons.iter().any(|c| c == "Long travel time"));
        assert!(!ranked[0].pros.iter().any(|p| p == "Short travel time"));
    }

    #[test]
    fn test_mid_duration_gets_neither_label() {
        let offers = vec![offer("A", 100.0, 8 * 60, 0)];
        let ranked = rank_offers(offers, &RankOptions::default());
        assert!(!ranked[0].pros.iter().any(|p| p == "Short travel time"));
        assert!(!ranked[0].cons.iter().any(|c| c == "Long travel time"));
    }

    #[test]
    fn test_unknown_duration_gets_no_travel_time_label() {
        let offers = vec![offer("A", 100.0, 0, 0)];
        let ranked = rank_offers(offers, &RankOptions::default());
        assert!(!ranked[0].pros.iter().any(|p| p == "Short travel time"));
        assert!(!ranked[0].cons.iter().any(|c| c == "Long travel time"));
    }

    #[test]
    fn test_max_results_clamped() {
        let offers = (0..20)
            .map(|i| offer(&format!("A{i}"), 100.0 + i as f64, 400, 0))
            .collect();
        let ranked = rank_offers(
            offers,
            &RankOptions {
                stop_preference: StopPreference::Any,
                max_results: 50,
            },
        );
        assert_eq!(ranked.len(), 10);
    }
}
