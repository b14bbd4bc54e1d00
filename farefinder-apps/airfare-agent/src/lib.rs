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

// Library for farefinder-airfare-agent
// Search pipeline: query builder -> provider client -> normalizer -> ranker

pub mod booking_links;
pub mod config;
pub mod error;
pub mod flights_query_builder;
pub mod flights_ranker;
pub mod flights_results_parser;
mod flights_search;

pub use booking_links::BookingLinkTable;
pub use config::ProviderConfig;
pub use error::SearchError;
pub use flights_query_builder::{
    FlightSearchParams, FlightSearchParamsBuilder, Seat, StopPreference, Trip,
};
pub use flights_ranker::{AnnotatedOffer, RankOptions, rank_offers};
pub use flights_results_parser::{FlightSearchResult, NormalizedOffer, normalize_offers};
pub use flights_search::SkyFaresClient;
