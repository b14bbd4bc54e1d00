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

//! CLI for partner-API flight search with ranked, annotated offers.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use farefinder_airfare_agent::{
    AnnotatedOffer, BookingLinkTable, FlightSearchParams, FlightSearchResult, ProviderConfig,
    RankOptions, Seat, SkyFaresClient, StopPreference, Trip, rank_offers,
};

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "farefinder-flights")]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Origin airport code (e.g., SFO, YVR)
    #[arg(short, long)]
    from: String,

    /// Destination airport code (e.g., JFK, LHR)
    #[arg(short, long)]
    to: String,

    /// Departure date (YYYY-MM-DD or YYYY/MM/DD)
    #[arg(short, long)]
    date: String,

    /// Return date for round trips (YYYY-MM-DD or YYYY/MM/DD)
    #[arg(short = 'R', long)]
    return_date: Option<String>,

    /// Cabin class: economy, premium_economy, business, first
    #[arg(short, long, default_value = "economy")]
    cabin: String,

    /// Number of adult passengers
    #[arg(short, long, default_value = "1")]
    adults: u32,

    /// Number of child passengers
    #[arg(long, default_value = "0")]
    children: u32,

    /// Only show nonstop offers
    #[arg(long, default_value = "false")]
    nonstop: bool,

    /// Currency code; defaults to the saved profile preference, else USD
    #[arg(long)]
    currency: Option<String>,

    /// Market region; defaults to the saved profile preference, else US
    #[arg(long)]
    market: Option<String>,

    /// How many offers to show (1-10)
    #[arg(short = 'n', long, default_value = "3")]
    top: usize,

    /// Profile database path for preferences and saved searches
    #[arg(long)]
    profile_db: Option<std::path::PathBuf>,

    /// Email of the profile to personalize and save under
    #[arg(long)]
    user_email: Option<String>,

    /// Print the ranked offers as JSON instead of a table
    #[arg(long, default_value = "false")]
    json: bool,

    /// Verbose output
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// Save raw JSON response to file for debugging
    #[arg(long)]
    save_json: bool,
}

/// Configure logging based on verbosity level
fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

/// Parse cabin class string to Seat enum
fn parse_cabin(s: &str) -> Result<Seat> {
    match s.to_lowercase().as_str() {
        "economy" | "e" => Ok(Seat::Economy),
        "premium_economy" | "premium" | "pe" => Ok(Seat::PremiumEconomy),
        "business" | "b" => Ok(Seat::Business),
        "first" | "f" => Ok(Seat::First),
        _ => anyhow::bail!(
            "Invalid cabin class: {}. Use: economy, premium_economy, business, first",
            s
        ),
    }
}

/// Parse date string to NaiveDate
fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .context(format!(
            "Invalid date format: {}. Use YYYY-MM-DD or YYYY/MM/DD",
            s
        ))
}

/// Format duration in hours/minutes.
fn fmt_duration(minutes: i32) -> String {
    let hrs = minutes / 60;
    let mins = minutes % 60;
    if minutes == 0 {
        "??".to_string()
    } else if mins == 0 {
        format!("{}h", hrs)
    } else if hrs == 0 {
        format!("{}m", mins)
    } else {
        format!("{}h {:02}m", hrs, mins)
    }
}

fn fmt_price(offer: &farefinder_airfare_agent::NormalizedOffer) -> String {
    if !offer.has_parsable_price() {
        return "n/a".to_string();
    }
    let code = offer.currency.as_deref().unwrap_or("");
    if offer.price.fract() == 0.0 {
        format!("{}{}", code, offer.price as i64)
    } else {
        format!("{}{:.2}", code, offer.price)
    }
}

fn fmt_stops(stops: i32) -> String {
    match stops {
        0 => "nonstop".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{} stops", n),
    }
}

/// Get terminal width for the separator bars
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(100)
}

fn dash_bar() -> String {
    "-".repeat(get_terminal_width().min(100))
}

/// Render the ranked offers to stdout
fn render_results(
    params: &FlightSearchParams,
    ranked: &[AnnotatedOffer],
    skipped: usize,
    links: &BookingLinkTable,
) {
    println!(
        "\n  ✈️  {} → {} on {}  ({}, {})",
        params.from_airport,
        params.to_airport,
        params.depart_date,
        params.trip_type.as_str(),
        params.cabin_class.as_str()
    );
    println!("{}", dash_bar());

    if ranked.is_empty() {
        println!("  No flights found. Try a different search.");
        return;
    }
    if skipped > 0 {
        println!("  (skipped {} incomplete offers from the provider)", skipped);
    }

    for (i, annotated) in ranked.iter().enumerate() {
        let offer = &annotated.offer;
        println!(
            "\n  #{}  {:<24} {:>10}   {}  ({})",
            i + 1,
            offer.airline,
            fmt_price(offer),
            fmt_duration(offer.duration_minutes),
            fmt_stops(offer.stops),
        );
        if let (Some(dep), Some(arr)) = (&offer.departure_time, &offer.arrival_time) {
            println!("      {} → {}", dep, arr);
        }
        for pro in &annotated.pros {
            println!("      ✅ {}", pro);
        }
        for con in &annotated.cons {
            println!("      ❌ {}", con);
        }
        let url = links.resolve(&offer.airline, offer.offer_url.as_deref(), params);
        println!("      🔗 Book: {}", url);
    }
    println!("\n{}", dash_bar());
}

/// Load saved preferences when a profile was named; absent profile pieces
/// fall back to flag values or the usual defaults.
#[cfg(feature = "persist")]
async fn load_preferences(
    args: &CliArgs,
) -> Result<(Option<farefinder_profile_store::ProfileStore>, Option<i64>, String, String, bool)>
{
    let mut currency = args.currency.clone();
    let mut market = args.market.clone();
    let mut nonstop = args.nonstop;

    let (store, user_id) = match (&args.profile_db, &args.user_email) {
        (Some(db_path), Some(email)) => {
            let store = farefinder_profile_store::ProfileStore::open(db_path)
                .await
                .context("Failed to open profile store")?;
            match store.find_user(email).await? {
                Some(profile) => {
                    if currency.is_none() {
                        currency = profile.currency.clone();
                    }
                    if market.is_none() {
                        market = profile.market.clone();
                    }
                    if !nonstop {
                        nonstop = profile.flight_type.as_deref() == Some("nonstop");
                    }
                    (Some(store), Some(profile.user_id))
                }
                None => {
                    tracing::warn!("No profile for {}; searching without one", email);
                    (Some(store), None)
                }
            }
        }
        (Some(_), None) | (None, Some(_)) => {
            anyhow::bail!("--profile-db and --user-email must be given together")
        }
        (None, None) => (None, None),
    };

    Ok((
        store,
        user_id,
        currency.unwrap_or_else(|| "USD".to_string()),
        market.unwrap_or_else(|| "US".to_string()),
        nonstop,
    ))
}

/// Persist the search and its ranked results. Failures here are logged and
/// never block the already-rendered results.
#[cfg(feature = "persist")]
async fn save_to_profile(
    store: &farefinder_profile_store::ProfileStore,
    user_id: i64,
    params: &FlightSearchParams,
    search_url: &str,
    ranked: &[AnnotatedOffer],
    links: &BookingLinkTable,
) {
    use farefinder_profile_store::{SavedResult, SavedSearch};

    let search = SavedSearch {
        origin: params.from_airport.clone(),
        destination: params.to_airport.clone(),
        departure_date: params.depart_date,
        return_date: params.return_date,
        trip_type: params.trip_type.as_str().to_string(),
        search_url: Some(search_url.to_string()),
    };
    let results: Vec<SavedResult> = ranked
        .iter()
        .map(|a| SavedResult {
            airline: a.offer.airline.clone(),
            price: a.offer.has_parsable_price().then_some(a.offer.price),
            duration_minutes: a.offer.duration_minutes as i64,
            stops: a.offer.stops as i64,
            booking_url: Some(links.resolve(&a.offer.airline, a.offer.offer_url.as_deref(), params)),
            departure_time: a.offer.departure_time.clone(),
            arrival_time: a.offer.arrival_time.clone(),
        })
        .collect();

    match store.save_search(user_id, &search, &results).await {
        Ok(search_id) => tracing::info!("Saved search {} to profile", search_id),
        Err(e) => tracing::warn!("Could not save search to profile (results shown above): {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    setup_logging(args.verbose);

    tracing::info!("Starting farefinder-flights CLI");
    tracing::debug!("Args: {:?}", args);

    let cabin = parse_cabin(&args.cabin)?;
    let depart_date = parse_date(&args.date)?;
    let return_date = args.return_date.as_deref().map(parse_date).transpose()?;

    #[cfg(feature = "persist")]
    let (store, user_id, currency, market, nonstop) = load_preferences(&args).await?;
    #[cfg(not(feature = "persist"))]
    let (currency, market, nonstop) = (
        args.currency.clone().unwrap_or_else(|| "USD".to_string()),
        args.market.clone().unwrap_or_else(|| "US".to_string()),
        args.nonstop,
    );

    let stop_preference = if nonstop {
        StopPreference::NonstopOnly
    } else {
        StopPreference::Any
    };

    let mut builder = FlightSearchParams::builder(
        args.from.to_uppercase(),
        args.to.to_uppercase(),
        depart_date,
    )
    .cabin_class(cabin)
    .adults(args.adults)
    .children(args.children)
    .currency(currency)
    .market(market)
    .stop_preference(stop_preference);

    if let Some(rd) = return_date {
        builder = builder.return_date(rd);
    } else {
        builder = builder.trip_type(Trip::OneWay);
    }

    let params = builder.build().context("Failed to build search parameters")?;
    let config = ProviderConfig::from_env().context("Provider configuration")?;
    let search_url = params.search_url(&config.api_host);

    let client = SkyFaresClient::new(config)?;
    let result: FlightSearchResult = client
        .search_flights(&params)
        .await
        .context("Search failed")?;

    if args.save_json {
        let filename = format!("debug_{}_{}.json", args.from, args.to);
        std::fs::write(&filename, &result.raw_response).context("Failed to write JSON file")?;
        tracing::info!("Saved raw response to {}", filename);
    }

    let ranked = rank_offers(
        result.offers.clone(),
        &RankOptions {
            stop_preference: params.stop_preference,
            max_results: args.top,
        },
    );

    let links = BookingLinkTable::default();
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&ranked).context("Serialize results")?
        );
    } else {
        render_results(&params, &ranked, result.skipped_offers, &links);
    }

    #[cfg(feature = "persist")]
    if let (Some(store), Some(user_id)) = (store, user_id) {
        save_to_profile(&store, user_id, &params, &search_url, &ranked, &links).await;
    }
    #[cfg(not(feature = "persist"))]
    let _ = search_url;

    Ok(())
}
