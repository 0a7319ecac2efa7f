#![deny(missing_docs)]
//! Hangar command-line interface.
//!
//! Lists, counts, creates, updates, and deletes ships through the REST API.

mod client;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use client::ShipClient;
use hangar_core::{ShipInput, ShipOrder, ShipQuery, ShipType};
use serde::Serialize;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

const ORDERS: [ShipOrder; 6] = [
    ShipOrder::Id,
    ShipOrder::Name,
    ShipOrder::Date,
    ShipOrder::Speed,
    ShipOrder::CrewSize,
    ShipOrder::Rating,
];

#[derive(Parser)]
#[command(name = "hangar", version, about = "Hangar ship registry CLI")]
struct Cli {
    /// Base URL of the Hangar server.
    #[arg(long, global = true, env = "HANGAR_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug, Default)]
struct FilterArgs {
    /// Name substring.
    #[arg(long)]
    name: Option<String>,
    /// Planet substring.
    #[arg(long)]
    planet: Option<String>,
    /// Ship type (transport, military, merchant).
    #[arg(long = "type", value_parser = parse_ship_type)]
    ship_type: Option<ShipType>,
    /// Produced on or after this date (YYYY-MM-DD or epoch millis).
    #[arg(long, value_parser = parse_date)]
    after: Option<DateTime<Utc>>,
    /// Produced on or before this date (YYYY-MM-DD or epoch millis).
    #[arg(long, value_parser = parse_date)]
    before: Option<DateTime<Utc>>,
    /// Only used (true) or only new (false) ships.
    #[arg(long)]
    used: Option<bool>,
    /// Minimum speed, inclusive.
    #[arg(long)]
    min_speed: Option<f64>,
    /// Maximum speed, inclusive.
    #[arg(long)]
    max_speed: Option<f64>,
    /// Minimum crew size, inclusive.
    #[arg(long)]
    min_crew_size: Option<i32>,
    /// Maximum crew size, inclusive.
    #[arg(long)]
    max_crew_size: Option<i32>,
    /// Minimum rating, inclusive.
    #[arg(long)]
    min_rating: Option<f64>,
    /// Maximum rating, inclusive.
    #[arg(long)]
    max_rating: Option<f64>,
}

#[derive(Args, Clone, Debug, Default)]
struct PageArgs {
    /// Sort key (id, name, date, speed, crew-size, rating).
    #[arg(long, value_parser = parse_order)]
    order: Option<ShipOrder>,
    /// Zero-based page number.
    #[arg(long)]
    page_number: Option<u32>,
    /// Ships per page.
    #[arg(long)]
    page_size: Option<u32>,
}

#[derive(Args, Clone, Debug, Default)]
struct ShipFields {
    /// Ship name (1-50 characters).
    #[arg(long)]
    name: Option<String>,
    /// Home planet (1-50 characters).
    #[arg(long)]
    planet: Option<String>,
    /// Ship type (transport, military, merchant).
    #[arg(long = "type", value_parser = parse_ship_type)]
    ship_type: Option<ShipType>,
    /// Production date (YYYY-MM-DD or epoch millis).
    #[arg(long, value_parser = parse_date)]
    prod_date: Option<DateTime<Utc>>,
    /// Whether the ship is second-hand.
    #[arg(long)]
    used: Option<bool>,
    /// Top speed, 0.01 to 0.99.
    #[arg(long)]
    speed: Option<f64>,
    /// Crew size, 1 to 9999.
    #[arg(long)]
    crew_size: Option<i32>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List one page of ships matching the filters.
    List {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Count ships matching the filters.
    Count {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show a single ship.
    Get { id: i64 },
    /// Register a new ship.
    Create {
        #[command(flatten)]
        fields: ShipFields,
    },
    /// Change the given fields of a ship.
    Update {
        id: i64,
        #[command(flatten)]
        fields: ShipFields,
    },
    /// Remove a ship.
    Delete { id: i64 },
}

/// Parse a ship type label, ignoring case.
fn parse_ship_type(value: &str) -> Result<ShipType, String> {
    value
        .trim()
        .to_ascii_uppercase()
        .parse::<ShipType>()
        .map_err(|err| err.to_string())
}

/// Parse a sort key such as `crew-size` or `CREW_SIZE`.
fn parse_order(value: &str) -> Result<ShipOrder, String> {
    let label = value.trim().to_ascii_uppercase().replace('-', "_");
    ORDERS
        .into_iter()
        .find(|order| order.as_str() == label)
        .ok_or_else(|| format!("unknown order {value}"))
}

/// Parse a date given as epoch milliseconds or `YYYY-MM-DD` (midnight UTC).
fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(millis) = value.parse::<i64>() {
        return Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| format!("timestamp out of range: {value}"));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|moment| moment.and_utc())
        .ok_or_else(|| format!("expected YYYY-MM-DD or epoch millis, got {value}"))
}

impl FilterArgs {
    fn into_query(self, page: PageArgs) -> ShipQuery {
        ShipQuery {
            name: self.name,
            planet: self.planet,
            ship_type: self.ship_type,
            after: self.after.map(|date| date.timestamp_millis()),
            before: self.before.map(|date| date.timestamp_millis()),
            is_used: self.used,
            min_speed: self.min_speed,
            max_speed: self.max_speed,
            min_crew_size: self.min_crew_size,
            max_crew_size: self.max_crew_size,
            min_rating: self.min_rating,
            max_rating: self.max_rating,
            order: page.order,
            page_number: page.page_number,
            page_size: page.page_size,
        }
    }
}

impl From<ShipFields> for ShipInput {
    fn from(fields: ShipFields) -> Self {
        ShipInput {
            name: fields.name,
            planet: fields.planet,
            ship_type: fields.ship_type,
            prod_date: fields.prod_date,
            used: fields.used,
            speed: fields.speed,
            crew_size: fields.crew_size,
        }
    }
}

fn render_json<T: Serialize>(value: &T) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Run one command against the server and return the text to print.
async fn execute(client: &ShipClient, command: Commands) -> CliResult<String> {
    match command {
        Commands::List { filters, page } => {
            let ships = client.list(&filters.into_query(page)).await?;
            render_json(&ships)
        }
        Commands::Count { filters } => {
            let count = client.count(&filters.into_query(PageArgs::default())).await?;
            Ok(count.to_string())
        }
        Commands::Get { id } => render_json(&client.get(id).await?),
        Commands::Create { fields } => render_json(&client.create(&fields.into()).await?),
        Commands::Update { id, fields } => {
            render_json(&client.update(id, &fields.into()).await?)
        }
        Commands::Delete { id } => {
            client.delete(id).await?;
            Ok(format!("deleted ship {id}"))
        }
    }
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let client = ShipClient::new(&cli.server)?;
    let output = execute(&client, cli.command).await?;
    println!("{output}");
    Ok(())
}
