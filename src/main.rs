use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveTime;
use clap::{ArgGroup, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod capacity;
mod config;
mod db;
mod forecast;
mod models;
mod promo;
mod report;

use config::ShopConfig;
use models::DAY_NAMES;

#[derive(Parser)]
#[command(name = "slot-insights")]
#[command(about = "Appointment slot utilization and busy-time insights for Chairtime", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import appointments from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Analyze slot utilization and suggest off-peak windows
    #[command(group(
        ArgGroup::new("scope")
            .args(["staff", "service"])
            .multiple(false)
    ))]
    Analyze {
        #[arg(long)]
        staff: Option<String>,
        #[arg(long)]
        service: Option<String>,
        #[arg(long, default_value_t = 90)]
        since_days: i64,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
    /// Project per-hour busyness from booking history
    #[command(group(
        ArgGroup::new("scope")
            .args(["staff", "service"])
            .multiple(false)
    ))]
    Forecast {
        #[arg(long)]
        staff: Option<String>,
        #[arg(long)]
        service: Option<String>,
        #[arg(long, default_value_t = 28)]
        since_days: i64,
        #[arg(long, default_value_t = 0.5)]
        alpha: f64,
        #[arg(long, default_value_t = 0.3)]
        beta: f64,
        #[arg(long, default_value_t = 0.2)]
        gamma: f64,
        #[arg(long, default_value_t = 24)]
        season_length: usize,
    },
    /// Generate a markdown report
    #[command(group(
        ArgGroup::new("scope")
            .args(["staff", "service"])
            .multiple(false)
    ))]
    Report {
        #[arg(long)]
        staff: Option<String>,
        #[arg(long)]
        service: Option<String>,
        #[arg(long, default_value_t = 90)]
        since_days: i64,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 5)]
        top: usize,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let (inserted, skipped) = db::import_csv(&pool, &csv).await?;
            println!(
                "Inserted {inserted} appointments from {} ({skipped} malformed rows skipped).",
                csv.display()
            );
        }
        Commands::Analyze {
            staff,
            service,
            since_days,
            config,
            top,
        } => {
            let shop = ShopConfig::load(config.as_deref())?;
            let since_date = forecast::cutoff_date(since_days);
            let appointments = db::fetch_appointments(
                &pool,
                since_date,
                staff.as_deref(),
                service.as_deref(),
            )
            .await?;

            if appointments.is_empty() {
                println!("No appointments found for this window.");
                return Ok(());
            }

            let grid = capacity::bin_appointments(&appointments, &shop);
            let summaries = capacity::day_summaries(&grid);
            let slots = promo::off_peak_slots(&grid, top);
            let totals = &grid.totals;

            println!("Utilization since {since_date}:");
            println!(
                "- {:.1}% of chair capacity booked ({} of {} minutes)",
                totals.utilization * 100.0,
                totals.booked_minutes,
                totals.capacity_minutes
            );
            println!(
                "- {} appointments: {} kept, {} no-show ({:.1}% rate), {} cancelled",
                totals.appointments,
                totals.kept,
                totals.noshow,
                totals.noshow_rate * 100.0,
                totals.cancelled
            );

            println!("Daily utilization:");
            for summary in summaries.iter().filter(|s| s.capacity_minutes > 0) {
                println!(
                    "- {}: {:.1}% booked, {} appointment-hours, {} no-shows",
                    DAY_NAMES[summary.day],
                    summary.utilization * 100.0,
                    summary.appts,
                    summary.noshow
                );
            }

            println!("Top off-peak windows:");
            for slot in slots.iter() {
                println!(
                    "- {} {:02}:00 ({:.1}% booked): {}",
                    DAY_NAMES[slot.day],
                    slot.hour,
                    slot.utilization * 100.0,
                    slot.promo
                );
            }
        }
        Commands::Forecast {
            staff,
            service,
            since_days,
            alpha,
            beta,
            gamma,
            season_length,
        } => {
            let since_date = forecast::cutoff_date(since_days);
            let appointments = db::fetch_appointments(
                &pool,
                since_date,
                staff.as_deref(),
                service.as_deref(),
            )
            .await?;

            let from = since_date.and_time(NaiveTime::MIN);
            let hours = since_days.max(1) as usize * 24;
            let series = forecast::hourly_series(&appointments, from, hours);
            let fitted = forecast::holt_winters(&series, alpha, beta, gamma, season_length);

            if fitted.is_empty() {
                println!(
                    "Not enough history: need at least {season_length} hours of bookings to fit a seasonal model."
                );
                return Ok(());
            }

            println!("Projected busy hours (trailing {season_length}h pattern):");
            let tail_start = fitted.len() - season_length.min(fitted.len());
            for (index, expected) in fitted[tail_start..].iter().enumerate() {
                let hour = (tail_start + index) % 24;
                println!("- {hour:02}:00 expected {:.1} visits", expected.max(0.0));
            }
        }
        Commands::Report {
            staff,
            service,
            since_days,
            config,
            top,
            out,
        } => {
            let shop = ShopConfig::load(config.as_deref())?;
            let since_date = forecast::cutoff_date(since_days);
            let appointments = db::fetch_appointments(
                &pool,
                since_date,
                staff.as_deref(),
                service.as_deref(),
            )
            .await?;

            let from = since_date.and_time(NaiveTime::MIN);
            let hours = since_days.max(1) as usize * 24;
            let series = forecast::hourly_series(&appointments, from, hours);
            let fitted = forecast::holt_winters(&series, 0.5, 0.3, 0.2, 24);
            let tail_start = fitted.len() - 24.min(fitted.len());
            let projected: Vec<(u32, f64)> = fitted[tail_start..]
                .iter()
                .enumerate()
                .map(|(index, expected)| (((tail_start + index) % 24) as u32, *expected))
                .collect();

            let scope = staff.as_deref().or(service.as_deref());
            let report = report::build_report(
                scope,
                since_date,
                &appointments,
                &shop,
                top,
                &projected,
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
