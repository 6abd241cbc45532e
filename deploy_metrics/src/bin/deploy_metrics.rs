use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use diesel::SqliteConnection;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use deploy_metrics::report::{AnalysisRequest, DashboardReport, DateRange};
use deploy_metrics::{db, export, report, store};
use ride_events::models::{DeploymentEvent, RideEvent};
use ride_events::{csv_source, zone_source};

#[derive(Parser)]
#[command(version, about = "Deployment → first ride reporting CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Merge deployment and ride CSV exports into the local store.
    Ingest(IngestCmd),
    /// Run an analysis pass and print or export the report tables.
    Report(ReportCmd),
}

#[derive(Args)]
struct IngestCmd {
    /// Deployments CSV export.
    #[arg(long, value_name = "FILE")]
    deployments: PathBuf,
    /// Rides CSV export.
    #[arg(long, value_name = "FILE")]
    rides: PathBuf,
    /// Store database file (falls back to DEPLOY_METRICS_DB).
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,
}

#[derive(Args)]
struct ReportCmd {
    /// Deployment zones GeoJSON.
    #[arg(long, value_name = "FILE")]
    zones: PathBuf,
    /// Deployments CSV export (required without --db).
    #[arg(long, value_name = "FILE")]
    deployments: Option<PathBuf>,
    /// Rides CSV export (required without --db).
    #[arg(long, value_name = "FILE")]
    rides: Option<PathBuf>,
    /// Store database file (falls back to DEPLOY_METRICS_DB). Fresh CSVs are
    /// merged in first; the analysis then runs over full store contents.
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,
    /// Inclusive filter start date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    start: Option<NaiveDate>,
    /// Inclusive filter end date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    end: Option<NaiveDate>,
    /// Directory to write the export CSVs into.
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Ingest(cmd) => run_ingest(cmd),
        Cmd::Report(cmd) => run_report(cmd),
    }
}

fn resolve_db(db: Option<PathBuf>) -> Option<PathBuf> {
    db.or_else(|| std::env::var_os("DEPLOY_METRICS_DB").map(PathBuf::from))
}

fn read_deployment_csv(path: &PathBuf) -> Result<Vec<DeploymentEvent>> {
    let (events, report) = csv_source::read_deployments_path(path)
        .with_context(|| format!("failed to read deployments CSV {}", path.display()))?;
    println!(
        "{}: {} rows kept, {} skipped",
        path.display(),
        report.rows_kept,
        report.rows_skipped
    );
    Ok(events)
}

fn read_ride_csv(path: &PathBuf) -> Result<Vec<RideEvent>> {
    let (events, report) = csv_source::read_rides_path(path)
        .with_context(|| format!("failed to read rides CSV {}", path.display()))?;
    println!(
        "{}: {} rows kept, {} skipped",
        path.display(),
        report.rows_kept,
        report.rows_skipped
    );
    Ok(events)
}

fn run_ingest(cmd: IngestCmd) -> Result<()> {
    let Some(db_path) = resolve_db(cmd.db) else {
        bail!("no store path: pass --db or set DEPLOY_METRICS_DB");
    };
    let deployments = read_deployment_csv(&cmd.deployments)?;
    let rides = read_ride_csv(&cmd.rides)?;

    let mut conn = db::open_store(&db_path)?;
    let d = store::upsert_deployments(&mut conn, &deployments)?;
    let r = store::upsert_rides(&mut conn, &rides)?;
    println!(
        "deployments: {} inserted, {} already present",
        d.inserted, d.ignored
    );
    println!("rides: {} inserted, {} already present", r.inserted, r.ignored);
    Ok(())
}

fn load_events(
    cmd: &ReportCmd,
) -> Result<(Vec<DeploymentEvent>, Vec<RideEvent>)> {
    match resolve_db(cmd.db.clone()) {
        Some(db_path) => {
            let mut conn: SqliteConnection = db::open_store(&db_path)?;
            if let Some(path) = &cmd.deployments {
                let fresh = read_deployment_csv(path)?;
                store::upsert_deployments(&mut conn, &fresh)?;
            }
            if let Some(path) = &cmd.rides {
                let fresh = read_ride_csv(path)?;
                store::upsert_rides(&mut conn, &fresh)?;
            }
            Ok((store::load_deployments(&mut conn)?, store::load_rides(&mut conn)?))
        }
        None => {
            let dep_path = cmd
                .deployments
                .as_ref()
                .context("--deployments is required without --db")?;
            let ride_path = cmd
                .rides
                .as_ref()
                .context("--rides is required without --db")?;
            Ok((read_deployment_csv(dep_path)?, read_ride_csv(ride_path)?))
        }
    }
}

fn run_report(cmd: ReportCmd) -> Result<()> {
    let zones_text = std::fs::read_to_string(&cmd.zones)
        .with_context(|| format!("failed to read zones GeoJSON {}", cmd.zones.display()))?;
    let zones = zone_source::read_zones(&zones_text)?;

    let date_range = match (cmd.start, cmd.end) {
        (Some(start), Some(end)) => Some(DateRange::new(start, end)?),
        (None, None) => None,
        _ => bail!("--start and --end must be given together"),
    };

    let (deployments, rides) = load_events(&cmd)?;
    let dashboard = report::run_analysis(
        &deployments,
        &rides,
        &zones,
        &AnalysisRequest { date_range },
    );
    print_report(&dashboard);

    if let Some(dir) = cmd.out_dir {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
        std::fs::write(
            dir.join("time_to_first_ride.csv"),
            export::deployments_csv(&dashboard)?,
        )?;
        std::fs::write(
            dir.join("deployment_spot_stats.csv"),
            export::zone_stats_csv(&dashboard)?,
        )?;
        println!("wrote export tables to {}", dir.display());
    }
    Ok(())
}

fn print_report(dashboard: &DashboardReport) {
    println!("Total deployments:          {}", dashboard.kpis.total_deployments);
    println!("Deployments with no ride:   {}", dashboard.kpis.no_ride_count);
    match dashboard.kpis.mean_hours {
        Some(hours) => println!("Avg time to first ride (h): {hours:.2}"),
        None => println!("Avg time to first ride (h): n/a"),
    }

    if !dashboard.zone_stats.is_empty() {
        println!();
        println!("{:<30} {:>10} {:>12}", "Deployment Spot", "Avg (h)", "Deployments");
        for row in &dashboard.zone_stats {
            let mean = row
                .mean_hours
                .map(|h| format!("{h:.2}"))
                .unwrap_or_else(|| "n/a".to_string());
            println!("{:<30} {:>10} {:>12}", row.zone, mean, row.deployments);
        }
    }
}
