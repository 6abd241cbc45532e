//! Delimited-text export of the report tables.
//!
//! Column headers mirror the dashboard tables these exports replace. Hours
//! are rounded to two decimals here and nowhere earlier.

use chrono::{DateTime, TimeDelta, Utc};

use crate::report::DashboardReport;

fn format_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn format_elapsed(elapsed: TimeDelta) -> String {
    let secs = elapsed.num_seconds();
    let days = secs / 86_400;
    let rem = secs % 86_400;
    format!(
        "{} days {:02}:{:02}:{:02}",
        days,
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

/// Render the per-deployment first-ride table as CSV.
pub fn deployments_csv(report: &DashboardReport) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Uuid",
        "Deployment Date",
        "Deployment Time",
        "First Ride Time",
        "Deployment Spot",
        "Vehicle Model",
        "Time to First Ride",
        "Time to First Ride Hours",
    ])?;
    for row in &report.first_rides {
        writer.write_record([
            row.uuid.to_string(),
            row.deployed_on.to_string(),
            format_time(row.deployed_at),
            format_time(row.first_ride_at),
            row.zone.clone().unwrap_or_default(),
            row.vehicle_model.clone().unwrap_or_default(),
            format_elapsed(row.elapsed),
            format!("{:.2}", row.hours),
        ])?;
    }
    Ok(String::from_utf8(writer.into_inner()?)?)
}

/// Render the per-zone summary table as CSV.
pub fn zone_stats_csv(report: &DashboardReport) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Deployment Spot",
        "Avg Time to First Ride (h)",
        "Total Deployments",
    ])?;
    for row in &report.zone_stats {
        writer.write_record([
            row.zone.clone(),
            row.mean_hours.map(|h| format!("{h:.2}")).unwrap_or_default(),
            row.deployments.to_string(),
        ])?;
    }
    Ok(String::from_utf8(writer.into_inner()?)?)
}
