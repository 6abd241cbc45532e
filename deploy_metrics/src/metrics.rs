//! Metric aggregation over matched first-ride records.
//!
//! Pure functions over in-memory collections; every aggregate is recomputed
//! per analysis pass. Groups with deployments but no matched rides keep a
//! row with an undefined (`None`) mean rather than a NaN or a silent omission.

use indexmap::IndexMap;
use serde::Serialize;

/// Width of one histogram bucket, in hours.
pub const HISTOGRAM_BUCKET_HOURS: f64 = 5.0;

/// Scalar KPI block for one filter window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    /// Eligible deployments in the window.
    pub total_deployments: usize,
    /// Deployments with no qualifying ride (total minus matched).
    pub no_ride_count: usize,
    /// Mean time to first ride in hours; `None` when nothing matched.
    pub mean_hours: Option<f64>,
}

/// One fixed-width histogram bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBucket {
    /// Inclusive lower bound of the bucket, in hours.
    pub start_hours: f64,
    /// Matched deployments falling in `[start, start + width)`.
    pub count: usize,
}

/// Mean hours to first ride for one vehicle model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStat {
    /// Vehicle model tag.
    pub model: String,
    /// Mean hours over the model's matched deployments.
    pub mean_hours: f64,
}

/// Per-zone aggregate row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneStat {
    /// Zone name.
    pub zone: String,
    /// Mean hours over the zone's matched deployments; `None` when the zone
    /// saw deployments but no ride followed any of them.
    pub mean_hours: Option<f64>,
    /// Deployments attributed to the zone in the filter window (matched or
    /// not).
    pub deployments: usize,
}

/// Color-scale thresholds over the defined per-zone means.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneThresholds {
    /// Smallest defined zone mean.
    pub min: f64,
    /// Median of the defined zone means.
    pub median: f64,
    /// Largest defined zone mean.
    pub max: f64,
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Histogram of hours in fixed 5-hour buckets, contiguous from zero through
/// the largest observed bucket.
pub fn histogram(hours: &[f64]) -> Vec<HistogramBucket> {
    let Some(max) = hours.iter().copied().fold(None::<f64>, |acc, h| {
        Some(acc.map_or(h, |m| m.max(h)))
    }) else {
        return Vec::new();
    };

    let last_bucket = (max / HISTOGRAM_BUCKET_HOURS).floor() as usize;
    let mut counts = vec![0usize; last_bucket + 1];
    for &h in hours {
        let bucket = ((h / HISTOGRAM_BUCKET_HOURS).floor() as usize).min(last_bucket);
        counts[bucket] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBucket {
            start_hours: i as f64 * HISTOGRAM_BUCKET_HOURS,
            count,
        })
        .collect()
}

/// Mean hours per vehicle model, ascending by mean.
pub fn model_means(records: &[(String, f64)]) -> Vec<ModelStat> {
    let mut groups: IndexMap<&str, Vec<f64>> = IndexMap::new();
    for (model, hours) in records {
        groups.entry(model.as_str()).or_default().push(*hours);
    }
    let mut stats: Vec<ModelStat> = groups
        .into_iter()
        .map(|(model, hours)| ModelStat {
            model: model.to_string(),
            // groups are never empty by construction
            mean_hours: mean(&hours).unwrap_or(0.0),
        })
        .collect();
    stats.sort_by(|a, b| {
        a.mean_hours
            .partial_cmp(&b.mean_hours)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    stats
}

/// Per-zone summary rows, slowest first, undefined means last.
///
/// `deployment_zones` carries the zone of every deployment in the filter
/// window (the count source); `matched` carries (zone, hours) for the
/// window's matched deployments (the mean source). Unassigned deployments
/// contribute no row.
pub fn zone_stats(
    deployment_zones: &[Option<String>],
    matched: &[(Option<String>, f64)],
) -> Vec<ZoneStat> {
    let mut groups: IndexMap<&str, (usize, Vec<f64>)> = IndexMap::new();
    for zone in deployment_zones.iter().flatten() {
        groups.entry(zone.as_str()).or_default().0 += 1;
    }
    for (zone, hours) in matched {
        if let Some(zone) = zone {
            groups.entry(zone.as_str()).or_default().1.push(*hours);
        }
    }

    let mut stats: Vec<ZoneStat> = groups
        .into_iter()
        .map(|(zone, (deployments, hours))| ZoneStat {
            zone: zone.to_string(),
            mean_hours: mean(&hours),
            deployments,
        })
        .collect();
    stats.sort_by(|a, b| match (a.mean_hours, b.mean_hours) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    stats
}

/// Min/median/max over the defined zone means; `None` when no zone has one.
pub fn zone_thresholds(stats: &[ZoneStat]) -> Option<ZoneThresholds> {
    let mut means: Vec<f64> = stats.iter().filter_map(|s| s.mean_hours).collect();
    if means.is_empty() {
        return None;
    }
    means.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = means.len() / 2;
    let median = if means.len() % 2 == 1 {
        means[mid]
    } else {
        (means[mid - 1] + means[mid]) / 2.0
    };
    Some(ZoneThresholds {
        min: means[0],
        median,
        max: means[means.len() - 1],
    })
}
