// Projects a decoded snapshot onto the metric store.

use crate::duration;
use crate::error::ProjectionError;
use crate::metrics::{AggregateGauges, ExporterMetrics};
use crate::models::{AggregateStat, Breakdown, CategoryRecord, StatsSnapshot};

/// The only DBLoadStatus value Tdarr is known to report.
pub const STABLE_LOAD_STATUS: &str = "Stable";

/// What one projection wrote; used for logging and cardinality warnings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionSummary {
    pub libraries: usize,
    pub breakdown_samples: usize,
    pub languages: usize,
}

impl ProjectionSummary {
    /// Label-keyed samples whose count is driven by upstream data.
    pub fn labeled_samples(&self) -> usize {
        self.breakdown_samples + self.languages
    }
}

/// Fields that arrive as strings, parsed before anything is written.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ParsedFields {
    fetch_time_secs: f64,
    tdarr_score: f64,
    health_check_score: f64,
}

/// Maps DBLoadStatus to a gauge value: 0 for "Stable", 1 for anything else.
pub fn load_status_value(status: &str) -> f64 {
    if status == STABLE_LOAD_STATUS {
        0.0
    } else {
        tracing::warn!(status, "unknown DBLoadStatus");
        1.0
    }
}

fn parse_fields(snapshot: &StatsSnapshot) -> Result<ParsedFields, ProjectionError> {
    let fetch_time = duration::parse(&snapshot.db_fetch_time).map_err(|source| {
        ProjectionError::FetchTime {
            value: snapshot.db_fetch_time.clone(),
            source,
        }
    })?;
    Ok(ParsedFields {
        fetch_time_secs: fetch_time.as_secs_f64(),
        tdarr_score: parse_score("tdarrScore", &snapshot.tdarr_score)?,
        health_check_score: parse_score("healthCheckScore", &snapshot.health_check_score)?,
    })
}

fn parse_score(field: &'static str, value: &str) -> Result<f64, ProjectionError> {
    value
        .parse::<f64>()
        .map_err(|source| ProjectionError::Score {
            field,
            value: value.to_string(),
            source,
        })
}

/// Writes `snapshot` into `metrics`.
///
/// String fields are parsed up front, so a `ProjectionError` leaves the store exactly as
/// it was. Language samples for keys missing from this snapshot keep their old value.
pub fn project(
    snapshot: &StatsSnapshot,
    metrics: &ExporterMetrics,
) -> Result<ProjectionSummary, ProjectionError> {
    let parsed = parse_fields(snapshot)?;

    metrics
        .total_file_count
        .set(snapshot.total_file_count as f64);
    metrics
        .total_transcode_count
        .set(snapshot.total_transcode_count as f64);
    metrics
        .total_health_check_count
        .set(snapshot.total_health_check_count as f64);
    metrics.size_diff.set(snapshot.size_diff);
    metrics.db_fetch_time.set(parsed.fetch_time_secs);
    metrics
        .db_load_status
        .set(load_status_value(&snapshot.db_load_status));
    metrics.db_queue.set(snapshot.db_queue as f64);
    metrics.score.set(parsed.tdarr_score);
    metrics.health_check_score.set(parsed.health_check_score);
    metrics
        .average_number_of_streams_in_video
        .set(snapshot.avg_number_of_streams_in_video);

    for (language, metric) in &snapshot.languages {
        metrics
            .languages
            .with_label_values(&[language.as_str()])
            .set(metric.count as f64);
    }

    let stream = &snapshot.stream_stats;
    set_aggregate(&metrics.stream_duration, &stream.duration);
    set_aggregate(&metrics.stream_bitrate, &stream.bit_rate);
    set_aggregate(&metrics.stream_nb_frames, &stream.nb_frames);

    for (gauge, count) in metrics.table_counts.iter().zip(snapshot.table_counts()) {
        gauge.set(count as f64);
    }
    for (gauge, count) in metrics
        .table_viewable_counts
        .iter()
        .zip(snapshot.table_viewable_counts())
    {
        gauge.set(count as f64);
    }

    let mut summary = ProjectionSummary {
        libraries: snapshot.categories.len(),
        languages: snapshot.languages.len(),
        ..Default::default()
    };
    for record in &snapshot.categories {
        project_category(record, metrics);
        summary.breakdown_samples += record.breakdown_len();
    }

    tracing::debug!(
        libraries = summary.libraries,
        breakdown_samples = summary.breakdown_samples,
        languages = summary.languages,
        "Snapshot projected"
    );
    Ok(summary)
}

fn set_aggregate(gauges: &AggregateGauges, stat: &AggregateStat) {
    gauges.average.set(stat.average);
    gauges.highest.set(stat.highest);
    gauges.total.set(stat.total);
}

fn project_category(record: &CategoryRecord, metrics: &ExporterMetrics) {
    let library = [record.library.as_str(), record.id.as_str()];
    metrics
        .library_total_file_count
        .with_label_values(&library)
        .set(record.total_file_count as f64);
    metrics
        .library_total_transcode_count
        .with_label_values(&library)
        .set(record.total_transcode_count as f64);
    metrics
        .library_total_health_check_count
        .with_label_values(&library)
        .set(record.total_health_check_count as f64);
    metrics
        .library_size_diff
        .with_label_values(&library)
        .set(record.size_diff);

    for kind in Breakdown::ALL {
        let vec = metrics.library_breakdown(kind);
        for entry in record.breakdown(kind) {
            vec.with_label_values(&[library[0], library[1], entry.name.as_str()])
                .set(entry.value as f64);
        }
    }
}
