// Prometheus metric store: one registry owned by the exporter, written by the poll worker
// and read by GET /metrics. Gauges are atomic, so readers never block the writer.

use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};

use crate::models::Breakdown;

pub const NAMESPACE: &str = "tdarr";

pub const LIBRARY_LABELS: [&str; 2] = ["library_name", "library_id"];

/// Metric name, help text and third label for each breakdown vector.
pub fn breakdown_metric(kind: Breakdown) -> (&'static str, &'static str, &'static str) {
    match kind {
        Breakdown::TranscodeStatus => (
            "library_transcode_status",
            "Transcode status in tdarr library",
            "status",
        ),
        Breakdown::Health => ("library_health", "Health in tdarr library", "health"),
        Breakdown::VideoCodec => (
            "library_video_codec",
            "Video codec in tdarr library",
            "codec",
        ),
        Breakdown::Container => (
            "library_video_container",
            "Video container in tdarr library",
            "container",
        ),
        Breakdown::Resolution => (
            "library_video_resolution",
            "Video resolution in tdarr library",
            "resolution",
        ),
        Breakdown::AudioCodec => (
            "library_audio_codec",
            "Audio codec in tdarr library",
            "codec",
        ),
        Breakdown::AudioContainer => (
            "library_audio_container",
            "Audio container in tdarr library",
            "container",
        ),
    }
}

/// average / highest / total gauges for one stream statistic.
#[derive(Clone)]
pub struct AggregateGauges {
    pub average: Gauge,
    pub highest: Gauge,
    pub total: Gauge,
}

#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Registry,

    pub total_file_count: Gauge,
    pub total_transcode_count: Gauge,
    pub total_health_check_count: Gauge,
    pub size_diff: Gauge,
    pub db_fetch_time: Gauge,
    pub db_load_status: Gauge,
    pub db_queue: Gauge,
    pub score: Gauge,
    pub health_check_score: Gauge,
    pub average_number_of_streams_in_video: Gauge,
    pub languages: GaugeVec,

    pub stream_duration: AggregateGauges,
    pub stream_bitrate: AggregateGauges,
    pub stream_nb_frames: AggregateGauges,

    /// `tdarr_table_N_count`, indexed by N.
    pub table_counts: Vec<Gauge>,
    /// `tdarr_table_N_viewable_count`, indexed by N.
    pub table_viewable_counts: Vec<Gauge>,

    pub library_total_file_count: GaugeVec,
    pub library_total_transcode_count: GaugeVec,
    pub library_total_health_check_count: GaugeVec,
    pub library_size_diff: GaugeVec,
    /// One vector per breakdown, in `Breakdown::ALL` order.
    library_breakdowns: Vec<GaugeVec>,
}

impl ExporterMetrics {
    /// Creates every metric and registers it with a fresh registry.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let r = &registry;

        let stream = |stat: &str, what: &str| -> prometheus::Result<AggregateGauges> {
            Ok(AggregateGauges {
                average: gauge(
                    r,
                    &format!("stream_stats_{stat}_average"),
                    &format!("Average {what} of streams"),
                )?,
                highest: gauge(
                    r,
                    &format!("stream_stats_{stat}_highest"),
                    &format!("Highest {what} of streams"),
                )?,
                total: gauge(
                    r,
                    &format!("stream_stats_{stat}_total"),
                    &format!("Total {what} of streams"),
                )?,
            })
        };

        let mut table_counts = Vec::with_capacity(7);
        let mut table_viewable_counts = Vec::with_capacity(7);
        for i in 0..7 {
            table_counts.push(gauge(
                r,
                &format!("table_{i}_count"),
                &format!("Table {i} count"),
            )?);
            table_viewable_counts.push(gauge(
                r,
                &format!("table_{i}_viewable_count"),
                &format!("Table {i} viewable count"),
            )?);
        }

        let library_breakdowns = Breakdown::ALL
            .iter()
            .map(|kind| {
                let (name, help, label) = breakdown_metric(*kind);
                gauge_vec(r, name, help, &[LIBRARY_LABELS[0], LIBRARY_LABELS[1], label])
            })
            .collect::<prometheus::Result<Vec<_>>>()?;

        Ok(Self {
            total_file_count: gauge(r, "total_file_count", "Total number of files in tdarr")?,
            total_transcode_count: gauge(
                r,
                "total_transcode_count",
                "Total number of transcodes in tdarr",
            )?,
            total_health_check_count: gauge(
                r,
                "total_health_check_count",
                "Total number of health checks in tdarr",
            )?,
            size_diff: gauge(r, "size_diff", "Size difference in tdarr")?,
            db_fetch_time: gauge(r, "db_fetch_time", "DB fetch time in tdarr, in seconds")?,
            db_load_status: gauge(
                r,
                "db_load_status",
                "DB load status in tdarr (0 = Stable, 1 = anything else)",
            )?,
            db_queue: gauge(r, "db_queue", "DB queue in tdarr")?,
            score: gauge(r, "score", "Tdarr score")?,
            health_check_score: gauge(r, "health_check_score", "Health check score")?,
            average_number_of_streams_in_video: gauge(
                r,
                "average_number_of_streams_in_video",
                "Average number of streams in video",
            )?,
            languages: gauge_vec(r, "languages", "Languages", &["language"])?,
            stream_duration: stream("duration", "duration")?,
            stream_bitrate: stream("bitrate", "bitrate")?,
            stream_nb_frames: stream("nb_frames", "number of frames")?,
            table_counts,
            table_viewable_counts,
            library_total_file_count: gauge_vec(
                r,
                "library_total_file_count",
                "Total number of files in tdarr library",
                &LIBRARY_LABELS,
            )?,
            library_total_transcode_count: gauge_vec(
                r,
                "library_total_transcode_count",
                "Total number of transcodes in tdarr library",
                &LIBRARY_LABELS,
            )?,
            library_total_health_check_count: gauge_vec(
                r,
                "library_total_health_check_count",
                "Total number of health checks in tdarr library",
                &LIBRARY_LABELS,
            )?,
            library_size_diff: gauge_vec(
                r,
                "library_size_diff",
                "Size difference in tdarr library",
                &LIBRARY_LABELS,
            )?,
            library_breakdowns,
            registry,
        })
    }

    pub fn library_breakdown(&self, kind: Breakdown) -> &GaugeVec {
        // Vectors are built in `Breakdown::ALL` order, which is declaration order.
        &self.library_breakdowns[kind as usize]
    }

    /// Current values in the Prometheus text exposition format.
    pub fn encode(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

fn gauge(registry: &Registry, name: &str, help: &str) -> prometheus::Result<Gauge> {
    let g = Gauge::with_opts(Opts::new(name, help).namespace(NAMESPACE))?;
    registry.register(Box::new(g.clone()))?;
    Ok(g)
}

fn gauge_vec(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> prometheus::Result<GaugeVec> {
    let g = GaugeVec::new(Opts::new(name, help).namespace(NAMESPACE), labels)?;
    registry.register(Box::new(g.clone()))?;
    Ok(g)
}
