// Root statistics document returned by Tdarr's StatisticsJSONDB

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

use super::{CategoryRecord, PieFault};

/// JSON `null` leaves a field at its zero value, like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AggregateStat {
    #[serde(deserialize_with = "null_as_default")]
    pub average: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub highest: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StreamStats {
    #[serde(deserialize_with = "null_as_default")]
    pub duration: AggregateStat,
    #[serde(deserialize_with = "null_as_default")]
    pub bit_rate: AggregateStat,
    #[serde(deserialize_with = "null_as_default")]
    pub nb_frames: AggregateStat,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LanguageMetric {
    #[serde(deserialize_with = "null_as_default")]
    pub count: i64,
}

/// Normalized snapshot of one poll. Missing and `null` fields take their zero value; a
/// field of the wrong JSON type fails the whole decode.
///
/// `categories` and `pie_faults` are filled by the second decode pass over `pies`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatsSnapshot {
    #[serde(rename = "_id", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub total_file_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_transcode_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_health_check_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub size_diff: f64,
    #[serde(rename = "DBFetchTime", deserialize_with = "null_as_default")]
    pub db_fetch_time: String,
    #[serde(rename = "DBLoadStatus", deserialize_with = "null_as_default")]
    pub db_load_status: String,
    #[serde(rename = "DBQueue", deserialize_with = "null_as_default")]
    pub db_queue: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub tdarr_score: String,
    #[serde(deserialize_with = "null_as_default")]
    pub health_check_score: String,
    #[serde(deserialize_with = "null_as_default")]
    pub process_warning: String,
    #[serde(deserialize_with = "null_as_default")]
    pub process_warning_queues: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub table0_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub table1_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub table2_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub table3_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub table4_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub table5_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub table6_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub table0_viewable_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub table1_viewable_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub table2_viewable_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub table3_viewable_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub table4_viewable_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub table5_viewable_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub table6_viewable_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub stream_stats: StreamStats,
    #[serde(deserialize_with = "null_as_default")]
    pub avg_number_of_streams_in_video: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub languages: BTreeMap<String, LanguageMetric>,
    #[serde(skip)]
    pub categories: Vec<CategoryRecord>,
    #[serde(skip)]
    pub pie_faults: Vec<PieFault>,
}

impl StatsSnapshot {
    /// `tableNCount` values in table order.
    pub fn table_counts(&self) -> [i64; 7] {
        [
            self.table0_count,
            self.table1_count,
            self.table2_count,
            self.table3_count,
            self.table4_count,
            self.table5_count,
            self.table6_count,
        ]
    }

    /// `tableNViewableCount` values in table order.
    pub fn table_viewable_counts(&self) -> [i64; 7] {
        [
            self.table0_viewable_count,
            self.table1_viewable_count,
            self.table2_viewable_count,
            self.table3_viewable_count,
            self.table4_viewable_count,
            self.table5_viewable_count,
            self.table6_viewable_count,
        ]
    }
}
