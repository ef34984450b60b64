// Domain models: statistics snapshot and per-library records

mod category;
mod snapshot;

pub use category::{Breakdown, BreakdownEntry, CategoryRecord, PieFault, PieFaultKind};
pub use snapshot::{AggregateStat, LanguageMetric, StatsSnapshot, StreamStats};
