// Two-pass decode of the statistics document.
// Pass one maps the typed fields with serde; pass two walks the positional `pies` arrays
// one element at a time and keeps whatever is well formed.

use serde::Deserialize;
use serde_json::Value;

use crate::error::DecodeError;
use crate::models::{
    Breakdown, BreakdownEntry, CategoryRecord, PieFault, PieFaultKind, StatsSnapshot,
};

/// Six header positions plus at least one breakdown slot.
pub const MIN_PIE_LEN: usize = 7;

/// Position of each breakdown within a pie array.
pub const BREAKDOWN_SLOTS: [(usize, Breakdown); 7] = [
    (6, Breakdown::TranscodeStatus),
    (7, Breakdown::Health),
    (8, Breakdown::VideoCodec),
    (9, Breakdown::Container),
    (10, Breakdown::Resolution),
    (11, Breakdown::AudioCodec),
    (12, Breakdown::AudioContainer),
];

#[derive(Deserialize)]
struct RawDocument {
    #[serde(flatten)]
    stats: StatsSnapshot,
    #[serde(default)]
    pies: Option<Vec<Value>>,
}

/// Result of the best-effort pass over `pies`.
#[derive(Debug, Default)]
pub struct DecodedPies {
    pub records: Vec<CategoryRecord>,
    pub faults: Vec<PieFault>,
}

/// Decodes an upstream response body into a snapshot.
///
/// Fails only when the document itself is malformed; bad pies end up in
/// `StatsSnapshot::pie_faults` instead.
pub fn decode_snapshot(body: &[u8]) -> Result<StatsSnapshot, DecodeError> {
    let raw: RawDocument = serde_json::from_slice(body)?;
    let mut snapshot = raw.stats;
    let pies = raw.pies.unwrap_or_default();

    let DecodedPies { records, faults } = decode_pies(&pies);
    for fault in &faults {
        tracing::warn!(
            pie = fault.pie,
            dropped = fault.kind.drops_record(),
            operation = "decode_pies",
            "Invalid pie format: {}",
            fault.kind
        );
    }
    tracing::debug!(
        pies = pies.len(),
        libraries = records.len(),
        faults = faults.len(),
        "Pies decoded"
    );

    snapshot.categories = records;
    snapshot.pie_faults = faults;
    Ok(snapshot)
}

/// Decodes every pie independently, in source order.
pub fn decode_pies(pies: &[Value]) -> DecodedPies {
    let mut out = DecodedPies::default();
    for (index, pie) in pies.iter().enumerate() {
        let mut entry_faults = Vec::new();
        match decode_pie(pie, &mut entry_faults) {
            Ok(record) => out.records.push(record),
            Err(kind) => out.faults.push(PieFault { pie: index, kind }),
        }
        out.faults.extend(
            entry_faults
                .into_iter()
                .map(|kind| PieFault { pie: index, kind }),
        );
    }
    out
}

/// Decodes one pie. Header problems drop the record; breakdown problems are pushed to
/// `faults` and the record is kept.
pub fn decode_pie(
    pie: &Value,
    faults: &mut Vec<PieFaultKind>,
) -> Result<CategoryRecord, PieFaultKind> {
    let items = pie.as_array().ok_or(PieFaultKind::NotAnArray)?;
    if items.len() < MIN_PIE_LEN {
        return Err(PieFaultKind::TooShort { len: items.len() });
    }

    let mut record = CategoryRecord {
        library: string_at(items, 0)?,
        id: string_at(items, 1)?,
        total_file_count: count_at(items, 2)?,
        total_transcode_count: count_at(items, 3)?,
        size_diff: number_at(items, 4)?,
        total_health_check_count: count_at(items, 5)?,
        ..Default::default()
    };

    for (position, breakdown) in BREAKDOWN_SLOTS {
        let Some(slot) = items.get(position) else {
            break;
        };
        let Some(entries) = slot.as_array() else {
            faults.push(PieFaultKind::SlotNotArray { breakdown });
            continue;
        };
        push_entries(
            entries,
            breakdown,
            None,
            record.breakdown_mut(breakdown),
            faults,
        );
    }
    Ok(record)
}

/// Appends the pairs in `values`, descending into nested arrays. Faults inside a nested
/// array report the index of the outermost entry.
fn push_entries(
    values: &[Value],
    breakdown: Breakdown,
    outer: Option<usize>,
    out: &mut Vec<BreakdownEntry>,
    faults: &mut Vec<PieFaultKind>,
) {
    for (i, value) in values.iter().enumerate() {
        let entry = outer.unwrap_or(i);
        if let Value::Array(nested) = value {
            push_entries(nested, breakdown, Some(entry), out, faults);
            continue;
        }
        match breakdown_entry(value) {
            Some(e) => out.push(e),
            None => faults.push(PieFaultKind::InvalidEntry { breakdown, entry }),
        }
    }
}

fn breakdown_entry(value: &Value) -> Option<BreakdownEntry> {
    let map = value.as_object()?;
    let name = map.get("name")?.as_str()?;
    let value = map.get("value")?.as_f64()?;
    Some(BreakdownEntry::new(name, value as i64))
}

fn string_at(items: &[Value], position: usize) -> Result<String, PieFaultKind> {
    items[position]
        .as_str()
        .map(str::to_owned)
        .ok_or(PieFaultKind::FieldType {
            position,
            expected: "string",
        })
}

fn number_at(items: &[Value], position: usize) -> Result<f64, PieFaultKind> {
    items[position].as_f64().ok_or(PieFaultKind::FieldType {
        position,
        expected: "number",
    })
}

/// Counts arrive as JSON numbers and are truncated toward zero.
fn count_at(items: &[Value], position: usize) -> Result<i64, PieFaultKind> {
    number_at(items, position).map(|n| n as i64)
}
