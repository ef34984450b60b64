// Per-library records decoded from the positional `pies` arrays

/// One of the seven histogram-like groupings carried by a pie, in slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Breakdown {
    TranscodeStatus,
    Health,
    VideoCodec,
    Container,
    Resolution,
    AudioCodec,
    AudioContainer,
}

impl Breakdown {
    pub const ALL: [Breakdown; 7] = [
        Breakdown::TranscodeStatus,
        Breakdown::Health,
        Breakdown::VideoCodec,
        Breakdown::Container,
        Breakdown::Resolution,
        Breakdown::AudioCodec,
        Breakdown::AudioContainer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Breakdown::TranscodeStatus => "transcode_status",
            Breakdown::Health => "health",
            Breakdown::VideoCodec => "video_codec",
            Breakdown::Container => "container",
            Breakdown::Resolution => "resolution",
            Breakdown::AudioCodec => "audio_codec",
            Breakdown::AudioContainer => "audio_container",
        }
    }
}

impl std::fmt::Display for Breakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownEntry {
    pub name: String,
    pub value: i64,
}

impl BreakdownEntry {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// One library ("pie") with its totals and breakdowns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryRecord {
    pub library: String,
    pub id: String,
    pub total_file_count: i64,
    pub total_transcode_count: i64,
    pub size_diff: f64,
    pub total_health_check_count: i64,
    pub transcode_status: Vec<BreakdownEntry>,
    pub health: Vec<BreakdownEntry>,
    pub video_codec: Vec<BreakdownEntry>,
    pub container: Vec<BreakdownEntry>,
    pub resolution: Vec<BreakdownEntry>,
    pub audio_codec: Vec<BreakdownEntry>,
    pub audio_container: Vec<BreakdownEntry>,
}

impl CategoryRecord {
    pub fn breakdown(&self, kind: Breakdown) -> &[BreakdownEntry] {
        match kind {
            Breakdown::TranscodeStatus => &self.transcode_status,
            Breakdown::Health => &self.health,
            Breakdown::VideoCodec => &self.video_codec,
            Breakdown::Container => &self.container,
            Breakdown::Resolution => &self.resolution,
            Breakdown::AudioCodec => &self.audio_codec,
            Breakdown::AudioContainer => &self.audio_container,
        }
    }

    pub fn breakdown_mut(&mut self, kind: Breakdown) -> &mut Vec<BreakdownEntry> {
        match kind {
            Breakdown::TranscodeStatus => &mut self.transcode_status,
            Breakdown::Health => &mut self.health,
            Breakdown::VideoCodec => &mut self.video_codec,
            Breakdown::Container => &mut self.container,
            Breakdown::Resolution => &mut self.resolution,
            Breakdown::AudioCodec => &mut self.audio_codec,
            Breakdown::AudioContainer => &mut self.audio_container,
        }
    }

    /// Total entries across all seven breakdowns.
    pub fn breakdown_len(&self) -> usize {
        Breakdown::ALL.iter().map(|b| self.breakdown(*b).len()).sum()
    }
}

/// Shape problem found in a pie; the decoder records it and moves on.
#[derive(Debug, Clone, PartialEq)]
pub struct PieFault {
    /// Index of the element within `pies`.
    pub pie: usize,
    pub kind: PieFaultKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PieFaultKind {
    /// Element is not an array; dropped.
    NotAnArray,
    /// Array has fewer than the six header positions plus one breakdown; dropped.
    TooShort { len: usize },
    /// A header position (0..=5) has the wrong type; dropped.
    FieldType {
        position: usize,
        expected: &'static str,
    },
    /// A breakdown slot is not an array; that breakdown stays empty.
    SlotNotArray { breakdown: Breakdown },
    /// A breakdown entry is not a `{name, value}` pair; entry skipped.
    InvalidEntry { breakdown: Breakdown, entry: usize },
}

impl PieFaultKind {
    /// Whether the whole pie was discarded.
    pub fn drops_record(&self) -> bool {
        matches!(
            self,
            PieFaultKind::NotAnArray | PieFaultKind::TooShort { .. } | PieFaultKind::FieldType { .. }
        )
    }
}

impl std::fmt::Display for PieFaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PieFaultKind::NotAnArray => write!(f, "not an array"),
            PieFaultKind::TooShort { len } => write!(f, "only {len} elements"),
            PieFaultKind::FieldType { position, expected } => {
                write!(f, "position {position} is not a {expected}")
            }
            PieFaultKind::SlotNotArray { breakdown } => {
                write!(f, "{breakdown} slot is not an array")
            }
            PieFaultKind::InvalidEntry { breakdown, entry } => {
                write!(f, "{breakdown} entry {entry} is not a name/value pair")
            }
        }
    }
}
