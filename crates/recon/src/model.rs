use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

use crate::config::PipelineOptions;
use crate::schema::{Record, Schema};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One decoded source file: an ordered token matrix, first row is the header.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn header(&self) -> &[String] {
        self.rows.first().map(|r| r.as_slice()).unwrap_or(&[])
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

/// Per-run switches. Defaults come from `[options]`; the caller may
/// override them for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunOptions {
    pub case_insensitive: bool,
    pub preserve_order: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            preserve_order: true,
        }
    }
}

impl From<&PipelineOptions> for RunOptions {
    fn from(options: &PipelineOptions) -> Self {
        Self {
            case_insensitive: options.case_insensitive,
            preserve_order: options.preserve_order,
        }
    }
}

/// Source tables in caller order. The first table with data wins schema
/// precedence regardless of how the files were decoded.
#[derive(Debug, Clone, Default)]
pub struct PipelineInput {
    pub tables: Vec<SourceTable>,
    pub options: RunOptions,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionCategory {
    Particle,
    Moisture,
    Vibration,
    Orientation,
    Runtime,
    Temperature,
}

impl ConditionCategory {
    pub const ALL: [ConditionCategory; 6] = [
        Self::Particle,
        Self::Moisture,
        Self::Vibration,
        Self::Orientation,
        Self::Runtime,
        Self::Temperature,
    ];
}

impl std::fmt::Display for ConditionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Particle => write!(f, "particle"),
            Self::Moisture => write!(f, "moisture"),
            Self::Vibration => write!(f, "vibration"),
            Self::Orientation => write!(f, "orientation"),
            Self::Runtime => write!(f, "runtime"),
            Self::Temperature => write!(f, "temperature"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Criticality {
    #[default]
    None,
    Critical,
    Complicated,
    CriticalAndComplicated,
}

impl Criticality {
    pub fn from_flags(is_critical: bool, is_complicated: bool) -> Self {
        match (is_critical, is_complicated) {
            (true, true) => Self::CriticalAndComplicated,
            (true, false) => Self::Critical,
            (false, true) => Self::Complicated,
            (false, false) => Self::None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Critical => "Critical",
            Self::Complicated => "Complicated",
            Self::CriticalAndComplicated => "Critical & Complicated",
        }
    }
}

impl Serialize for Criticality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Normalized status. Anything the rules don't recognize passes through
/// as `Raw` with the trimmed source value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLabel {
    Done,
    NotAccessible,
    NotFound,
    NoLubePoint,
    Question,
    InternalQuestion,
    OutOfScope,
    Obsolete,
    NotApplicable,
    Raw(String),
}

impl StatusLabel {
    pub fn label(&self) -> &str {
        match self {
            Self::Done => "Done",
            Self::NotAccessible => "Not Accessible",
            Self::NotFound => "Not Found",
            Self::NoLubePoint => "No Lube Point",
            Self::Question => "Question",
            Self::InternalQuestion => "Internal Question",
            Self::OutOfScope => "Out of Scope",
            Self::Obsolete => "Obsolete",
            Self::NotApplicable => "Not Applicable",
            Self::Raw(value) => value,
        }
    }

    /// Parse a vocabulary label back into the enum. Used when a reviewer
    /// picks a status by hand; unknown text stays `Raw`.
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        [
            Self::Done,
            Self::NotAccessible,
            Self::NotFound,
            Self::NoLubePoint,
            Self::Question,
            Self::InternalQuestion,
            Self::OutOfScope,
            Self::Obsolete,
            Self::NotApplicable,
        ]
        .into_iter()
        .find(|s| s.label().eq_ignore_ascii_case(trimmed))
        .unwrap_or_else(|| Self::Raw(trimmed.to_string()))
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

impl std::fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for StatusLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// A reconciled record plus the fields derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedRecord {
    pub record: Record,
    pub identifier: String,
    pub area: String,
    pub is_critical: bool,
    pub is_complicated: bool,
    pub criticality: Criticality,
    pub raw_status: String,
    pub status: StatusLabel,
    pub is_done: bool,
    pub comment: String,
    pub conditions: BTreeMap<ConditionCategory, String>,
    pub features: BTreeMap<String, bool>,
    pub components: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketKind {
    ProceduresReady,
    NotCollected,
    NoLubePoint,
    Sampled,
    Questions,
}

impl BucketKind {
    pub const ALL: [BucketKind; 5] = [
        Self::ProceduresReady,
        Self::NotCollected,
        Self::NoLubePoint,
        Self::Sampled,
        Self::Questions,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ProceduresReady => "procedures-ready",
            Self::NotCollected => "not-collected",
            Self::NoLubePoint => "no-lube-point",
            Self::Sampled => "sampled",
            Self::Questions => "questions",
        }
    }
}

impl std::fmt::Display for BucketKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Records selected by one predicate, paginated on their own.
#[derive(Debug, Clone, Serialize)]
pub struct Bucket {
    pub kind: BucketKind,
    pub page_count: usize,
    pub records: Vec<ClassifiedRecord>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineSummary {
    /// Non-blank data rows accepted across all files.
    pub total_rows: usize,
    pub combined: usize,
    pub duplicates_removed: usize,
    pub done: usize,
    pub todo: usize,
    pub critical: usize,
    pub complicated: usize,
    pub bucket_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineMeta {
    pub engine_version: String,
    pub run_at: String,
    pub file_count: usize,
    pub case_insensitive: bool,
    pub preserve_order: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub meta: PipelineMeta,
    pub summary: PipelineSummary,
    pub schema: Schema,
    pub combined: Vec<ClassifiedRecord>,
    pub done: Vec<ClassifiedRecord>,
    pub todo: Vec<ClassifiedRecord>,
    pub buckets: Vec<Bucket>,
    /// Advisory messages, e.g. "Missing column: Done?".
    pub diagnostics: Vec<String>,
}

impl PipelineResult {
    pub fn bucket(&self, kind: BucketKind) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.kind == kind)
    }
}
