use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::model::ConditionCategory;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Pipeline configuration. Every section has defaults matching the survey
/// exports the tool was built for, so an empty document is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub columns: ColumnNames,
    pub markers: Markers,
    pub status: StatusSynonyms,
    pub options: PipelineOptions,
    pub conditions: Vec<ConditionEntry>,
    pub features: Vec<FeatureFlag>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            markers: Markers::default(),
            status: StatusSynonyms::default(),
            options: PipelineOptions::default(),
            conditions: default_conditions(),
            features: default_features(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column contract
// ---------------------------------------------------------------------------

/// Display names the pipeline reads. These form the contract with the
/// survey tool that produces the CSV exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Deduplication key.
    pub identifier: String,
    /// Drives sort priority and the done/to-do split.
    pub status: String,
    pub area: String,
    /// Short-code critical marker.
    pub critical: String,
    /// Secondary critical marker, same sentinel as `critical`.
    pub critical_numeric: String,
    pub complicated: String,
    pub comment: String,
    /// Repeated column read up to `options.max_occurrences` times.
    pub component: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            identifier: "Asset number".into(),
            status: "Done?".into(),
            area: "Area".into(),
            critical: "Critical".into(),
            critical_numeric: "Criticality".into(),
            complicated: "Complicated".into(),
            comment: "Comment".into(),
            component: "Component".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

/// Literal cell values with a fixed meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub done: String,
    pub not_done: String,
    pub no_lube_point: String,
    pub critical_sentinel: String,
    pub complicated: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            done: "Yes".into(),
            not_done: "No".into(),
            no_lube_point: "NLP".into(),
            critical_sentinel: "C".into(),
            complicated: "complicated".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Status synonyms
// ---------------------------------------------------------------------------

/// Substrings (matched case-insensitively) recognized by the status rules.
/// English and French variants both appear in the field exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusSynonyms {
    pub not_accessible: Vec<String>,
    pub not_found: Vec<String>,
    pub internal_question: Vec<String>,
    pub question: Vec<String>,
    pub out_of_scope: Vec<String>,
    pub not_applicable: Vec<String>,
    /// Matched against the normalized status label.
    pub sampled: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for StatusSynonyms {
    fn default() -> Self {
        Self {
            not_accessible: strings(&["not accessible", "non accessible", "inaccessible"]),
            not_found: strings(&["not found", "non trouvé", "introuvable"]),
            internal_question: strings(&["internal question", "question interne"]),
            question: strings(&["question"]),
            out_of_scope: strings(&["out of scope", "hors scope", "hors périmètre", "obsolete"]),
            not_applicable: strings(&["not applicable", "non applicable", "n/a"]),
            sampled: strings(&["sampl", "prélev", "échantillon"]),
        }
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub case_insensitive: bool,
    /// Keep ingestion order. Sorting by status priority is opt-in.
    pub preserve_order: bool,
    /// Upper bound for repeated-column reads (e.g. "Component" 1..=N).
    pub max_occurrences: usize,
    /// Stand-in for a blank area or identifier when grouping pages.
    pub unknown_placeholder: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            preserve_order: true,
            max_occurrences: 12,
            unknown_placeholder: "Unknown".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Conditions + features
// ---------------------------------------------------------------------------

/// One recognized condition marker: a literal label plus its short codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionEntry {
    pub category: ConditionCategory,
    pub label: String,
    #[serde(default)]
    pub codes: Vec<String>,
}

/// Boolean flag read from a 0/1 column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlag {
    pub name: String,
    pub column: String,
}

fn condition(category: ConditionCategory, label: &str, codes: &[&str]) -> ConditionEntry {
    ConditionEntry {
        category,
        label: label.into(),
        codes: strings(codes),
    }
}

pub fn default_conditions() -> Vec<ConditionEntry> {
    use ConditionCategory::*;
    vec![
        condition(Particle, "Clean environment", &["P0"]),
        condition(Particle, "Dusty environment", &["P1"]),
        condition(Particle, "Heavy particle contamination", &["P2"]),
        condition(Moisture, "Dry", &["M0"]),
        condition(Moisture, "Humid", &["M1"]),
        condition(Moisture, "Water wash-down", &["M2"]),
        condition(Vibration, "Low vibration", &["V0"]),
        condition(Vibration, "High vibration", &["V1"]),
        condition(Orientation, "Horizontal", &["OH"]),
        condition(Orientation, "Vertical", &["OV"]),
        condition(Runtime, "Continuous operation", &["R24"]),
        condition(Runtime, "Intermittent operation", &["RINT"]),
        condition(Runtime, "Standby", &["RSB"]),
        condition(Temperature, "Low temperature", &["T-"]),
        condition(Temperature, "Ambient temperature", &["T0"]),
        condition(Temperature, "High temperature", &["T+"]),
    ]
}

pub fn default_features() -> Vec<FeatureFlag> {
    [
        ("sampling_point", "Sampling point"),
        ("breather", "Breather"),
        ("sight_glass", "Sight glass"),
        ("auto_lubricator", "Auto lubricator"),
        ("quick_connect", "Quick connect"),
    ]
    .iter()
    .map(|(name, column)| FeatureFlag {
        name: name.to_string(),
        column: column.to_string(),
    })
    .collect()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl PipelineConfig {
    pub fn from_toml(input: &str) -> Result<Self, PipelineError> {
        let config: PipelineConfig =
            toml::from_str(input).map_err(|e| PipelineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(self).map_err(|e| PipelineError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        let columns = &self.columns;
        if columns.identifier.trim().is_empty() {
            return Err(PipelineError::ConfigValidation(
                "columns.identifier must not be empty".into(),
            ));
        }
        if columns.status.trim().is_empty() {
            return Err(PipelineError::ConfigValidation(
                "columns.status must not be empty".into(),
            ));
        }
        if columns.identifier.trim() == columns.status.trim() {
            return Err(PipelineError::ConfigValidation(format!(
                "identifier and status columns must differ, both are '{}'",
                columns.identifier
            )));
        }

        let markers = [
            ("done", &self.markers.done),
            ("not_done", &self.markers.not_done),
            ("no_lube_point", &self.markers.no_lube_point),
            ("critical_sentinel", &self.markers.critical_sentinel),
            ("complicated", &self.markers.complicated),
        ];
        for (name, value) in markers {
            if value.trim().is_empty() {
                return Err(PipelineError::ConfigValidation(format!(
                    "markers.{name} must not be empty"
                )));
            }
        }

        if self.options.max_occurrences == 0 {
            return Err(PipelineError::ConfigValidation(
                "options.max_occurrences must be at least 1".into(),
            ));
        }

        for entry in &self.conditions {
            if entry.label.trim().is_empty() {
                return Err(PipelineError::ConfigValidation(format!(
                    "condition in category '{}' has an empty label",
                    entry.category
                )));
            }
        }

        let mut seen = HashSet::new();
        for feature in &self.features {
            if !seen.insert(feature.name.as_str()) {
                return Err(PipelineError::ConfigValidation(format!(
                    "duplicate feature name '{}'",
                    feature.name
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
