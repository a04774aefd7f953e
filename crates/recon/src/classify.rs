use std::collections::{BTreeMap, HashMap};

use crate::config::PipelineConfig;
use crate::model::{ClassifiedRecord, ConditionCategory, Criticality, StatusLabel};
use crate::schema::{Record, Schema};

// ---------------------------------------------------------------------------
// Status rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Pattern {
    Equals(String),
    Contains(String),
}

impl Pattern {
    fn matches(&self, folded: &str) -> bool {
        match self {
            Pattern::Equals(p) => folded == p,
            Pattern::Contains(p) => folded.contains(p.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
struct StatusRule {
    patterns: Vec<Pattern>,
    label: StatusLabel,
}

/// Ordered status rules, first match wins. Patterns are lowercased once.
#[derive(Debug, Clone)]
pub struct StatusRules {
    rules: Vec<StatusRule>,
}

fn contains_all(values: &[String]) -> Vec<Pattern> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .map(Pattern::Contains)
        .collect()
}

impl StatusRules {
    pub fn from_config(config: &PipelineConfig) -> Self {
        let synonyms = &config.status;
        let markers = &config.markers;
        let rule = |patterns, label| StatusRule { patterns, label };

        let rules = vec![
            rule(
                vec![Pattern::Equals(markers.done.trim().to_lowercase())],
                StatusLabel::Done,
            ),
            rule(contains_all(&synonyms.not_accessible), StatusLabel::NotAccessible),
            rule(contains_all(&synonyms.not_found), StatusLabel::NotFound),
            rule(
                vec![Pattern::Equals(markers.no_lube_point.trim().to_lowercase())],
                StatusLabel::NoLubePoint,
            ),
            rule(contains_all(&synonyms.internal_question), StatusLabel::InternalQuestion),
            rule(contains_all(&synonyms.question), StatusLabel::Question),
            rule(contains_all(&synonyms.out_of_scope), StatusLabel::OutOfScope),
            rule(contains_all(&synonyms.not_applicable), StatusLabel::NotApplicable),
        ];
        Self { rules }
    }

    pub fn normalize(&self, raw: &str) -> StatusLabel {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return StatusLabel::Raw(String::new());
        }
        let folded = trimmed.to_lowercase();
        self.rules
            .iter()
            .find(|r| r.patterns.iter().any(|p| p.matches(&folded)))
            .map(|r| r.label.clone())
            .unwrap_or_else(|| StatusLabel::Raw(trimmed.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Condition dictionary
// ---------------------------------------------------------------------------

/// Lowercased literal or short code -> (category, label).
#[derive(Debug, Clone, Default)]
pub struct ConditionDictionary {
    entries: HashMap<String, (ConditionCategory, String)>,
}

impl ConditionDictionary {
    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut entries = HashMap::new();
        for entry in &config.conditions {
            let target = (entry.category, entry.label.clone());
            for literal in std::iter::once(&entry.label).chain(entry.codes.iter()) {
                let key = literal.trim().to_lowercase();
                if !key.is_empty() {
                    entries.insert(key, target.clone());
                }
            }
        }
        Self { entries }
    }

    pub fn lookup(&self, value: &str) -> Option<&(ConditionCategory, String)> {
        let key = value.trim();
        if key.is_empty() {
            return None;
        }
        self.entries.get(&key.to_lowercase())
    }

    /// Scan every value left to right; a later match overwrites an earlier
    /// one in the same category.
    pub fn scan(&self, values: &[String]) -> BTreeMap<ConditionCategory, String> {
        let mut found = BTreeMap::new();
        for value in values {
            if let Some((category, label)) = self.lookup(value) {
                found.insert(*category, label.clone());
            }
        }
        found
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Derives business fields for records of one schema. Holds no per-record
/// state; classifying a record never affects another.
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    config: &'a PipelineConfig,
    schema: &'a Schema,
    rules: StatusRules,
    conditions: ConditionDictionary,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a PipelineConfig, schema: &'a Schema) -> Self {
        Self {
            config,
            schema,
            rules: StatusRules::from_config(config),
            conditions: ConditionDictionary::from_config(config),
        }
    }

    pub fn classify(&self, record: Record) -> ClassifiedRecord {
        let mut classified = ClassifiedRecord {
            record,
            identifier: String::new(),
            area: String::new(),
            is_critical: false,
            is_complicated: false,
            criticality: Criticality::None,
            raw_status: String::new(),
            status: StatusLabel::Raw(String::new()),
            is_done: false,
            comment: String::new(),
            conditions: BTreeMap::new(),
            features: BTreeMap::new(),
            components: Vec::new(),
            page_number: None,
        };
        self.derive(&mut classified);
        classified
    }

    /// Recompute derived fields after a manual edit to `classified.record`.
    /// The page number is left alone; pagination belongs to the view.
    pub fn reclassify(&self, classified: &mut ClassifiedRecord) {
        self.derive(classified);
    }

    fn derive(&self, out: &mut ClassifiedRecord) {
        let columns = &self.config.columns;
        let markers = &self.config.markers;
        let get = |name: &str| self.schema.get(&out.record, name, 1).to_string();

        let identifier = get(&columns.identifier);
        let area = get(&columns.area);
        let comment = get(&columns.comment);
        let raw_status = get(&columns.status);

        let sentinel = markers.critical_sentinel.trim();
        let is_critical =
            get(&columns.critical) == sentinel || get(&columns.critical_numeric) == sentinel;
        let is_complicated =
            get(&columns.complicated).to_lowercase() == markers.complicated.trim().to_lowercase();

        let features = self
            .config
            .features
            .iter()
            .map(|f| (f.name.clone(), self.schema.get(&out.record, &f.column, 1) == "1"))
            .collect();

        let components = self.schema.repeated_values(
            &out.record,
            &columns.component,
            self.config.options.max_occurrences,
        );

        out.status = self.rules.normalize(&raw_status);
        out.is_done = raw_status.eq_ignore_ascii_case(markers.done.trim());
        out.conditions = self.conditions.scan(out.record.values());
        out.identifier = identifier;
        out.area = area;
        out.comment = comment;
        out.raw_status = raw_status;
        out.is_critical = is_critical;
        out.is_complicated = is_complicated;
        out.criticality = Criticality::from_flags(is_critical, is_complicated);
        out.features = features;
        out.components = components;
    }
}
