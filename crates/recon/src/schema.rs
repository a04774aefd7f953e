//! Canonical column schema.
//!
//! Every header cell becomes a [`ColumnDescriptor`] keyed by display name plus
//! its 1-based occurrence within its own file, so `Moteur, Moteur` yields
//! `Moteur__occ1` and `Moteur__occ2`. The canonical schema is the append-only
//! union of those descriptors across files, in first-seen order.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

pub const OCCURRENCE_SEPARATOR: &str = "__occ";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnDescriptor {
    pub display_name: String,
    pub occurrence: usize,
    pub internal_key: String,
}

impl ColumnDescriptor {
    pub fn new(display_name: impl Into<String>, occurrence: usize) -> Self {
        let display_name = display_name.into();
        let internal_key = format!("{display_name}{OCCURRENCE_SEPARATOR}{occurrence}");
        Self {
            display_name,
            occurrence,
            internal_key,
        }
    }
}

/// Descriptors for one header row, in column order. Header text is used
/// verbatim (no trimming) so formatting differences never collide.
pub fn local_schema(header: &[String]) -> Vec<ColumnDescriptor> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    header
        .iter()
        .map(|name| {
            let count = counts.entry(name.as_str()).or_insert(0);
            *count += 1;
            ColumnDescriptor::new(name.clone(), *count)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Accumulates the canonical schema for one pipeline run. Consumed by
/// [`SchemaBuilder::build`]; the resulting [`Schema`] is immutable.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    columns: Vec<ColumnDescriptor>,
    index: HashMap<String, usize>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one file's header. Returns that file's local schema; descriptors
    /// not yet present are appended in the file's own order.
    pub fn add_header(&mut self, header: &[String]) -> Vec<ColumnDescriptor> {
        let local = local_schema(header);
        for descriptor in &local {
            if !self.index.contains_key(&descriptor.internal_key) {
                self.index
                    .insert(descriptor.internal_key.clone(), self.columns.len());
                self.columns.push(descriptor.clone());
            }
        }
        local
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn build(self) -> Schema {
        Schema {
            columns: self.columns,
            index: self.index,
        }
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<ColumnDescriptor>,
    index: HashMap<String, usize>,
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.columns.serialize(serializer)
    }
}

impl Schema {
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of an internal key.
    pub fn position(&self, internal_key: &str) -> Option<usize> {
        self.index.get(internal_key).copied()
    }

    /// Resolve a display name (compared trimmed) and 1-based occurrence to a
    /// column position.
    pub fn find(&self, display_name: &str, occurrence: usize) -> Option<usize> {
        let wanted = display_name.trim();
        self.columns
            .iter()
            .position(|c| c.occurrence == occurrence && c.display_name.trim() == wanted)
    }

    pub fn has_column(&self, display_name: &str) -> bool {
        self.find(display_name, 1).is_some()
    }

    /// Trimmed cell value for `display_name` / `occurrence`, or "" when the
    /// column or the value is absent. The sanctioned way to read a record by
    /// human-readable column name.
    pub fn get<'r>(&self, record: &'r Record, display_name: &str, occurrence: usize) -> &'r str {
        self.find(display_name, occurrence)
            .and_then(|idx| record.value(idx))
            .map(str::trim)
            .unwrap_or("")
    }

    /// Non-blank values of occurrences `1..=max_occurrences` of a repeated
    /// column, in occurrence order.
    pub fn repeated_values(
        &self,
        record: &Record,
        display_name: &str,
        max_occurrences: usize,
    ) -> Vec<String> {
        (1..=max_occurrences)
            .map(|occ| self.get(record, display_name, occ))
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// A record with an empty value for every column.
    pub fn blank_record(&self) -> Record {
        Record {
            values: vec![String::new(); self.columns.len()],
        }
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Cell values aligned with the schema: `values[i]` belongs to
/// `schema.columns()[i]`. Serialized as that positional array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record {
    values: Vec<String>,
}

impl Record {
    pub(crate) fn from_values(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn value(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).map(|v| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Manual correction of a single cell. Returns false when the column is
    /// not part of the schema; the schema itself is never extended.
    pub fn set(
        &mut self,
        schema: &Schema,
        display_name: &str,
        occurrence: usize,
        value: impl Into<String>,
    ) -> bool {
        match schema.find(display_name, occurrence) {
            Some(idx) if idx < self.values.len() => {
                self.values[idx] = value.into();
                true
            }
            _ => false,
        }
    }
}
