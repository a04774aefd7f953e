use crate::config::PipelineConfig;
use crate::model::{BucketKind, ClassifiedRecord, StatusLabel};

/// Bucket predicates. Each is independent; a record can land in several
/// buckets or none.
#[derive(Debug, Clone)]
pub struct Categorizer {
    sampled: Vec<String>,
}

impl Categorizer {
    pub fn from_config(config: &PipelineConfig) -> Self {
        let sampled = config
            .status
            .sampled
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { sampled }
    }

    pub fn matches(&self, kind: BucketKind, record: &ClassifiedRecord) -> bool {
        match kind {
            BucketKind::ProceduresReady => record.is_done && !record.identifier.is_empty(),
            BucketKind::NotCollected => {
                record.status == StatusLabel::NotFound || record.identifier.is_empty()
            }
            BucketKind::NoLubePoint => record.status == StatusLabel::NoLubePoint,
            BucketKind::Sampled => {
                let folded = record.status.label().to_lowercase();
                self.sampled.iter().any(|s| folded.contains(s.as_str()))
            }
            // Case-sensitive on the normalized label, so both Question and
            // Internal Question qualify.
            BucketKind::Questions => {
                record.status.label().contains("Question") || !record.comment.is_empty()
            }
        }
    }

    pub fn select(&self, kind: BucketKind, records: &[ClassifiedRecord]) -> Vec<ClassifiedRecord> {
        records
            .iter()
            .filter(|r| self.matches(kind, r))
            .cloned()
            .collect()
    }
}
