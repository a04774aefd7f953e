use std::collections::BTreeMap;

use crate::model::{Bucket, ClassifiedRecord, PipelineSummary};

/// Compute summary statistics for one pipeline run.
pub fn compute_summary(
    total_rows: usize,
    duplicates_removed: usize,
    combined: &[ClassifiedRecord],
    done: &[ClassifiedRecord],
    todo: &[ClassifiedRecord],
    buckets: &[Bucket],
) -> PipelineSummary {
    let mut bucket_counts: BTreeMap<String, usize> = BTreeMap::new();
    for bucket in buckets {
        bucket_counts.insert(bucket.kind.to_string(), bucket.records.len());
    }

    PipelineSummary {
        total_rows,
        combined: combined.len(),
        duplicates_removed,
        done: done.len(),
        todo: todo.len(),
        critical: combined.iter().filter(|r| r.is_critical).count(),
        complicated: combined.iter().filter(|r| r.is_complicated).count(),
        bucket_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;
    use crate::config::PipelineConfig;
    use crate::model::BucketKind;
    use crate::schema::SchemaBuilder;

    #[test]
    fn summary_counts() {
        let config = PipelineConfig::default();
        let mut builder = SchemaBuilder::new();
        builder.add_header(&["Critical".to_string(), "Complicated".to_string()]);
        let schema = builder.build();
        let classifier = Classifier::new(&config, &schema);

        let mut critical = schema.blank_record();
        critical.set(&schema, "Critical", 1, "C");
        let mut both = critical.clone();
        both.set(&schema, "Complicated", 1, "complicated");
        let combined = vec![
            classifier.classify(critical),
            classifier.classify(both),
            classifier.classify(schema.blank_record()),
        ];
        let buckets = vec![Bucket {
            kind: BucketKind::Questions,
            page_count: 1,
            records: combined[..1].to_vec(),
        }];

        let summary = compute_summary(4, 1, &combined, &combined[..2], &combined[2..], &buckets);
        assert_eq!(summary.total_rows, 4);
        assert_eq!(summary.combined, 3);
        assert_eq!(summary.duplicates_removed, 1);
        assert_eq!(summary.done, 2);
        assert_eq!(summary.todo, 1);
        assert_eq!(summary.critical, 2);
        assert_eq!(summary.complicated, 1);
        assert_eq!(summary.bucket_counts["questions"], 1);
    }
}
