use crate::categorize::Categorizer;
use crate::classify::Classifier;
use crate::config::PipelineConfig;
use crate::dedupe::{dedupe_by_identifier, sort_by_status, split_done_todo, MarkerMatcher};
use crate::model::{
    Bucket, BucketKind, ClassifiedRecord, PipelineInput, PipelineMeta, PipelineResult,
};
use crate::paginate::assign_pages;
use crate::reconcile::{reconcile_rows, unify};
use crate::summary::compute_summary;

/// Run the pipeline over one batch of source tables.
///
/// Never fails: a missing identifier column skips deduplication, a missing
/// status column skips sorting and the done/to-do split, and both are
/// reported in `diagnostics`. Every call builds its own schema and records,
/// so results of earlier runs are never touched.
pub fn run(config: &PipelineConfig, input: &PipelineInput) -> PipelineResult {
    let options = input.options;
    let columns = &config.columns;

    let (schema, sources) = unify(&input.tables);
    let reconciled = reconcile_rows(&schema, &sources);
    let total_rows = reconciled.accepted_rows;

    let mut diagnostics = Vec::new();
    let has_status = schema.has_column(&columns.status);
    let has_identifier = schema.has_column(&columns.identifier);
    if !has_status {
        log::warn!("status column '{}' not found", columns.status);
        diagnostics.push(format!("Missing column: {}", columns.status));
    }
    if !has_identifier {
        log::warn!("identifier column '{}' not found, dedupe skipped", columns.identifier);
        diagnostics.push(format!("Missing column: {} (dedupe skipped)", columns.identifier));
    }

    let matcher = MarkerMatcher::new(&config.markers, options.case_insensitive);
    let mut records = reconciled.records;

    if !options.preserve_order && has_status {
        sort_by_status(&mut records, &matcher, |r| schema.get(r, &columns.status, 1));
    }

    let mut duplicates_removed = 0;
    if has_identifier {
        let (kept, removed) =
            dedupe_by_identifier(records, &matcher, |r| schema.get(r, &columns.identifier, 1));
        records = kept;
        duplicates_removed = removed;
    }
    log::debug!(
        "{} row(s) accepted, {} duplicate(s) removed",
        total_rows,
        duplicates_removed
    );

    let classifier = Classifier::new(config, &schema);
    let combined: Vec<ClassifiedRecord> =
        records.into_iter().map(|r| classifier.classify(r)).collect();

    let placeholder = config.options.unknown_placeholder.as_str();
    let (mut done, mut todo) = if has_status {
        split_done_todo(&combined, &matcher, |c| c.raw_status.as_str())
    } else {
        (Vec::new(), Vec::new())
    };
    assign_pages(&mut done, placeholder);
    assign_pages(&mut todo, placeholder);

    let categorizer = Categorizer::from_config(config);
    let buckets: Vec<Bucket> = BucketKind::ALL
        .iter()
        .map(|&kind| {
            let mut records = categorizer.select(kind, &combined);
            let page_count = assign_pages(&mut records, placeholder);
            Bucket {
                kind,
                page_count,
                records,
            }
        })
        .collect();

    let summary = compute_summary(total_rows, duplicates_removed, &combined, &done, &todo, &buckets);

    PipelineResult {
        meta: PipelineMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            file_count: input.tables.len(),
            case_insensitive: options.case_insensitive,
            preserve_order: options.preserve_order,
        },
        summary,
        schema,
        combined,
        done,
        todo,
        buckets,
        diagnostics,
    }
}
