//! `lubegrid-recon`: lubrication survey reconciliation engine.
//!
//! Pure engine crate: receives decoded token matrices, returns the unified
//! schema, the deduplicated record set and its classified views.
//! No CLI or IO dependencies.

pub mod categorize;
pub mod classify;
pub mod config;
pub mod dedupe;
pub mod engine;
pub mod error;
pub mod model;
pub mod paginate;
pub mod reconcile;
pub mod schema;
pub mod summary;

pub use config::PipelineConfig;
pub use engine::run;
pub use error::PipelineError;
pub use model::{
    Bucket, BucketKind, ClassifiedRecord, PipelineInput, PipelineResult, RunOptions, SourceTable,
    StatusLabel,
};
pub use schema::{ColumnDescriptor, Record, Schema};
