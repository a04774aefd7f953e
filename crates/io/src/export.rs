// Bucket export to plain CSV

use std::path::Path;

use lubegrid_recon::model::ConditionCategory;
use lubegrid_recon::{ClassifiedRecord, PipelineConfig, Schema};

/// Header row: schema display names, then the derived columns.
pub fn export_header(schema: &Schema, config: &PipelineConfig) -> Vec<String> {
    let mut header: Vec<String> = schema
        .columns()
        .iter()
        .map(|c| c.display_name.clone())
        .collect();
    header.extend(["Identifier", "Criticality", "Status", "Done"].map(String::from));
    header.extend(ConditionCategory::ALL.iter().map(|c| c.to_string()));
    header.extend(config.features.iter().map(|f| f.name.clone()));
    header.push("Page".to_string());
    header
}

/// One output row, aligned with `export_header`.
pub fn export_row(record: &ClassifiedRecord, config: &PipelineConfig) -> Vec<String> {
    let mut row: Vec<String> = record.record.values().to_vec();
    row.push(record.identifier.clone());
    row.push(record.criticality.label().to_string());
    row.push(record.status.label().to_string());
    row.push(flag(record.is_done));
    for category in ConditionCategory::ALL {
        row.push(record.conditions.get(&category).cloned().unwrap_or_default());
    }
    for feature in &config.features {
        row.push(flag(record.features.get(&feature.name).copied().unwrap_or(false)));
    }
    row.push(record.page_number.map(|p| p.to_string()).unwrap_or_default());
    row
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

/// Write one record set (a bucket, or done/todo/combined) as comma CSV.
pub fn write_bucket_csv(
    path: &Path,
    schema: &Schema,
    config: &PipelineConfig,
    records: &[ClassifiedRecord],
) -> Result<(), String> {
    let mut writer = ::csv::WriterBuilder::new()
        .from_path(path)
        .map_err(|e| format!("{}: {}", path.display(), e))?;

    writer
        .write_record(export_header(schema, config))
        .map_err(|e| e.to_string())?;
    for record in records {
        writer
            .write_record(export_row(record, config))
            .map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    log::debug!("wrote {} record(s) to {}", records.len(), path.display());
    Ok(())
}
