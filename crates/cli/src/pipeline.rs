//! `lgrid run` / `schema` / `validate` / `config`.

use std::path::{Path, PathBuf};

use lubegrid_recon::reconcile::unify;
use lubegrid_recon::{
    run, BucketKind, PipelineConfig, PipelineError, PipelineInput, PipelineResult, RunOptions,
};

use crate::exit_codes::EXIT_DIAGNOSTICS;
use crate::CliError;

const USER_CONFIG_FILE: &str = "pipeline.toml";

pub struct RunArgs {
    pub files: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub sort: bool,
    pub case_insensitive: bool,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub strict: bool,
    pub quiet: bool,
}

// ============================================================================
// Config resolution
// ============================================================================

/// `<config dir>/lubegrid/pipeline.toml`, if the platform has a config dir.
fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lubegrid").join(USER_CONFIG_FILE))
}

fn read_config(path: &Path) -> Result<PipelineConfig, PipelineError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| PipelineError::Io(format!("cannot read {}: {e}", path.display())))?;
    PipelineConfig::from_toml(&text)
}

/// Explicit path, then the per-user file, then built-in defaults.
fn resolve_config(explicit: Option<&Path>) -> Result<PipelineConfig, CliError> {
    if let Some(path) = explicit {
        log::debug!("using config {}", path.display());
        return read_config(path).map_err(CliError::from);
    }

    match user_config_path() {
        Some(path) if path.is_file() => {
            log::debug!("using user config {}", path.display());
            read_config(&path).map_err(|e| {
                CliError::from(e).with_hint(format!("fix or remove {}", path.display()))
            })
        }
        _ => Ok(PipelineConfig::default()),
    }
}

// ============================================================================
// run
// ============================================================================

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = resolve_config(args.config.as_deref())?;

    let mut options = RunOptions::from(&config.options);
    if args.sort {
        options.preserve_order = false;
    }
    if args.case_insensitive {
        options.case_insensitive = true;
    }

    let tables = lubegrid_io::csv::load_tables(&args.files).map_err(CliError::io)?;
    let input = PipelineInput { tables, options };
    let result = run(&config, &input);

    if args.json || args.output.is_some() {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = args.output {
            std::fs::write(path, &json_str)
                .map_err(|e| CliError::io(format!("cannot write output: {e}")))?;
            if !args.quiet {
                eprintln!("wrote {}", path.display());
            }
        }

        if args.json {
            println!("{json_str}");
        }
    }

    if let Some(ref dir) = args.export_dir {
        let written = export_all(dir, &config, &result)?;
        if !args.quiet {
            eprintln!("exported {} file(s) to {}", written, dir.display());
        }
    }

    if !args.quiet {
        print_summary(&result);
    }

    if args.strict && !result.diagnostics.is_empty() {
        return Err(CliError {
            code: EXIT_DIAGNOSTICS,
            message: format!("{} diagnostic(s) reported", result.diagnostics.len()),
            hint: Some("check the identifier and status column names in [columns]".to_string()),
        });
    }

    Ok(())
}

fn export_all(dir: &Path, config: &PipelineConfig, result: &PipelineResult) -> Result<usize, CliError> {
    if dir.is_file() {
        return Err(CliError::args(format!("{} is a file, not a directory", dir.display())));
    }
    std::fs::create_dir_all(dir)
        .map_err(|e| CliError::io(format!("cannot create {}: {e}", dir.display())))?;

    let mut views: Vec<(String, &[lubegrid_recon::ClassifiedRecord])> = vec![
        ("combined".to_string(), result.combined.as_slice()),
        ("done".to_string(), result.done.as_slice()),
        ("todo".to_string(), result.todo.as_slice()),
    ];
    views.extend(
        result
            .buckets
            .iter()
            .map(|b| (b.kind.name().to_string(), b.records.as_slice())),
    );

    for (name, records) in &views {
        let path = dir.join(format!("{name}.csv"));
        lubegrid_io::export::write_bucket_csv(&path, &result.schema, config, records)
            .map_err(CliError::io)?;
    }
    Ok(views.len())
}

fn print_summary(result: &PipelineResult) {
    let s = &result.summary;
    eprintln!(
        "{} row(s) from {} file(s): {} record(s), {} duplicate(s) removed",
        s.total_rows, result.meta.file_count, s.combined, s.duplicates_removed,
    );
    eprintln!(
        "done {}, to-do {}, critical {}, complicated {}",
        s.done, s.todo, s.critical, s.complicated,
    );
    let buckets: Vec<String> = BucketKind::ALL
        .iter()
        .map(|kind| format!("{} {}", kind.name(), s.bucket_counts.get(kind.name()).copied().unwrap_or(0)))
        .collect();
    eprintln!("buckets: {}", buckets.join(", "));

    for diagnostic in &result.diagnostics {
        eprintln!("warning: {diagnostic}");
    }
}

// ============================================================================
// schema
// ============================================================================

pub fn cmd_schema(files: Vec<PathBuf>, json: bool) -> Result<(), CliError> {
    let tables = lubegrid_io::csv::load_tables(&files).map_err(CliError::io)?;
    let (schema, sources) = unify(&tables);

    if json {
        let json_str = serde_json::to_string_pretty(&schema)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    for (idx, column) in schema.columns().iter().enumerate() {
        println!("{}\t{}", idx + 1, column.internal_key);
    }
    let skipped = tables.len() - sources.len();
    eprintln!(
        "{} column(s) from {} file(s){}",
        schema.len(),
        sources.len(),
        if skipped > 0 {
            format!(", {skipped} empty file(s) skipped")
        } else {
            String::new()
        },
    );
    Ok(())
}

// ============================================================================
// validate / config
// ============================================================================

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    eprintln!(
        "config OK: identifier '{}', status '{}', {} condition(s), {} feature(s)",
        config.columns.identifier,
        config.columns.status,
        config.conditions.len(),
        config.features.len(),
    );
    Ok(())
}

pub fn cmd_config(show_path: bool) -> Result<(), CliError> {
    if show_path {
        let path = user_config_path()
            .ok_or_else(|| CliError::general("no config directory on this platform"))?;
        println!("{}", path.display());
        return Ok(());
    }

    let toml_str = PipelineConfig::default().to_toml()?;
    print!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn explicit_config_is_parsed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("site.toml");
        fs::write(&path, "[columns]\nidentifier = \"Tag\"\n").unwrap();

        let config = resolve_config(Some(&path)).unwrap();
        assert_eq!(config.columns.identifier, "Tag");
        assert_eq!(config.columns.status, "Done?");
    }

    #[test]
    fn missing_config_is_io_error() {
        let dir = tempdir().unwrap();
        let err = resolve_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_IO);
        assert!(err.message.contains("nope.toml"));
    }

    #[test]
    fn invalid_config_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[options]\nmax_occurrences = 0\n").unwrap();

        let err = resolve_config(Some(&path)).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_INVALID_CONFIG);
        assert!(err.hint.is_some());
    }
}
