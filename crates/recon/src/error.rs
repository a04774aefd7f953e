use std::fmt;

/// Failures at the edges of the pipeline. The pipeline itself never fails:
/// missing columns and odd values degrade into diagnostics and defaults.
#[derive(Debug)]
pub enum PipelineError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty column name, bad limit, etc.).
    ConfigValidation(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for PipelineError {}
