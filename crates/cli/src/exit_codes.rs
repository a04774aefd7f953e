//! CLI Exit Code Registry
//!
//! Single source of truth for `lgrid` exit codes. Scripts depend on them.
//!
//! # Exit Codes
//!
//! | Code | Domain    | Description                                      |
//! |------|-----------|--------------------------------------------------|
//! | 0    | Universal | Success                                          |
//! | 1    | Universal | General error (unspecified)                      |
//! | 2    | Universal | Usage error (bad args, no input files)           |
//! | 3    | run       | Cannot read an input file or write an output     |
//! | 4    | config    | Config file cannot be parsed or fails validation |
//! | 5    | run       | Diagnostics were emitted and `--strict` was set  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant below
//! 2. Document what triggers it
//! 3. Update the table above

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Pipeline (3-5)
// =============================================================================

/// An input survey could not be read, or an output could not be written.
pub const EXIT_IO: u8 = 3;

/// The pipeline config is malformed or invalid.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// The run completed but reported diagnostics (missing identifier or
/// status column) under `--strict`. Output is still written.
pub const EXIT_DIAGNOSTICS: u8 = 5;
