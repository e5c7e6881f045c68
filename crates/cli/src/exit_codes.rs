//! CLI Exit Code Registry
//!
//! Single source of truth for the exit codes of `csvdedupe` and `csvlink`.
//! Scripts rely on them.
//!
//! | Code | Meaning                                               |
//! |------|-------------------------------------------------------|
//! | 0    | Success                                               |
//! | 2    | Usage error (bad args, bad config file)               |
//! | 3    | I/O error (unreadable input, unwritable output)       |
//! | 4    | Malformed input (no header, bad resolution file)      |
//! | 5    | Requested field missing from the header               |
//! | 6    | Resolution result references a row that doesn't exist |

use csvdedupe_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options, bad config file.
pub const EXIT_USAGE: u8 = 2;

/// Input unreadable or output unwritable.
pub const EXIT_IO: u8 = 3;

/// Table without header, unparsable CSV, or malformed resolution file.
pub const EXIT_MALFORMED: u8 = 4;

/// A field named on the command line or in config is absent from the header.
pub const EXIT_MISSING_FIELD: u8 = 5;

/// A cluster or pair points past the end of its table.
pub const EXIT_DANGLING: u8 = 6;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::Io { .. } => EXIT_IO,
        ReconError::MalformedInput { .. } | ReconError::ResolutionFile(_) => EXIT_MALFORMED,
        ReconError::Csv(e) if e.is_io_error() => EXIT_IO,
        ReconError::Csv(_) => EXIT_MALFORMED,
        ReconError::MissingField { .. } => EXIT_MISSING_FIELD,
        ReconError::DanglingReference { .. } => EXIT_DANGLING,
    }
}
