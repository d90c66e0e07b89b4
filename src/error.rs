// Error taxonomy for the labeling library.
// The binary wraps these in `anyhow` with extra context; the library keeps
// them typed so callers (and tests) can tell an aborted session apart from a
// failed load or save.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while loading, labeling or saving a dataset.
#[derive(Debug, Error)]
pub enum LabelError {
    /// The dataset could not be opened or parsed.
    #[error("failed to load dataset {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The column holding the tweet text is not in the header.
    #[error("dataset {path} has no `{column}` column")]
    MissingColumn { path: PathBuf, column: String },

    /// The annotator typed something that is not an integer.
    #[error("row {row}: `{input}` is not an integer label")]
    InvalidAnswer { row: usize, input: String },

    /// The annotator pressed Ctrl+C before every row was labeled.
    #[error("annotation interrupted at row {row}")]
    Interrupted { row: usize },

    /// Input ended (EOF on piped stdin) before every row was labeled.
    #[error("input closed at row {row}")]
    InputClosed { row: usize },

    /// Reading from or writing to the terminal failed.
    #[error("terminal I/O failed: {0}")]
    Prompt(#[from] io::Error),

    /// The augmented dataset could not be written back.
    #[error("failed to save dataset {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The config file exists but could not be read or parsed.
    #[error("invalid config file {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// The labels were already written (e.g. by the Ctrl+C handler).
    #[error("session was already finalized")]
    AlreadyFinalized,

    /// Another thread panicked while holding the pending session state.
    #[error("session state is unavailable (lock poisoned)")]
    StatePoisoned,
}

pub type Result<T> = std::result::Result<T, LabelError>;
