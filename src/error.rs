//! Error taxonomy for a single add-file run.
//!
//! Every variant here is fatal to the run and maps to exit status 1, except
//! help/version output carried inside [`AddFileError::Cli`]. Per-domain trigger
//! failures are not errors at this level; they are reported and the run
//! continues.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AddFileError {
    /// Option-level parse failures, plus `--help`/`--version` output.
    #[error(transparent)]
    Cli(#[from] clap::Error),

    /// Too few arguments to describe any useful run.
    #[error("insufficient arguments")]
    Usage,

    #[error("'{0}' is an invalid domain ID")]
    InvalidDomainId(String),

    /// `--name`/`--mime` given before any `--add-file`.
    #[error("Please set {0} after an add-file token")]
    MisplacedOverride(&'static str),

    #[error("Could not execute '{candidate}' ({tool}): {reason}")]
    ToolNotFound {
        tool: String,
        candidate: String,
        reason: String,
    },

    #[error("invalid tool configuration: {0}")]
    Config(String),

    #[error("Could not execute '{program}': {io}")]
    Spawn { program: String, io: std::io::Error },
}

pub type Result<T> = std::result::Result<T, AddFileError>;

impl AddFileError {
    /// Process exit status for a run that ended with this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AddFileError::Cli(err) if !err.use_stderr() => 0,
            _ => 1,
        }
    }
}
