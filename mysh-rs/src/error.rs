use std::ffi::NulError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction { Input, Output }

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Direction::Input => f.write_str("input"), Direction::Output => f.write_str("output") }
    }
}

#[derive(Debug, Error)]
pub enum ShellError {
    // -------- abandon the current invocation --------
    #[error("Invalid pipe syntax")]
    InvalidPipe,
    #[error("No file specified for {0} redirection")]
    MissingRedirectTarget(Direction),
    #[error("Error opening file for {direction} redirection: {path}: {source}")]
    RedirectOpen { direction: Direction, path: String, #[source] source: io::Error },
    #[error("argument contains a NUL byte: {0}")]
    Nul(#[from] NulError),

    // -------- advisory, reported by built-ins --------
    #[error("cd: Invalid number of arguments")]
    CdUsage,
    #[error("cd: no previous directory")]
    NoPreviousDir,
    #[error("cd failed: {}: {source}", .path.display())]
    Chdir { path: PathBuf, #[source] source: io::Error },
    #[error("getcwd failed: {0}")]
    Getcwd(#[source] io::Error),
    #[error("which: missing command name")]
    WhichUsage,
    #[error("which: {0} not found")]
    WhichNotFound(String),
    #[error("write failed: {0}")]
    Output(#[from] io::Error),

    // -------- the shell cannot go on --------
    #[error("Fork failed: {0}")]
    Fork(#[source] nix::Error),
    #[error("Pipe failed: {0}")]
    Pipe(#[source] nix::Error),
    #[error("Wait failed: {0}")]
    Wait(#[source] nix::Error),
}

impl ShellError {
    /// Process or pipe table exhaustion; everything else is print-and-continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Fork(_) | ShellError::Pipe(_) | ShellError::Wait(_))
    }
}

pub type Result<T> = std::result::Result<T, ShellError>;
