use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TriageError>;

#[derive(Debug, Error)]
pub enum TriageError {
    /// `git` ran but exited with a non-zero status.
    #[error(
        "Failed to execute '{command}'.\nError code {code}.\nOutput: {stdout}\nError: {stderr}"
    )]
    Execution {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    /// `git` could not be started at all.
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("No git repository found from {}", path.display())]
    NotARepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error(
        "No reviewer identity configured: pass --author, set CHERRY_TRIAGE_AUTHOR, \
         or set `cherry-triage.author` / `user.email` in git config"
    )]
    MissingAuthor,

    #[error("Could not parse `git show` output for commit {0}")]
    UnparseableCommit(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading a prompt answer or writing to the terminal failed.
    #[error("Terminal I/O failed: {0}")]
    Terminal(#[source] io::Error),
}

impl TriageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TriageError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from a `git` invocation that ran and failed.
    pub fn is_execution(&self) -> bool {
        matches!(self, TriageError::Execution { .. })
    }

    /// Whether a prompt was cut short by Ctrl-C. Raw-mode prompts read it as
    /// a key, so it never reaches the signal handler.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, TriageError::Terminal(err) if err.kind() == io::ErrorKind::Interrupted)
    }
}
