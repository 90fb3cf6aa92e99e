use std::ffi::OsStr;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, info, instrument};

use crate::error::{Result, TriageError};

/// Path to the `git` executable and the directory it runs in.
#[derive(Clone)]
pub struct GitRunner {
    /// The path to the Git executable on disk.
    pub path_to_git: PathBuf,

    /// The working directory that the Git executable should be run in.
    pub working_directory: PathBuf,
}

impl fmt::Debug for GitRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<GitRunner path_to_git={:?} working_directory={:?}>",
            self.path_to_git, self.working_directory
        )
    }
}

/// Options for invoking Git.
#[derive(Clone, Copy, Debug)]
pub struct GitRunOpts {
    /// If set, a non-zero exit code is returned as [`TriageError::Execution`].
    pub treat_git_failure_as_error: bool,

    /// If set, the command line is logged at `info` instead of `debug`.
    pub echo: bool,
}

impl Default for GitRunOpts {
    fn default() -> Self {
        Self {
            treat_git_failure_as_error: true,
            echo: false,
        }
    }
}

impl GitRunOpts {
    pub fn echoed() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    pub fn allow_failure() -> Self {
        Self {
            treat_git_failure_as_error: false,
            ..Self::default()
        }
    }
}

/// The captured result of one Git invocation.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

impl GitRunner {
    pub fn new(working_directory: impl Into<PathBuf>) -> Self {
        Self {
            path_to_git: PathBuf::from("git"),
            working_directory: working_directory.into(),
        }
    }

    /// Run Git and fail on a non-zero exit code.
    pub fn run<S: AsRef<OsStr> + fmt::Debug>(&self, args: &[S]) -> Result<GitOutput> {
        self.run_with(args, GitRunOpts::default())
    }

    #[instrument(skip(self))]
    pub fn run_with<S: AsRef<OsStr> + fmt::Debug>(
        &self,
        args: &[S],
        opts: GitRunOpts,
    ) -> Result<GitOutput> {
        let command_string = self.render(args);
        if opts.echo {
            info!("{}", command_string);
        } else {
            debug!("running {}", command_string);
        }

        let output = Command::new(&self.path_to_git)
            .current_dir(&self.working_directory)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| TriageError::Spawn {
                command: command_string.clone(),
                source,
            })?;

        // A process killed by a signal has no exit code; report it as 1.
        let result = GitOutput {
            exit_code: output.status.code().unwrap_or(1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if opts.treat_git_failure_as_error && !result.is_success() {
            return Err(TriageError::Execution {
                command: command_string,
                code: result.exit_code,
                stdout: result.stdout,
                stderr: result.stderr,
            });
        }
        Ok(result)
    }

    fn render<S: AsRef<OsStr>>(&self, args: &[S]) -> String {
        let mut rendered = self.path_to_git.to_string_lossy().into_owned();
        for arg in args {
            rendered.push(' ');
            rendered.push_str(&arg.as_ref().to_string_lossy());
        }
        rendered
    }
}
