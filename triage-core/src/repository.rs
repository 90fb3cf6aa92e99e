use std::collections::HashSet;
use std::path::{Path, PathBuf};

use git2::Repository as Git2Repository;
use tracing::{debug, instrument};

use crate::cherry_pick::{CherryPickOps, CherryPickResult};
use crate::commit::Commit;
use crate::error::{Result, TriageError};
use crate::parse;
use crate::runner::{GitOutput, GitRunOpts, GitRunner};

const CHERRY_PICK_TRAILER: &str = "cherry picked from commit";

// Print non-ASCII paths as-is instead of C-quoting them.
const UNQUOTED_PATHS: [&str; 2] = ["-c", "core.quotePath=false"];

/// A git repository driven through the `git` executable.
///
/// `libgit2` is only used to locate the metadata directory; every operation
/// that reads or changes history runs `git` in a subprocess.
pub struct Repository {
    git_dir: PathBuf,
    runner: GitRunner,
}

impl Repository {
    /// Find the repository containing `path`.
    #[instrument]
    pub fn discover(path: &Path) -> Result<Self> {
        let git_repo =
            Git2Repository::discover(path).map_err(|source| TriageError::NotARepository {
                path: path.to_path_buf(),
                source,
            })?;
        let git_dir = git_repo.path().to_path_buf();
        let workdir = git_repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| git_dir.clone());
        debug!(git_dir = %git_dir.display(), workdir = %workdir.display(), "found repository");

        Ok(Repository {
            git_dir,
            runner: GitRunner::new(workdir),
        })
    }

    /// The `.git` directory.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn runner(&self) -> &GitRunner {
        &self.runner
    }

    fn git<S: AsRef<std::ffi::OsStr> + std::fmt::Debug>(&self, args: &[S]) -> Result<GitOutput> {
        self.runner.run(args)
    }

    /// Parse `git show --stat` for one commit.
    #[instrument(skip(self))]
    pub fn commit_details(&self, id: &str) -> Result<Commit> {
        let output = self.git(&[
            UNQUOTED_PATHS[0],
            UNQUOTED_PATHS[1],
            "show",
            "--no-color",
            "--format=medium",
            "--stat=4096",
            id,
        ])?;
        parse::parse_commit_details(&output.stdout)
            .ok_or_else(|| TriageError::UnparseableCommit(id.to_string()))
    }

    /// Header, message and touched paths of a commit, ready for display.
    #[instrument(skip(self))]
    pub fn commit_overview(&self, id: &str) -> Result<Vec<String>> {
        let output = self.git(&[
            UNQUOTED_PATHS[0],
            UNQUOTED_PATHS[1],
            "show",
            "--no-color",
            "--format=medium",
            "--name-only",
            id,
        ])?;
        Ok(parse::parse_overview(&output.stdout)
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Commits reachable from `upstream` with no equivalent change in `head`,
    /// in the order `git cherry` lists them.
    #[instrument(skip(self))]
    pub fn missing_commits(&self, upstream: &str, head: &str) -> Result<Vec<String>> {
        let output = self
            .runner
            .run_with(&["cherry", head, upstream], GitRunOpts::echoed())?;
        Ok(parse::parse_missing_commits(&output.stdout))
    }

    /// Ids recorded by `(cherry picked from commit ...)` trailers in `head`.
    #[instrument(skip(self))]
    pub fn cherry_picked_ids(&self, head: &str) -> Result<HashSet<String>> {
        let output = self.runner.run_with(
            &[
                "log",
                "--no-color",
                "--format=%B",
                "--fixed-strings",
                "--grep",
                CHERRY_PICK_TRAILER,
                head,
            ],
            GitRunOpts::echoed(),
        )?;
        Ok(parse::parse_cherry_picked_ids(&output.stdout)
            .map(str::to_string)
            .collect())
    }

    /// Name of the checked-out branch, or `None` when `HEAD` is detached or
    /// unborn.
    #[instrument(skip(self))]
    pub fn current_branch(&self) -> Result<Option<String>> {
        let output = self.runner.run_with(
            &["rev-parse", "--abbrev-ref", "HEAD"],
            GitRunOpts::allow_failure(),
        )?;
        if !output.is_success() {
            return Ok(None);
        }
        let name = output.stdout.trim();
        Ok((!name.is_empty() && name != "HEAD").then(|| name.to_string()))
    }

    /// Whether there is nothing staged, modified or untracked.
    pub fn is_clean(&self) -> Result<bool> {
        let output = self.git(&["status", "--porcelain"])?;
        Ok(parse::is_clean_status(&output.stdout))
    }

    /// Value of a git config key, or `None` if it is unset.
    #[instrument(skip(self))]
    pub fn config_value(&self, key: &str) -> Result<Option<String>> {
        let output = self
            .runner
            .run_with(&["config", "--get", key], GitRunOpts::allow_failure())?;
        match output.exit_code {
            0 => {
                let value = output.stdout.trim();
                Ok((!value.is_empty()).then(|| value.to_string()))
            }
            // `git config --get` exits with 1 when the key is missing.
            1 => Ok(None),
            code => Err(TriageError::Execution {
                command: format!("git config --get {key}"),
                code,
                stdout: output.stdout,
                stderr: output.stderr,
            }),
        }
    }

    // Cherry-pick operations

    /// Cherry-pick `id` and commit it with a provenance trailer.
    pub fn cherry_pick(&self, id: &str) -> Result<CherryPickResult> {
        CherryPickOps::new(self).pick_commit(id)
    }

    /// Cherry-pick `id` into the index only and record it as in progress.
    pub fn partial_cherry_pick(&self, id: &str) -> Result<CherryPickResult> {
        CherryPickOps::new(self).pick_partial(id)
    }

    /// Id of an unfinished partial cherry-pick, if any.
    pub fn pending_partial_pick(&self) -> Result<Option<String>> {
        CherryPickOps::new(self).pending_partial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestRepo, JANE};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_discover_outside_repository_fails() {
        let temp_dir = TempDir::new().unwrap();
        let err = Repository::discover(temp_dir.path()).err().unwrap();
        assert!(matches!(err, TriageError::NotARepository { .. }));
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let test_repo = TestRepo::new();
        let nested = test_repo.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let repo = Repository::discover(&nested).unwrap();
        assert!(repo.git_dir().ends_with(".git"));
        assert!(repo.git_dir().is_dir());
    }

    #[test]
    fn test_missing_commits_in_listing_order() {
        let (test_repo, ids) = TestRepo::with_diverged_branches();
        let repo = Repository::discover(test_repo.path()).unwrap();
        assert_eq!(
            repo.missing_commits("upstream", "downstream").unwrap(),
            ids.to_vec()
        );
        assert!(repo.missing_commits("downstream", "upstream").unwrap().is_empty());
    }

    #[test]
    fn test_commit_details() {
        let (test_repo, ids) = TestRepo::with_diverged_branches();
        let repo = Repository::discover(test_repo.path()).unwrap();

        let commit = repo.commit_details(&ids[2]).unwrap();
        assert_eq!(commit.id, ids[2]);
        let author = commit.author.clone().unwrap();
        assert_eq!((author.name.as_str(), author.email.as_str()), JANE);
        assert_eq!(commit.message, "Add c\n\nWith a body.");
        assert_eq!(commit.files, vec!["c.txt".to_string()]);
    }

    #[test]
    fn test_commit_details_keeps_non_ascii_paths() {
        let test_repo = TestRepo::new();
        let id = test_repo.commit_file("日本.txt", "konnichiwa\n", "Add greeting", JANE);
        let repo = Repository::discover(test_repo.path()).unwrap();

        let commit = repo.commit_details(&id).unwrap();
        assert_eq!(commit.files, vec!["日本.txt".to_string()]);
        let overview = repo.commit_overview(&id).unwrap();
        assert_eq!(overview.last().unwrap(), "日本.txt");
    }

    #[test]
    fn test_commit_details_unknown_id_is_execution_error() {
        let test_repo = TestRepo::new();
        let repo = Repository::discover(test_repo.path()).unwrap();
        let err = repo
            .commit_details("0000000000000000000000000000000000000000")
            .unwrap_err();
        assert!(err.is_execution());
    }

    #[test]
    fn test_commit_overview() {
        let (test_repo, ids) = TestRepo::with_diverged_branches();
        let repo = Repository::discover(test_repo.path()).unwrap();
        let overview = repo.commit_overview(&ids[0]).unwrap();
        assert_eq!(overview[0], format!("commit {}", ids[0]));
        assert!(overview.iter().any(|line| line == "Add a"));
        assert_eq!(overview.last().unwrap(), "a.txt");
    }

    #[test]
    fn test_cherry_picked_ids() {
        let test_repo = TestRepo::new();
        test_repo.commit_file(
            "x.txt",
            "x\n",
            "Port x\n\n(cherry picked from commit 0123456789abcdef0123456789abcdef01234567)\n",
            JANE,
        );
        let repo = Repository::discover(test_repo.path()).unwrap();
        let ids = repo.cherry_picked_ids("HEAD").unwrap();
        assert_eq!(
            ids,
            ["0123456789abcdef0123456789abcdef01234567".to_string()]
                .into_iter()
                .collect::<HashSet<String>>()
        );
    }

    #[test]
    fn test_current_branch() {
        let (test_repo, _) = TestRepo::with_diverged_branches();
        let repo = Repository::discover(test_repo.path()).unwrap();
        assert_eq!(repo.current_branch().unwrap().as_deref(), Some("downstream"));

        test_repo.checkout("upstream");
        assert_eq!(repo.current_branch().unwrap().as_deref(), Some("upstream"));

        let head = test_repo.head_id();
        test_repo.detach_head(&head);
        assert_eq!(repo.current_branch().unwrap(), None);
    }

    #[test]
    fn test_is_clean() {
        let test_repo = TestRepo::new();
        let repo = Repository::discover(test_repo.path()).unwrap();
        assert!(repo.is_clean().unwrap());

        test_repo.write_file("untracked.txt", "new\n");
        assert!(!repo.is_clean().unwrap());
    }

    #[test]
    fn test_config_value() {
        let test_repo = TestRepo::new();
        let repo = Repository::discover(test_repo.path()).unwrap();
        assert_eq!(
            repo.config_value("user.email").unwrap().as_deref(),
            Some("tester@example.com")
        );
        assert_eq!(repo.config_value("cherry-triage.no-such-key").unwrap(), None);
    }
}
