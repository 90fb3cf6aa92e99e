use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TriageError};
use crate::ignore::IgnoreStore;
use crate::repository::Repository;

/// Git config key checked for the reviewer marker before `user.email`.
pub const AUTHOR_CONFIG_KEY: &str = "cherry-triage.author";

/// File holding the id of the commit currently under review.
pub const REVIEW_MARKER_FILE: &str = "commit_to_review";

/// Settings for one triage run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriageConfig {
    /// Branch the candidate commits come from.
    pub upstream: String,
    /// Branch the commits are picked onto.
    pub head: String,
    /// Substring of the author email that marks the reviewer's commits.
    pub author_marker: String,
    /// Where the ignore list and review marker live.
    pub state_dir: PathBuf,
}

impl TriageConfig {
    /// Build a config, filling in the reviewer marker and state dir when
    /// they were not given explicitly.
    pub fn resolve(
        repo: &Repository,
        upstream: String,
        head: String,
        author_marker: Option<String>,
        state_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let author_marker = match author_marker.filter(|marker| !marker.is_empty()) {
            Some(marker) => marker,
            None => reviewer_from_git_config(repo)?,
        };
        let state_dir = state_dir.unwrap_or_else(std::env::temp_dir);
        debug!(%author_marker, state_dir = %state_dir.display(), "resolved configuration");

        Ok(TriageConfig {
            upstream,
            head,
            author_marker,
            state_dir,
        })
    }

    pub fn ignore_store(&self) -> IgnoreStore {
        IgnoreStore::new(&self.state_dir, &self.upstream, &self.head)
    }

    pub fn review_marker_path(&self) -> PathBuf {
        self.state_dir.join(REVIEW_MARKER_FILE)
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }
}

fn reviewer_from_git_config(repo: &Repository) -> Result<String> {
    for key in [AUTHOR_CONFIG_KEY, "user.email"] {
        if let Some(value) = repo.config_value(key)? {
            debug!(key, "reviewer marker taken from git config");
            return Ok(value);
        }
    }
    Err(TriageError::MissingAuthor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestRepo;
    use pretty_assertions::assert_eq;

    fn resolve(test_repo: &TestRepo, author: Option<&str>) -> Result<TriageConfig> {
        let repo = Repository::discover(test_repo.path()).unwrap();
        TriageConfig::resolve(
            &repo,
            "upstream".to_string(),
            "downstream".to_string(),
            author.map(String::from),
            Some(test_repo.path().join("state")),
        )
    }

    #[test]
    fn test_explicit_author_wins() {
        let test_repo = TestRepo::new();
        let config = resolve(&test_repo, Some("doe")).unwrap();
        assert_eq!(config.author_marker, "doe");
    }

    #[test]
    fn test_author_falls_back_to_user_email() {
        let test_repo = TestRepo::new();
        let config = resolve(&test_repo, None).unwrap();
        assert_eq!(config.author_marker, "tester@example.com");
    }

    #[test]
    fn test_author_prefers_dedicated_config_key() {
        let test_repo = TestRepo::new();
        test_repo
            .repo
            .config()
            .unwrap()
            .set_str(AUTHOR_CONFIG_KEY, "jane.doe")
            .unwrap();
        let config = resolve(&test_repo, Some("")).unwrap();
        assert_eq!(config.author_marker, "jane.doe");
    }

    #[test]
    fn test_paths_live_in_state_dir() {
        let test_repo = TestRepo::new();
        let config = resolve(&test_repo, Some("doe")).unwrap();
        let state_dir = test_repo.path().join("state");
        assert_eq!(config.review_marker_path(), state_dir.join("commit_to_review"));
        assert_eq!(
            config.ignore_store().path(),
            state_dir.join("upstream_downstream.ignored")
        );
    }
}
