use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{info, instrument, warn};

use crate::commit::Commit;
use crate::error::{Result, TriageError};
use crate::repository::Repository;
use crate::runner::GitRunOpts;

/// Marker for a partial cherry-pick in progress, owned by this tool.
pub const PARTIAL_PICK_MARKER: &str = "CHERRY_TRIAGE_PARTIAL";

/// Git's own cherry-pick marker. Written next to ours so that a manual
/// `git commit` credits the original author; git deletes it after committing.
pub const GIT_CHERRY_PICK_HEAD: &str = "CHERRY_PICK_HEAD";

/// Message file used when committing a partial cherry-pick.
pub const PARTIAL_PICK_MESSAGE: &str = "CHERRY_TRIAGE_MSG";

/// Cherry-pick result information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CherryPickResult {
    /// The commit that was picked.
    pub source: String,
    /// The commit created on the current branch, if one was created.
    pub created: Option<String>,
    pub message: String,
}

/// Cherry-pick operations for a repository
pub struct CherryPickOps<'repo> {
    repo: &'repo Repository,
}

impl<'repo> CherryPickOps<'repo> {
    pub fn new(repo: &'repo Repository) -> Self {
        CherryPickOps { repo }
    }

    fn marker_path(&self) -> PathBuf {
        self.repo.git_dir().join(PARTIAL_PICK_MARKER)
    }

    fn git_marker_path(&self) -> PathBuf {
        self.repo.git_dir().join(GIT_CHERRY_PICK_HEAD)
    }

    fn message_path(&self) -> PathBuf {
        self.repo.git_dir().join(PARTIAL_PICK_MESSAGE)
    }

    fn head_id(&self) -> Result<String> {
        let output = self.repo.runner().run(&["rev-parse", "HEAD"])?;
        Ok(output.stdout.trim().to_string())
    }

    /// Cherry-pick a single commit, recording its origin in the message.
    #[instrument(skip(self))]
    pub fn pick_commit(&self, id: &str) -> Result<CherryPickResult> {
        self.repo
            .runner()
            .run_with(&["cherry-pick", "-x", id], GitRunOpts::echoed())?;
        let created = self.head_id()?;
        Ok(CherryPickResult {
            source: id.to_string(),
            message: format!("Cherry-picked {} as {}", short(id), short(&created)),
            created: Some(created),
        })
    }

    /// Apply a commit to the index and working tree without committing,
    /// then leave the marker so the pick can be finished later.
    #[instrument(skip(self))]
    pub fn pick_partial(&self, id: &str) -> Result<CherryPickResult> {
        self.repo
            .runner()
            .run_with(&["cherry-pick", "-x", "-n", id], GitRunOpts::echoed())?;

        for marker in [self.marker_path(), self.git_marker_path()] {
            fs::write(&marker, format!("{id}\n")).map_err(|err| TriageError::io(&marker, err))?;
        }
        info!(id, "recorded partial cherry-pick");

        Ok(CherryPickResult {
            source: id.to_string(),
            created: None,
            message: format!(
                "Staged {}; adjust the changes and commit them to finish",
                short(id)
            ),
        })
    }

    /// Id recorded in the marker, if a partial cherry-pick is unfinished.
    pub fn pending_partial(&self) -> Result<Option<String>> {
        let marker = self.marker_path();
        match fs::read_to_string(&marker) {
            Ok(content) => {
                let id = content.trim();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(TriageError::io(&marker, err)),
        }
    }

    /// Forget the partial cherry-pick. Git's marker is only removed while it
    /// still names the same commit. Missing markers are fine.
    pub fn clear_partial(&self) -> Result<()> {
        if let Some(id) = self.pending_partial()? {
            let git_marker = self.git_marker_path();
            if let Ok(content) = fs::read_to_string(&git_marker) {
                if content.trim() == id {
                    remove_if_present(git_marker)?;
                }
            }
        }
        remove_if_present(self.marker_path())
    }

    /// Commit whatever is staged as the finished partial pick of `original`.
    #[instrument(skip(self, original), fields(id = %original.id))]
    pub fn commit_partial(&self, original: &Commit) -> Result<CherryPickResult> {
        let message_path = self.message_path();
        let message = format!(
            "{}\n\n(cherry picked from commit {})\n",
            original.message, original.id
        );
        fs::write(&message_path, message).map_err(|err| TriageError::io(&message_path, err))?;

        let mut args = vec![
            "commit".to_string(),
            "-F".to_string(),
            message_path.to_string_lossy().into_owned(),
        ];
        if let Some(author) = &original.author {
            args.push("--author".to_string());
            args.push(author.to_string());
        }
        let committed = self.repo.runner().run_with(&args, GitRunOpts::echoed());

        // The message file is ours to clean up whether or not the commit worked.
        if let Err(err) = remove_if_present(message_path) {
            warn!("{}", err);
        }
        committed?;
        self.clear_partial()?;

        let created = self.head_id()?;
        Ok(CherryPickResult {
            source: original.id.clone(),
            message: format!(
                "Committed partial cherry-pick of {} as {}",
                original.short_id(),
                short(&created)
            ),
            created: Some(created),
        })
    }
}

fn remove_if_present(path: PathBuf) -> Result<()> {
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(TriageError::io(path, err)),
    }
}

fn short(id: &str) -> &str {
    &id[..id.len().min(8)]
}
