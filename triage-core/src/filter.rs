use crate::commit::Commit;
use crate::state::TriageState;

/// Decides which missing commits are offered for review.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    author_marker: String,
}

impl CandidateFilter {
    pub fn new(author_marker: impl Into<String>) -> Self {
        Self {
            author_marker: author_marker.into(),
        }
    }

    /// Drop ids that are ignored or already picked, keeping the listing order.
    ///
    /// This runs before any per-commit `git show`.
    pub fn pending(&self, missing: Vec<String>, state: &TriageState) -> Vec<String> {
        missing
            .into_iter()
            .filter(|id| !state.is_excluded(id))
            .collect()
    }

    pub fn is_candidate(&self, commit: &Commit, state: &TriageState) -> bool {
        commit.is_authored_by(&self.author_marker) && !state.is_excluded(&commit.id)
    }
}
