use std::collections::HashSet;
use std::fmt;

/// Everything the triage loop accumulates while it runs.
#[derive(Debug, Clone, Default)]
pub struct TriageState {
    /// Ids the user ignored, in this run or an earlier one.
    pub ignored: HashSet<String>,

    /// Ids already cherry-picked into the head branch.
    pub cherry_picked: HashSet<String>,

    pub tally: Tally,
}

impl TriageState {
    pub fn new(ignored: HashSet<String>, cherry_picked: HashSet<String>) -> Self {
        Self {
            ignored,
            cherry_picked,
            tally: Tally::default(),
        }
    }

    /// Whether `id` must not be offered for review.
    pub fn is_excluded(&self, id: &str) -> bool {
        self.ignored.contains(id) || self.cherry_picked.contains(id)
    }
}

/// Per-run counts of what happened to each reviewed commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub skipped: usize,
    pub ignored: usize,
    pub picked: usize,
    pub partially_picked: usize,
    pub failed: usize,
}

impl Tally {
    pub fn reviewed(&self) -> usize {
        self.skipped + self.ignored + self.picked + self.partially_picked + self.failed
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} reviewed: {} skipped, {} ignored, {} cherry-picked, {} partially cherry-picked, {} failed",
            self.reviewed(),
            self.skipped,
            self.ignored,
            self.picked,
            self.partially_picked,
            self.failed
        )
    }
}
