//! The interactive triage loop.
//!
//! Each candidate goes through the same steps: record it in the review
//! marker, wait for a clean working tree, show it, ask what to do and do it.
//! All accumulated state lives in a [`TriageState`] that is passed from one
//! commit to the next.

use std::fs;
use std::io::Write;

use tracing::{debug, info, warn};

use crate::cherry_pick::CherryPickOps;
use crate::config::TriageConfig;
use crate::error::{Result, TriageError};
use crate::filter::CandidateFilter;
use crate::ignore::IgnoreStore;
use crate::prompt::{Action, Prompter};
use crate::repository::Repository;
use crate::state::TriageState;

const RULE_WIDTH: usize = 79;

pub struct Session<'a, P, W> {
    repo: &'a Repository,
    config: &'a TriageConfig,
    filter: CandidateFilter,
    ignore_store: IgnoreStore,
    prompter: P,
    out: W,
}

impl<'a, P: Prompter, W: Write> Session<'a, P, W> {
    pub fn new(repo: &'a Repository, config: &'a TriageConfig, prompter: P, out: W) -> Self {
        Session {
            repo,
            config,
            filter: CandidateFilter::new(config.author_marker.clone()),
            ignore_store: config.ignore_store(),
            prompter,
            out,
        }
    }

    /// Ignore list from disk plus the ids already picked into head.
    pub fn load_state(&self) -> Result<TriageState> {
        let ignored = self.ignore_store.load()?;
        let cherry_picked = self.repo.cherry_picked_ids(&self.config.head)?;
        info!(
            ignored = ignored.len(),
            cherry_picked = cherry_picked.len(),
            "loaded triage state"
        );
        Ok(TriageState::new(ignored, cherry_picked))
    }

    /// Review every candidate once and return the final state.
    pub fn run(&mut self) -> Result<TriageState> {
        if let Some(id) = self.repo.pending_partial_pick()? {
            self.say(format_args!(
                "Warning: the partial cherry-pick of {id} has not been committed yet"
            ))?;
        }
        self.warn_if_head_not_checked_out()?;

        let state = self.load_state()?;
        let missing = self
            .repo
            .missing_commits(&self.config.upstream, &self.config.head)?;
        let pending = self.filter.pending(missing, &state);
        debug!(count = pending.len(), "commits left after exclusions");

        let state = pending
            .iter()
            .try_fold(state, |state, id| self.review(state, id))?;

        self.say(format_args!("Done. {}", state.tally))?;
        Ok(state)
    }

    fn review(&mut self, mut state: TriageState, id: &str) -> Result<TriageState> {
        // An earlier decision in this run may have excluded it.
        if state.is_excluded(id) {
            return Ok(state);
        }
        let commit = self.repo.commit_details(id)?;
        if !self.filter.is_candidate(&commit, &state) {
            debug!(id, author = ?commit.author, "not a candidate");
            return Ok(state);
        }

        self.say(format_args!("{}", "=".repeat(RULE_WIDTH)))?;
        self.say(format_args!("save state for: {id}"))?;
        self.save_review_marker(id)?;
        self.await_clean_tree()?;

        for line in self.repo.commit_overview(id)? {
            self.say(format_args!("{line}"))?;
        }
        self.say(format_args!(""))?;

        match self.prompter.choose_action()? {
            Action::Skip => {
                self.say(format_args!("Skip {id}"))?;
                state.tally.skipped += 1;
            }
            Action::Ignore => {
                self.ignore_store.append(id)?;
                state.ignored.insert(id.to_string());
                state.tally.ignored += 1;
            }
            Action::CherryPick => match self.repo.cherry_pick(id) {
                Ok(result) => {
                    self.say(format_args!("{}", result.message))?;
                    state.cherry_picked.insert(id.to_string());
                    state.tally.picked += 1;
                }
                Err(err) => {
                    self.report_failed_pick(id, err)?;
                    state.tally.failed += 1;
                }
            },
            Action::PartialCherryPick => match self.repo.partial_cherry_pick(id) {
                Ok(result) => {
                    self.say(format_args!("{}", result.message))?;
                    state.tally.partially_picked += 1;
                }
                Err(err) => {
                    self.report_failed_pick(id, err)?;
                    state.tally.failed += 1;
                }
            },
        }
        Ok(state)
    }

    /// Block until `git status` is clean, offering to commit an unfinished
    /// partial cherry-pick along the way.
    fn await_clean_tree(&mut self) -> Result<()> {
        let ops = CherryPickOps::new(self.repo);
        loop {
            let pending = ops.pending_partial()?;
            if self.repo.is_clean()? {
                if let Some(id) = pending {
                    warn!(id = %id, "removing stale partial cherry-pick marker");
                    ops.clear_partial()?;
                }
                return Ok(());
            }

            if let Some(id) = pending {
                let question = format!("Commit the partial cherry-pick of {id} now?");
                if self.prompter.confirm(&question)? {
                    let original = self.repo.commit_details(&id)?;
                    match ops.commit_partial(&original) {
                        Ok(result) => self.say(format_args!("{}", result.message))?,
                        Err(err) if err.is_execution() => self.say(format_args!("{err}"))?,
                        Err(err) => return Err(err),
                    }
                    continue;
                }
            }

            self.say(format_args!("Seems like your working directory is not clean"))?;
            self.prompter.acknowledge_dirty_tree()?;
        }
    }

    /// Picks land on the checked-out branch, but the already-picked ids are
    /// read from `head`.
    fn warn_if_head_not_checked_out(&mut self) -> Result<()> {
        let config = self.config;
        let head = &config.head;
        let checked_out = match self.repo.current_branch()? {
            Some(branch) if branch == *head => return Ok(()),
            Some(branch) => format!("{branch} is checked out"),
            None => "HEAD is detached".to_string(),
        };
        warn!(head = %head, "head branch is not checked out");
        self.say(format_args!(
            "Warning: {checked_out}, but cherry-picks are meant for {head}"
        ))
    }

    /// A failed `git cherry-pick` is reported and the loop moves on.
    fn report_failed_pick(&mut self, id: &str, err: TriageError) -> Result<()> {
        if !err.is_execution() {
            return Err(err);
        }
        warn!(id, "cherry-pick failed");
        self.say(format_args!("{err}"))
    }

    fn save_review_marker(&self, id: &str) -> Result<()> {
        let path = self.config.review_marker_path();
        fs::create_dir_all(self.config.state_dir())
            .and_then(|()| fs::write(&path, id))
            .map_err(|err| TriageError::io(&path, err))
    }

    fn say(&mut self, args: std::fmt::Arguments<'_>) -> Result<()> {
        writeln!(self.out, "{args}").map_err(TriageError::Terminal)
    }

    /// The output stream, mostly useful to inspect it in tests.
    pub fn into_output(self) -> W {
        self.out
    }
}
