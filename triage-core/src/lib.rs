//! Triage commits that exist upstream but are missing from a local branch.
//!
//! All version-control work is done by the `git` executable; this crate
//! decides which commits to show, remembers the user's decisions and runs
//! the cherry-picks.

pub mod error;
pub mod runner;
pub mod commit;
pub mod parse;
pub mod state;
pub mod filter;
pub mod ignore;
pub mod repository;
pub mod cherry_pick;
pub mod config;
pub mod prompt;
pub mod session;

#[cfg(test)]
mod testing;

pub use error::{Result, TriageError};
pub use runner::{GitOutput, GitRunOpts, GitRunner};
pub use commit::{Author, Commit};
pub use state::{Tally, TriageState};
pub use filter::CandidateFilter;
pub use ignore::IgnoreStore;
pub use repository::Repository;
pub use cherry_pick::{CherryPickOps, CherryPickResult};
pub use config::TriageConfig;
pub use prompt::{Action, Prompter, TerminalPrompter};
pub use session::Session;
