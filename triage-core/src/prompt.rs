use std::fmt;

use dialoguer::{Confirm, Input};

use crate::error::{Result, TriageError};

/// What to do with the commit under review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Skip,
    Ignore,
    CherryPick,
    PartialCherryPick,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::Skip,
        Action::Ignore,
        Action::CherryPick,
        Action::PartialCherryPick,
    ];

    /// Single-character code typed by the user.
    pub fn code(self) -> char {
        match self {
            Action::Skip => 's',
            Action::Ignore => 'i',
            Action::CherryPick => 'c',
            Action::PartialCherryPick => 'p',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Skip => "(s)kip",
            Action::Ignore => "(i)gnore",
            Action::CherryPick => "(c)herry-pick",
            Action::PartialCherryPick => "(p)artial cherry-pick",
        }
    }

    pub fn from_code(input: &str) -> Option<Action> {
        let mut chars = input.trim().chars();
        let code = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        Action::ALL.into_iter().find(|action| action.code() == code)
    }

    /// `(s)kip|(i)gnore|(c)herry-pick|(p)artial cherry-pick`
    pub fn menu() -> String {
        Action::ALL
            .iter()
            .map(|action| action.label())
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The questions the triage loop asks.
pub trait Prompter {
    /// Wait until the user says they dealt with a dirty working tree.
    fn acknowledge_dirty_tree(&mut self) -> Result<()>;

    /// Ask until one of the [`Action`] codes is entered.
    fn choose_action(&mut self) -> Result<Action>;

    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn acknowledge_dirty_tree(&mut self) -> Result<()> {
        Input::<String>::new()
            .with_prompt("Type ENTER when ready to continue...")
            .allow_empty(true)
            .interact_text()
            .map_err(TriageError::Terminal)?;
        Ok(())
    }

    fn choose_action(&mut self) -> Result<Action> {
        let answer = Input::<String>::new()
            .with_prompt(format!("Command: {}", Action::menu()))
            .validate_with(|input: &String| -> std::result::Result<(), String> {
                match Action::from_code(input) {
                    Some(_) => Ok(()),
                    None => Err(format!("expected one of {}", Action::menu())),
                }
            })
            .interact_text()
            .map_err(TriageError::Terminal)?;

        // The validator only lets known codes through.
        Action::from_code(&answer).ok_or_else(|| {
            TriageError::Terminal(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("unknown command {answer:?}"),
            ))
        })
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
            .map_err(TriageError::Terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(Action::from_code("s"), Some(Action::Skip));
        assert_eq!(Action::from_code("i"), Some(Action::Ignore));
        assert_eq!(Action::from_code(" c\n"), Some(Action::CherryPick));
        assert_eq!(Action::from_code("p"), Some(Action::PartialCherryPick));
        assert_eq!(Action::from_code(""), None);
        assert_eq!(Action::from_code("skip"), None);
        assert_eq!(Action::from_code("x"), None);
        assert_eq!(Action::from_code("S"), None);
    }

    #[test]
    fn test_menu() {
        assert_eq!(
            Action::menu(),
            "(s)kip|(i)gnore|(c)herry-pick|(p)artial cherry-pick"
        );
    }
}
