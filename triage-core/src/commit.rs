use std::fmt;

/// Author of a commit as printed by `git show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// A commit parsed from one `git show --stat` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: String,
    /// `None` when the author line did not look like `name <email>`.
    pub author: Option<Author>,
    pub message: String,
    pub files: Vec<String>,
}

impl Commit {
    /// Whether the author's email contains `marker`.
    pub fn is_authored_by(&self, marker: &str) -> bool {
        self.author
            .as_ref()
            .map_or(false, |author| author.email.contains(marker))
    }

    /// Short form of the id, for display.
    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(8)]
    }
}
