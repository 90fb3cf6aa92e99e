//! Parsers for the text `git` prints.
//!
//! Every parser here is line-oriented and tolerant: a line that does not have
//! the expected shape is dropped instead of failing the whole parse.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::commit::{Author, Commit};

static AUTHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(.*?)\s*<(.*?)>\s*$").expect("valid author regex"));

// ` path | 12 ++--`, ` path | 0` or ` image.png | Bin 0 -> 42 bytes`
static CHANGED_FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ (\S.*?)\s+\|\s+(?:\d+(?:\s+[+-]*)?|Bin\b.*)$").expect("valid stat regex")
});

static CHERRY_PICKED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"cherry picked from commit (\w+)\)$").expect("valid trailer regex")
});

const BODY_INDENT: &str = "    ";

/// Parse `name <email>`.
pub fn parse_author(raw: &str) -> Option<Author> {
    let captures = AUTHOR_RE.captures(raw)?;
    Some(Author {
        name: captures[1].to_string(),
        email: captures[2].to_string(),
    })
}

/// Path named by one line of a `--stat` block.
pub fn parse_changed_file(line: &str) -> Option<&str> {
    CHANGED_FILE_RE
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|path| path.as_str().trim())
}

fn is_changed_file(line: &str) -> bool {
    CHANGED_FILE_RE.is_match(line)
}

/// Parse the output of `git show --stat --format=medium <id>`.
///
/// Returns `None` if the output does not start with a `commit <id>` line.
pub fn parse_commit_details(output: &str) -> Option<Commit> {
    let mut lines = output.lines().skip_while(|line| line.trim().is_empty());

    let id = lines
        .next()?
        .strip_prefix("commit ")?
        .split_whitespace()
        .next()?
        .to_string();

    // Header lines run up to the first blank line.
    let mut author = None;
    for line in lines.by_ref() {
        if line.trim().is_empty() {
            break;
        }
        if let Some(raw) = line.strip_prefix("Author:") {
            author = parse_author(raw);
        }
    }

    let rest: Vec<&str> = lines.collect();
    let files_start = rest
        .iter()
        .position(|line| is_changed_file(line))
        .unwrap_or(rest.len());
    let (message_lines, stat_lines) = rest.split_at(files_start);

    let message_lines: Vec<&str> = message_lines
        .iter()
        .map(|line| line.strip_prefix(BODY_INDENT).unwrap_or(line))
        .collect();
    let message = trim_blank_lines(&message_lines).join("\n");

    // The summary line never matches, so it falls out here.
    let files = stat_lines
        .iter()
        .filter_map(|line| parse_changed_file(line))
        .map(str::to_string)
        .collect();

    Some(Commit {
        id,
        author,
        message,
        files,
    })
}

fn trim_blank_lines<'a>(lines: &'a [&'a str]) -> &'a [&'a str] {
    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(start, |index| index + 1);
    &lines[start..end]
}

/// Parse one line of `git cherry` output into `(already_present, id)`.
pub fn parse_cherry_line(line: &str) -> Option<(bool, &str)> {
    let mut tokens = line.split_whitespace();
    let sign = tokens.next()?;
    let id = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    Some((sign == "-", id))
}

/// Ids listed by `git cherry` that have no equivalent in the other branch,
/// in the order they were listed.
pub fn parse_missing_commits(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(parse_cherry_line)
        .filter(|(already_present, _)| !already_present)
        .map(|(_, id)| id.to_string())
        .collect()
}

/// Id recorded by a `(cherry picked from commit <id>)` trailer.
pub fn parse_cherry_picked_trailer(line: &str) -> Option<&str> {
    CHERRY_PICKED_RE
        .captures(line.trim_end())
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

/// Every id recorded by a cherry-pick trailer in `output`.
pub fn parse_cherry_picked_ids(output: &str) -> impl Iterator<Item = &str> {
    output.lines().filter_map(parse_cherry_picked_trailer)
}

/// Trimmed, non-empty lines of `git show --name-only` output.
pub fn parse_overview(output: &str) -> Vec<&str> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Whether `git status --porcelain` reported nothing.
pub fn is_clean_status(output: &str) -> bool {
    output.lines().all(|line| line.trim().is_empty())
}
