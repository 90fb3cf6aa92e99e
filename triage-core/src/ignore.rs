use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TriageError};

/// Append-only list of commit ids the user never wants to see again for one
/// `(upstream, head)` pair.
#[derive(Debug, Clone)]
pub struct IgnoreStore {
    path: PathBuf,
}

impl IgnoreStore {
    pub fn new(state_dir: &Path, upstream: &str, head: &str) -> Self {
        Self {
            path: ignore_file_path(state_dir, upstream, head),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the ignored ids. A missing file is an empty set.
    pub fn load(&self) -> Result<HashSet<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(err) => return Err(TriageError::io(&self.path, err)),
        };

        let ids: HashSet<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        debug!(path = %self.path.display(), count = ids.len(), "loaded ignore list");
        Ok(ids)
    }

    /// Add `id` to the end of the file.
    pub fn append(&self, id: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| TriageError::io(parent, err))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| TriageError::io(&self.path, err))?;
        writeln!(file, "{}", id).map_err(|err| TriageError::io(&self.path, err))?;
        Ok(())
    }
}

/// `<state_dir>/<upstream>_<head>.ignored`, with ref names escaped so that
/// slashes stay inside one file name and `_` only ever separates the pair.
pub fn ignore_file_path(state_dir: &Path, upstream: &str, head: &str) -> PathBuf {
    state_dir.join(format!(
        "{}_{}.ignored",
        escape_ref_name(upstream),
        escape_ref_name(head)
    ))
}

fn escape_ref_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '/' => escaped.push_str("%2F"),
            '\\' => escaped.push_str("%5C"),
            '_' => escaped.push_str("%5F"),
            c => escaped.push(c),
        }
    }
    escaped
}
