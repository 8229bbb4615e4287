//! Reading and rewriting `package.config`
//!
//! `package.config` is a plain text file of `key=value` lines with no quoting,
//! escaping, or comments. Keys are matched by line prefix, so a lookup for
//! `name` also matches a `names=` line. Line order is preserved across edits
//! apart from appended and deleted keys.
//!
//! # Examples
//!
//! ```no_run
//! use knightos::ConfigStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ConfigStore::new("package.config");
//!
//! store.set("dependencies", "core/init core/corelib")?;
//! assert_eq!(store.get("dependencies").as_deref(), Some("core/init core/corelib"));
//!
//! // An empty value removes the key
//! store.set("dependencies", "")?;
//! assert_eq!(store.get("dependencies"), None);
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// The project config filename
pub const PACKAGE_CONFIG_NAME: &str = "package.config";

/// Line-oriented `key=value` store backed by a single file
///
/// There is no locking. Concurrent writers race and the last one wins, and a
/// crash during `set` can leave a truncated file behind.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up `key`, reporting I/O failures to the caller
    ///
    /// Returns the trimmed text after the first `=` of the first line that
    /// starts with `key`. Matching lines without an `=` are skipped.
    pub fn read(&self, key: &str) -> io::Result<Option<String>> {
        let file = fs::File::open(&self.path)?;
        for line in BufReader::new(file).lines() {
            let line = line?;
            if !line.starts_with(key) {
                continue;
            }
            if let Some((_, value)) = line.split_once('=') {
                return Ok(Some(value.trim().to_string()));
            }
        }
        Ok(None)
    }

    /// Look up `key`, treating any I/O failure as an absent value
    ///
    /// This is the "optional config" policy: a missing or unreadable
    /// `package.config` simply has no keys.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.read(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "config read failed; treating as absent");
                None
            }
        }
    }

    /// Set `key` to `value`, rewriting the file
    ///
    /// Every line starting with `key` becomes `key=value`; if none exists a
    /// new line is appended. An empty `value` deletes every line for `key`.
    /// Unlike [`get`](Self::get), failure to read the file is an error.
    pub fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let content = fs::read_to_string(&self.path)?;
        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();

        let entry = format!("{}={}", key, value);
        let mut found = false;
        for line in lines.iter_mut() {
            if line.starts_with(key) {
                *line = entry.clone();
                found = true;
            }
        }
        if !found {
            lines.push(entry);
        }

        if value.is_empty() {
            lines.retain(|l| !l.starts_with(key));
        }

        let mut output = String::with_capacity(content.len() + key.len() + value.len() + 2);
        for line in &lines {
            output.push_str(line);
            output.push('\n');
        }
        fs::write(&self.path, output)
    }
}
