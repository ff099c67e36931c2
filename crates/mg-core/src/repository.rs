//! Migration script discovery
//!
//! Scripts are files in a single directory whose extension is one of the
//! configured script extensions. Each file becomes a [`MigrationScript`]
//! with an identity (file stem without leading zeros), an order key (the
//! leading `<digits>_` prefix), the declared target database from a `USE`
//! line, and the raw content.

use crate::error::{CoreError, CoreResult};
use crate::names::ScriptIdentity;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// A migration script read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationScript {
    /// Name matched against the ledger
    pub identity: ScriptIdentity,

    /// Numeric prefix of the file name, 0 when absent
    pub order_key: i64,

    /// Database named by a leading `USE <name>` line
    pub target_database: Option<String>,

    /// Full file content
    pub content: String,

    /// Path the script was read from
    pub path: PathBuf,
}

impl MigrationScript {
    /// Build a script from its file name and content.
    ///
    /// Returns `None` when the file stem is empty or made only of zeros.
    pub fn from_parts(path: PathBuf, content: String) -> Option<Self> {
        let stem = path.file_stem().and_then(|s| s.to_str())?;
        let identity = ScriptIdentity::from_stem(stem)?;
        let order_key = parse_order_key(stem);
        let target_database = detect_target_database(&content);
        Some(Self {
            identity,
            order_key,
            target_database,
            content,
            path,
        })
    }

    /// Whether the script declares its own target database
    pub fn is_cross_database(&self) -> bool {
        self.target_database.is_some()
    }
}

/// Half-open window `[start, stop)` over order keys.
///
/// A `stop` of zero or below leaves the window unbounded above.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptRange {
    pub start: i64,
    pub stop: i64,
}

impl ScriptRange {
    /// Create a range from CLI-style bounds
    pub fn new(start: i64, stop: i64) -> Self {
        Self { start, stop }
    }

    /// Check whether an order key falls inside the window
    pub fn contains(&self, order_key: i64) -> bool {
        order_key >= self.start && (self.stop <= 0 || order_key < self.stop)
    }
}

fn order_prefix_re() -> &'static Regex {
    static ORDER_PREFIX: OnceLock<Regex> = OnceLock::new();
    ORDER_PREFIX.get_or_init(|| Regex::new(r"^([0-9]+)_").expect("valid regex literal"))
}

fn use_database_re() -> &'static Regex {
    static USE_DATABASE: OnceLock<Regex> = OnceLock::new();
    USE_DATABASE.get_or_init(|| {
        Regex::new(
            r#"(?i)^\s*use\s+((?:[A-Za-z0-9_]+|\[[^\]]+\]|"[^"]+")(?:\.(?:[A-Za-z0-9_]+|\[[^\]]+\]|"[^"]+"))*)\s*;?\s*$"#,
        )
        .expect("valid regex literal")
    })
}

/// Extract the order key from a file stem (`001_init` gives 1).
///
/// Stems without a `<digits>_` prefix, and prefixes too large for an
/// `i64`, yield 0.
pub fn parse_order_key(stem: &str) -> i64 {
    let Some(caps) = order_prefix_re().captures(stem) else {
        return 0;
    };
    match caps[1].parse::<i64>() {
        Ok(n) => n,
        Err(e) => {
            log::warn!("Cannot extract script number from '{}': {}", stem, e);
            0
        }
    }
}

/// Detect a `USE <database>` statement on the first non-blank line.
///
/// The name may be dotted (`catalog.schema`) and each part may be quoted
/// with `[...]` or `"..."`; quotes are dropped from the result. A leading
/// byte order mark is ignored.
pub fn detect_target_database(content: &str) -> Option<String> {
    let first = strip_bom(content)
        .lines()
        .find(|line| !line.trim().is_empty())?;
    use_database_re()
        .captures(first)
        .map(|caps| caps[1].replace(['[', ']', '"'], ""))
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{FEFF}').unwrap_or(content)
}

/// Load the scripts in `dir` whose order key falls in `range`.
///
/// Files with other extensions are ignored; unreadable files are logged and
/// skipped. A script that is not valid UTF-8 fails the whole load with
/// [`CoreError::ScriptNotUtf8`]. The result is sorted by `(order_key, identity)`. Two selected
/// files with the same identity are rejected with
/// [`CoreError::DuplicateIdentity`].
pub fn load_scripts(
    dir: &Path,
    extensions: &[String],
    range: ScriptRange,
) -> CoreResult<Vec<MigrationScript>> {
    let entries = std::fs::read_dir(dir).map_err(|e| CoreError::DirectoryUnreadable {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut scripts = Vec::new();
    let mut seen: HashMap<ScriptIdentity, PathBuf> = HashMap::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Cannot read entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if path.is_dir() {
            continue;
        }

        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|s| s.eq_ignore_ascii_case(ext)));
        if !supported {
            log::debug!("Skipping file with unsupported extension: {}", path.display());
            continue;
        }

        let order_key = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map_or(0, parse_order_key);
        if !range.contains(order_key) {
            log::debug!(
                "Skipping {} (number {} outside range)",
                path.display(),
                order_key
            );
            continue;
        }

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Skipping unreadable script {}: {}", path.display(), e);
                continue;
            }
        };
        let content = match String::from_utf8(bytes) {
            Ok(content) => strip_bom(&content).to_string(),
            Err(e) => {
                return Err(CoreError::ScriptNotUtf8 {
                    path: path.display().to_string(),
                    source: e.utf8_error(),
                })
            }
        };

        let Some(script) = MigrationScript::from_parts(path.clone(), content) else {
            log::warn!(
                "Skipping {}: file name does not yield a script identity",
                path.display()
            );
            continue;
        };

        if let Some(first) = seen.get(&script.identity) {
            return Err(CoreError::DuplicateIdentity {
                identity: script.identity.to_string(),
                first: first.display().to_string(),
                second: path.display().to_string(),
            });
        }
        seen.insert(script.identity.clone(), path);
        scripts.push(script);
    }

    sort_scripts(&mut scripts);
    Ok(scripts)
}

/// Sort scripts by order key, then identity.
pub fn sort_scripts(scripts: &mut [MigrationScript]) {
    scripts.sort_by(|a, b| {
        a.order_key
            .cmp(&b.order_key)
            .then_with(|| a.identity.cmp(&b.identity))
    });
}

#[cfg(test)]
#[path = "repository_test.rs"]
mod tests;
