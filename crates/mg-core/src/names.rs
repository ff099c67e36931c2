//! Strongly-typed names used across the workspace.

use crate::newtype_string::define_checked_string;

define_checked_string! {
    /// Canonical name of a migration script, matched against ledger rows.
    ///
    /// Derived from the file name with its extension and leading zeros
    /// removed (`001_init.sql` becomes `1_init`).
    pub struct ScriptIdentity where is_non_empty, "non-empty";
}

define_checked_string! {
    /// Name of the ledger table, optionally schema-qualified (`ops.versions`).
    ///
    /// Restricted to plain SQL identifiers because it is interpolated into
    /// the ledger DDL and queries.
    pub struct LedgerTable where is_plain_identifier_path, "one or two dot-separated identifiers ([A-Za-z_][A-Za-z0-9_]*)";
}

impl ScriptIdentity {
    /// Derive the identity from a file stem: leading `0` characters are
    /// stripped so that `001_init` and a ledger row `1_init` match.
    pub fn from_stem(stem: &str) -> Option<Self> {
        Self::try_new(stem.trim_start_matches('0'))
    }
}

impl Default for LedgerTable {
    fn default() -> Self {
        Self(crate::config::DEFAULT_LEDGER_TABLE.to_string())
    }
}

fn is_non_empty(s: &str) -> bool {
    !s.is_empty()
}

fn is_plain_identifier_path(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    parts.len() <= 2 && parts.iter().all(|p| is_plain_identifier(p))
}

fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
