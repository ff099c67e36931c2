//! Splitting script content into executable batches.
//!
//! A batch ends at a line that, once trimmed, equals the batch separator
//! (case-insensitive). The separator line itself belongs to no batch.

/// The T-SQL batch separator understood by sqlcmd and SSMS.
pub const DEFAULT_BATCH_SEPARATOR: &str = "GO";

/// Split `content` into batches on lines equal to `separator`.
///
/// Non-separator lines are copied verbatim, line endings included; a final
/// line without a line ending gets `\n` appended so every batch is a
/// sequence of complete lines. Empty batches produced by a leading
/// separator or by two consecutive separators are kept in place. Lines
/// after the last separator form a trailing batch; nothing after a final
/// separator produces no batch.
///
/// # Examples
/// ```
/// use mg_core::splitter::split_batches;
/// assert_eq!(split_batches("A\nGO\nB", "GO"), vec!["A\n", "B\n"]);
/// assert_eq!(split_batches("SELECT 1;\n", "GO"), vec!["SELECT 1;\n"]);
/// ```
pub fn split_batches(content: &str, separator: &str) -> Vec<String> {
    let mut batches = Vec::new();
    let mut current = String::new();
    let mut pending = false;

    for line in content.split_inclusive('\n') {
        if line.trim().eq_ignore_ascii_case(separator) {
            batches.push(std::mem::take(&mut current));
            pending = false;
            continue;
        }
        current.push_str(line);
        if !line.ends_with('\n') {
            current.push('\n');
        }
        pending = true;
    }

    if pending {
        batches.push(current);
    }
    batches
}

/// Whether a batch contains nothing but whitespace.
///
/// Such batches are kept by [`split_batches`] but are no-ops when executed.
pub fn is_blank_batch(batch: &str) -> bool {
    batch.trim().is_empty()
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
