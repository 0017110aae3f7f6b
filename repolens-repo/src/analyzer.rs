//! Tree analysis
//!
//! Pure computation over a tree listing; runs inside the worker pool.

use regex::Regex;
use repolens_core::{TreeAnalysisResult, TreeEntry};
use std::sync::LazyLock;

static CONFIG_FILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.ya?ml$").expect("valid config file pattern"));

/// Whether `path` looks like a YAML configuration file
pub fn is_config_file(path: &str) -> bool {
    CONFIG_FILE_PATTERN.is_match(path)
}

/// Compute total blob size, blob count and the first configuration file path
///
/// Entries are visited in the given order. Only blobs count; sizes that are
/// missing, non-positive or non-finite contribute nothing. The first YAML path
/// wins and is never replaced by a later one.
pub fn analyze_tree(entries: &[TreeEntry]) -> TreeAnalysisResult {
    let mut result = TreeAnalysisResult::default();

    for entry in entries.iter().filter(|entry| entry.is_blob()) {
        result.file_count += 1;

        if let Some(size) = entry.size_bytes.filter(|size| size.is_finite() && *size > 0.0) {
            result.total_bytes = result.total_bytes.saturating_add(size as u64);
        }

        if result.config_file_path.is_none() {
            if let Some(path) = entry.path.as_deref().filter(|path| is_config_file(path)) {
                result.config_file_path = Some(path.to_string());
            }
        }
    }

    result
}
