//! Working-directory allowlist and environment filtering.

use std::path::{Path, PathBuf};

/// True iff `cwd` resolves inside one of the allowlisted roots.
///
/// Symlinks are resolved on both sides before comparing, and matching
/// respects path-component boundaries: root `/tmp/foo` admits `/tmp/foo`
/// and `/tmp/foo/sub` but never `/tmp/foobar`. An unresolvable cwd (e.g.
/// nonexistent) is outside every root; unresolvable roots are skipped.
pub fn is_within_roots(cwd: &Path, roots: &[PathBuf]) -> bool {
    let Ok(resolved_cwd) = std::fs::canonicalize(cwd) else {
        return false;
    };
    roots.iter().any(|root| match std::fs::canonicalize(root) {
        Ok(resolved_root) => resolved_cwd.starts_with(&resolved_root),
        Err(_) => false,
    })
}

/// The child environment: exactly the allowlisted variable names that are
/// set in the bridge's own environment, nothing else.
pub fn filtered_env(allowlist: &[String]) -> Vec<(String, String)> {
    allowlist
        .iter()
        .filter_map(|key| std::env::var(key).ok().map(|value| (key.clone(), value)))
        .collect()
}
