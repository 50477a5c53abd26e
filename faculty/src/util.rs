use std::path::{Path, PathBuf};

/// Returns the workspace root, i.e. the parent of this crate's manifest
/// directory.
///
/// Resolved at compile time, so a relocated binary still points at the
/// tree it was built from.
pub fn workspace_dir() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

/// Directory holding `default.toml` and the per-environment overrides.
pub fn config_dir() -> PathBuf {
    workspace_dir().join("configs")
}
