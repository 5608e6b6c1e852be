//! Workspace layout helpers.

use std::path::PathBuf;

/// Name of the per-project workspace directory.
pub const WORKSPACE_DIR: &str = ".aptrank";

/// Directory where embedding models are cached.
///
/// Models are shared across workspaces, so they live under the user's home
/// directory rather than inside the project's workspace directory.
pub fn models_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(WORKSPACE_DIR).join("models"))
        .unwrap_or_else(|| PathBuf::from(WORKSPACE_DIR).join("models"))
}
