//! Workspace discovery.
//!
//! File enumeration only. No project model is built here; the semantic
//! provider owns that. The heuristic cross-file search just needs a flat
//! list of source files under the root with the usual build-output and
//! VCS noise filtered away.

use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::InitializeParams;
use tracing::debug;
use walkdir::WalkDir;

const EXCLUDED_DIRS: &[&str] = &["bin", "obj", ".git", "node_modules"];
const SOURCE_EXTENSIONS: &[&str] = &["vb", "bas"];
const PROJECT_EXTENSIONS: &[&str] = &["vbproj", "sln"];

/// The workspace root the client advertised, from `rootUri` first and
/// the first workspace folder otherwise.
pub fn root_from_initialize(params: &InitializeParams) -> Option<PathBuf> {
    #[allow(deprecated)]
    let root_uri = params.root_uri.as_ref();
    root_uri
        .and_then(|uri| uri.to_file_path().ok())
        .or_else(|| {
            params
                .workspace_folders
                .as_ref()?
                .first()?
                .uri
                .to_file_path()
                .ok()
        })
}

fn is_excluded_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED_DIRS.iter().any(|ex| name.eq_ignore_ascii_case(ex)))
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|s| ext.eq_ignore_ascii_case(s)))
}

fn files_with_extensions(root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && has_extension(entry.path(), extensions))
        .map(|entry| entry.into_path())
        .collect()
}

/// All source files under `root`, in directory-walk order.
pub fn source_files(root: &Path) -> Vec<PathBuf> {
    let files = files_with_extensions(root, SOURCE_EXTENSIONS);
    debug!(root = %root.display(), count = files.len(), "enumerated workspace source files");
    files
}

/// Project and solution files under `root`. Discovery only; nothing
/// reads their contents. An empty result means single-file mode.
pub fn project_files(root: &Path) -> Vec<PathBuf> {
    let files = files_with_extensions(root, PROJECT_EXTENSIONS);
    debug!(root = %root.display(), count = files.len(), "enumerated workspace project files");
    files
}
