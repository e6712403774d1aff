use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, SlidesmithError};

const TEMPLATE_EXTENSIONS: &[&str] = &["pptx", "potx"];

/// Keep ASCII alphanumerics, `.`, `-` and `_`; spaces become `_`, leading dots go.
///
/// Returns `None` when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            _ => None,
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Whether `name` carries a template extension (`.pptx` or `.potx`, any case).
pub fn allowed_template(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            TEMPLATE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Directory holding per-request uploads and rendered decks.
#[derive(Debug, Clone)]
pub struct TempWorkspace {
    root: PathBuf,
}

impl TempWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write an uploaded template and return a guard that deletes it.
    ///
    /// Files without a template extension are skipped and `Ok(None)` is returned.
    pub async fn save_template(&self, file_name: &str, bytes: &[u8]) -> Result<Option<TempFile>> {
        if !allowed_template(file_name) {
            debug!(file_name, "Ignoring upload without a template extension");
            return Ok(None);
        }

        let sanitized = sanitize_filename(file_name).ok_or_else(|| {
            SlidesmithError::Validation(format!("Invalid template filename: {file_name}"))
        })?;

        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(format!(
            "upload_{}_{}_{}",
            std::process::id(),
            nanoid::nanoid!(10),
            sanitized
        ));
        tokio::fs::write(&path, bytes).await?;

        debug!(path = %path.display(), size = bytes.len(), "Saved template upload");
        Ok(Some(TempFile::new(path)))
    }
}

/// Removes the wrapped file when dropped.
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
}

impl TempFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed temp file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove temp file"),
        }
    }
}
