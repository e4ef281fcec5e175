//! Resolving note paths and writing notes to disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use clipmark_core::error::AppError;
use clipmark_core::models::ExtractedPage;
use clipmark_core::template::Template;
use clipmark_core::util::{render_filename, sanitize_filename, slugify};

use crate::config::{expand_tilde, Config};

const MAX_FILENAME_LENGTH: usize = 120;

/// Resolve an explicit `-o` folder: absolute and `~` paths as given,
/// otherwise relative to the current directory.
pub fn resolve_output_folder(folder: &str) -> Result<PathBuf, AppError> {
    let path = expand_tilde(folder);
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

/// Resolve a template's folder: absolute paths as given, otherwise relative
/// to the vault.
pub fn resolve_template_folder(folder: &str, vault: &Path) -> Result<PathBuf, AppError> {
    let path = expand_tilde(folder);
    let path = if path.is_absolute() {
        path
    } else {
        vault.join(path)
    };
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

/// Render the note filename from the template's pattern.
pub fn note_filename(page: &ExtractedPage, template: &Template, config: &Config) -> String {
    let date = Local::now().format(&config.filename_date_format).to_string();
    let slug = slugify(&page.title);
    let rendered = render_filename(
        &template.filename,
        &[
            ("title", page.title.as_str()),
            ("date", date.as_str()),
            ("slug", slug.as_str()),
            ("domain", page.domain.as_str()),
        ],
    );
    format!("{}.md", sanitize_filename(&rendered, MAX_FILENAME_LENGTH))
}

/// Append " (1)", " (2)", ... until the path does not exist yet.
pub fn unique_filepath(base: PathBuf) -> PathBuf {
    if !base.exists() {
        return base;
    }
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled")
        .to_string();
    let parent = base.parent().unwrap_or(Path::new(".")).to_path_buf();

    let mut counter = 1;
    loop {
        let candidate = parent.join(format!("{stem} ({counter}).md"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Write a note atomically: temp file in the target directory, then rename.
pub fn write_note(path: &Path, content: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path)
        .map_err(|e| AppError::Io(e.error))?;
    Ok(())
}
