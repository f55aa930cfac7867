//! Filesystem side of job creation: reading dropped paths, loading file
//! content and encoding the multipart form.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chunkycloud_core::assets::{
    flatten_entries, locate_description, AssetMatcher, DroppedEntry, FileSource, SceneFile,
};
use chunkycloud_core::submission::{FormValue, JobSubmission};
use reqwest::multipart::{Form, Part};

/// Load the full content of a file.
pub async fn read_content(file: &SceneFile) -> io::Result<Bytes> {
    match file.source() {
        FileSource::Path(path) => tokio::fs::read(path).await.map(Bytes::from),
        FileSource::Memory(content) => Ok(content.clone()),
    }
}

/// Turn dropped paths into entries.
///
/// Directories are listed one level deep. Their subdirectories appear as
/// empty [`DroppedEntry::Directory`] placeholders. Children are sorted by
/// name so a drop always produces the same order.
pub async fn read_dropped(paths: &[PathBuf]) -> io::Result<Vec<DroppedEntry>> {
    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let metadata = tokio::fs::metadata(path).await?;
        if metadata.is_dir() {
            entries.push(DroppedEntry::Directory {
                name: entry_name(path),
                entries: list_directory(path).await?,
            });
        } else {
            entries.push(DroppedEntry::File(SceneFile::from_path(path)));
        }
    }
    Ok(entries)
}

async fn list_directory(dir: &Path) -> io::Result<Vec<DroppedEntry>> {
    let mut children = Vec::new();
    let mut reader = tokio::fs::read_dir(dir).await?;
    while let Some(child) = reader.next_entry().await? {
        let path = child.path();
        if child.file_type().await?.is_dir() {
            children.push(DroppedEntry::Directory {
                name: entry_name(&path),
                entries: Vec::new(),
            });
        } else {
            children.push(DroppedEntry::File(SceneFile::from_path(path)));
        }
    }
    children.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(children)
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Flatten a drop and feed it to the matcher.
///
/// The description's content is read before matching. A read failure is
/// logged and treated like unparsable content.
pub async fn match_drop(matcher: &mut AssetMatcher, entries: Vec<DroppedEntry>) {
    let files = flatten_entries(entries);
    let content = match locate_description(&files) {
        Some(description) => read_optional(description).await,
        None => None,
    };
    tracing::debug!(files = files.len(), has_description = content.is_some(), "Matching drop");
    matcher.match_drop(&files, content.as_deref());
}

/// Manual selection in the description picker.
pub async fn pick_description(matcher: &mut AssetMatcher, file: SceneFile) {
    let content = read_optional(&file).await;
    matcher.set_description(file, content.as_deref());
}

async fn read_optional(file: &SceneFile) -> Option<Bytes> {
    match read_content(file).await {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::warn!(file = file.name(), error = %e, "Failed to read scene description");
            None
        }
    }
}

/// Encode a submission as a multipart form, reading every file part.
pub async fn build_form(submission: &JobSubmission) -> io::Result<Form> {
    let mut form = Form::new();
    for field in &submission.fields {
        form = match &field.value {
            FormValue::File(file) => {
                let content = read_content(file).await?;
                let part = Part::bytes(content.to_vec()).file_name(file.name().to_string());
                form.part(field.name, part)
            }
            FormValue::Text(value) => form.text(field.name, value.clone()),
        };
    }
    Ok(form)
}
