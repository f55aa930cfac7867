//! File identities and dropped-entry flattening.

use std::path::PathBuf;

use bytes::Bytes;

/// Where a file's content can be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// Content already held in memory (e.g. pasted or generated).
    Memory(Bytes),
}

/// A selected or dropped file: its name plus a content accessor.
///
/// The name is the bare file name used for convention matching; it never
/// contains directory components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneFile {
    name: String,
    source: FileSource,
}

impl SceneFile {
    pub fn new(name: impl Into<String>, source: FileSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// A file on disk, named after the path's final component.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(name, FileSource::Path(path))
    }

    pub fn in_memory(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self::new(name, FileSource::Memory(content.into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// The name without `.{extension}`, if it carries that extension and
    /// the rest is non-empty. Extensions compare ASCII case-insensitively.
    pub fn stem(&self, extension: &str) -> Option<&str> {
        let split = self.name.len().checked_sub(extension.len() + 1)?;
        let stem = self.name.get(..split)?;
        let suffix = self.name.get(split..)?.strip_prefix('.')?;
        (!stem.is_empty() && suffix.eq_ignore_ascii_case(extension)).then_some(stem)
    }

    pub fn has_extension(&self, extension: &str) -> bool {
        self.stem(extension).is_some()
    }
}

/// One item of a drop or picker selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DroppedEntry {
    File(SceneFile),
    /// A directory with its direct children. Children that are directories
    /// themselves are kept as empty placeholders and never traversed.
    Directory {
        name: String,
        entries: Vec<DroppedEntry>,
    },
}

impl DroppedEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::File(file) => file.name(),
            Self::Directory { name, .. } => name,
        }
    }
}

/// Reduce a drop to the flat set of files to match against.
///
/// A drop consisting of exactly one directory is expanded one level into its
/// files. Otherwise only the top-level files are used. Nested directories
/// are never expanded.
pub fn flatten_entries(entries: Vec<DroppedEntry>) -> Vec<SceneFile> {
    let entries = match <[DroppedEntry; 1]>::try_from(entries) {
        Ok([DroppedEntry::Directory { entries, .. }]) => entries,
        Ok(single) => single.into(),
        Err(entries) => entries,
    };

    entries
        .into_iter()
        .filter_map(|entry| match entry {
            DroppedEntry::File(file) => Some(file),
            DroppedEntry::Directory { .. } => None,
        })
        .collect()
}
