use std::path::{Component, Path};

use serde::Deserialize;

/// One file entry of a release manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileDescriptor {
    /// Path relative to the installation base, unique within a manifest.
    pub name: String,
    /// Expected byte count, `0` skips the size check.
    #[serde(default)]
    pub size: u64,
    /// Hex digest, empty skips the content check.
    #[serde(default)]
    pub hash: String,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, size: u64, hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            hash: hash.into(),
        }
    }

    /// Descriptor that only asks for the file to exist.
    pub fn unchecked(name: impl Into<String>) -> Self {
        Self::new(name, 0, String::new())
    }

    /// Whether the name stays inside the installation base once joined to it.
    #[must_use]
    pub fn has_safe_name(&self) -> bool {
        let path = Path::new(&self.name);
        !self.name.is_empty()
            && path
                .components()
                .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
    }
}

/// Outdated subset of a manifest, fixed once computed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateBatch {
    files: Vec<FileDescriptor>,
}

impl UpdateBatch {
    #[must_use]
    pub fn new(files: Vec<FileDescriptor>) -> Self {
        Self { files }
    }

    #[must_use]
    pub fn single(file: FileDescriptor) -> Self {
        Self { files: vec![file] }
    }

    #[must_use]
    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&FileDescriptor> {
        self.files.iter().find(|file| file.name == name)
    }
}
