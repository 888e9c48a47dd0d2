use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::GatewayError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    /// RFC 3339 timestamp.
    pub modified: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DirectoryListing {
    pub path: String,
    pub entries: Vec<FileEntry>,
}

/// Request/response access to the filesystem.
///
/// Implementations must be callable from a blocking worker thread.
pub trait FileSystemGateway: Send + Sync {
    fn list(&self, path: &Path) -> Result<DirectoryListing, GatewayError>;
    fn create_directory(&self, path: &Path) -> Result<(), GatewayError>;
    fn delete(&self, path: &Path) -> Result<(), GatewayError>;
    fn copy(&self, source: &Path, dest: &Path) -> Result<(), GatewayError>;
    fn move_entry(&self, source: &Path, dest: &Path) -> Result<(), GatewayError>;
    /// Rename within the same parent directory.
    fn rename(&self, path: &Path, new_name: &str) -> Result<(), GatewayError>;
}

/// Gateway backed by the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFs;

impl FileSystemGateway for LocalFs {
    fn list(&self, path: &Path) -> Result<DirectoryListing, GatewayError> {
        if !path.exists() {
            return Err(GatewayError::NotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(GatewayError::NotADirectory(path.to_path_buf()));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| GatewayError::io(path, e))? {
            let entry = entry.map_err(|e| GatewayError::io(path, e))?;
            let entry_path = entry.path();
            let metadata = entry
                .metadata()
                .map_err(|e| GatewayError::io(&entry_path, e))?;
            let modified: DateTime<Utc> = metadata
                .modified()
                .unwrap_or(SystemTime::UNIX_EPOCH)
                .into();

            entries.push(FileEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry_path.to_string_lossy().to_string(),
                is_dir: metadata.is_dir(),
                size: metadata.len(),
                modified: modified.to_rfc3339(),
            });
        }

        sort_entries(&mut entries);

        Ok(DirectoryListing {
            path: path.to_string_lossy().to_string(),
            entries,
        })
    }

    fn create_directory(&self, path: &Path) -> Result<(), GatewayError> {
        fs::create_dir_all(path).map_err(|e| GatewayError::io(path, e))
    }

    fn delete(&self, path: &Path) -> Result<(), GatewayError> {
        let result = if path.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        result.map_err(|e| GatewayError::io(path, e))
    }

    fn copy(&self, source: &Path, dest: &Path) -> Result<(), GatewayError> {
        fs::copy(source, dest)
            .map(|_| ())
            .map_err(|e| GatewayError::io(source, e))
    }

    fn move_entry(&self, source: &Path, dest: &Path) -> Result<(), GatewayError> {
        fs::rename(source, dest).map_err(|e| GatewayError::io(source, e))
    }

    fn rename(&self, path: &Path, new_name: &str) -> Result<(), GatewayError> {
        let parent = path
            .parent()
            .ok_or_else(|| GatewayError::NoParent(path.to_path_buf()))?;
        fs::rename(path, parent.join(new_name)).map_err(|e| GatewayError::io(path, e))
    }
}

/// Directories first, then case-insensitive by name.
pub fn sort_entries(entries: &mut [FileEntry]) {
    entries.sort_by(|a, b| match (a.is_dir, b.is_dir) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });
}
