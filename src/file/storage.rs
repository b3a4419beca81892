//! File storage for filedrop.
//!
//! This module provides physical file storage:
//! - Atomic writes (temporary file in the storage root, then a single rename)
//! - Collision handling per [`CollisionPolicy`]
//! - Listing and loading of committed files

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::name::{candidate_name, ensure_resolved};
use super::{MAX_COLLISION_ATTEMPTS, TEMP_PREFIX, TEMP_SUFFIX};
use crate::{FiledropError, Result};

/// What to do when a resolved name is already taken by another file.
///
/// Under every policy, a target that already holds byte-identical content
/// is treated as success so a retried upload does not create a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Use the first free name among `name`, `name-1`, `name-2`, ...
    #[default]
    Rename,
    /// Fail with [`FiledropError::Conflict`].
    Reject,
    /// Replace the existing file (last writer wins).
    Overwrite,
}

/// A committed file as seen by a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Name inside the storage root.
    pub name: String,
    /// Size in bytes, read from the filesystem.
    pub size: u64,
    /// Modification time, read from the filesystem.
    pub modified: SystemTime,
}

/// File storage service for managing physical files.
///
/// Files live directly under the storage root:
/// ```text
/// {base_path}/
/// ├── photo_1718000000000.jpg
/// ├── report.pdf
/// ├── report-1.pdf
/// └── .upload-Xk2f9a.part   (in-flight, never listed)
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Base directory for file storage.
    base_path: PathBuf,
    /// Collision policy applied by [`FileStorage::store`].
    collision: CollisionPolicy,
}

impl FileStorage {
    /// Create a new FileStorage with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self {
            base_path,
            collision: CollisionPolicy::default(),
        })
    }

    /// Set the collision policy.
    pub fn with_collision_policy(mut self, collision: CollisionPolicy) -> Self {
        self.collision = collision;
        self
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the collision policy.
    pub fn collision_policy(&self) -> CollisionPolicy {
        self.collision
    }

    /// Atomically store `content` under a resolved name.
    ///
    /// # Arguments
    ///
    /// * `resolved_name` - Output of [`super::resolve_name`]
    /// * `content` - The file content to save
    ///
    /// # Returns
    ///
    /// The name the content is visible under. It differs from
    /// `resolved_name` only under [`CollisionPolicy::Rename`].
    pub fn store(&self, resolved_name: &str, content: &[u8]) -> Result<String> {
        ensure_resolved(resolved_name)?;

        let temp = self.write_temp(&mut &content[..])?;

        let stored_name = match self.collision {
            CollisionPolicy::Overwrite => {
                let path = self.get_file_path(resolved_name);
                temp.persist(&path).map_err(|e| e.error)?;
                resolved_name.to_string()
            }
            CollisionPolicy::Reject => {
                let path = self.get_file_path(resolved_name);
                match temp.persist_noclobber(&path) {
                    Ok(_) => resolved_name.to_string(),
                    Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                        if !Self::holds_identical(&path, content) {
                            return Err(FiledropError::Conflict(format!(
                                "{resolved_name} already exists"
                            )));
                        }
                        tracing::debug!(name = resolved_name, "Identical file already stored");
                        resolved_name.to_string()
                    }
                    Err(e) => return Err(e.error.into()),
                }
            }
            CollisionPolicy::Rename => self.persist_first_free(temp, resolved_name, content)?,
        };

        self.sync_dir();
        Ok(stored_name)
    }

    /// Move `temp` into the first free collision candidate.
    fn persist_first_free(
        &self,
        mut temp: NamedTempFile,
        resolved_name: &str,
        content: &[u8],
    ) -> Result<String> {
        for n in 0..MAX_COLLISION_ATTEMPTS {
            let name = candidate_name(resolved_name, n);
            let path = self.get_file_path(&name);

            match temp.persist_noclobber(&path) {
                Ok(_) => return Ok(name),
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                    if Self::holds_identical(&path, content) {
                        tracing::debug!(name = %name, "Identical file already stored");
                        return Ok(name);
                    }
                    temp = e.file;
                }
                Err(e) => return Err(e.error.into()),
            }
        }

        Err(FiledropError::Conflict(format!(
            "no free name left for {resolved_name}"
        )))
    }

    /// Write everything from `reader` into a fresh temporary file inside the
    /// storage root and flush it to disk.
    ///
    /// The temporary file is deleted when the returned handle is dropped
    /// without being persisted, including on every error path here.
    fn write_temp<R: Read>(&self, reader: &mut R) -> Result<NamedTempFile> {
        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.base_path)?;

        io::copy(reader, temp.as_file_mut())?;
        temp.as_file().sync_all()?;

        Ok(temp)
    }

    /// Check whether `path` is a regular file containing exactly `content`.
    fn holds_identical(path: &Path, content: &[u8]) -> bool {
        match fs::metadata(path) {
            Ok(m) if m.is_file() && m.len() == content.len() as u64 => {
                fs::read(path).map(|existing| existing == content).unwrap_or(false)
            }
            _ => false,
        }
    }

    /// Flush the directory entry of a rename to disk.
    #[cfg(unix)]
    fn sync_dir(&self) {
        if let Err(e) = fs::File::open(&self.base_path).and_then(|dir| dir.sync_all()) {
            tracing::debug!(error = %e, "Failed to sync storage directory");
        }
    }

    #[cfg(not(unix))]
    fn sync_dir(&self) {}

    /// List committed files in the storage root.
    ///
    /// Sizes and timestamps come from the filesystem on every call. In-flight
    /// temporary files and subdirectories are skipped, as are entries that
    /// disappear while the listing runs. Any other error fails the whole call.
    pub fn list(&self) -> Result<Vec<StoredFile>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if Self::is_temp_name(&name) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            if !metadata.is_file() {
                continue;
            }

            files.push(StoredFile {
                name,
                size: metadata.len(),
                modified: metadata.modified()?,
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Load content from storage.
    pub fn load(&self, name: &str) -> Result<Vec<u8>> {
        ensure_resolved(name)?;
        let file_path = self.get_file_path(name);

        match fs::read(&file_path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FiledropError::NotFound(format!("File: {name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get the full file path for a resolved name.
    pub fn get_file_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    fn is_temp_name(name: &str) -> bool {
        name.starts_with(TEMP_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup_storage(collision: CollisionPolicy) -> (TempDir, FileStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path())
            .unwrap()
            .with_collision_policy(collision);
        (temp_dir, storage)
    }

    fn dir_entries(storage: &FileStorage) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(storage.base_path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Reader that yields `limit` bytes and then fails.
    struct FailingReader {
        remaining: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"));
            }
            let n = buf.len().min(self.remaining);
            buf[..n].fill(0xAB);
            self.remaining -= n;
            Ok(n)
        }
    }

    #[test]
    fn test_new_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let storage_path = temp_dir.path().join("nested").join("uploads");

        assert!(!storage_path.exists());

        let storage = FileStorage::new(&storage_path).unwrap();

        assert!(storage_path.is_dir());
        assert_eq!(storage.base_path(), storage_path);
        assert_eq!(storage.collision_policy(), CollisionPolicy::Rename);
    }

    #[test]
    fn test_store_and_load() {
        let (_temp_dir, storage) = setup_storage(CollisionPolicy::Rename);
        let content = b"Hello, World!";

        let stored_name = storage.store("hello.txt", content).unwrap();

        assert_eq!(stored_name, "hello.txt");
        assert_eq!(storage.load(&stored_name).unwrap(), content);
        assert_eq!(dir_entries(&storage), vec!["hello.txt"]);
    }

    #[test]
    fn test_store_binary_content() {
        let (_temp_dir, storage) = setup_storage(CollisionPolicy::Rename);
        let content: Vec<u8> = (0..=255).collect();

        let stored_name = storage.store("binary.bin", &content).unwrap();

        assert_eq!(storage.load(&stored_name).unwrap(), content);
    }

    #[test]
    fn test_store_empty_content() {
        let (_temp_dir, storage) = setup_storage(CollisionPolicy::Rename);

        let stored_name = storage.store("empty.txt", b"").unwrap();

        assert_eq!(storage.load(&stored_name).unwrap(), b"");
        assert_eq!(storage.list().unwrap()[0].size, 0);
    }

    #[test]
    fn test_store_rejects_unresolved_name() {
        let (_temp_dir, storage) = setup_storage(CollisionPolicy::Overwrite);

        let result = storage.store("../escape.txt", b"data");

        assert!(matches!(result, Err(FiledropError::Validation(_))));
        assert!(dir_entries(&storage).is_empty());
    }

    #[test]
    fn test_rename_policy_suffixes_different_content() {
        let (_temp_dir, storage) = setup_storage(CollisionPolicy::Rename);

        assert_eq!(storage.store("photo.jpg", b"first").unwrap(), "photo.jpg");
        assert_eq!(storage.store("photo.jpg", b"second").unwrap(), "photo-1.jpg");
        assert_eq!(storage.store("photo.jpg", b"third").unwrap(), "photo-2.jpg");

        assert_eq!(storage.load("photo.jpg").unwrap(), b"first");
        assert_eq!(storage.load("photo-1.jpg").unwrap(), b"second");
        assert_eq!(storage.load("photo-2.jpg").unwrap(), b"third");
    }

    #[test]
    fn test_rename_policy_reuses_identical_content() {
        let (_temp_dir, storage) = setup_storage(CollisionPolicy::Rename);

        assert_eq!(storage.store("photo.jpg", b"same").unwrap(), "photo.jpg");
        assert_eq!(storage.store("photo.jpg", b"other").unwrap(), "photo-1.jpg");

        // Retrying either upload lands on the slot that already holds it.
        assert_eq!(storage.store("photo.jpg", b"same").unwrap(), "photo.jpg");
        assert_eq!(storage.store("photo.jpg", b"other").unwrap(), "photo-1.jpg");

        assert_eq!(dir_entries(&storage), vec!["photo-1.jpg", "photo.jpg"]);
    }

    #[test]
    fn test_rename_policy_skips_directories() {
        let (_temp_dir, storage) = setup_storage(CollisionPolicy::Rename);
        fs::create_dir(storage.base_path().join("photo.jpg")).unwrap();

        let stored_name = storage.store("photo.jpg", b"data").unwrap();

        assert_eq!(stored_name, "photo-1.jpg");
    }

    #[test]
    fn test_reject_policy() {
        let (_temp_dir, storage) = setup_storage(CollisionPolicy::Reject);

        storage.store("doc.pdf", b"original").unwrap();

        let result = storage.store("doc.pdf", b"changed");
        assert!(matches!(result, Err(FiledropError::Conflict(_))));
        assert_eq!(storage.load("doc.pdf").unwrap(), b"original");

        // Identical retry succeeds
        assert_eq!(storage.store("doc.pdf", b"original").unwrap(), "doc.pdf");

        assert_eq!(dir_entries(&storage), vec!["doc.pdf"]);
    }

    #[test]
    fn test_overwrite_policy() {
        let (_temp_dir, storage) = setup_storage(CollisionPolicy::Overwrite);

        storage.store("notes.txt", b"v1").unwrap();
        let stored_name = storage.store("notes.txt", b"version two").unwrap();

        assert_eq!(stored_name, "notes.txt");
        assert_eq!(storage.load("notes.txt").unwrap(), b"version two");
        assert_eq!(dir_entries(&storage), vec!["notes.txt"]);
    }

    #[test]
    fn test_interrupted_write_leaves_nothing_behind() {
        let (_temp_dir, storage) = setup_storage(CollisionPolicy::Rename);
        let mut reader = FailingReader { remaining: 64 * 1024 };

        let result = storage.write_temp(&mut reader);

        assert!(matches!(result, Err(FiledropError::Storage(_))));
        assert!(dir_entries(&storage).is_empty());
        assert!(storage.list().unwrap().is_empty());
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let (_temp_dir, storage) = setup_storage(CollisionPolicy::Overwrite);
        let blocker = storage.base_path().join("target.bin");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("inner"), b"x").unwrap();

        let result = storage.store("target.bin", b"payload");

        assert!(matches!(result, Err(FiledropError::Storage(_))));
        assert_eq!(dir_entries(&storage), vec!["target.bin"]);
        assert!(storage.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_reports_sizes_sorted() {
        let (_temp_dir, storage) = setup_storage(CollisionPolicy::Rename);

        storage.store("b.txt", b"bb").unwrap();
        storage.store("a.txt", b"a").unwrap();
        storage.store("c.txt", b"ccc").unwrap();

        let files = storage.list().unwrap();
        let summary: Vec<(&str, u64)> = files
            .iter()
            .map(|f| (f.name.as_str(), f.size))
            .collect();

        assert_eq!(summary, vec![("a.txt", 1), ("b.txt", 2), ("c.txt", 3)]);
    }

    #[test]
    fn test_list_skips_temp_files_and_directories() {
        let (_temp_dir, storage) = setup_storage(CollisionPolicy::Rename);

        storage.store("kept.txt", b"kept").unwrap();
        let in_flight = storage.write_temp(&mut &b"partial"[..]).unwrap();
        fs::create_dir(storage.base_path().join("subdir")).unwrap();

        let files = storage.list().unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "kept.txt");
        drop(in_flight);
    }

    #[test]
    fn test_list_fails_when_root_is_gone() {
        let (temp_dir, storage) = setup_storage(CollisionPolicy::Rename);
        let root = temp_dir.path().to_path_buf();
        drop(temp_dir);

        assert!(!root.exists());
        assert!(matches!(storage.list(), Err(FiledropError::Storage(_))));
    }

    #[test]
    fn test_load_not_found() {
        let (_temp_dir, storage) = setup_storage(CollisionPolicy::Rename);

        let result = storage.load("nonexistent.txt");

        assert!(matches!(result, Err(FiledropError::NotFound(_))));
    }

    #[test]
    fn test_load_rejects_traversal() {
        let (_temp_dir, storage) = setup_storage(CollisionPolicy::Rename);

        let result = storage.load("../../etc/passwd");

        assert!(matches!(result, Err(FiledropError::Validation(_))));
    }

    #[test]
    fn test_concurrent_store_same_name() {
        let (_temp_dir, storage) = setup_storage(CollisionPolicy::Rename);
        let storage = Arc::new(storage);

        const WRITERS: usize = 8;

        let handles: Vec<_> = (0..WRITERS)
            .map(|i| {
                let storage = Arc::clone(&storage);
                std::thread::spawn(move || {
                    let content = format!("writer {i}").into_bytes();
                    let name = storage.store("shared.txt", &content).unwrap();
                    (name, content)
                })
            })
            .collect();

        let results: Vec<(String, Vec<u8>)> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let mut names: Vec<&str> = results.iter().map(|(n, _)| n.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), WRITERS);

        for (name, content) in &results {
            assert_eq!(&storage.load(name).unwrap(), content);
        }
        assert_eq!(storage.list().unwrap().len(), WRITERS);
    }
}
