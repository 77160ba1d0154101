//! Persistence of uploaded assignment and submission files.
//!
//! Stored paths have the form `/uploads/...` and are kept in the database as
//! is; the HTTP layer serves the `/uploads` prefix from the storage root.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::{Result, ServiceError};

/// An uploaded file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Name as sent by the client.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Which assignment material a file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    Exercise,
    Guide,
}

impl Display for MaterialKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MaterialKind::Exercise => f.write_str("exercise"),
            MaterialKind::Guide => f.write_str("guide"),
        }
    }
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Stores the exercise sheet or guide of an assignment.
    async fn save_assignment_material(
        &self,
        assignment_id: i32,
        kind: MaterialKind,
        file: UploadedFile,
    ) -> Result<String>;

    async fn save_submission_file(
        &self,
        assignment_id: i32,
        student_id: i32,
        file: UploadedFile,
    ) -> Result<String>;

    /// Stores a supplementary document of an assignment.
    async fn save_assignment_file(&self, assignment_id: i32, file: UploadedFile) -> Result<String>;

    fn public_url(&self, path: &str) -> String;

    /// Removes a stored file. Missing files are not an error.
    async fn delete_file(&self, path: &str) -> Result<()>;
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Splits a client file name into a safe stem and extension (with its dot).
fn split_file_name(file_name: &str) -> (String, String) {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let path = Path::new(base);
    let stem = sanitize(path.file_stem().and_then(|s| s.to_str()).unwrap_or("file"));
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", sanitize(e)))
        .unwrap_or_default();
    let stem = if stem.is_empty() { "file".to_string() } else { stem };
    (stem, ext)
}

/// `yyyyMMddHHmmssfff` timestamp plus an 8 character random suffix.
fn unique_suffix() -> String {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S%3f");
    let random = Uuid::new_v4().simple().to_string();
    format!("{}_{}", timestamp, &random[..8])
}

fn submission_path(assignment_id: i32, student_id: i32, file_name: &str) -> String {
    let (stem, ext) = split_file_name(file_name);
    format!(
        "/uploads/submissions/{}/{}/{}_{}{}",
        assignment_id,
        student_id,
        stem,
        unique_suffix(),
        ext
    )
}

fn assignment_file_path(assignment_id: i32, file_name: &str) -> String {
    let (stem, ext) = split_file_name(file_name);
    format!(
        "/uploads/assignments/{}/{}_{}{}",
        assignment_id,
        stem,
        unique_suffix(),
        ext
    )
}

fn material_path(assignment_id: i32, kind: MaterialKind, file_name: &str) -> String {
    let (_, ext) = split_file_name(file_name);
    format!(
        "/uploads/assignments/materials/{}_{}_{}{}",
        assignment_id,
        kind,
        unique_suffix(),
        ext
    )
}

/// Strips the legacy `~` prefix and makes the path absolute.
fn normalize(path: &str) -> String {
    let trimmed = path.trim().trim_start_matches('~');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Stores files below a root directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a stored path onto the filesystem, refusing anything that would
    /// leave the root.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = normalize(path);
        let relative = Path::new(relative.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(ServiceError::validation(format!("Invalid file path '{}'.", path)));
        }
        Ok(self.root.join(relative))
    }

    async fn write(&self, path: String, file: UploadedFile) -> Result<String> {
        let target = self.resolve(&path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &file.bytes).await?;
        info!(
            "Stored '{}' ({} bytes) at {}",
            file.file_name,
            file.bytes.len(),
            target.display()
        );
        Ok(path)
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    async fn save_assignment_material(
        &self,
        assignment_id: i32,
        kind: MaterialKind,
        file: UploadedFile,
    ) -> Result<String> {
        let path = material_path(assignment_id, kind, &file.file_name);
        self.write(path, file).await
    }

    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    async fn save_submission_file(
        &self,
        assignment_id: i32,
        student_id: i32,
        file: UploadedFile,
    ) -> Result<String> {
        let path = submission_path(assignment_id, student_id, &file.file_name);
        self.write(path, file).await
    }

    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    async fn save_assignment_file(&self, assignment_id: i32, file: UploadedFile) -> Result<String> {
        let path = assignment_file_path(assignment_id, &file.file_name);
        self.write(path, file).await
    }

    fn public_url(&self, path: &str) -> String {
        normalize(path)
    }

    #[instrument(skip(self))]
    async fn delete_file(&self, path: &str) -> Result<()> {
        if path.trim().is_empty() {
            return Ok(());
        }
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                debug!("Deleted {}", target.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("File {} already gone", target.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps files in memory. Used by tests and throwaway deployments.
#[derive(Debug, Default)]
pub struct MemoryFileStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&self, path: String, file: UploadedFile) -> Result<String> {
        let mut files = self
            .files
            .lock()
            .map_err(|_| ServiceError::Storage(std::io::Error::other("storage lock poisoned")))?;
        files.insert(path.clone(), file.bytes);
        Ok(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files
            .lock()
            .map(|files| files.contains_key(&normalize(path)))
            .unwrap_or(false)
    }

    pub fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .ok()
            .and_then(|files| files.get(&normalize(path)).cloned())
    }

    pub fn len(&self) -> usize {
        self.files.lock().map(|files| files.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl FileStorage for MemoryFileStorage {
    async fn save_assignment_material(
        &self,
        assignment_id: i32,
        kind: MaterialKind,
        file: UploadedFile,
    ) -> Result<String> {
        let path = material_path(assignment_id, kind, &file.file_name);
        self.put(path, file)
    }

    async fn save_submission_file(
        &self,
        assignment_id: i32,
        student_id: i32,
        file: UploadedFile,
    ) -> Result<String> {
        let path = submission_path(assignment_id, student_id, &file.file_name);
        self.put(path, file)
    }

    async fn save_assignment_file(&self, assignment_id: i32, file: UploadedFile) -> Result<String> {
        let path = assignment_file_path(assignment_id, &file.file_name);
        self.put(path, file)
    }

    fn public_url(&self, path: &str) -> String {
        normalize(path)
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        if let Ok(mut files) = self.files.lock() {
            files.remove(&normalize(path));
        }
        Ok(())
    }
}
