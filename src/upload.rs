//! Turning raw files into top-level items.
//!
//! Uploads in a batch run concurrently and are collected with `join_all`, so
//! results come back in file order regardless of completion order. Ids and
//! positions are reserved before anything is sent ([`PendingUpload`]); the
//! board applies the finished batch as one append.

use crate::constants::{FALLBACK_MIME, LOCAL_UPLOADS_DIR, UPLOAD_ENDPOINT, UPLOAD_FIELD_NAME};
use crate::error::{UploadError, UploadResult};
use crate::types::{Item, ItemId, Position, RawFile, ResourceRef, UploadedFile};
use async_trait::async_trait;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// External service that stores a file and hands back a reference to it.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: &RawFile) -> UploadResult<UploadedFile>;
}

// ============================================================================
// HTTP
// ============================================================================

/// Posts files as multipart form data to `{api_base}/api/upload`.
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: reqwest::Client,
    api_base: String,
}

impl HttpUploader {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_base)
    }

    pub fn with_client(client: reqwest::Client, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { client, api_base }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.api_base, UPLOAD_ENDPOINT)
    }

    /// The service answers with paths relative to its own base.
    pub fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.api_base, url)
        } else {
            format!("{}/{}", self.api_base, url)
        }
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(&self, file: &RawFile) -> UploadResult<UploadedFile> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime)
            .or_else(|_| {
                reqwest::multipart::Part::bytes(file.bytes.clone())
                    .file_name(file.name.clone())
                    .mime_str(FALLBACK_MIME)
            })?;
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD_NAME, part);

        debug!("Uploading {} ({} bytes) to {}", file.name, file.size(), self.endpoint());
        let resp = self.client.post(self.endpoint()).multipart(form).send().await?;

        if !resp.status().is_success() {
            return Err(UploadError::Status {
                name: file.name.clone(),
                status: resp.status().as_u16(),
            });
        }

        let body = resp.text().await?;
        let mut uploaded: UploadedFile = serde_json::from_str(&body)
            .map_err(|e| UploadError::InvalidResponse(format!("{}: {}", file.name, e)))?;
        uploaded.url = self.absolute_url(&uploaded.url);
        Ok(uploaded)
    }
}

// ============================================================================
// Local
// ============================================================================

/// Copies files into a local directory; used when no upload service is configured.
#[derive(Debug, Clone)]
pub struct LocalUploader {
    dir: PathBuf,
}

impl LocalUploader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data_dir>/uploads`
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(LOCAL_UPLOADS_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Uploader for LocalUploader {
    async fn upload(&self, file: &RawFile) -> UploadResult<UploadedFile> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let path = self.dir.join(stored_file_name(millis, &file.name));
        tokio::fs::write(&path, &file.bytes).await?;

        Ok(UploadedFile {
            url: format!("file://{}", path.display()),
            original_name: file.name.clone(),
            mime: file.mime.clone(),
            size: file.size(),
        })
    }
}

/// `<millis>-<name>` with every run of whitespace in the name replaced by `_`.
pub fn stored_file_name(millis: u128, name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_run {
                cleaned.push('_');
            }
            in_run = true;
        } else {
            cleaned.push(c);
            in_run = false;
        }
    }
    format!("{}-{}", millis, cleaned)
}

// ============================================================================
// Batches
// ============================================================================

/// One reserved slot of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry {
    pub id: ItemId,
    pub name: String,
    pub at: Position,
}

/// Ids and positions reserved for a batch before any upload is sent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PendingUpload {
    entries: Vec<PendingEntry>,
}

impl PendingUpload {
    /// Reserve one entry per file, staggered diagonally from `origin`.
    pub fn reserve(files: &[RawFile], origin: Position, step: f64) -> Self {
        let entries = files
            .iter()
            .enumerate()
            .map(|(i, file)| {
                let offset = i as f64 * step;
                PendingEntry {
                    id: ItemId::new(),
                    name: file.name.clone(),
                    at: origin + Position::new(offset, offset),
                }
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[PendingEntry] {
        &self.entries
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pair reserved entries with upload results, in file order.
    ///
    /// Entries for which `is_cancelled` holds are skipped whatever their result.
    pub fn resolve(
        self,
        results: Vec<UploadResult<UploadedFile>>,
        is_cancelled: impl Fn(ItemId) -> bool,
    ) -> ResolvedBatch {
        let mut batch = ResolvedBatch::default();
        for (entry, result) in self.entries.into_iter().zip(results) {
            if is_cancelled(entry.id) {
                debug!("Discarding upload of {} for removed item {}", entry.name, entry.id);
                batch.cancelled.push(entry.id);
                continue;
            }
            match result {
                Ok(uploaded) => batch.items.push(item_from_upload(&entry, uploaded)),
                Err(error) => {
                    warn!("Upload of {} failed: {}", entry.name, error);
                    batch.failed.push(UploadFailure {
                        name: entry.name,
                        error,
                    });
                }
            }
        }
        batch
    }
}

fn item_from_upload(entry: &PendingEntry, uploaded: UploadedFile) -> Item {
    let name = if uploaded.original_name.is_empty() {
        entry.name.clone()
    } else {
        uploaded.original_name
    };
    Item::uploaded(
        entry.id,
        name,
        ResourceRef::new(uploaded.url, uploaded.mime),
        entry.at,
    )
}

/// A file that did not make it into the batch.
#[derive(Debug)]
pub struct UploadFailure {
    pub name: String,
    pub error: UploadError,
}

/// Outcome of pairing a batch with its upload results.
#[derive(Debug, Default)]
pub struct ResolvedBatch {
    pub items: Vec<Item>,
    pub failed: Vec<UploadFailure>,
    pub cancelled: Vec<ItemId>,
}

/// What happened to a batch handed to the board.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub added: Vec<ItemId>,
    pub failed: Vec<UploadFailure>,
    pub cancelled: Vec<ItemId>,
}

impl UploadReport {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty() && self.cancelled.is_empty()
    }
}

/// Fans a batch out to an [`Uploader`] and collects the results in file order.
pub struct UploadCoordinator;

impl UploadCoordinator {
    pub async fn upload_all(
        uploader: &dyn Uploader,
        files: &[RawFile],
    ) -> Vec<UploadResult<UploadedFile>> {
        if files.is_empty() {
            return Vec::new();
        }
        info!("Uploading batch of {} files", files.len());
        join_all(files.iter().map(|file| uploader.upload(file))).await
    }
}
