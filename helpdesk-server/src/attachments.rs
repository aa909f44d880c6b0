//! Attachment storage
//!
//! Ticket images are written to `{work_dir}/uploads/` under a fresh
//! UUID file name and served back from `/uploads/{filename}`.

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use shared::models::Attachment;
use uuid::Uuid;

use crate::utils::{AppError, AppResult, ErrorCode};

/// Maximum images per ticket
pub const MAX_ATTACHMENTS: usize = 5;

/// Accepted image extensions (lowercase)
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// URL prefix under which stored files are served
pub const PUBLIC_PREFIX: &str = "uploads";

/// One uploaded file part
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct AttachmentStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl AttachmentStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate a batch before anything touches the disk
    pub fn check_all(&self, uploads: &[Upload]) -> AppResult<()> {
        if uploads.len() > MAX_ATTACHMENTS {
            return Err(AppError::with_message(
                ErrorCode::TooManyAttachments,
                format!("At most {} images per ticket", MAX_ATTACHMENTS),
            )
            .with_detail("count", uploads.len()));
        }
        uploads.iter().try_for_each(|u| self.check(u).map(|_| ()))
    }

    /// Validate one upload and return its normalized extension
    pub fn check(&self, upload: &Upload) -> AppResult<String> {
        if upload.data.is_empty() {
            return Err(AppError::validation(format!(
                "Empty file provided: {}",
                upload.filename
            )));
        }
        if upload.data.len() > self.max_bytes {
            return Err(AppError::with_message(
                ErrorCode::AttachmentTooLarge,
                format!(
                    "File too large. Maximum size is {}MB",
                    self.max_bytes / 1024 / 1024
                ),
            )
            .with_detail("filename", upload.filename.as_str()));
        }

        let ext = Path::new(&upload.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(AppError::with_message(
                ErrorCode::UnsupportedAttachment,
                format!(
                    "Unsupported file format. Supported: {}",
                    ALLOWED_EXTENSIONS.join(", ")
                ),
            )
            .with_detail("filename", upload.filename.as_str()));
        }
        Ok(ext)
    }

    /// Persist every upload; on failure the files already written are removed
    pub async fn save_all(&self, uploads: Vec<Upload>) -> AppResult<Vec<Attachment>> {
        self.check_all(&uploads)?;
        if uploads.is_empty() {
            return Ok(Vec::new());
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::storage(format!("Failed to create uploads directory: {}", e)))?;

        let mut saved: Vec<Attachment> = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.save(upload).await {
                Ok(attachment) => saved.push(attachment),
                Err(e) => {
                    self.discard(&saved).await;
                    return Err(e);
                }
            }
        }
        Ok(saved)
    }

    async fn save(&self, upload: Upload) -> AppResult<Attachment> {
        let ext = self.check(&upload)?;
        let stored = format!("{}.{}", Uuid::new_v4().simple(), ext);
        let file_path = self.dir.join(&stored);

        tokio::fs::write(&file_path, &upload.data)
            .await
            .map_err(|e| AppError::storage(format!("Failed to save file: {}", e)))?;

        tracing::info!(
            original_name = %upload.filename,
            stored = %stored,
            size = upload.data.len(),
            "Attachment stored"
        );

        Ok(Attachment {
            filename: upload.filename,
            path: format!("{}/{}", PUBLIC_PREFIX, stored),
        })
    }

    /// Best-effort removal of stored attachments
    pub async fn discard(&self, attachments: &[Attachment]) {
        for attachment in attachments {
            let Some(name) = attachment.path.rsplit('/').next() else {
                continue;
            };
            if let Err(e) = tokio::fs::remove_file(self.dir.join(name)).await {
                tracing::warn!(path = %attachment.path, error = %e, "Failed to remove attachment");
            }
        }
    }

    /// Map a served file name to its location, rejecting traversal
    pub fn resolve(&self, filename: &str) -> AppResult<PathBuf> {
        if filename.is_empty()
            || filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
        {
            return Err(AppError::invalid("Invalid filename"));
        }
        Ok(self.dir.join(filename))
    }
}
