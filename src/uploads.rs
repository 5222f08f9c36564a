use std::path::Path;

use axum::extract::multipart::Field;
use sha2::{Digest, Sha256};

use crate::config::UploadConfig;
use crate::error::{ApiError, ApiResult};

/// Public prefix the upload root is served under
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Resume,
    Logo,
}

impl UploadKind {
    /// Multipart field name, also used as the error field
    pub fn field(&self) -> &'static str {
        match self {
            UploadKind::Resume => "resume",
            UploadKind::Logo => "logo",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            UploadKind::Resume => "Resume",
            UploadKind::Logo => "Logo",
        }
    }

    fn dir_name(&self) -> &'static str {
        match self {
            UploadKind::Resume => "resumes",
            UploadKind::Logo => "logos",
        }
    }

    fn allowed<'a>(&self, config: &'a UploadConfig) -> &'a [String] {
        match self {
            UploadKind::Resume => &config.resume_extensions,
            UploadKind::Logo => &config.image_extensions,
        }
    }

    fn max_bytes(&self, config: &UploadConfig) -> usize {
        match self {
            UploadKind::Resume => config.max_resume_bytes,
            UploadKind::Logo => config.max_logo_bytes,
        }
    }
}

/// Lower-cased extension of `file_name` if it is on the allow-list for `kind`
pub fn check_extension(config: &UploadConfig, kind: UploadKind, file_name: Option<&str>) -> ApiResult<String> {
    let ext = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let allowed = kind.allowed(config);
    if ext.is_empty() || !allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)) {
        return Err(ApiError::invalid_field(
            kind.field(),
            format!("{} must be one of: {}", kind.label(), allowed.join(", ")),
        ));
    }
    Ok(ext)
}

pub fn check_size(config: &UploadConfig, kind: UploadKind, len: usize) -> ApiResult<()> {
    let max = kind.max_bytes(config);
    if len == 0 {
        return Err(ApiError::invalid_field(kind.field(), format!("{} file is empty", kind.label())));
    }
    if len > max {
        return Err(ApiError::invalid_field(
            kind.field(),
            format!("{} must be at most {} bytes", kind.label(), max),
        ));
    }
    Ok(())
}

/// First 16 hex chars of the SHA-256 of the content, plus the extension
pub fn content_name(bytes: &[u8], ext: &str) -> String {
    let digest = Sha256::digest(bytes);
    let hex: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();
    format!("{}.{}", hex, ext)
}

/// URL a stored file is served under
pub fn public_url(kind: UploadKind, name: &str) -> String {
    format!("{}/{}/{}", PUBLIC_PREFIX, kind.dir_name(), name)
}

/// Write `bytes` to `<root>/<kind>/<name>`
pub async fn write(config: &UploadConfig, kind: UploadKind, name: &str, bytes: &[u8]) -> ApiResult<()> {
    let dir = config.dir.join(kind.dir_name());
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::internal(format!("create {}: {}", dir.display(), e)))?;

    let path = dir.join(name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| ApiError::internal(format!("write {}: {}", path.display(), e)))?;

    tracing::info!(kind = kind.field(), size = bytes.len(), "Stored upload {}", name);
    Ok(())
}

/// Write the file under a content-addressed name and return its public URL
pub async fn store(config: &UploadConfig, kind: UploadKind, ext: &str, bytes: &[u8]) -> ApiResult<String> {
    let name = content_name(bytes, ext);
    write(config, kind, &name, bytes).await?;
    Ok(public_url(kind, &name))
}

/// Validate and persist one multipart file field.
///
/// The extension is checked from the declared file name before the body is read.
pub async fn accept_field(config: &UploadConfig, kind: UploadKind, field: Field<'_>) -> ApiResult<String> {
    let ext = check_extension(config, kind, field.file_name())?;
    let bytes = field.bytes().await?;
    check_size(config, kind, bytes.len())?;
    store(config, kind, &ext, &bytes).await
}
