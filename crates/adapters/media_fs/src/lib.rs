//! # bizdir-adapter-media-fs
//!
//! Implements the `ImageStore` port from `bizdir-app` on the local
//! filesystem. Stored paths are relative to the media root, so they can be
//! served as-is under a static `/media` mount.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, ImageReader, Limits};

use bizdir_app::ports::ImageStore;
use bizdir_domain::business::{IMAGE_PREFIX, ImageUpload, image_path};
use bizdir_domain::error::{BizDirError, ValidationError};

/// Errors raised while storing an image.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// The payload is not an image we can decode.
    #[error("undecodable image: {0}")]
    Decode(#[from] image::ImageError),

    /// Writing the blob failed.
    #[error("media io error")]
    Io(#[from] std::io::Error),

    /// The blocking decode task was cancelled or panicked.
    #[error("decode task failed")]
    Join(#[from] tokio::task::JoinError),
}

impl From<MediaError> for BizDirError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Decode(_) => ValidationError::InvalidImage.into(),
            other => Self::Storage(Box::new(other)),
        }
    }
}

/// Stores images below a root directory.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory every stored path is relative to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Largest width or height accepted for a stored image.
const MAX_DIMENSION: u32 = 8192;

/// Cap on decoder allocations, independent of the compressed upload size.
const MAX_DECODE_ALLOC: u64 = 128 * 1024 * 1024;

fn decode_limits() -> Limits {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_DIMENSION);
    limits.max_image_height = Some(MAX_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    limits
}

/// Fully decode `bytes` within [`decode_limits`], returning the detected format.
fn decode(bytes: &[u8]) -> Result<ImageFormat, MediaError> {
    let format = image::guess_format(bytes)?;
    let mut reader = ImageReader::with_format(Cursor::new(bytes), format);
    reader.limits(decode_limits());
    reader.decode()?;
    Ok(format)
}

fn extension_for(upload: &ImageUpload, format: ImageFormat) -> String {
    upload
        .extension()
        .or_else(|| format.extensions_str().first().map(|ext| (*ext).to_string()))
        .unwrap_or_else(|| "img".to_string())
}

impl ImageStore for FsImageStore {
    #[tracing::instrument(skip_all, fields(filename = ?upload.filename, size = upload.bytes.len()))]
    async fn save(&self, upload: ImageUpload) -> Result<String, BizDirError> {
        let (upload, decoded) = tokio::task::spawn_blocking(move || {
            let decoded = decode(&upload.bytes);
            (upload, decoded)
        })
        .await
        .map_err(MediaError::from)?;
        let format = decoded?;

        let path = image_path(&extension_for(&upload, format));
        let target = self.root.join(&path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(MediaError::from)?;
        }
        tokio::fs::write(&target, &upload.bytes)
            .await
            .map_err(MediaError::from)?;

        tracing::debug!(%path, ?format, "stored image");
        Ok(path)
    }

    #[tracing::instrument(skip(self))]
    async fn remove(&self, path: &str) -> Result<(), BizDirError> {
        if !path.starts_with(IMAGE_PREFIX) || path.contains("..") {
            tracing::warn!("refusing to remove path outside the image directory");
            return Ok(());
        }
        match tokio::fs::remove_file(self.root.join(path)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(MediaError::from(err).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(10, 10, image::Rgb([200, 10, 10]));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    fn upload(filename: Option<&str>, bytes: Vec<u8>) -> ImageUpload {
        ImageUpload {
            filename: filename.map(str::to_string),
            bytes,
        }
    }

    #[tokio::test]
    async fn should_store_image_under_prefix_with_upload_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path());

        let path = store
            .save(upload(Some("Photo.PNG"), png_bytes()))
            .await
            .unwrap();

        assert!(path.starts_with(IMAGE_PREFIX));
        assert!(path.ends_with(".png"));
        assert!(!path.contains("Photo"));
        let written = std::fs::read(dir.path().join(&path)).unwrap();
        assert_eq!(written, png_bytes());
    }

    #[tokio::test]
    async fn should_use_detected_format_when_filename_has_no_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path());

        let path = store.save(upload(Some("photo"), png_bytes())).await.unwrap();
        assert!(path.ends_with(".png"));
    }

    #[tokio::test]
    async fn should_generate_fresh_path_for_each_upload() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path());

        let first = store.save(upload(Some("a.png"), png_bytes())).await.unwrap();
        let second = store.save(upload(Some("a.png"), png_bytes())).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn should_reject_undecodable_payload_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path());

        let result = store
            .save(upload(Some("a.png"), b"notanimage".to_vec()))
            .await;

        assert!(matches!(
            result,
            Err(BizDirError::Validation(ValidationError::InvalidImage))
        ));
        assert!(!dir.path().join(IMAGE_PREFIX).exists());
    }

    #[tokio::test]
    async fn should_reject_truncated_image() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path());
        let mut bytes = png_bytes();
        bytes.truncate(20);

        let result = store.save(upload(Some("a.png"), bytes)).await;
        assert!(matches!(
            result,
            Err(BizDirError::Validation(ValidationError::InvalidImage))
        ));
    }

    #[tokio::test]
    async fn should_reject_image_exceeding_dimension_limit() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path());
        let wide = image::GrayImage::new(MAX_DIMENSION + 1, 1);
        let mut buffer = Cursor::new(Vec::new());
        wide.write_to(&mut buffer, ImageFormat::Png).unwrap();

        let result = store
            .save(upload(Some("wide.png"), buffer.into_inner()))
            .await;

        assert!(matches!(
            result,
            Err(BizDirError::Validation(ValidationError::InvalidImage))
        ));
        assert!(!dir.path().join(IMAGE_PREFIX).exists());
    }

    #[tokio::test]
    async fn should_remove_stored_image() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path());
        let path = store.save(upload(Some("a.png"), png_bytes())).await.unwrap();

        store.remove(&path).await.unwrap();

        assert!(!dir.path().join(&path).exists());
        // already gone
        store.remove(&path).await.unwrap();
    }

    #[tokio::test]
    async fn should_not_remove_files_outside_image_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path());
        std::fs::write(dir.path().join("keep.txt"), b"keep").unwrap();

        store.remove("keep.txt").await.unwrap();
        store
            .remove(&format!("{IMAGE_PREFIX}../../keep.txt"))
            .await
            .unwrap();

        assert!(dir.path().join("keep.txt").exists());
    }
}
