//! Media port — blob storage for uploaded images.

use std::future::Future;

use bizdir_domain::business::ImageUpload;
use bizdir_domain::error::BizDirError;

/// Stores uploaded images under freshly generated paths.
pub trait ImageStore {
    /// Decode-check and persist `upload`, returning its storage path
    /// (see [`bizdir_domain::business::image_path`]).
    ///
    /// Fails with `ValidationError::InvalidImage` when the payload is not a
    /// decodable image; nothing is written in that case.
    fn save(&self, upload: ImageUpload) -> impl Future<Output = Result<String, BizDirError>> + Send;

    /// Delete a previously stored image. A path that no longer exists is
    /// not an error.
    fn remove(&self, path: &str) -> impl Future<Output = Result<(), BizDirError>> + Send;
}
