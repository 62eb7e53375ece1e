//! Fetching and decoding image resources.
//!
//! Loading is asynchronous: the session awaits a loader and hands the result
//! back to the element, which discards it if a newer load has started since.

use async_trait::async_trait;
use diagramkit_core::ImageError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Natural pixel size of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
}

/// Source of image bytes.
#[async_trait(?Send)]
pub trait ImageLoader {
    /// Raw bytes behind `src`.
    async fn fetch(&self, src: &str) -> Result<Vec<u8>, ImageError>;

    /// Fetch and decode `src`.
    async fn load(&self, src: &str) -> Result<DecodedImage, ImageError> {
        if src.trim().is_empty() {
            return Err(ImageError::EmptySource);
        }
        let bytes = self.fetch(src).await?;
        decode(src, &bytes)
    }
}

/// Decode `bytes` far enough to know the image's dimensions.
pub fn decode(src: &str, bytes: &[u8]) -> Result<DecodedImage, ImageError> {
    let image = image::load_from_memory(bytes).map_err(|e| ImageError::Decode {
        src: src.to_string(),
        reason: e.to_string(),
    })?;
    tracing::debug!("Decoded '{}': {}x{}", src, image.width(), image.height());
    Ok(DecodedImage {
        width: image.width(),
        height: image.height(),
    })
}

/// Reads images from the filesystem. Relative sources resolve against
/// `base_dir` when one is set.
#[derive(Debug, Clone, Default)]
pub struct FileImageLoader {
    base_dir: Option<PathBuf>,
}

impl FileImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, src: &str) -> PathBuf {
        let path = Path::new(src);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait(?Send)]
impl ImageLoader for FileImageLoader {
    async fn fetch(&self, src: &str) -> Result<Vec<u8>, ImageError> {
        let path = self.resolve(src);
        tokio::fs::read(&path).await.map_err(|e| ImageError::Load {
            src: src.to_string(),
            reason: e.to_string(),
        })
    }
}

/// In-memory image store keyed by source string.
#[derive(Debug, Default)]
pub struct MemoryImageLoader {
    images: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, src: impl Into<String>, bytes: Vec<u8>) {
        self.images.write().insert(src.into(), bytes);
    }

    pub fn remove(&self, src: &str) -> Option<Vec<u8>> {
        self.images.write().remove(src)
    }
}

#[async_trait(?Send)]
impl ImageLoader for MemoryImageLoader {
    async fn fetch(&self, src: &str) -> Result<Vec<u8>, ImageError> {
        self.images
            .read()
            .get(src)
            .cloned()
            .ok_or_else(|| ImageError::Load {
                src: src.to_string(),
                reason: "not found".to_string(),
            })
    }
}
