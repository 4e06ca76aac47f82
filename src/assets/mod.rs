//! Image acquisition.
//!
//! Sheets are loaded once per URL and kept in an [`ImageCache`] owned by
//! the caller. Missing images are loaded in parallel through an
//! [`ImageLoader`]; the render pass itself only reads the cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use rayon::prelude::*;

use crate::error::{AvatarError, Result};

/// Source of sheet images.
pub trait ImageLoader: Sync {
    /// Load the image behind `url`.
    fn load(&self, url: &str) -> Result<RgbaImage>;
}

/// Loads images from the filesystem.
///
/// Relative paths and `file://` URLs are resolved against `base`.
#[derive(Debug, Clone)]
pub struct FileLoader {
    base: PathBuf,
}

impl FileLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Filesystem path for a sheet URL.
    pub fn resolve(&self, url: &str) -> Result<PathBuf> {
        if url.contains("://") && !url.starts_with("file://") {
            return Err(AvatarError::LoadFailure {
                url: url.to_string(),
                message: "only local paths and file:// URLs can be read from disk".to_string(),
            });
        }

        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.base.join(path))
        }
    }
}

impl ImageLoader for FileLoader {
    fn load(&self, url: &str) -> Result<RgbaImage> {
        let path = self.resolve(url)?;
        let image = image::open(&path).map_err(|e| AvatarError::LoadFailure {
            url: url.to_string(),
            message: format!("{}: {}", path.display(), e),
        })?;
        Ok(image.to_rgba8())
    }
}

/// Decoded sheet images keyed by URL. Entries are never evicted.
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    images: HashMap<String, Arc<RgbaImage>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every URL not already cached.
    ///
    /// Duplicates are loaded once. Successful loads are kept even when
    /// another URL fails; the first failure in request order is returned.
    /// Returns how many images were loaded.
    pub fn ensure_loaded<I, S, L>(&mut self, urls: I, loader: &L) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        L: ImageLoader + ?Sized,
    {
        let mut missing: Vec<String> = Vec::new();
        for url in urls {
            let url = url.as_ref();
            if !self.images.contains_key(url) && !missing.iter().any(|m| m == url) {
                missing.push(url.to_string());
            }
        }

        let results: Vec<(String, Result<RgbaImage>)> = missing
            .into_par_iter()
            .map(|url| {
                let result = loader.load(&url);
                (url, result)
            })
            .collect();

        let mut loaded = 0;
        let mut first_error = None;
        for (url, result) in results {
            match result {
                Ok(image) => {
                    self.images.insert(url, Arc::new(image));
                    loaded += 1;
                }
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(loaded),
        }
    }

    pub fn get(&self, url: &str) -> Option<&RgbaImage> {
        self.images.get(url).map(Arc::as_ref)
    }

    /// Shared handle to a cached image.
    pub fn shared(&self, url: &str) -> Option<Arc<RgbaImage>> {
        self.images.get(url).cloned()
    }

    pub fn insert(&mut self, url: impl Into<String>, image: RgbaImage) {
        self.images.insert(url.into(), Arc::new(image));
    }

    pub fn contains(&self, url: &str) -> bool {
        self.images.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Drop every cached image.
    pub fn clear(&mut self) {
        self.images.clear();
    }
}
