//! Image processing and storage
//!
//! ## Responsibilities
//!
//! - Validation of captured photos (weight and dimension limits)
//! - Compression into a bounded JPEG, never upscaling
//! - Square-bounded thumbnails for list views
//! - Durable copies under the app-private `images/` directory; the
//!   transient capture URI is never referenced by persisted state
//! - Best-effort deletion and age-based sweep of orphaned files

mod types;

pub use types::*;

use crate::error::{Error, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

/// Image service instance
pub struct ImageService {
    images_dir: PathBuf,
    limits: ImageLimits,
}

impl ImageService {
    /// Create the service, ensuring the storage directory exists
    pub async fn new(images_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&images_dir).await?;
        Ok(Self {
            images_dir,
            limits: ImageLimits::default(),
        })
    }

    /// Override the acceptance limits (tests)
    pub fn with_limits(mut self, limits: ImageLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    // ========================================
    // Pipeline steps
    // ========================================

    /// Check a capture against the limits
    ///
    /// A merely-invalid image yields `valid: false` with the accumulated
    /// reasons; only an unreadable file is an error.
    pub async fn validate_image(&self, source: &Path) -> Result<ImageValidation> {
        let meta = fs::metadata(source).await?;
        let (width, height) = image::image_dimensions(source)
            .map_err(|e| Error::Image(format!("unreadable image {}: {e}", source.display())))?;

        let reasons = evaluate_limits(meta.len(), width, height, &self.limits);
        Ok(ImageValidation {
            valid: reasons.is_empty(),
            reasons,
        })
    }

    /// Re-encode a capture as a bounded JPEG in the storage directory
    ///
    /// Images already inside the bounding box keep their dimensions.
    pub async fn compress_image(&self, source: &Path, options: &ProcessOptions) -> Result<PathBuf> {
        let img = image::open(source)
            .map_err(|e| Error::Image(format!("decode failed for {}: {e}", source.display())))?;

        let (width, height) = img.dimensions();
        let resized = if width > options.max_width || height > options.max_height {
            img.resize(options.max_width, options.max_height, FilterType::Lanczos3)
        } else {
            img
        };

        let path = self.allocate_name("");
        self.encode_jpeg(&resized, &path, options.quality).await?;

        debug!(
            source = %source.display(),
            stored = %path.display(),
            width = resized.width(),
            height = resized.height(),
            "Image compressed"
        );

        Ok(path)
    }

    /// Produce a square-bounded, lower-quality derivative for list views
    pub async fn create_thumbnail(&self, source: &Path, size: u32) -> Result<PathBuf> {
        let path = self.allocate_name("_thumb");
        self.thumbnail_to(source, &path, size).await?;
        Ok(path)
    }

    /// Full pipeline: validate, compress, thumbnail
    ///
    /// Short-circuits with the validation reasons; any processing error
    /// comes back as a failure outcome instead of propagating.
    pub async fn process_image(&self, source: &Path, options: &ProcessOptions) -> ProcessOutcome {
        let validation = match self.validate_image(source).await {
            Ok(v) => v,
            Err(e) => return ProcessOutcome::failure(vec![e.to_string()]),
        };
        if !validation.valid {
            return ProcessOutcome::failure(
                validation.reasons.iter().map(|r| r.to_string()).collect(),
            );
        }

        let stored_path = match self.compress_image(source, options).await {
            Ok(p) => p,
            Err(e) => return ProcessOutcome::failure(vec![e.to_string()]),
        };

        let thumbnail_path = Self::thumbnail_sibling(&stored_path);
        if let Err(e) = self
            .thumbnail_to(source, &thumbnail_path, options.thumbnail_size)
            .await
        {
            // do not leave a half-processed pair behind
            let _ = fs::remove_file(&stored_path).await;
            return ProcessOutcome::failure(vec![e.to_string()]);
        }

        let (width, height) = image::image_dimensions(&stored_path).unwrap_or((0, 0));
        let size_bytes = fs::metadata(&stored_path).await.map(|m| m.len()).unwrap_or(0);

        ProcessOutcome {
            success: true,
            stored: Some(StoredImage {
                path: stored_path,
                thumbnail_path,
                width,
                height,
                size_bytes,
            }),
            errors: vec![],
        }
    }

    // ========================================
    // Housekeeping
    // ========================================

    /// Remove a stored image and its thumbnail; best effort, logged only
    pub async fn delete_image(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            debug!(path = %path.display(), error = %e, "Image delete failed");
        }
        let thumb = Self::thumbnail_sibling(path);
        if thumb.as_path() != path && thumb.exists() {
            if let Err(e) = fs::remove_file(&thumb).await {
                debug!(path = %thumb.display(), error = %e, "Thumbnail delete failed");
            }
        }
    }

    /// Sweep stored files older than `max_age_days`; best effort, logged only
    pub async fn cleanup_old_images(&self, max_age_days: i64) -> u64 {
        let age = std::time::Duration::from_secs(max_age_days.max(0) as u64 * 86_400);
        let cutoff = std::time::SystemTime::now() - age;

        let mut entries = match fs::read_dir(&self.images_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.images_dir.display(), error = %e, "Image sweep skipped");
                return 0;
            }
        };

        let mut removed = 0u64;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(t) => t,
                Err(e) => {
                    debug!(path = %entry.path().display(), error = %e, "Sweep metadata failed");
                    continue;
                }
            };
            if modified <= cutoff {
                match fs::remove_file(entry.path()).await {
                    Ok(()) => removed += 1,
                    Err(e) => debug!(path = %entry.path().display(), error = %e, "Sweep delete failed"),
                }
            }
        }

        if removed > 0 {
            info!(removed, max_age_days, "Old images swept");
        }
        removed
    }

    /// Run the sweep periodically in the background
    pub fn spawn_cleanup_task(
        self: Arc<Self>,
        interval: std::time::Duration,
        max_age_days: i64,
    ) -> tokio::task::JoinHandle<()> {
        let service = self;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                service.cleanup_old_images(max_age_days).await;
            }
        })
    }

    // ========================================
    // Internals
    // ========================================

    async fn thumbnail_to(&self, source: &Path, dest: &Path, size: u32) -> Result<()> {
        let img = image::open(source)
            .map_err(|e| Error::Image(format!("decode failed for {}: {e}", source.display())))?;

        let (width, height) = img.dimensions();
        let thumb = if width > size || height > size {
            img.thumbnail(size, size)
        } else {
            img
        };

        self.encode_jpeg(&thumb, dest, defaults::THUMBNAIL_QUALITY)
            .await
    }

    async fn encode_jpeg(&self, img: &DynamicImage, dest: &Path, quality: u8) -> Result<()> {
        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        let mut buf = Vec::new();
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
            .map_err(|e| Error::Image(format!("encode failed: {e}")))?;
        fs::write(dest, &buf).await?;
        Ok(())
    }

    /// Timestamp-based name under the storage directory; bumps the
    /// millisecond until the name is free
    fn allocate_name(&self, suffix: &str) -> PathBuf {
        let mut ts = chrono::Utc::now().timestamp_millis();
        loop {
            let path = self.images_dir.join(format!("incident_{ts}{suffix}.jpg"));
            if !path.exists() {
                return path;
            }
            ts += 1;
        }
    }

    fn thumbnail_sibling(path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "jpg".to_string());
        path.with_file_name(format!("{stem}_thumb.{ext}"))
    }
}
