//! Image service type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default limits and encoding settings
pub mod defaults {
    pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;
    pub const MAX_DIMENSION: u32 = 4000;
    pub const MIN_DIMENSION: u32 = 100;
    pub const MAX_WIDTH: u32 = 1920;
    pub const MAX_HEIGHT: u32 = 1080;
    pub const JPEG_QUALITY: u8 = 80;
    pub const THUMBNAIL_SIZE: u32 = 200;
    pub const THUMBNAIL_QUALITY: u8 = 70;
    pub const RETENTION_DAYS: i64 = 7;
}

/// Why a capture was rejected before processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// File weight above the ceiling
    FileTooLarge,
    /// Pixel dimensions above the ceiling
    TooLarge,
    /// Pixel dimensions below the floor
    TooSmall,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileTooLarge => write!(f, "Fichier trop volumineux (max 10 Mo)"),
            Self::TooLarge => write!(f, "Image trop grande (max 4000x4000)"),
            Self::TooSmall => write!(f, "Image trop petite (min 100x100)"),
        }
    }
}

/// Acceptance limits for captured photos
#[derive(Debug, Clone, Copy)]
pub struct ImageLimits {
    pub max_file_bytes: u64,
    pub max_dimension: u32,
    pub min_dimension: u32,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: defaults::MAX_FILE_BYTES,
            max_dimension: defaults::MAX_DIMENSION,
            min_dimension: defaults::MIN_DIMENSION,
        }
    }
}

/// Validation verdict; a merely-invalid image is not an error
#[derive(Debug, Clone)]
pub struct ImageValidation {
    pub valid: bool,
    pub reasons: Vec<RejectReason>,
}

/// Processing settings
#[derive(Debug, Clone, Copy)]
pub struct ProcessOptions {
    /// Bounding box for the compressed image; never upscales
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality, 0-100
    pub quality: u8,
    /// Square bound for the list-view thumbnail
    pub thumbnail_size: u32,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            max_width: defaults::MAX_WIDTH,
            max_height: defaults::MAX_HEIGHT,
            quality: defaults::JPEG_QUALITY,
            thumbnail_size: defaults::THUMBNAIL_SIZE,
        }
    }
}

/// A durably stored, processed photo
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub path: PathBuf,
    pub thumbnail_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
}

/// Result of the full validate-compress-thumbnail pipeline
///
/// Processing failures land here as messages instead of propagating.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub success: bool,
    pub stored: Option<StoredImage>,
    pub errors: Vec<String>,
}

impl ProcessOutcome {
    pub fn failure(errors: Vec<String>) -> Self {
        Self {
            success: false,
            stored: None,
            errors,
        }
    }
}

/// Check reported size and dimensions against the limits, accumulating
/// every applicable reason
pub fn evaluate_limits(
    file_bytes: u64,
    width: u32,
    height: u32,
    limits: &ImageLimits,
) -> Vec<RejectReason> {
    let mut reasons = Vec::new();
    if file_bytes > limits.max_file_bytes {
        reasons.push(RejectReason::FileTooLarge);
    }
    if width > limits.max_dimension || height > limits.max_dimension {
        reasons.push(RejectReason::TooLarge);
    }
    if width < limits.min_dimension || height < limits.min_dimension {
        reasons.push(RejectReason::TooSmall);
    }
    reasons
}
