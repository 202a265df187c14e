//! Decoding of uploaded photos into pixel buffers.

use std::path::Path;

use derive_more::Display;
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use strum::{AsRefStr, EnumString};
use utoipa::ToSchema;

/// Image formats accepted by the uploader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, EnumString, AsRefStr, ToSchema)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum UploadFormat {
    #[strum(serialize = "png")]
    Png,
    #[strum(to_string = "jpeg", serialize = "jpg")]
    Jpeg,
}

impl UploadFormat {
    /// Format implied by the file extension. `None` when the extension is
    /// missing or not one of jpg/jpeg/png.
    pub fn from_filename(filename: &str) -> Option<Self> {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    fn image_format(self) -> ImageFormat {
        match self {
            UploadFormat::Png => ImageFormat::Png,
            UploadFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

#[derive(Debug, Display, PartialEq, Eq)]
pub enum ImageError {
    #[display(fmt = "Image data is too large: {} bytes (max: {} bytes)", _0, _1)]
    TooLarge(usize, usize),

    #[display(fmt = "Unsupported image format")]
    UnsupportedFormat,

    #[display(fmt = "Failed to decode image: {}", _0)]
    DecodeFailed(String),

    #[display(fmt = "Image data is empty")]
    EmptyData,
}

impl std::error::Error for ImageError {}

/// Metadata reported back to the uploader
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImageInfo {
    #[schema(example = 640)]
    pub width: u32,
    #[schema(example = 480)]
    pub height: u32,
    pub format: UploadFormat,
    #[schema(example = "Rgb8")]
    pub color_type: String,
    #[schema(example = 48213)]
    pub size_bytes: usize,
}

/// Decode raw upload bytes. The format comes from the magic bytes, not
/// from the file name.
pub fn decode_upload(
    bytes: &[u8],
    max_bytes: usize,
) -> Result<(DynamicImage, ImageInfo), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    if bytes.len() > max_bytes {
        return Err(ImageError::TooLarge(bytes.len(), max_bytes));
    }

    let format = detect_format(bytes)?;

    let img = image::load_from_memory_with_format(bytes, format.image_format())
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        color_type: format!("{:?}", img.color()),
        size_bytes: bytes.len(),
    };

    Ok((img, info))
}

/// Detect image format from magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<UploadFormat, ImageError> {
    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(UploadFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(UploadFormat::Jpeg),

        _ => Err(ImageError::UnsupportedFormat),
    }
}
