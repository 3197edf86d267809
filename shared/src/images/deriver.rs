use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use uuid::Uuid;

use crate::config::ImageLimits;
use crate::error::{Result, ServiceError};

/// Format every preview and thumbnail is normalised to.
pub const PREVIEW_FORMAT: ImageFormat = ImageFormat::WebP;
pub const PREVIEW_EXT: &str = "webp";

/// Encoded bytes of one variant together with what the codec reports about them
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedVariant {
    pub id: String,
    pub ext: String,
    pub width: u32,
    pub height: u32,
    pub content: Vec<u8>,
}

/// The preview either is the original itself or a separately encoded object
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Original,
    Converted(DerivedVariant),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedImage {
    pub orig: DerivedVariant,
    pub prvw: Preview,
    pub thmb: DerivedVariant,
}

impl DerivedImage {
    pub fn preview(&self) -> &DerivedVariant {
        match &self.prvw {
            Preview::Original => &self.orig,
            Preview::Converted(variant) => variant,
        }
    }
}

/// Lowercase extension token used in keys and content types; `None` for
/// formats the pipeline does not accept.
pub fn format_token(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Jpeg => Some("jpeg"),
        ImageFormat::Png => Some("png"),
        ImageFormat::WebP => Some("webp"),
        ImageFormat::Gif => Some("gif"),
        ImageFormat::Tiff => Some("tiff"),
        _ => None,
    }
}

/// Bounding box of the thumbnail: the axis of the longer side is fixed to
/// `size`, the other one follows the aspect ratio.
pub fn thumbnail_box(width: u32, height: u32, size: u32) -> (u32, u32) {
    let scaled = |num: u32, den: u32| -> u32 {
        let value = (num as f64 * size as f64 / den as f64).round() as u32;
        value.max(1)
    };

    if height > width {
        (scaled(width, height), size)
    } else {
        (size, scaled(height, width))
    }
}

/// Reads the dimensions straight from an encoded buffer.
pub fn probe_dimensions(content: &[u8]) -> Result<(u32, u32)> {
    ImageReader::new(Cursor::new(content))
        .with_guessed_format()
        .map_err(|err| ServiceError::InternalError(format!("Could not read image: {}", err)))?
        .into_dimensions()
        .map_err(|err| ServiceError::InternalError(format!("Could not read image dimensions: {}", err)))
}

pub fn encode_webp(image: &DynamicImage) -> Result<Vec<u8>> {
    // the webp encoder only takes 8-bit rgb(a)
    let normalized = if image.color().has_alpha() {
        DynamicImage::ImageRgba8(image.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    };

    let mut buffer = Cursor::new(Vec::new());
    normalized
        .write_to(&mut buffer, PREVIEW_FORMAT)
        .map_err(|err| ServiceError::InternalError(format!("WebP encoding failed: {}", err)))?;

    Ok(buffer.into_inner())
}

fn encoded_variant(content: Vec<u8>) -> Result<DerivedVariant> {
    let (width, height) = probe_dimensions(&content)?;
    Ok(DerivedVariant {
        id: Uuid::new_v4().to_string(),
        ext: PREVIEW_EXT.to_string(),
        width,
        height,
        content,
    })
}

/// Turns an uploaded image into its original, preview and thumbnail variants.
///
/// Pure transform over bytes: nothing is written anywhere. Decoding and resizing
/// are CPU-bound, async callers should run `derive` on a blocking thread.
#[derive(Debug, Clone, Copy)]
pub struct VariantDeriver {
    limits: ImageLimits,
}

impl VariantDeriver {
    pub fn new(limits: ImageLimits) -> Self {
        Self { limits }
    }

    pub fn decode_payload(payload: &str) -> Result<Vec<u8>> {
        STANDARD.decode(payload.trim()).map_err(|err| {
            tracing::warn!("Image payload is not valid base64: {}", err);
            ServiceError::ValidationError("image must be a base64 encoded string".to_string())
        })
    }

    pub fn derive(&self, bytes: Vec<u8>) -> Result<DerivedImage> {
        let format = image::guess_format(&bytes).map_err(|_| ServiceError::UnsupportedFormat)?;
        let ext = format_token(format).ok_or(ServiceError::UnsupportedFormat)?;

        if bytes.len() > self.limits.max_image_bytes {
            tracing::warn!(
                "Rejecting {} image of {} bytes (limit {})",
                ext,
                bytes.len(),
                self.limits.max_image_bytes
            );
            return Err(ServiceError::PayloadTooLarge {
                size: bytes.len(),
                limit: self.limits.max_image_bytes,
            });
        }

        let decoded = image::load_from_memory_with_format(&bytes, format).map_err(|err| {
            tracing::warn!("Could not decode {} image: {}", ext, err);
            ServiceError::UnsupportedFormat
        })?;

        let (width, height) = (decoded.width(), decoded.height());
        if width == 0 || height == 0 {
            return Err(ServiceError::UnsupportedFormat);
        }
        tracing::debug!("Decoded {} image {}x{}", ext, width, height);

        let (thumb_width, thumb_height) =
            thumbnail_box(width, height, self.limits.thumbnail_size);
        let thumbnail = decoded.resize_to_fill(thumb_width, thumb_height, FilterType::Lanczos3);
        let thmb = encoded_variant(encode_webp(&thumbnail)?)?;

        let prvw = if format == PREVIEW_FORMAT {
            Preview::Original
        } else {
            Preview::Converted(encoded_variant(encode_webp(&decoded)?)?)
        };

        let orig = DerivedVariant {
            id: Uuid::new_v4().to_string(),
            ext: ext.to_string(),
            width,
            height,
            content: bytes,
        };

        tracing::info!(
            "Derived variants: orig {}x{} {}, thmb {}x{}",
            orig.width,
            orig.height,
            orig.ext,
            thmb.width,
            thmb.height
        );

        Ok(DerivedImage { orig, prvw, thmb })
    }
}
