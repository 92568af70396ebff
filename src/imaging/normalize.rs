//! Capture-to-payload image pipeline: bounded downscale, EXIF rotation
//! correction, JPEG re-encode, base64 data-URI.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use log::debug;

use crate::capture::CapturedImage;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Output width and height are both bounded by this.
    pub max_dimension_px: u32,
    pub jpeg_quality: u8,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_dimension_px: 1280,
            jpeg_quality: 75,
        }
    }
}

/// Transport-ready encoded photo. Bounded in size by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPayload {
    pub data_uri: String,
    pub mime_type: &'static str,
}

/// Run the full pipeline on a captured photo.
///
/// Bounds are probed without a full decode, a successive-doubling sample
/// factor brings both axes under `max_dimension_px`, the EXIF orientation tag
/// (when readable) dictates a clockwise rotation, and the result is JPEG
/// re-encoded and base64-wrapped. Any decode failure surfaces as
/// [`Error::ImageDecode`] carrying the capture's source identifier; the
/// caller treats that as fatal to the attempt, not retried.
pub fn normalize(image: &CapturedImage, options: &NormalizeOptions) -> Result<NormalizedPayload> {
    let max_dim = options.max_dimension_px.max(1);

    // Step 1: bounds only, no pixel data yet
    let (width, height) = ImageReader::new(Cursor::new(&image.bytes))
        .with_guessed_format()
        .map_err(|err| decode_error(image, &err.to_string()))?
        .into_dimensions()
        .map_err(|err| decode_error(image, &err.to_string()))?;

    // Step 2: successive doubling until both axes fit
    let mut sample_factor = 1u32;
    while width / sample_factor > max_dim || height / sample_factor > max_dim {
        sample_factor *= 2;
    }

    // Step 3: full decode, then apply the sample factor
    let decoded = ImageReader::new(Cursor::new(&image.bytes))
        .with_guessed_format()
        .map_err(|err| decode_error(image, &err.to_string()))?
        .decode()
        .map_err(|err| decode_error(image, &err.to_string()))?;
    let mut scaled = if sample_factor > 1 {
        decoded.resize(width / sample_factor, height / sample_factor, FilterType::Triangle)
    } else {
        decoded
    };
    if scaled.width() > max_dim || scaled.height() > max_dim {
        scaled = scaled.resize(max_dim, max_dim, FilterType::Triangle);
    }

    // Steps 4-5: EXIF orientation, clockwise rotation
    let rotation = exif_rotation_degrees(&image.bytes);
    let corrected = apply_rotation(scaled, rotation);
    debug!(
        "normalized '{}': {}x{} -> {}x{} (sample_factor={}, rotation={})",
        image.source,
        width,
        height,
        corrected.width(),
        corrected.height(),
        sample_factor,
        rotation
    );

    // Step 6: JPEG re-encode at the bounded quality
    let rgb = corrected.to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, options.jpeg_quality)
        .encode_image(&rgb)
        .map_err(|err| decode_error(image, &err.to_string()))?;

    // Step 7: self-describing payload
    Ok(NormalizedPayload {
        data_uri: format!("data:image/jpeg;base64,{}", B64.encode(&jpeg)),
        mime_type: "image/jpeg",
    })
}

/// Decode a `data:` URI back into pixels. Used by display layers and tests.
pub fn decode_data_uri(data_uri: &str) -> Result<DynamicImage> {
    let base64_part = data_uri
        .split_once(',')
        .map(|(_, rest)| rest)
        .unwrap_or_default();
    if base64_part.is_empty() {
        return Err(Error::ImageDecode {
            source: "data-uri".to_string(),
            reason: "no base64 payload after comma".to_string(),
        });
    }
    let bytes = B64.decode(base64_part).map_err(|err| Error::ImageDecode {
        source: "data-uri".to_string(),
        reason: err.to_string(),
    })?;
    image::load_from_memory(&bytes).map_err(|err| Error::ImageDecode {
        source: "data-uri".to_string(),
        reason: err.to_string(),
    })
}

/// Map the EXIF orientation tag to clockwise rotation degrees. Missing or
/// unreadable EXIF never fails the pipeline.
fn exif_rotation_degrees(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(meta) => match meta
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
        {
            Some(6) => 90,
            Some(3) => 180,
            Some(8) => 270,
            _ => 0,
        },
        Err(_) => 0,
    }
}

fn apply_rotation(image: DynamicImage, degrees: u32) -> DynamicImage {
    match degrees {
        90 => image.rotate90(),
        180 => image.rotate180(),
        270 => image.rotate270(),
        _ => image,
    }
}

fn decode_error(image: &CapturedImage, reason: &str) -> Error {
    Error::ImageDecode {
        source: image.source.clone(),
        reason: reason.to_string(),
    }
}
