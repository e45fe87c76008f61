use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, Rgb, RgbImage};

use crate::models::strategy::EnhancementStrategy;

/// JPEG quality for re-encoded output. Listing portals recompress anyway.
const OUTPUT_JPEG_QUALITY: u8 = 90;

/// Decode a base64 image, tolerating an optional `data:image/...;base64,`
/// prefix as sent by browser canvases.
pub fn decode_image(input: &str) -> Result<Vec<u8>, EnhanceError> {
    let payload = match input.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:image/") => rest,
        _ => input,
    };
    Ok(base64::engine::general_purpose::STANDARD.decode(payload.trim())?)
}

/// Encode JPEG bytes back into the data-URL form the frontend expects.
pub fn to_data_url(jpeg_bytes: &[u8]) -> String {
    format!(
        "data:image/jpeg;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(jpeg_bytes)
    )
}

/// Apply an enhancement strategy to raw image bytes and re-encode as JPEG.
///
/// Pixel pipeline: brightness multiplier, saturation scaling around per-pixel
/// luma, linear contrast, then an optional unsharp mask. Matches the order the
/// strategy parameters were tuned in.
pub fn enhance_image(
    image_bytes: &[u8],
    strategy: &EnhancementStrategy,
) -> Result<Vec<u8>, EnhanceError> {
    let decoded = image::load_from_memory(image_bytes)?;
    let mut rgb: RgbImage = decoded.to_rgb8();

    let brightness = strategy.brightness as f32;
    let saturation = strategy.saturation as f32;
    let contrast = strategy.contrast as f32;

    let adjusts_pixels = (brightness - 1.0).abs() > f32::EPSILON
        || (saturation - 1.0).abs() > f32::EPSILON
        || (contrast - 1.0).abs() > f32::EPSILON;

    if adjusts_pixels {
        for pixel in rgb.pixels_mut() {
            *pixel = adjust_pixel(*pixel, brightness, saturation, contrast);
        }
    }

    if strategy.sharpen > 0 {
        rgb = imageops::unsharpen(&rgb, strategy.sharpen as f32, 2);
    }

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, OUTPUT_JPEG_QUALITY).encode_image(&rgb)?;
    Ok(out)
}

fn adjust_pixel(pixel: Rgb<u8>, brightness: f32, saturation: f32, contrast: f32) -> Rgb<u8> {
    let r = pixel.0[0] as f32 * brightness;
    let g = pixel.0[1] as f32 * brightness;
    let b = pixel.0[2] as f32 * brightness;

    // Rec. 601 luma; saturation scales chroma around it.
    let luma = 0.299 * r + 0.587 * g + 0.114 * b;
    let r = luma + (r - luma) * saturation;
    let g = luma + (g - luma) * saturation;
    let b = luma + (b - luma) * saturation;

    Rgb([
        (r * contrast).clamp(0.0, 255.0) as u8,
        (g * contrast).clamp(0.0, 255.0) as u8,
        (b * contrast).clamp(0.0, 255.0) as u8,
    ])
}

#[derive(Debug, thiserror::Error)]
pub enum EnhanceError {
    #[error("invalid base64 image payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),
}
