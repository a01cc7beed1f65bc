//! Generators for synthetic RGBA rasters.
//!
//! All buffers are row-major RGBA8 (4 bytes per pixel), the layout
//! `DecodedRaster::new` expects.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageOutputFormat, RgbaImage};
use std::io::{Cursor, Write};

/// Fully opaque alpha.
pub const OPAQUE: u8 = 255;

/// Every pixel set to `rgba`.
pub fn solid_rgba(width: usize, height: usize, rgba: [u8; 4]) -> Vec<u8> {
    rgba.repeat(width * height)
}

/// Flatten a pixel list into a buffer.
pub fn rgba_from_pixels(pixels: &[[u8; 4]]) -> Vec<u8> {
    pixels.concat()
}

/// Vertical stripes cycling through `colors`, one column per stripe.
///
/// # Example
///
/// ```
/// use test_utils::striped_rgba;
///
/// let data = striped_rgba(4, 1, &[[0, 0, 0, 255], [255, 255, 255, 255]]);
/// assert_eq!(&data[4..8], &[255, 255, 255, 255]);
/// ```
pub fn striped_rgba(width: usize, height: usize, colors: &[[u8; 4]]) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height * 4);
    for _row in 0..height {
        for col in 0..width {
            data.extend_from_slice(&colors[col % colors.len()]);
        }
    }
    data
}

/// Horizontal band layout: each `(color, rows)` entry fills `rows` full rows.
pub fn banded_rgba(width: usize, bands: &[([u8; 4], usize)]) -> Vec<u8> {
    let mut data = Vec::new();
    for (color, rows) in bands {
        data.extend(color.repeat(width * rows));
    }
    data
}

/// NDVI-like ramp: red on the left through yellow to green on the right.
pub fn vegetation_ramp_rgba(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height * 4);
    for _row in 0..height {
        for col in 0..width {
            let t = col as f32 / (width.max(2) - 1) as f32;
            let (r, g) = if t < 0.5 {
                (215.0, 48.0 + (224.0 - 48.0) * t * 2.0)
            } else {
                (215.0 - (215.0 - 26.0) * (t - 0.5) * 2.0, 224.0 - (224.0 - 152.0) * (t - 0.5) * 2.0)
            };
            data.extend_from_slice(&[r as u8, g as u8, 60, OPAQUE]);
        }
    }
    data
}

/// Deterministic pseudo-random opaque pixels (xorshift), for benchmarks.
pub fn noise_rgba(width: usize, height: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.max(1);
    let mut data = Vec::with_capacity(width * height * 4);
    for _ in 0..width * height {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let bytes = state.to_le_bytes();
        data.extend_from_slice(&[bytes[0], bytes[1], bytes[2], OPAQUE]);
    }
    data
}

/// Encode an RGBA buffer as PNG bytes.
pub fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
    let image = RgbaImage::from_raw(width, height, rgba.to_vec())
        .expect("buffer length must match dimensions");
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut out, ImageOutputFormat::Png)
        .expect("PNG encoding failed");
    out.into_inner()
}

/// Wrap image bytes in a base64 data URI.
pub fn png_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// Write image bytes to a temporary `.png` file that lives as long as the handle.
pub fn write_temp_png(png: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("failed to create temp file");
    file.write_all(png).expect("failed to write temp file");
    file.flush().expect("failed to flush temp file");
    file
}
