//! Decoded RGBA rasters and the pixel sampler.

use agro_common::{AnalysisError, AnalysisResult};

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// A single RGBA pixel read from a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSample {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PixelSample {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// A fully decoded image: `width * height` RGBA8 pixels in row-major order.
#[derive(Debug, Clone)]
pub struct DecodedRaster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl DecodedRaster {
    /// Wrap an RGBA8 buffer, checking its length against the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> AnalysisResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or_else(|| {
                AnalysisError::processing(format!("raster {}x{} is too large", width, height))
            })?;

        if data.len() != expected {
            return Err(AnalysisError::MalformedRaster {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total pixels, transparent ones included.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Single pass over the pixels with `alpha >= alpha_threshold`.
    pub fn samples(&self, alpha_threshold: u8) -> Samples<'_> {
        Samples {
            pixels: self.data.chunks_exact(CHANNELS),
            alpha_threshold,
        }
    }
}

/// Iterator over the opaque pixels of a raster.
pub struct Samples<'a> {
    pixels: std::slice::ChunksExact<'a, u8>,
    alpha_threshold: u8,
}

impl Iterator for Samples<'_> {
    type Item = PixelSample;

    #[inline]
    fn next(&mut self) -> Option<PixelSample> {
        for px in self.pixels.by_ref() {
            if px[3] >= self.alpha_threshold {
                return Some(PixelSample::new(px[0], px[1], px[2], px[3]));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.pixels.size_hint().1)
    }
}
