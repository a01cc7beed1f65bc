//! Common color range fixtures.

use agro_common::ColorRange;

/// Material green used by the crop layer legend.
pub const CROP_GREEN: [u8; 3] = [46, 125, 50];

pub const BLACK: [u8; 4] = [0, 0, 0, 255];
pub const WHITE: [u8; 4] = [255, 255, 255, 255];
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Single vegetation bucket around `CROP_GREEN`.
pub fn vegetation_range(tolerance: u8) -> ColorRange {
    ColorRange::new("Veg", CROP_GREEN, tolerance)
}

/// Exact black and white buckets.
pub fn black_and_white_ranges() -> Vec<ColorRange> {
    vec![
        ColorRange::new("Black", [0, 0, 0], 0),
        ColorRange::new("White", [255, 255, 255], 0),
    ]
}

/// Four narrow buckets in colors synthetic test images avoid.
pub fn unrelated_ranges() -> Vec<ColorRange> {
    vec![
        ColorRange::new("Magenta", [255, 0, 255], 5),
        ColorRange::new("Cyan", [0, 255, 255], 5),
        ColorRange::new("Navy", [0, 0, 128], 5),
        ColorRange::new("Olive", [128, 128, 0], 5),
    ]
}
