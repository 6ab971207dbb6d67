use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbImage};
use ndarray::Array2;

use crate::error::Result;
use crate::mask::BinaryMask;

/// Image file extensions recognized in dataset directories.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["tif", "tiff", "png", "jpg", "jpeg"];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_high_bit_depth(img: &DynamicImage) -> bool {
    let color = img.color();
    color.bits_per_pixel() / color.channel_count() as u16 > 8
}

/// Load an image as raw grayscale sample values (not normalized).
///
/// 16-bit sources keep their full range; everything else goes through 8-bit
/// luminance.
pub fn load_gray(path: &Path) -> Result<Array2<f32>> {
    let img = image::open(path)?;
    let data = if is_high_bit_depth(&img) {
        let gray = img.to_luma16();
        let (w, h) = gray.dimensions();
        Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
            gray.get_pixel(col as u32, row as u32).0[0] as f32
        })
    } else {
        let gray = img.to_luma8();
        let (w, h) = gray.dimensions();
        Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
            gray.get_pixel(col as u32, row as u32).0[0] as f32
        })
    };
    Ok(data)
}

/// Load a ground-truth mask.
///
/// 16-bit label images are foreground above half their maximum; 8-bit masks
/// are foreground wherever non-zero.
pub fn load_mask(path: &Path) -> Result<BinaryMask> {
    let img = image::open(path)?;
    if is_high_bit_depth(&img) {
        let gray = img.to_luma16();
        let (w, h) = gray.dimensions();
        let max = gray.pixels().map(|p| p.0[0]).max().unwrap_or(0) as f32;
        let cut = max / 2.0;
        Ok(Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
            gray.get_pixel(col as u32, row as u32).0[0] as f32 > cut
        }))
    } else {
        let gray = img.to_luma8();
        let (w, h) = gray.dimensions();
        Ok(Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
            gray.get_pixel(col as u32, row as u32).0[0] > 0
        }))
    }
}

/// Save an 8-bit RGB image as PNG.
pub fn save_rgb_png(img: &RgbImage, path: &Path) -> Result<()> {
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
