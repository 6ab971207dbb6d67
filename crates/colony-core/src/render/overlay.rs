use image::{Rgb, RgbImage};
use ndarray::Array2;

use crate::consts::{DIVISION_BANNER_ALPHA, DIVISION_BANNER_COLOR, DIVISION_BANNER_HEIGHT};

/// Grayscale [0, 1] intensities replicated into three 8-bit channels.
pub fn gray_to_rgb(data: &Array2<f32>) -> RgbImage {
    let (h, w) = data.dim();
    RgbImage::from_fn(w as u32, h as u32, |x, y| {
        let v = (data[[y as usize, x as usize]].clamp(0.0, 1.0) * 255.0) as u8;
        Rgb([v, v, v])
    })
}

fn blend(a: u8, b: u8, alpha: f32) -> u8 {
    (a as f32 * (1.0 - alpha) + b as f32 * alpha).round().clamp(0.0, 255.0) as u8
}

/// Blend `color` over masked pixels of the grayscale frame.
///
/// The whole image is weighted by `1 - alpha` against a layer that is
/// `color` inside the mask and black elsewhere, so unmasked pixels dim too.
pub fn overlay_mask(data: &Array2<f32>, mask: &Array2<bool>, color: [u8; 3], alpha: f32) -> RgbImage {
    let mut img = gray_to_rgb(data);
    for (x, y, px) in img.enumerate_pixels_mut() {
        let layer = if mask[[y as usize, x as usize]] { color } else { [0, 0, 0] };
        for c in 0..3 {
            px.0[c] = blend(px.0[c], layer[c], alpha);
        }
    }
    img
}

/// Place panels side by side; panels must share a height.
pub fn hstack(panels: &[&RgbImage]) -> RgbImage {
    let height = panels.iter().map(|p| p.height()).max().unwrap_or(0);
    let width: u32 = panels.iter().map(|p| p.width()).sum();
    let mut out = RgbImage::new(width, height);
    let mut offset = 0;
    for panel in panels {
        for (x, y, px) in panel.enumerate_pixels() {
            out.put_pixel(offset + x, y, *px);
        }
        offset += panel.width();
    }
    out
}

/// Place panels top to bottom; panels must share a width.
pub fn vstack(panels: &[&RgbImage]) -> RgbImage {
    let width = panels.iter().map(|p| p.width()).max().unwrap_or(0);
    let height: u32 = panels.iter().map(|p| p.height()).sum();
    let mut out = RgbImage::new(width, height);
    let mut offset = 0;
    for panel in panels {
        for (x, y, px) in panel.enumerate_pixels() {
            out.put_pixel(x, offset + y, *px);
        }
        offset += panel.height();
    }
    out
}

/// Tint the top rows of a frame to mark a division-like event.
pub fn division_banner(img: &mut RgbImage) {
    let rows = DIVISION_BANNER_HEIGHT.min(img.height());
    for y in 0..rows {
        for x in 0..img.width() {
            let px = img.get_pixel_mut(x, y);
            for c in 0..3 {
                px.0[c] = blend(px.0[c], DIVISION_BANNER_COLOR[c], DIVISION_BANNER_ALPHA);
            }
        }
    }
}
