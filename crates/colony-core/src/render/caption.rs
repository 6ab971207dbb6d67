use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::consts::{
    CAPTION_GLYPH_SCALE, CAPTION_HEIGHT, CAPTION_MARGIN, CAPTION_TIME_COLOR, GT_OVERLAY_COLOR,
    PRED_OVERLAY_COLOR,
};

const GLYPH_CELLS: u32 = 8;

/// Values printed in a frame's caption.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptionText {
    pub time: f64,
    pub area_gt: Option<usize>,
    pub area_pred: usize,
    pub growth: f64,
}

/// Width in pixels of `text` when drawn by [`draw_text`].
pub fn text_width(text: &str) -> u32 {
    text.chars().count() as u32 * GLYPH_CELLS * CAPTION_GLYPH_SCALE
}

/// Draw `text` with its top-left corner at `(x, y)`. Pixels outside the
/// image are dropped; characters without a glyph leave a blank cell.
pub fn draw_text(img: &mut RgbImage, text: &str, x: i32, y: i32, color: [u8; 3]) {
    let scale = CAPTION_GLYPH_SCALE;
    let advance = (GLYPH_CELLS * scale) as i32;
    for (i, ch) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch) else {
            continue;
        };
        let left = x + i as i32 * advance;
        for (row, &bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_CELLS {
                // Least significant bit is the leftmost column.
                if bits & (1 << col) == 0 {
                    continue;
                }
                let cell = Rect::at(left + (col * scale) as i32, y + row as i32 * scale as i32)
                    .of_size(scale, scale);
                draw_filled_rect_mut(img, cell, Rgb(color));
            }
        }
    }
}

/// Black bar of [`CAPTION_HEIGHT`] rows: time on the left, ground-truth
/// area centered, predicted area and growth on the right.
pub fn caption_bar(width: u32, text: &CaptionText) -> RgbImage {
    let mut bar = RgbImage::new(width, CAPTION_HEIGHT);
    let y = ((CAPTION_HEIGHT - GLYPH_CELLS * CAPTION_GLYPH_SCALE) / 2) as i32;

    draw_text(
        &mut bar,
        &format!("time={:.2}s", text.time),
        CAPTION_MARGIN as i32,
        y,
        CAPTION_TIME_COLOR,
    );
    if let Some(area) = text.area_gt {
        let label = format!("GT area={area}");
        let x = (width as i32 - text_width(&label) as i32) / 2;
        draw_text(&mut bar, &label, x, y, GT_OVERLAY_COLOR);
    }
    let label = format!("Pred area={}  growth={:.3}", text.area_pred, text.growth);
    let x = width as i32 - text_width(&label) as i32 - CAPTION_MARGIN as i32;
    draw_text(&mut bar, &label, x, y, PRED_OVERLAY_COLOR);
    bar
}
