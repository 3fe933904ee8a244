//! Raster rendering of the colorbar legend and the placemark icon.

use image::{imageops, ImageFormat, Rgb, Rgba, RgbaImage};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_hollow_rect_mut,
};
use imageproc::rect::Rect;
use std::io::Cursor;

use crate::bucket::{Scale, ValueRange};
use crate::error::{Error, Result};

const MAX_TICKS: f64 = 64.0;
const MAX_DECIMALS: usize = 12;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Which side of the bar frame tick marks are drawn on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickDirection {
    In,
    Out,
}

/// Look of the colorbar legend.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorbarStyle {
    pub bar_width: u32,
    pub bar_height: u32,
    /// Blank border around everything.
    pub margin: u32,
    pub tick_length: u32,
    pub tick_direction: TickDirection,
    /// Approximate number of ticks on a linear scale.
    pub ticks: usize,
    /// Pixel size of one dot of the 8x8 label glyphs.
    pub label_scale: u32,
    pub foreground: Rgba<u8>,
    pub background: Rgba<u8>,
}

impl Default for ColorbarStyle {
    fn default() -> Self {
        Self {
            bar_width: 20,
            bar_height: 300,
            margin: 8,
            tick_length: 4,
            tick_direction: TickDirection::In,
            ticks: 5,
            label_scale: 2,
            foreground: BLACK,
            background: WHITE,
        }
    }
}

/// Draws a vertical colorbar with one band per color, the first color at
/// the bottom, and labelled ticks on its right.
pub fn render_colorbar(
    colors: &[Rgb<u8>],
    range: &ValueRange,
    style: &ColorbarStyle,
) -> RgbaImage {
    let ticks = ticks(range, style.ticks);
    let label_gap = style.label_scale * 2
        + match style.tick_direction {
            TickDirection::In => 0,
            TickDirection::Out => style.tick_length,
        };
    let label_width = ticks
        .iter()
        .map(|(_, label)| text_width(label, style.label_scale))
        .max()
        .unwrap_or(0);

    let (bar_w, bar_h) = (style.bar_width.max(1), style.bar_height.max(1));
    let width = style.margin * 2 + bar_w + label_gap + label_width;
    let height = style.margin * 2 + bar_h;
    let mut img = RgbaImage::from_pixel(width, height, style.background);

    let (x0, y0) = (style.margin as i32, style.margin as i32);
    let bottom = y0 + bar_h as i32;
    let n = colors.len() as u32;
    for (k, &Rgb([r, g, b])) in colors.iter().enumerate() {
        let k = k as u32;
        let top = bottom - ((k + 1) * bar_h / n) as i32;
        let band_h = ((k + 1) * bar_h / n - k * bar_h / n).max(1);
        draw_filled_rect_mut(
            &mut img,
            Rect::at(x0, top).of_size(bar_w, band_h),
            Rgba([r, g, b, 255]),
        );
    }
    draw_hollow_rect_mut(
        &mut img,
        Rect::at(x0, y0).of_size(bar_w, bar_h),
        style.foreground,
    );

    let right = x0 + bar_w as i32;
    let glyph_h = (GLYPH_SIZE * style.label_scale) as i32;
    for (t, label) in &ticks {
        let y = bottom - (t * bar_h as f64).round() as i32;
        let y = y.max(y0).min(bottom - 1);
        if style.tick_length > 0 {
            let x = match style.tick_direction {
                TickDirection::In => right - style.tick_length as i32,
                TickDirection::Out => right,
            };
            draw_filled_rect_mut(
                &mut img,
                Rect::at(x, y).of_size(style.tick_length, 1),
                style.foreground,
            );
        }

        let label_x = right + label_gap as i32;
        draw_text(
            &mut img,
            label,
            label_x,
            y - glyph_h / 2,
            style.label_scale,
            style.foreground,
        );
    }

    img
}

/// Draws the placemark icon: a white disc, optionally with a black rim, on
/// a transparent background and cropped to the disc.
pub fn render_icon(edge: bool) -> RgbaImage {
    const SIZE: u32 = 26;
    const RADIUS: i32 = 9;

    let mut img = RgbaImage::from_pixel(SIZE, SIZE, Rgba([0, 0, 0, 0]));
    let center = (SIZE as i32 / 2, SIZE as i32 / 2);
    draw_filled_circle_mut(&mut img, center, RADIUS, WHITE);
    draw_hollow_circle_mut(&mut img, center, RADIUS, if edge { BLACK } else { WHITE });

    match opaque_bounds(&img) {
        Some((x, y, w, h)) => imageops::crop_imm(&img, x, y, w, h).to_image(),
        None => img,
    }
}

/// Encodes an image as PNG.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(Error::Encode)?;
    Ok(buf.into_inner())
}

fn opaque_bounds(img: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, px) in img.enumerate_pixels() {
        if px[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds.map(|(x0, y0, x1, y1)| (x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

/// Tick positions in [0, 1] along the bar, with their labels.
fn ticks(range: &ValueRange, target: usize) -> Vec<(f64, String)> {
    let values = match range.scale {
        Scale::Linear => linear_ticks(range.vmin, range.vmax, target),
        Scale::Log => log_ticks(range.vmin, range.vmax),
    };

    values
        .into_iter()
        .map(|(v, label)| {
            let t = range.normalize(v);
            (if t.is_finite() { t } else { 0.0 }, label)
        })
        .collect()
}

fn linear_ticks(vmin: f64, vmax: f64, target: usize) -> Vec<(f64, String)> {
    let span = vmax - vmin;
    if !(span > 0.0) {
        return vec![(vmin, format_number(vmin, 0))];
    }

    let raw = span / target.max(1) as f64;
    let magnitude = 10_f64.powf(raw.log10().floor());
    if !(magnitude > 0.0) || !magnitude.is_finite() {
        return end_ticks(vmin, vmax);
    }

    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude);
    let decimals = (-step.log10().floor()).max(0.0) as usize;

    let first = (vmin / step).ceil();
    let last = (vmax / step + 1e-9).floor();
    if !(last - first < MAX_TICKS) || decimals > MAX_DECIMALS {
        return end_ticks(vmin, vmax);
    }

    (first as i64..=last as i64)
        .map(|i| {
            let v = i as f64 * step;
            (v, format_number(v, decimals))
        })
        .collect()
}

// ranges too narrow for decimal ticks only get their ends labelled
fn end_ticks(vmin: f64, vmax: f64) -> Vec<(f64, String)> {
    vec![(vmin, format!("{:e}", vmin)), (vmax, format!("{:e}", vmax))]
}

fn log_ticks(vmin: f64, vmax: f64) -> Vec<(f64, String)> {
    let first = (vmin.log10() - 1e-9).ceil() as i32;
    let last = (vmax.log10() + 1e-9).floor() as i32;
    if first > last {
        return vec![(vmin, format_number(vmin, 2)), (vmax, format_number(vmax, 2))];
    }

    (first..=last)
        .map(|k| {
            let label = if (0..6).contains(&k) {
                format!("{}", 10_i64.pow(k as u32))
            } else {
                format!("1e{}", k)
            };
            (10_f64.powi(k), label)
        })
        .collect()
}

fn format_number(v: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, v);
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_owned()
    } else {
        s
    }
}

/// Edge length of a font8x8 glyph in dots.
const GLYPH_SIZE: u32 = 8;

fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale.max(1)
}

fn draw_text(img: &mut RgbaImage, text: &str, x: i32, y: i32, scale: u32, color: Rgba<u8>) {
    let scale = scale.max(1);
    let advance = (GLYPH_SIZE * scale) as i32;
    for (i, c) in text.chars().enumerate() {
        let rows = match BASIC_FONTS.get(c) {
            Some(rows) => rows,
            None => continue,
        };
        let gx = x + i as i32 * advance;
        for (row, bits) in rows.iter().enumerate() {
            // least significant bit is the leftmost dot
            for col in 0..GLYPH_SIZE {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let rect = Rect::at(gx + (col * scale) as i32, y + row as i32 * scale as i32)
                    .of_size(scale, scale);
                draw_filled_rect_mut(img, rect, color);
            }
        }
    }
}
