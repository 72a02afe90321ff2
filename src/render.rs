// Copyright 2026 cardsnap contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Rasterization of draw instructions.
//!
//! Executes the composer's instruction list against an RGBA buffer and
//! encodes it as PNG. Instructions are in logical points; everything is
//! multiplied by the device pixel ratio at execution time so output stays
//! crisp on high-density displays. The rasterizer also measures text with
//! the same fonts it draws with, so wrapped lines fit exactly.

use std::io::Cursor;
use std::path::Path;
use std::path::PathBuf;

use image::ImageBuffer;
use image::Rgba;
use image::RgbaImage;
use image::imageops;
use rusttype::Font;
use rusttype::Scale;
use rusttype::point;
use walkdir::WalkDir;

use cardsnap_core::Align;
use cardsnap_core::CanvasSize;
use cardsnap_core::Color;
use cardsnap_core::DrawOp;
use cardsnap_core::ErrorReport;
use cardsnap_core::Fallible;
use cardsnap_core::FontFamily;
use cardsnap_core::Rect;
use cardsnap_core::TextMeasure;
use cardsnap_core::TextStyle;
use cardsnap_core::fail;

use crate::export::Rasterizer;
use crate::media::AuxiliaryImage;

const SHADOW: Rgba<u8> = Rgba([0, 0, 0, 25]);
const SHADOW_OFFSET_Y: f32 = 10.0;

/// The sans and serif faces the layout styles refer to.
pub struct FontSet {
    sans: Font<'static>,
    serif: Font<'static>,
}

impl FontSet {
    /// Load fonts from the given paths. Without a sans path, system font
    /// directories are searched; without a serif path, the sans face is
    /// reused for serif styles.
    pub fn load(sans_path: Option<&Path>, serif_path: Option<&Path>) -> Fallible<FontSet> {
        let sans_path = match sans_path {
            Some(p) => p.to_path_buf(),
            None => discover_font().ok_or_else(|| {
                ErrorReport::new("no usable font found; set font_path in cardsnap.toml")
            })?,
        };
        let sans = load_font(&sans_path)?;
        let serif = match serif_path {
            Some(p) => load_font(p)?,
            None => sans.clone(),
        };
        Ok(FontSet { sans, serif })
    }

    fn face(&self, family: FontFamily) -> &Font<'static> {
        match family {
            FontFamily::Sans => &self.sans,
            FontFamily::Serif => &self.serif,
        }
    }
}

fn load_font(path: &Path) -> Fallible<Font<'static>> {
    let bytes = std::fs::read(path)?;
    Font::try_from_vec(bytes)
        .ok_or_else(|| ErrorReport::new(format!("{} is not a usable font", path.display())))
}

/// Search system font directories for a TrueType font, preferring faces
/// that cover CJK.
pub fn discover_font() -> Option<PathBuf> {
    let roots = [
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/System/Library/Fonts",
        "C:\\Windows\\Fonts",
    ];
    let mut fallback: Option<PathBuf> = None;
    for root in roots {
        for entry in WalkDir::new(root).into_iter().flatten() {
            let path = entry.path();
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase());
            if !matches!(ext.as_deref(), Some("ttf") | Some("otf")) {
                continue;
            }
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_ascii_lowercase();
            if name.contains("cjk") || name.contains("noto") {
                return Some(path.to_path_buf());
            }
            if fallback.is_none() {
                fallback = Some(path.to_path_buf());
            }
        }
    }
    fallback
}

/// Glyph-level rasterizer backed by a [`FontSet`].
pub struct GlyphRasterizer {
    fonts: FontSet,
}

impl GlyphRasterizer {
    pub fn new(fonts: FontSet) -> Self {
        Self { fonts }
    }
}

impl TextMeasure for GlyphRasterizer {
    fn width(&self, text: &str, style: &TextStyle) -> f32 {
        let font = self.fonts.face(style.family);
        let scale = Scale::uniform(style.size_px);
        font.layout(text, scale, point(0.0, 0.0))
            .map(|g| g.unpositioned().h_metrics().advance_width)
            .sum()
    }
}

impl Rasterizer for GlyphRasterizer {
    fn rasterize(
        &self,
        canvas: CanvasSize,
        pixel_ratio: f32,
        ops: &[DrawOp],
        aux: Option<&AuxiliaryImage>,
    ) -> Fallible<Vec<u8>> {
        let width = (canvas.width * pixel_ratio).round() as u32;
        let height = (canvas.height * pixel_ratio).round() as u32;
        if width == 0 || height == 0 {
            return fail("could not acquire drawing surface: empty canvas");
        }
        let mut surface: RgbaImage =
            ImageBuffer::from_pixel(width, height, Rgba([255, 255, 255, 255]));

        for op in ops {
            match op {
                DrawOp::Fill { rect, color } => {
                    fill_rect(&mut surface, scale_rect(*rect, pixel_ratio), opaque(*color));
                }
                DrawOp::Panel {
                    rect,
                    radius,
                    fill,
                    border,
                    border_width,
                } => {
                    self.draw_panel(
                        &mut surface,
                        *rect,
                        *radius,
                        *fill,
                        *border,
                        *border_width,
                        pixel_ratio,
                    );
                }
                DrawOp::Text {
                    content,
                    x,
                    y,
                    align,
                    style,
                    color,
                } => {
                    self.draw_text(&mut surface, content, *x, *y, *align, style, *color, pixel_ratio);
                }
                DrawOp::Image { rect } => {
                    if let Some(aux) = aux {
                        let (x, y, w, h) = scale_rect(*rect, pixel_ratio);
                        if w > 0 && h > 0 {
                            let resized = imageops::resize(
                                &aux.pixels,
                                w,
                                h,
                                imageops::FilterType::Lanczos3,
                            );
                            overlay_alpha(&mut surface, &resized, x.max(0) as u32, y.max(0) as u32);
                        }
                    }
                }
            }
        }

        encode_png(&surface)
    }
}

impl GlyphRasterizer {
    #[allow(clippy::too_many_arguments)]
    fn draw_panel(
        &self,
        surface: &mut RgbaImage,
        rect: Rect,
        radius: f32,
        fill: Color,
        border: Color,
        border_width: f32,
        s: f32,
    ) {
        // The canvas original blurs the shadow; a single translucent offset
        // layer approximates it.
        let shadow = Rect::new(rect.x, rect.y + SHADOW_OFFSET_Y, rect.width, rect.height);
        fill_rounded(surface, scale_rect(shadow, s), (radius * s) as i32, SHADOW);
        // Border ring: rounded rect in the accent color with the fill
        // inset by the border width on top.
        fill_rounded(
            surface,
            scale_rect(rect, s),
            (radius * s) as i32,
            opaque(border),
        );
        let inner = Rect::new(
            rect.x + border_width,
            rect.y + border_width,
            rect.width - 2.0 * border_width,
            rect.height - 2.0 * border_width,
        );
        fill_rounded(
            surface,
            scale_rect(inner, s),
            ((radius - border_width) * s) as i32,
            opaque(fill),
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &self,
        surface: &mut RgbaImage,
        content: &str,
        x: f32,
        y: f32,
        align: Align,
        style: &TextStyle,
        color: Color,
        s: f32,
    ) {
        let font = self.fonts.face(style.family);
        let scale = Scale::uniform(style.size_px * s);
        let scaled_style = TextStyle {
            size_px: style.size_px * s,
            ..*style
        };
        let left = match align {
            Align::Left => x * s,
            Align::Center => x * s - self.width(content, &scaled_style) / 2.0,
        };
        let ascent = font.v_metrics(scale).ascent;
        let baseline = y * s + ascent;
        let color = opaque(color);
        for glyph in font.layout(content, scale, point(left, baseline)) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    let px = gx as i32 + bb.min.x;
                    let py = gy as i32 + bb.min.y;
                    if px < 0 || py < 0 {
                        return;
                    }
                    let (px, py) = (px as u32, py as u32);
                    if px >= surface.width() || py >= surface.height() {
                        return;
                    }
                    let alpha = (v * 255.0) as u8;
                    if alpha == 0 {
                        return;
                    }
                    blend(surface.get_pixel_mut(px, py), Rgba([color[0], color[1], color[2], alpha]));
                });
            }
        }
    }
}

fn opaque(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, 255])
}

/// Scale a logical rect to device pixels.
fn scale_rect(rect: Rect, s: f32) -> (i32, i32, u32, u32) {
    (
        (rect.x * s).round() as i32,
        (rect.y * s).round() as i32,
        (rect.width * s).round().max(0.0) as u32,
        (rect.height * s).round().max(0.0) as u32,
    )
}

/// Source-over blend of one pixel.
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let a = src[3] as f32 / 255.0;
    if a <= 0.0 {
        return;
    }
    let inv = 1.0 - a;
    dst[0] = (src[0] as f32 * a + dst[0] as f32 * inv) as u8;
    dst[1] = (src[1] as f32 * a + dst[1] as f32 * inv) as u8;
    dst[2] = (src[2] as f32 * a + dst[2] as f32 * inv) as u8;
    dst[3] = 255;
}

fn fill_rect(surface: &mut RgbaImage, (x, y, w, h): (i32, i32, u32, u32), color: Rgba<u8>) {
    for py in y.max(0)..(y + h as i32).min(surface.height() as i32) {
        for px in x.max(0)..(x + w as i32).min(surface.width() as i32) {
            blend(surface.get_pixel_mut(px as u32, py as u32), color);
        }
    }
}

/// Whether a point of a `w` x `h` box lies inside its rounded outline.
fn rounded_contains(x: i32, y: i32, w: i32, h: i32, r: i32) -> bool {
    if x >= r && x < w - r {
        return true;
    }
    if y >= r && y < h - r {
        return true;
    }
    let cx = if x < r { r - 1 } else { w - r };
    let cy = if y < r { r - 1 } else { h - r };
    let dx = x - cx;
    let dy = y - cy;
    dx * dx + dy * dy <= r * r
}

fn fill_rounded(surface: &mut RgbaImage, (x, y, w, h): (i32, i32, u32, u32), r: i32, color: Rgba<u8>) {
    let (w, h) = (w as i32, h as i32);
    for oy in 0..h {
        for ox in 0..w {
            if !rounded_contains(ox, oy, w, h, r) {
                continue;
            }
            let px = x + ox;
            let py = y + oy;
            if px < 0 || py < 0 || px >= surface.width() as i32 || py >= surface.height() as i32 {
                continue;
            }
            blend(surface.get_pixel_mut(px as u32, py as u32), color);
        }
    }
}

/// Alpha-composite `over` onto `base` at the given offset.
fn overlay_alpha(base: &mut RgbaImage, over: &RgbaImage, x: u32, y: u32) {
    for oy in 0..over.height() {
        for ox in 0..over.width() {
            let bx = x + ox;
            let by = y + oy;
            if bx >= base.width() || by >= base.height() {
                continue;
            }
            blend(base.get_pixel_mut(bx, by), *over.get_pixel(ox, oy));
        }
    }
}

fn encode_png(surface: &RgbaImage) -> Fallible<Vec<u8>> {
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(surface.clone())
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| ErrorReport::new(format!("PNG encoding failed: {e}")))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    use cardsnap_core::Card;
    use cardsnap_core::Face;
    use cardsnap_core::compose;

    /// Build a rasterizer from whatever font the host system has. Tests
    /// that need glyphs skip silently when none is available.
    fn try_rasterizer() -> Option<GlyphRasterizer> {
        let _ = discover_font()?;
        FontSet::load(None, None).ok().map(GlyphRasterizer::new)
    }

    fn test_card() -> Card {
        Card {
            id: 7,
            question: "Q".to_string(),
            answer: "A".to_string(),
            tip: "T".to_string(),
            quote: None,
        }
    }

    #[test]
    fn test_rounded_contains_center_and_corners() {
        assert!(rounded_contains(50, 50, 100, 100, 20));
        // The very corner of the box is outside the rounded outline.
        assert!(!rounded_contains(0, 0, 100, 100, 20));
        assert!(!rounded_contains(99, 99, 100, 100, 20));
        // Edge midpoints are inside.
        assert!(rounded_contains(0, 50, 100, 100, 20));
        assert!(rounded_contains(50, 0, 100, 100, 20));
    }

    #[test]
    fn test_blend_opaque_replaces() {
        let mut dst = Rgba([0, 0, 0, 255]);
        blend(&mut dst, Rgba([200, 100, 50, 255]));
        assert_eq!(dst, Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn test_blend_zero_alpha_is_noop() {
        let mut dst = Rgba([1, 2, 3, 255]);
        blend(&mut dst, Rgba([200, 100, 50, 0]));
        assert_eq!(dst, Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_fill_rect_clips_to_surface() {
        let mut surface: RgbaImage = ImageBuffer::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        fill_rect(&mut surface, (-2, -2, 10, 10), Rgba([255, 255, 255, 255]));
        assert_eq!(*surface.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*surface.get_pixel(3, 3), Rgba([255, 255, 255, 255]));
    }

    /// Full raster smoke test: compose a card and rasterize it at pixel
    /// ratio 2; the PNG decodes back to the scaled dimensions with the
    /// background color in the top-left corner.
    #[test]
    fn test_rasterize_smoke() -> Fallible<()> {
        let Some(rasterizer) = try_rasterizer() else {
            return Ok(());
        };
        let canvas = CanvasSize::new(300.0, 500.0);
        let card = test_card();
        let ops = compose(&card, Face::Question, canvas, None, &rasterizer);
        let png = rasterizer.rasterize(canvas, 2.0, &ops, None)?;
        let decoded = image::load_from_memory(&png)
            .map_err(|e| ErrorReport::new(format!("decode failed: {e}")))?
            .to_rgba8();
        assert_eq!(decoded.width(), 600);
        assert_eq!(decoded.height(), 1000);
        assert_eq!(*decoded.get_pixel(0, 0), Rgba([0xFF, 0xFB, 0xE6, 255]));
        Ok(())
    }

    /// An empty canvas is a surface acquisition failure.
    #[test]
    fn test_zero_canvas_fails() -> Fallible<()> {
        let Some(rasterizer) = try_rasterizer() else {
            return Ok(());
        };
        let result = rasterizer.rasterize(CanvasSize::new(0.0, 0.0), 2.0, &[], None);
        assert!(result.is_err());
        Ok(())
    }

    /// Font-backed measurement grows with the text, so wrapping can rely
    /// on it.
    #[test]
    fn test_measure_monotonic() -> Fallible<()> {
        let Some(rasterizer) = try_rasterizer() else {
            return Ok(());
        };
        let style = TextStyle::sans(20.0);
        let w1 = rasterizer.width("a", &style);
        let w2 = rasterizer.width("ab", &style);
        assert!(w2 > w1);
        assert_eq!(rasterizer.width("", &style), 0.0);
        Ok(())
    }

    /// The auxiliary image's pixels land inside the placement rect.
    #[test]
    fn test_aux_image_drawn() -> Fallible<()> {
        let Some(rasterizer) = try_rasterizer() else {
            return Ok(());
        };
        let canvas = CanvasSize::new(300.0, 500.0);
        let aux = AuxiliaryImage {
            pixels: ImageBuffer::from_pixel(40, 30, Rgba([1, 2, 3, 255])),
        };
        let ops = compose(
            &test_card(),
            Face::Question,
            canvas,
            Some(aux.extent()),
            &rasterizer,
        );
        let png = rasterizer.rasterize(canvas, 1.0, &ops, Some(&aux))?;
        let decoded = image::load_from_memory(&png)
            .map_err(|e| ErrorReport::new(format!("decode failed: {e}")))?
            .to_rgba8();
        // Placed band: height capped at 150, centered, 20px above bottom.
        assert_eq!(*decoded.get_pixel(150, 500 - 20 - 75), Rgba([1, 2, 3, 255]));
        Ok(())
    }
}
