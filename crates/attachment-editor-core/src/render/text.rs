//! Text measurement, wrapping and glyph rasterization.
//!
//! The renderer talks to fonts only through [`TextEngine`], so text layout
//! is testable without font files. [`GlyphTextEngine`] is the production
//! implementation on top of `ab_glyph`.

use std::collections::HashMap;

use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};

use crate::error::{EditorError, Result};
use crate::geometry::{Point, Size};
use crate::item::FontDescriptor;

/// Vertical metrics of one line at a given font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// Distance from the line top to the baseline.
    pub ascent: f64,
    /// Distance from the baseline to the line bottom (positive).
    pub descent: f64,
    /// Distance between consecutive line tops.
    pub line_height: f64,
}

/// Font services needed to lay out and draw text items.
pub trait TextEngine {
    fn line_metrics(&self, font: &FontDescriptor, font_size: f64) -> Result<LineMetrics>;

    /// Horizontal advance of a single line of text, kerning included.
    fn advance_width(&self, font: &FontDescriptor, font_size: f64, text: &str) -> Result<f64>;

    /// Rasterize one line whose line box has its top-left at `origin`.
    /// `sink` receives `(x, y, coverage)` per touched pixel.
    fn draw_line(
        &self,
        font: &FontDescriptor,
        font_size: f64,
        text: &str,
        origin: Point,
        sink: &mut dyn FnMut(i64, i64, f32),
    ) -> Result<()>;
}

/// One laid-out line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub width: f64,
}

/// Wrapped, center-aligned text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
    pub metrics: LineMetrics,
    /// Bounding size, rounded up to whole units.
    pub size: Size,
}

impl TextBlock {
    /// Top-left of a line's box inside the block, centered horizontally.
    pub fn line_origin(&self, index: usize) -> Point {
        let width = self.lines.get(index).map_or(0.0, |line| line.width);
        Point::new(
            (self.size.width - width) * 0.5,
            index as f64 * self.metrics.line_height,
        )
    }
}

/// Greedy word wrap of `text` at `max_width`.
///
/// Explicit newlines always break. Runs of whitespace collapse to a single
/// space. A word wider than `max_width` is broken between characters.
pub fn layout_text(
    engine: &dyn TextEngine,
    text: &str,
    font: &FontDescriptor,
    font_size: f64,
    max_width: f64,
) -> Result<TextBlock> {
    if !(max_width > 0.0 && font_size > 0.0) {
        return Err(EditorError::invalid_geometry("text layout", max_width, font_size));
    }
    let metrics = engine.line_metrics(font, font_size)?;
    let measure = |text: String| -> Result<TextLine> {
        let width = engine.advance_width(font, font_size, &text)?;
        Ok(TextLine { text, width })
    };

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if !current.is_empty() {
                let candidate = format!("{current} {word}");
                if engine.advance_width(font, font_size, &candidate)? <= max_width {
                    current = candidate;
                    continue;
                }
                lines.push(measure(std::mem::take(&mut current))?);
            }
            if engine.advance_width(font, font_size, word)? <= max_width {
                current = word.to_string();
            } else {
                let mut pieces = break_word(engine, font, font_size, word, max_width)?;
                current = pieces.pop().unwrap_or_default();
                for piece in pieces {
                    lines.push(measure(piece)?);
                }
            }
        }
        lines.push(measure(current)?);
    }

    let width = lines.iter().map(|line| line.width).fold(0.0, f64::max);
    let height = lines.len() as f64 * metrics.line_height;
    Ok(TextBlock {
        lines,
        metrics,
        size: Size::new(width, height).ceil(),
    })
}

/// Split a word into pieces no wider than `max_width`, one character minimum.
fn break_word(
    engine: &dyn TextEngine,
    font: &FontDescriptor,
    font_size: f64,
    word: &str,
    max_width: f64,
) -> Result<Vec<String>> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for ch in word.chars() {
        piece.push(ch);
        if piece.chars().count() > 1 && engine.advance_width(font, font_size, &piece)? > max_width {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(ch);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    Ok(pieces)
}

/// `ab_glyph` backed text engine with fonts registered by family name.
///
/// The first registered font is the fallback for unknown families.
#[derive(Default, Clone)]
pub struct GlyphTextEngine {
    fonts: HashMap<String, FontArc>,
    fallback: Option<FontArc>,
}

impl GlyphTextEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and register a TrueType/OpenType font.
    pub fn add_font(&mut self, family: impl Into<String>, data: Vec<u8>) -> Result<()> {
        let font =
            FontArc::try_from_vec(data).map_err(|err| EditorError::InvalidFont(err.to_string()))?;
        if self.fallback.is_none() {
            self.fallback = Some(font.clone());
        }
        self.fonts.insert(family.into(), font);
        Ok(())
    }

    pub fn has_fonts(&self) -> bool {
        self.fallback.is_some()
    }

    fn font(&self, descriptor: &FontDescriptor) -> Result<&FontArc> {
        self.fonts
            .get(&descriptor.family)
            .or(self.fallback.as_ref())
            .ok_or_else(|| {
                EditorError::InvalidFont(format!("no font registered for {}", descriptor.family))
            })
    }
}

impl TextEngine for GlyphTextEngine {
    fn line_metrics(&self, font: &FontDescriptor, font_size: f64) -> Result<LineMetrics> {
        let scaled = self.font(font)?.as_scaled(PxScale::from(font_size as f32));
        Ok(LineMetrics {
            ascent: scaled.ascent() as f64,
            descent: -scaled.descent() as f64,
            line_height: (scaled.height() + scaled.line_gap()) as f64,
        })
    }

    fn advance_width(&self, font: &FontDescriptor, font_size: f64, text: &str) -> Result<f64> {
        let font = self.font(font)?;
        let scaled = font.as_scaled(PxScale::from(font_size as f32));
        let mut width = 0.0f32;
        let mut last_glyph: Option<GlyphId> = None;
        for ch in text.chars() {
            let glyph_id = font.glyph_id(ch);
            if let Some(prev) = last_glyph {
                width += scaled.kern(prev, glyph_id);
            }
            width += scaled.h_advance(glyph_id);
            last_glyph = Some(glyph_id);
        }
        Ok(width as f64)
    }

    fn draw_line(
        &self,
        font: &FontDescriptor,
        font_size: f64,
        text: &str,
        origin: Point,
        sink: &mut dyn FnMut(i64, i64, f32),
    ) -> Result<()> {
        let font = self.font(font)?;
        let scale = PxScale::from(font_size as f32);
        let scaled = font.as_scaled(scale);
        let baseline = origin.y as f32 + scaled.ascent();
        let mut caret = origin.x as f32;
        let mut last_glyph: Option<GlyphId> = None;
        for ch in text.chars() {
            let glyph_id = font.glyph_id(ch);
            if let Some(prev) = last_glyph {
                caret += scaled.kern(prev, glyph_id);
            }
            let glyph = glyph_id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(glyph_id);
            last_glyph = Some(glyph_id);

            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                let (min_x, min_y) = (bounds.min.x as i64, bounds.min.y as i64);
                outlined.draw(|x, y, coverage| sink(min_x + x as i64, min_y + y as i64, coverage));
            }
        }
        Ok(())
    }
}
