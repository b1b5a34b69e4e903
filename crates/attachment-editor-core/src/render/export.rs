//! One-shot rendering to a pixel buffer at the output size.
//!
//! # Algorithm
//!
//! Export renders in output pixel space with device scale 1:
//! 1. **Background**: inverse mapping. Every output pixel center is taken
//!    back through the content affine into canvas space, mirrored about the
//!    frame center when flipped, and sampled bilinearly from the source.
//! 2. **Strokes**: the cubic path is flattened and mapped into output space.
//!    Each segment is rasterized over its own bounding box only, coverage
//!    coming from the pixel's distance to the segment (round caps and joins
//!    for free); the per-pixel maximum is blended once.
//! 3. **Text**: each layer is rasterized once into a coverage mask at its
//!    `contents_scale` (content scaling times the item's output scale), so
//!    glyphs are drawn at the resolution they end up at. The mask is then
//!    inverse-mapped through the text and content transforms.
//!
//! Items are composited back to front with source-over blending.

use glam::{DAffine2, DVec2};
use image::{Rgba, RgbaImage};

use super::layers::{build_item_layer, ItemLayer, LayerContext, StrokeLayer, TextLayer};
use super::text::TextEngine;
use crate::error::{EditorError, Result};
use crate::geometry::{Point, Rect, Size};
use crate::item::Color;
use crate::model::EditorContents;

/// Maximum distance between flattened stroke points, in canvas units.
const STROKE_FLATTEN_STEP: f64 = 0.5;

/// Upper bound on text coverage mask area. Larger masks are rasterized at
/// a reduced scale.
const MAX_TEXT_MASK_PIXELS: f64 = 16_777_216.0;

/// Render `contents` over `src_image` at `contents.transform().output_size_pixels`.
///
/// Items that fail to build are logged and skipped.
///
/// # Errors
///
/// [`EditorError::InvalidGeometry`] if the source image or output size is
/// empty.
pub fn render_output(
    contents: &EditorContents,
    src_image: &RgbaImage,
    text_engine: &dyn TextEngine,
) -> Result<RgbaImage> {
    let (src_width, src_height) = src_image.dimensions();
    let src_size = Size::new(src_width as f64, src_height as f64);
    let transform = contents.transform();
    let output_size = transform.output_size_pixels.round();
    if !output_size.is_valid() {
        return Err(EditorError::invalid_geometry(
            "export output",
            output_size.width,
            output_size.height,
        ));
    }

    let context = LayerContext::new(output_size, src_size, transform, 1.0, text_engine)?;
    let center = DVec2::from(Rect::from_size(output_size).center());
    let canvas_to_view = DAffine2::from_translation(center)
        * transform.affine_transform(output_size)
        * DAffine2::from_translation(-center);

    let mut output = RgbaImage::new(output_size.width as u32, output_size.height as u32);
    draw_background(&mut output, src_image, context.image_frame, transform.is_flipped, &canvas_to_view);

    for item in contents.items() {
        match build_item_layer(item, &context) {
            Ok(Some(ItemLayer::Stroke(layer))) => {
                draw_stroke(&mut output, &layer, &canvas_to_view, transform.scaling)
            }
            Ok(Some(ItemLayer::Text(layer))) => {
                if let Err(err) = draw_text(&mut output, &layer, &canvas_to_view, text_engine) {
                    tracing::warn!(item_id = %layer.item_id, %err, "skipping text in export");
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(item_id = %item.item_id(), %err, "skipping item in export");
            }
        }
    }

    tracing::debug!(
        width = output.width(),
        height = output.height(),
        items = contents.len(),
        "rendered output"
    );
    Ok(output)
}

fn draw_background(
    output: &mut RgbaImage,
    src_image: &RgbaImage,
    frame: Rect,
    is_flipped: bool,
    canvas_to_view: &DAffine2,
) {
    let view_to_canvas = canvas_to_view.inverse();
    let (src_width, src_height) = src_image.dimensions();
    let frame_center_x = frame.center().x;

    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let view = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
        let mut canvas = Point::from(view_to_canvas.transform_point2(view));
        if is_flipped {
            canvas.x = 2.0 * frame_center_x - canvas.x;
        }
        if !frame.contains(canvas) {
            continue;
        }
        let src_x = (canvas.x - frame.min_x()) / frame.width() * src_width as f64 - 0.5;
        let src_y = (canvas.y - frame.min_y()) / frame.height() * src_height as f64 - 0.5;
        *pixel = Rgba(sample_bilinear(src_image, src_x, src_y));
    }
}

/// Bilinear RGBA sample with edge clamping.
fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> [u8; 4] {
    let (w, h) = image.dimensions();
    let max_x = (w - 1) as f64;
    let max_y = (h - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = image.get_pixel(x0, y0).0;
    let p10 = image.get_pixel(x1, y0).0;
    let p01 = image.get_pixel(x0, y1).0;
    let p11 = image.get_pixel(x1, y1).0;

    let mut result = [0u8; 4];
    for i in 0..4 {
        let v = p00[i] as f64 * (1.0 - fx) * (1.0 - fy)
            + p10[i] as f64 * fx * (1.0 - fy)
            + p01[i] as f64 * (1.0 - fx) * fy
            + p11[i] as f64 * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    result
}

fn draw_stroke(output: &mut RgbaImage, layer: &StrokeLayer, canvas_to_view: &DAffine2, scaling: f64) {
    // Strokes that miss the output are dropped before flattening.
    let corners = layer
        .bounds()
        .corners()
        .map(|corner| Point::from(canvas_to_view.transform_point2(corner.into())));
    let Some((x0, y0, x1, y1)) =
        Rect::bounding(corners).and_then(|bounds| pixel_span(bounds.outset(1.0), output.dimensions()))
    else {
        return;
    };

    let polyline: Vec<DVec2> = layer
        .path
        .flatten(STROKE_FLATTEN_STEP)
        .into_iter()
        .map(|point| canvas_to_view.transform_point2(point.into()))
        .collect();
    let half_width = layer.line_width * scaling * 0.5;
    let reach = half_width + 1.0;

    // Each segment only touches pixels within `reach` of itself; the mask
    // keeps the strongest coverage so overlapping segments don't double up.
    let mut mask = CoverageMask::new((x1 - x0) as usize, (y1 - y0) as usize);
    let segments: Vec<(DVec2, DVec2)> = match polyline.as_slice() {
        [only] => vec![(*only, *only)],
        points => points.windows(2).map(|pair| (pair[0], pair[1])).collect(),
    };
    for (a, b) in segments {
        let segment_bounds = Rect::bounding([Point::from(a), Point::from(b)]).map(|r| r.outset(reach));
        let Some((sx0, sy0, sx1, sy1)) =
            segment_bounds.and_then(|r| pixel_span(r, output.dimensions()))
        else {
            continue;
        };
        for y in sy0..sy1 {
            for x in sx0..sx1 {
                let center = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let coverage = half_width - distance_to_segment(center, a, b) + 0.5;
                if coverage > 0.0 {
                    mask.add(i64::from(x - x0), i64::from(y - y0), coverage as f32);
                }
            }
        }
    }

    for y in y0..y1 {
        for x in x0..x1 {
            let coverage = mask.get(i64::from(x - x0), i64::from(y - y0));
            if coverage > 0.0 {
                blend_pixel(output.get_pixel_mut(x, y), layer.color, coverage);
            }
        }
    }
}

fn distance_to_segment(point: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let length_squared = ab.length_squared();
    if length_squared <= f64::EPSILON {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// Per-pixel coverage, kept at the maximum of everything drawn into it.
struct CoverageMask {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl CoverageMask {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    fn add(&mut self, x: i64, y: i64, coverage: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let index = y as usize * self.width + x as usize;
        self.data[index] = self.data[index].max(coverage.clamp(0.0, 1.0));
    }

    fn get(&self, x: i64, y: i64) -> f64 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return 0.0;
        }
        self.data[y as usize * self.width + x as usize] as f64
    }

    /// Bilinear sample; outside the mask is empty.
    fn sample_bilinear(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);
        self.get(x0, y0) * (1.0 - fx) * (1.0 - fy)
            + self.get(x0 + 1, y0) * fx * (1.0 - fy)
            + self.get(x0, y0 + 1) * (1.0 - fx) * fy
            + self.get(x0 + 1, y0 + 1) * fx * fy
    }
}

fn draw_text(
    output: &mut RgbaImage,
    layer: &TextLayer,
    canvas_to_view: &DAffine2,
    text_engine: &dyn TextEngine,
) -> Result<()> {
    let frame = layer.frame;
    if frame.is_empty() {
        return Ok(());
    }
    let mut scale = layer.contents_scale.max(f64::EPSILON);
    let area = frame.width() * frame.height() * scale * scale;
    if area > MAX_TEXT_MASK_PIXELS {
        scale *= (MAX_TEXT_MASK_PIXELS / area).sqrt();
        tracing::debug!(item_id = %layer.item_id, scale, "reduced text raster scale");
    }

    let mut mask = CoverageMask::new(
        (frame.width() * scale).ceil() as usize,
        (frame.height() * scale).ceil() as usize,
    );
    for (index, line) in layer.block.lines.iter().enumerate() {
        let origin = layer.block.line_origin(index) * scale;
        text_engine.draw_line(
            &layer.font,
            layer.font_size() * scale,
            &line.text,
            origin,
            &mut |x, y, coverage| mask.add(x, y, coverage),
        )?;
    }

    let text_to_view = *canvas_to_view * layer.local_transform;
    let view_to_text = text_to_view.inverse();
    let corners = frame
        .corners()
        .map(|corner| Point::from(text_to_view.transform_point2(corner.into())));
    let Some(bounds) = Rect::bounding(corners) else {
        return Ok(());
    };
    let Some((x0, y0, x1, y1)) = pixel_span(bounds.outset(1.0), output.dimensions()) else {
        return Ok(());
    };

    for y in y0..y1 {
        for x in x0..x1 {
            let local = view_to_text.transform_point2(DVec2::new(x as f64 + 0.5, y as f64 + 0.5));
            let mask_x = (local.x - frame.min_x()) * scale - 0.5;
            let mask_y = (local.y - frame.min_y()) * scale - 0.5;
            let coverage = mask.sample_bilinear(mask_x, mask_y);
            if coverage > 0.0 {
                blend_pixel(output.get_pixel_mut(x, y), layer.color, coverage);
            }
        }
    }
    Ok(())
}

/// Pixel range `[x0, x1) x [y0, y1)` covering `bounds`, clipped to the image.
fn pixel_span(bounds: Rect, (width, height): (u32, u32)) -> Option<(u32, u32, u32, u32)> {
    let x0 = bounds.min_x().floor().max(0.0);
    let y0 = bounds.min_y().floor().max(0.0);
    let x1 = bounds.max_x().ceil().min(width as f64);
    let y1 = bounds.max_y().ceil().min(height as f64);
    if !(x0 < x1 && y0 < y1) {
        return None;
    }
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

/// Source-over blend of `color` at `coverage` onto a straight-alpha pixel.
fn blend_pixel(dst: &mut Rgba<u8>, color: Color, coverage: f64) {
    let src_alpha = color.a as f64 / 255.0 * coverage.clamp(0.0, 1.0);
    if src_alpha <= 0.0 {
        return;
    }
    let dst_alpha = dst.0[3] as f64 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    let src = [color.r, color.g, color.b];
    for (channel, &src_value) in src.iter().enumerate() {
        let value = (src_value as f64 * src_alpha
            + dst.0[channel] as f64 * dst_alpha * (1.0 - src_alpha))
            / out_alpha;
        dst.0[channel] = value.clamp(0.0, 255.0).round() as u8;
    }
    dst.0[3] = (out_alpha * 255.0).clamp(0.0, 255.0).round() as u8;
}
