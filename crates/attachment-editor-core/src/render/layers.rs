//! Visual layers derived from items.
//!
//! All layers live in canvas space: the coordinate space of the content
//! layer before the content affine is applied. The image frame maps item
//! unit coordinates into that space.

use glam::{DAffine2, DVec2};

use super::path::{smooth_points, BezierPath};
use super::text::{layout_text, TextBlock, TextEngine};
use crate::error::{EditorError, Result};
use crate::geometry::{from_unit, Point, Rect, Size};
use crate::item::{Color, EditorItem, FontDescriptor, ItemId, StrokeItem, TextItem};
use crate::transform::{image_frame, Transform};

/// Everything needed to turn items into layers for one destination.
pub struct LayerContext<'a> {
    /// Size of the destination: the view on screen, the output on export.
    pub dst_size: Size,
    pub image_frame: Rect,
    /// The transform's content scaling.
    pub content_scaling: f64,
    pub device_scale: f64,
    pub text_engine: &'a dyn TextEngine,
}

impl<'a> LayerContext<'a> {
    pub fn new(
        dst_size: Size,
        src_image_size: Size,
        transform: &Transform,
        device_scale: f64,
        text_engine: &'a dyn TextEngine,
    ) -> Result<Self> {
        Ok(Self {
            dst_size,
            image_frame: image_frame(dst_size, src_image_size, transform)?,
            content_scaling: transform.scaling,
            device_scale,
            text_engine,
        })
    }
}

/// The background image placed in its frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageLayer {
    pub frame: Rect,
    pub is_flipped: bool,
}

impl ImageLayer {
    /// The layer's own transform: a horizontal mirror about the frame
    /// center when flipped, identity otherwise.
    pub fn local_transform(&self) -> DAffine2 {
        if !self.is_flipped {
            return DAffine2::IDENTITY;
        }
        let center = DVec2::from(self.frame.center());
        DAffine2::from_translation(center)
            * DAffine2::from_scale(DVec2::new(-1.0, 1.0))
            * DAffine2::from_translation(-center)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeLayer {
    pub item_id: ItemId,
    pub path: BezierPath,
    pub line_width: f64,
    pub color: Color,
}

impl StrokeLayer {
    /// Bounds of everything the stroke can paint, round caps included.
    pub fn bounds(&self) -> Rect {
        self.path.control_bounds().outset(self.line_width * 0.5)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLayer {
    pub item_id: ItemId,
    pub block: TextBlock,
    pub color: Color,
    /// Font at its rendered size.
    pub font: FontDescriptor,
    /// The unrotated, unscaled text box.
    pub frame: Rect,
    /// Scale then rotate about the frame center.
    pub local_transform: DAffine2,
    /// Rasterization scale that keeps glyphs sharp under the local and
    /// content scaling.
    pub contents_scale: f64,
}

impl TextLayer {
    pub fn font_size(&self) -> f64 {
        self.font.point_size
    }

    /// Whether a canvas-space point falls inside the transformed text box.
    pub fn contains(&self, canvas_point: Point) -> bool {
        let local = self
            .local_transform
            .inverse()
            .transform_point2(canvas_point.into());
        self.frame.contains(local.into())
    }
}

/// One item's layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemLayer {
    Stroke(StrokeLayer),
    Text(TextLayer),
}

impl ItemLayer {
    pub fn item_id(&self) -> &ItemId {
        match self {
            ItemLayer::Stroke(layer) => &layer.item_id,
            ItemLayer::Text(layer) => &layer.item_id,
        }
    }
}

/// Build the layer for any item. `None` means the item draws nothing.
pub fn build_item_layer(item: &EditorItem, context: &LayerContext<'_>) -> Result<Option<ItemLayer>> {
    match item {
        EditorItem::Stroke(stroke) => {
            Ok(build_stroke_layer(stroke, context).map(ItemLayer::Stroke))
        }
        EditorItem::Text(text) => build_text_layer(text, context).map(|layer| Some(ItemLayer::Text(layer))),
    }
}

/// Stroke samples projected through the image frame, smoothed, and joined
/// with cubic segments. Strokes with no samples draw nothing.
pub fn build_stroke_layer(item: &StrokeItem, context: &LayerContext<'_>) -> Option<StrokeLayer> {
    let points: Vec<Point> = item
        .unit_samples
        .iter()
        .map(|&unit| from_unit(unit, context.image_frame))
        .collect();
    let path = BezierPath::stroke_through(&smooth_points(&points))?;
    Some(StrokeLayer {
        item_id: item.item_id.clone(),
        path,
        line_width: StrokeItem::stroke_width(item.unit_stroke_width, context.dst_size),
        color: item.color,
    })
}

/// Wrapped text centered on the item's projected unit center.
///
/// # Errors
///
/// [`EditorError::InvalidGeometry`] if the item has no reference width or
/// the frame leaves no room to lay out; font errors from the engine.
pub fn build_text_layer(item: &TextItem, context: &LayerContext<'_>) -> Result<TextLayer> {
    if !(item.font_reference_image_width > 0.0) {
        return Err(EditorError::invalid_geometry(
            "text reference width",
            item.font_reference_image_width,
            item.font.point_size,
        ));
    }
    let frame_width = context.image_frame.width();
    let font_size = item.font.point_size * frame_width / item.font_reference_image_width;
    let max_width = frame_width * item.unit_width;
    let block = layout_text(context.text_engine, &item.text, &item.font, font_size, max_width)?;

    let center = from_unit(item.unit_center, context.image_frame);
    let frame = Rect::centered(center, block.size);
    let pivot = DVec2::from(center);
    let local_transform = DAffine2::from_translation(pivot)
        * DAffine2::from_angle(item.rotation_radians)
        * DAffine2::from_scale(DVec2::splat(item.scaling))
        * DAffine2::from_translation(-pivot);

    Ok(TextLayer {
        item_id: item.item_id.clone(),
        block,
        color: item.color,
        font: item.font.with_size(font_size),
        frame,
        local_transform,
        contents_scale: context.device_scale * context.content_scaling * item.output_scale(),
    })
}
