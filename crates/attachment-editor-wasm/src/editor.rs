//! Editing session bindings.
//!
//! A `JsImageEditor` owns the content model, the canvas renderer (registered
//! as a model observer) and one controller per gesture family. The host
//! forwards raw gesture samples in view points; the session routes them to
//! the right controller and exposes the resulting transform, crop overlay
//! and export.
//!
//! # Gesture Phases
//!
//! Every gesture method takes a `phase` byte: 0 = began, 1 = changed,
//! 2 = ended, anything else = cancelled.
//!
//! # View Size
//!
//! The view must keep the output's aspect ratio. A crop or a quarter turn
//! changes that ratio, so after either the host has to resize its canvas.
//! `fit_view_size` hands that job to the session: it remembers the area
//! available to the canvas and refits the view after every edit that can
//! change the output size.

use std::cell::RefCell;
use std::rc::Rc;

use attachment_editor_core::transform::image_frame;
use attachment_editor_core::{
    render_output, BrushController, CanvasRenderer, Color, CropController, EditorConfig,
    EditorError, EditorModel, FontDescriptor, GesturePhase, GlyphTextEngine, ItemId, PinchSample, Point, Size,
    TextEngine, TextItem, TextItemController,
};
use image::RgbaImage;
use wasm_bindgen::prelude::*;

use crate::types::{
    color_from_u32, color_to_u32, phase_from_u8, points_from_flat, rgba_image_from_pixels, to_js_error,
    JsRenderedImage,
};

/// An editing session over one source image.
#[wasm_bindgen]
pub struct JsImageEditor {
    model: EditorModel,
    renderer: Rc<RefCell<CanvasRenderer>>,
    crop: CropController,
    brush: BrushController,
    text: TextItemController,
    text_engine: GlyphTextEngine,
    src_image: RgbaImage,
    config: EditorConfig,
    /// Area the view is fitted into, when the session manages the view size.
    available_size: Option<Size>,
}

#[wasm_bindgen]
impl JsImageEditor {
    /// Start a session from RGBA source pixels.
    ///
    /// # Arguments
    /// * `width` - Source width in pixels
    /// * `height` - Source height in pixels
    /// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
    /// * `config` - Optional settings object; missing fields use defaults
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        config: JsValue,
    ) -> Result<JsImageEditor, JsValue> {
        let config = config_from_js(config)?;
        let src_image = rgba_image_from_pixels(width, height, pixels).map_err(to_js_error)?;
        Self::from_image(src_image, config).map_err(to_js_error)
    }

    /// Resize the editor view. Gesture locations are interpreted in this space.
    ///
    /// The size should have the output aspect ratio (`output_aspect_ratio`).
    /// Crop drags and `rotate_90` change that ratio, and so can `reset`,
    /// `undo` and `redo`; a host that sizes the view itself must call this
    /// again after them. Calling it stops `fit_view_size` refitting.
    pub fn set_view_size(&mut self, width: f64, height: f64) {
        self.available_size = None;
        self.apply_view_size(Size::new(width, height));
    }

    /// Fit the view into a `max_width` x `max_height` area with the output
    /// aspect ratio, and keep it fitted after later edits. Returns the view
    /// size as `{ width, height }`; read `view_size()` after edits to resize
    /// the canvas element.
    pub fn fit_view_size(&mut self, max_width: f64, max_height: f64) -> Result<JsValue, JsValue> {
        let fitted = self
            .fit_to(Size::new(max_width, max_height))
            .map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&fitted).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Current view size as `{ width, height }`.
    pub fn view_size(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.crop.view_size()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Output width over height.
    #[wasm_bindgen(getter)]
    pub fn output_aspect_ratio(&self) -> f64 {
        self.model.current_transform().output_aspect_ratio()
    }

    /// Replace the settings. `max_undo_depth` only applies to new sessions.
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config = config_from_js(config)?;
        self.cancel_gestures();
        self.crop.set_config(&config);
        self.brush.set_config(&config);
        self.renderer.borrow_mut().set_device_scale(config.device_scale);
        self.config = config;
        Ok(())
    }

    /// Register a TrueType/OpenType font under a family name. The first
    /// font registered is used for unknown families.
    pub fn add_font(&mut self, family: &str, data: Vec<u8>) -> Result<(), JsValue> {
        self.text_engine.add_font(family, data).map_err(to_js_error)?;
        let engine: Rc<dyn TextEngine> = Rc::new(self.text_engine.clone());
        self.renderer.borrow_mut().set_text_engine(engine);
        Ok(())
    }

    /// One-finger drag on the canvas: crop handle drag or content pan.
    pub fn pan(&mut self, phase: u8, x: f64, y: f64) {
        let phase = phase_from_u8(phase);
        self.crop.handle_pan(&mut self.model, phase, Point::new(x, y));
        if phase == GesturePhase::Ended {
            self.refit();
        }
    }

    /// Two-finger pinch on the canvas: zoom, rotate and pan the content.
    pub fn pinch(&mut self, phase: u8, centroid_x: f64, centroid_y: f64, angle_radians: f64, distance: f64) {
        let sample = PinchSample::new(Point::new(centroid_x, centroid_y), angle_radians, distance);
        self.crop.handle_pinch(&mut self.model, phase_from_u8(phase), sample);
    }

    pub fn rotate_90(&mut self) {
        self.cancel_item_gestures();
        self.crop.rotate_90(&mut self.model);
        self.refit();
    }

    pub fn rotate_45(&mut self) {
        self.cancel_item_gestures();
        self.crop.rotate_45(&mut self.model);
    }

    pub fn zoom_2x(&mut self) {
        self.cancel_item_gestures();
        self.crop.zoom_2x(&mut self.model);
    }

    pub fn flip(&mut self) {
        self.cancel_item_gestures();
        self.crop.flip(&mut self.model);
    }

    /// Back to the default transform for the source image.
    pub fn reset(&mut self) {
        self.cancel_item_gestures();
        self.crop.reset(&mut self.model);
        self.refit();
    }

    /// The current transform as a plain object.
    pub fn transform(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.model.current_transform())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// The crop rectangle of the drag in progress (view points), or undefined.
    pub fn crop_rect(&self) -> Result<JsValue, JsValue> {
        match self.crop.crop_rect() {
            Some(rect) => serde_wasm_bindgen::to_value(&rect).map_err(|e| JsValue::from_str(&e.to_string())),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Brush color for the next stroke, packed as `0xRRGGBBAA`.
    #[wasm_bindgen(getter)]
    pub fn brush_color(&self) -> u32 {
        color_to_u32(self.brush.color())
    }

    pub fn set_brush_color(&mut self, rgba: u32) {
        self.brush.set_color(color_from_u32(rgba));
    }

    /// Brush drag. `coords` is a flat `[x0, y0, x1, y1, ...]` list of view
    /// locations; on began pass the touch history followed by the current
    /// location.
    pub fn stroke(&mut self, phase: u8, coords: Vec<f64>) {
        let locations = points_from_flat(&coords);
        self.brush.handle_stroke(&mut self.model, phase_from_u8(phase), &locations);
    }

    /// Add a centered text label and return its id.
    pub fn add_text(&mut self, text: &str, rgba: u32, font_family: &str) -> Result<String, JsValue> {
        self.cancel_gestures();
        let view_size = self.crop.view_size();
        let frame = image_frame(
            view_size,
            self.model.src_image_size_pixels(),
            &self.model.current_transform(),
        )
        .map_err(to_js_error)?;
        let font = FontDescriptor::new(font_family, self.config.default_font_size);
        let item = TextItem::new(text, color_from_u32(rgba), font, frame.width());
        let item_id = item.item_id.to_string();
        self.model.append_item(item).map_err(to_js_error)?;
        Ok(item_id)
    }

    /// Replace the text of an existing label.
    pub fn set_text(&mut self, item_id: &str, text: &str) -> Result<(), JsValue> {
        self.cancel_gestures();
        let item = self.text_item(item_id)?.with_text(text);
        self.model.replace_item(item).map_err(to_js_error)
    }

    /// Remove any item.
    pub fn remove_item(&mut self, item_id: &str) -> Result<(), JsValue> {
        self.cancel_gestures();
        self.model
            .remove_item(&ItemId::from(item_id))
            .map(|_| ())
            .map_err(to_js_error)
    }

    /// Drag a text label. The id is only read on began.
    pub fn text_pan(&mut self, phase: u8, item_id: &str, x: f64, y: f64) {
        self.text.handle_pan(
            &mut self.model,
            phase_from_u8(phase),
            &ItemId::from(item_id),
            Point::new(x, y),
        );
    }

    /// Pinch a text label. The id is only read on began.
    pub fn text_pinch(
        &mut self,
        phase: u8,
        item_id: &str,
        centroid_x: f64,
        centroid_y: f64,
        angle_radians: f64,
        distance: f64,
    ) {
        let sample = PinchSample::new(Point::new(centroid_x, centroid_y), angle_radians, distance);
        self.text
            .handle_pinch(&mut self.model, phase_from_u8(phase), &ItemId::from(item_id), sample);
    }

    /// Id of the topmost text label under a view location.
    pub fn text_item_at(&self, x: f64, y: f64) -> Option<String> {
        self.renderer
            .borrow()
            .text_item_at(Point::new(x, y))
            .map(|item_id| item_id.to_string())
    }

    /// Item ids in draw order.
    pub fn item_ids(&self) -> js_sys::Array {
        self.model
            .item_ids()
            .iter()
            .map(|item_id| JsValue::from_str(item_id.as_str()))
            .collect()
    }

    pub fn undo(&mut self) -> bool {
        self.cancel_gestures();
        let undone = self.model.undo();
        self.refit();
        undone
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_gestures();
        let redone = self.model.redo();
        self.refit();
        redone
    }

    #[wasm_bindgen(getter)]
    pub fn can_undo(&self) -> bool {
        self.model.can_undo()
    }

    #[wasm_bindgen(getter)]
    pub fn can_redo(&self) -> bool {
        self.model.can_redo()
    }

    /// Whether anything has been edited.
    #[wasm_bindgen(getter)]
    pub fn is_dirty(&self) -> bool {
        self.model.is_dirty()
    }

    /// Render the edited image at the output size.
    pub fn render_output(&self) -> Result<JsRenderedImage, JsValue> {
        render_output(self.model.contents(), &self.src_image, &self.text_engine)
            .map(JsRenderedImage::from_rgba)
            .map_err(to_js_error)
    }
}

impl JsImageEditor {
    pub(crate) fn from_image(src_image: RgbaImage, config: EditorConfig) -> Result<Self, EditorError> {
        let (width, height) = src_image.dimensions();
        let src_size = Size::new(width as f64, height as f64);
        let mut model = EditorModel::new(src_size, &config)?;

        let text_engine = GlyphTextEngine::new();
        let engine: Rc<dyn TextEngine> = Rc::new(text_engine.clone());
        let renderer = Rc::new(RefCell::new(CanvasRenderer::new(src_size, engine, &config)));
        renderer.borrow_mut().rebuild(model.contents());
        model.add_observer(&renderer);

        Ok(Self {
            model,
            renderer,
            crop: CropController::new(Size::ZERO, &config),
            brush: BrushController::new(Size::ZERO, Color::BLACK, &config),
            text: TextItemController::new(Size::ZERO),
            text_engine,
            src_image,
            config,
            available_size: None,
        })
    }

    /// Fit the view into `available` and keep it fitted.
    pub(crate) fn fit_to(&mut self, available: Size) -> Result<Size, EditorError> {
        let fitted = self.model.current_transform().fitted_view_size(available)?;
        self.available_size = Some(available);
        self.apply_view_size(fitted);
        Ok(fitted)
    }

    pub(crate) fn model(&self) -> &EditorModel {
        &self.model
    }

    pub(crate) fn renderer(&self) -> &Rc<RefCell<CanvasRenderer>> {
        &self.renderer
    }

    fn text_item(&self, item_id: &str) -> Result<TextItem, JsValue> {
        let item_id = ItemId::from(item_id);
        self.model
            .item(&item_id)
            .and_then(|item| item.as_text())
            .cloned()
            .ok_or_else(|| to_js_error(EditorError::UnknownItem(item_id)))
    }

    fn apply_view_size(&mut self, view_size: Size) {
        self.cancel_gestures();
        self.crop.set_view_size(view_size);
        self.brush.set_view_size(view_size);
        self.text.set_view_size(view_size);
        self.renderer.borrow_mut().set_view_size(view_size);
    }

    fn refit(&mut self) {
        let Some(available) = self.available_size else {
            return;
        };
        // `fit_to` checked the area and outputs are never empty.
        if let Ok(fitted) = self.model.current_transform().fitted_view_size(available) {
            if fitted != self.crop.view_size() {
                self.apply_view_size(fitted);
            }
        }
    }

    fn cancel_item_gestures(&mut self) {
        self.brush.cancel(&mut self.model);
        self.text.cancel(&mut self.model);
    }

    fn cancel_gestures(&mut self) {
        self.cancel_item_gestures();
        self.crop.cancel(&mut self.model);
    }
}

fn config_from_js(value: JsValue) -> Result<EditorConfig, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(EditorConfig::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))
}
