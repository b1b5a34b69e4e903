//! The live on-screen renderer.
//!
//! [`CanvasRenderer`] observes the content model and keeps a
//! [`CanvasLayout`]: the background layer plus one layer per item, all in
//! canvas space, and the content affine that places them in the view.
//!
//! # Update modes
//!
//! - Structural changes (transform, item set or order) rebuild every layer.
//! - In-place item changes rebuild only the named items' layers, which keeps
//!   live drawing and dragging cheap.
//!
//! The layout is derived purely from (contents, view size, device scale);
//! nothing else feeds into it.

use std::collections::HashMap;
use std::rc::Rc;

use glam::DAffine2;

use super::layers::{build_item_layer, ImageLayer, ItemLayer, LayerContext};
use super::text::TextEngine;
use crate::config::EditorConfig;
use crate::geometry::{Point, Size};
use crate::item::{EditorItem, ItemId};
use crate::model::{EditorContents, ModelObserver};
use crate::transform::view_to_content;

/// One entry of the back-to-front draw list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand<'a> {
    Image(&'a ImageLayer),
    Item(&'a ItemLayer),
}

/// Derived render state for one view size.
#[derive(Debug, Clone)]
pub struct CanvasLayout {
    pub view_size: Size,
    /// Applied to every layer about the view center.
    pub content_affine: DAffine2,
    pub image: ImageLayer,
    layers: HashMap<ItemId, ItemLayer>,
    order: Vec<ItemId>,
}

impl CanvasLayout {
    /// Layers back to front: the image, then items in model order.
    pub fn draw_list(&self) -> Vec<DrawCommand<'_>> {
        std::iter::once(DrawCommand::Image(&self.image))
            .chain(
                self.order
                    .iter()
                    .filter_map(|item_id| self.layers.get(item_id))
                    .map(DrawCommand::Item),
            )
            .collect()
    }

    pub fn item_layer(&self, item_id: &ItemId) -> Option<&ItemLayer> {
        self.layers.get(item_id)
    }

    pub fn item_layer_count(&self) -> usize {
        self.layers.len()
    }
}

pub struct CanvasRenderer {
    src_image_size: Size,
    view_size: Size,
    device_scale: f64,
    text_engine: Rc<dyn TextEngine>,
    contents: Option<Rc<EditorContents>>,
    layout: Option<CanvasLayout>,
    rebuild_count: u64,
}

impl CanvasRenderer {
    pub fn new(src_image_size: Size, text_engine: Rc<dyn TextEngine>, config: &EditorConfig) -> Self {
        Self {
            src_image_size,
            view_size: Size::ZERO,
            device_scale: config.device_scale,
            text_engine,
            contents: None,
            layout: None,
            rebuild_count: 0,
        }
    }

    pub fn view_size(&self) -> Size {
        self.view_size
    }

    /// Resize the view. Every layer depends on the view size.
    pub fn set_view_size(&mut self, view_size: Size) {
        if self.view_size == view_size {
            return;
        }
        self.view_size = view_size;
        self.rebuild_current();
    }

    pub fn set_device_scale(&mut self, device_scale: f64) {
        if self.device_scale == device_scale {
            return;
        }
        self.device_scale = device_scale;
        self.rebuild_current();
    }

    pub fn set_text_engine(&mut self, text_engine: Rc<dyn TextEngine>) {
        self.text_engine = text_engine;
        self.rebuild_current();
    }

    /// The current layout, or `None` before contents or a usable view size
    /// have been supplied.
    pub fn layout(&self) -> Option<&CanvasLayout> {
        self.layout.as_ref()
    }

    /// Number of full rebuilds so far.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    fn rebuild_current(&mut self) {
        if let Some(contents) = self.contents.take() {
            self.rebuild(&contents);
            self.contents = Some(contents);
        }
    }

    /// Rebuild every layer from scratch.
    pub fn rebuild(&mut self, contents: &Rc<EditorContents>) {
        self.contents = Some(Rc::clone(contents));
        self.rebuild_count += 1;

        let transform = contents.transform();
        let context = match LayerContext::new(
            self.view_size,
            self.src_image_size,
            transform,
            self.device_scale,
            self.text_engine.as_ref(),
        ) {
            Ok(context) => context,
            Err(err) => {
                tracing::debug!(%err, "skipping canvas layout");
                self.layout = None;
                return;
            }
        };

        let mut layers = HashMap::new();
        for item in contents.items() {
            if let Some(layer) = build_layer_logged(item, &context) {
                layers.insert(item.item_id().clone(), layer);
            }
        }

        self.layout = Some(CanvasLayout {
            view_size: self.view_size,
            content_affine: transform.affine_transform(self.view_size),
            image: ImageLayer {
                frame: context.image_frame,
                is_flipped: transform.is_flipped,
            },
            layers,
            order: contents.item_ids(),
        });
    }

    /// Rebuild only the layers of `item_ids`. Layers of ids no longer in
    /// `contents` are dropped; all other layers are left alone.
    pub fn update_items(&mut self, contents: &Rc<EditorContents>, item_ids: &[ItemId]) {
        self.contents = Some(Rc::clone(contents));
        let Some(layout) = self.layout.as_mut() else {
            self.rebuild_current();
            return;
        };

        let context = match LayerContext::new(
            self.view_size,
            self.src_image_size,
            contents.transform(),
            self.device_scale,
            self.text_engine.as_ref(),
        ) {
            Ok(context) => context,
            Err(err) => {
                tracing::debug!(%err, "skipping item update");
                return;
            }
        };

        for item_id in item_ids {
            layout.layers.remove(item_id);
            if let Some(layer) = contents
                .item(item_id)
                .and_then(|item| build_layer_logged(item, &context))
            {
                layout.layers.insert(item_id.clone(), layer);
            }
        }
        layout.order = contents.item_ids();
    }

    /// Topmost text item under a view location.
    pub fn text_item_at(&self, location_in_view: Point) -> Option<ItemId> {
        let layout = self.layout.as_ref()?;
        let canvas_point = view_to_content(location_in_view, layout.view_size, &layout.content_affine);
        layout
            .order
            .iter()
            .rev()
            .filter_map(|item_id| layout.layers.get(item_id))
            .find_map(|layer| match layer {
                ItemLayer::Text(text) if text.contains(canvas_point) => Some(text.item_id.clone()),
                _ => None,
            })
    }
}

fn build_layer_logged(item: &EditorItem, context: &LayerContext<'_>) -> Option<ItemLayer> {
    match build_item_layer(item, context) {
        Ok(layer) => layer,
        Err(err) => {
            tracing::warn!(item_id = %item.item_id(), %err, "skipping item layer");
            None
        }
    }
}

impl ModelObserver for CanvasRenderer {
    fn model_did_change(&mut self, _before: &Rc<EditorContents>, after: &Rc<EditorContents>) {
        self.rebuild(after);
    }

    fn items_did_change(&mut self, contents: &Rc<EditorContents>, item_ids: &[ItemId]) {
        self.update_items(contents, item_ids);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::item::{Color, FontDescriptor, StrokeItem, TextItem};
    use crate::model::EditorModel;
    use crate::render::text::test_support::FixedAdvanceEngine;

    const SRC: Size = Size::new(200.0, 100.0);

    fn renderer() -> Rc<RefCell<CanvasRenderer>> {
        let mut renderer = CanvasRenderer::new(SRC, Rc::new(FixedAdvanceEngine), &EditorConfig::default());
        renderer.set_view_size(Size::new(200.0, 100.0));
        Rc::new(RefCell::new(renderer))
    }

    fn model_with(renderer: &Rc<RefCell<CanvasRenderer>>) -> EditorModel {
        let mut model = EditorModel::new(SRC, &EditorConfig::default()).unwrap();
        model.add_observer(renderer);
        model
    }

    fn text(label: &str) -> TextItem {
        TextItem::new(label, Color::WHITE, FontDescriptor::new("Sans", 10.0), 200.0)
    }

    #[test]
    fn test_no_layout_before_contents() {
        let renderer = renderer();
        assert!(renderer.borrow().layout().is_none());
    }

    #[test]
    fn test_draw_list_order() {
        let renderer = renderer();
        let mut model = model_with(&renderer);
        let stroke = StrokeItem::new(Color::BLACK, vec![Point::new(0.5, 0.5)], 0.02);
        let label = text("hi");
        model.append_item(stroke.clone()).unwrap();
        model.append_item(label.clone()).unwrap();

        let renderer = renderer.borrow();
        let layout = renderer.layout().unwrap();
        let list = layout.draw_list();
        assert_eq!(list.len(), 3);
        assert!(matches!(list[0], DrawCommand::Image(_)));
        assert!(matches!(list[1], DrawCommand::Item(layer) if layer.item_id() == &stroke.item_id));
        assert!(matches!(list[2], DrawCommand::Item(layer) if layer.item_id() == &label.item_id));
    }

    #[test]
    fn test_item_change_updates_incrementally() {
        let renderer = renderer();
        let mut model = model_with(&renderer);
        let stroke = StrokeItem::new(Color::BLACK, vec![Point::new(0.1, 0.1)], 0.02);
        let label = text("hi");
        model.append_item(stroke.clone()).unwrap();
        model.append_item(label.clone()).unwrap();
        let rebuilds = renderer.borrow().rebuild_count();
        let label_layer = renderer.borrow().layout().unwrap().item_layer(&label.item_id).cloned();

        model
            .replace_item(stroke.with_unit_samples(vec![Point::new(0.1, 0.1), Point::new(0.9, 0.9)]))
            .unwrap();

        let renderer = renderer.borrow();
        assert_eq!(renderer.rebuild_count(), rebuilds);
        let layout = renderer.layout().unwrap();
        match layout.item_layer(&stroke.item_id) {
            Some(ItemLayer::Stroke(layer)) => assert_eq!(layer.path.segments.len(), 1),
            other => panic!("unexpected layer {other:?}"),
        }
        assert_eq!(layout.item_layer(&label.item_id).cloned(), label_layer);
    }

    #[test]
    fn test_transform_change_rebuilds() {
        let renderer = renderer();
        let mut model = model_with(&renderer);
        model.append_item(text("hi")).unwrap();
        let rebuilds = renderer.borrow().rebuild_count();

        model.replace_transform(model.current_transform().flipped());

        let renderer = renderer.borrow();
        assert_eq!(renderer.rebuild_count(), rebuilds + 1);
        assert!(renderer.layout().unwrap().image.is_flipped);
    }

    #[test]
    fn test_removed_item_drops_layer() {
        let renderer = renderer();
        let mut model = model_with(&renderer);
        let label = text("hi");
        model.append_item(label.clone()).unwrap();
        model.remove_item(&label.item_id).unwrap();

        let renderer = renderer.borrow();
        let layout = renderer.layout().unwrap();
        assert_eq!(layout.item_layer_count(), 0);
        assert_eq!(layout.draw_list().len(), 1);
    }

    #[test]
    fn test_bad_item_is_skipped() {
        let renderer = renderer();
        let mut model = model_with(&renderer);
        let broken = TextItem::new("x", Color::WHITE, FontDescriptor::new("Sans", 10.0), 0.0);
        let good = text("ok");
        model.append_item(broken.clone()).unwrap();
        model.append_item(good.clone()).unwrap();

        let renderer = renderer.borrow();
        let layout = renderer.layout().unwrap();
        assert!(layout.item_layer(&broken.item_id).is_none());
        assert!(layout.item_layer(&good.item_id).is_some());
        assert_eq!(layout.draw_list().len(), 2);
    }

    #[test]
    fn test_zero_view_size_has_no_layout() {
        let renderer = renderer();
        let mut model = model_with(&renderer);
        model.append_item(text("hi")).unwrap();
        renderer.borrow_mut().set_view_size(Size::ZERO);
        assert!(renderer.borrow().layout().is_none());

        renderer.borrow_mut().set_view_size(Size::new(200.0, 100.0));
        assert!(renderer.borrow().layout().is_some());
    }

    #[test]
    fn test_text_item_at_finds_topmost() {
        let renderer = renderer();
        let mut model = model_with(&renderer);
        let bottom = text("wide label");
        let top = text("hi");
        model.append_item(bottom.clone()).unwrap();
        model.append_item(top.clone()).unwrap();

        let renderer = renderer.borrow();
        // Both labels are centered on the view center.
        assert_eq!(renderer.text_item_at(Point::new(100.0, 50.0)), Some(top.item_id));
        // Only the wide label reaches 20 px left of center.
        assert_eq!(renderer.text_item_at(Point::new(80.0, 50.0)), Some(bottom.item_id));
        assert_eq!(renderer.text_item_at(Point::new(5.0, 5.0)), None);
    }

    #[test]
    fn test_text_item_at_follows_content_transform() {
        let renderer = renderer();
        let mut model = model_with(&renderer);
        let label = text("hi");
        model.append_item(label.clone()).unwrap();
        // Scale 2 and shift right by a quarter of the view.
        let moved = model
            .current_transform()
            .with_scaling(2.0)
            .with_unit_translation(Point::new(0.25, 0.0));
        model.replace_transform(moved);

        let renderer = renderer.borrow();
        assert_eq!(renderer.text_item_at(Point::new(150.0, 50.0)), Some(label.item_id));
        assert_eq!(renderer.text_item_at(Point::new(100.0, 50.0)), None);
    }
}
