//! Attachment Editor WASM - WebAssembly bindings for the attachment editor
//!
//! This crate exposes an editing session from attachment-editor-core to a
//! JavaScript/TypeScript host UI. The host owns the view, forwards gesture
//! samples in view points, draws the crop overlay and asks for the export.
//!
//! # Module Structure
//!
//! - `editor` - The `JsImageEditor` editing session
//! - `types` - WASM-compatible wrapper types and argument conversions
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsImageEditor } from '@attachment-editor/wasm';
//!
//! await init();
//!
//! const editor = new JsImageEditor(bitmap.width, bitmap.height, rgba, { crop_corner_size: 24 });
//! // The view keeps the output aspect ratio; a crop or rotate_90 changes it.
//! // fit_view_size refits after such edits. Hosts calling set_view_size
//! // directly must resize again after a crop or rotate.
//! const { width, height } = editor.fit_view_size(container.clientWidth, container.clientHeight);
//!
//! // Forward a drag: 0 = began, 1 = changed, 2 = ended, 3 = cancelled
//! editor.pan(0, e.offsetX, e.offsetY);
//! editor.pan(2, e.offsetX, e.offsetY);
//! const view = editor.view_size();
//! canvas.width = view.width;
//! canvas.height = view.height;
//!
//! const out = editor.render_output();
//! const image = new ImageData(new Uint8ClampedArray(out.pixels()), out.width, out.height);
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod types;

pub use editor::JsImageEditor;
pub use types::JsRenderedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::debug_1(&JsValue::from_str(&format!(
        "attachment-editor-wasm {} loaded",
        version()
    )));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
