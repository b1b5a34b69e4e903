//! WASM-compatible wrapper types and argument conversions.
//!
//! JavaScript hands over gesture phases as small integers and point lists
//! as flat `Float64Array`s; this module turns those into core types.

use attachment_editor_core::{Color, EditorError, GesturePhase, Point, Result};
use image::RgbaImage;
use wasm_bindgen::prelude::*;

/// A rendered RGBA image for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. `pixels()` copies it out as a
/// `Uint8Array`, ready for `new ImageData(new Uint8ClampedArray(...), w, h)`.
///
/// The `free()` method can be called to explicitly release WASM memory, but this is
/// optional as wasm-bindgen's finalizer will handle cleanup automatically.
#[wasm_bindgen]
pub struct JsRenderedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsRenderedImage {
    /// Create a new JsRenderedImage from dimensions and RGBA pixel data.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsRenderedImage {
        JsRenderedImage {
            width,
            height,
            pixels,
        }
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns straight-alpha RGBA pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {}
}

impl JsRenderedImage {
    pub(crate) fn from_rgba(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }
}

/// Wrap host RGBA pixels as an image buffer.
pub(crate) fn rgba_image_from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<RgbaImage> {
    let expected = width as usize * height as usize * 4;
    let actual = pixels.len();
    if width == 0 || height == 0 {
        return Err(EditorError::invalid_geometry(
            "source image",
            width as f64,
            height as f64,
        ));
    }
    RgbaImage::from_raw(width, height, pixels)
        .ok_or(EditorError::InvalidPixelBuffer { expected, actual })
}

/// Convert a u8 gesture phase.
///
/// Values:
/// - 0 = Began
/// - 1 = Changed
/// - 2 = Ended
///
/// Any other value is treated as Cancelled.
pub(crate) fn phase_from_u8(value: u8) -> GesturePhase {
    match value {
        0 => GesturePhase::Began,
        1 => GesturePhase::Changed,
        2 => GesturePhase::Ended,
        _ => GesturePhase::Cancelled,
    }
}

/// Pair up a flat `[x0, y0, x1, y1, ...]` list. A trailing odd value is dropped.
pub(crate) fn points_from_flat(coords: &[f64]) -> Vec<Point> {
    coords
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect()
}

/// Unpack a `0xRRGGBBAA` color.
pub(crate) fn color_from_u32(rgba: u32) -> Color {
    let [r, g, b, a] = rgba.to_be_bytes();
    Color::rgba(r, g, b, a)
}

/// Pack a color as `0xRRGGBBAA`.
pub(crate) fn color_to_u32(color: Color) -> u32 {
    u32::from_be_bytes([color.r, color.g, color.b, color.a])
}

/// Convert a core error for JavaScript.
pub(crate) fn to_js_error(err: EditorError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
