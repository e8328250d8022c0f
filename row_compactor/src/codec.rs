// THEORY:
// The `codec` module is the boundary between files and pixels. The compactor
// only understands raw RGBA buffers; everything that knows about file formats
// lives behind the `ImageCodec` trait so the core never depends on one.
//
// `PngCodec` is the stock implementation. It will read anything the `image`
// crate can guess from the bytes and always writes PNG back out.

use crate::error::{CompactError, Result};
use image::{ExtendedColorType, ImageEncoder};
use tracing::debug;

/// A decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Turns file bytes into RGBA buffers and back.
pub trait ImageCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage>;

    fn encode(&self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>>;

    /// MIME type of the bytes produced by `encode`.
    fn mime_type(&self) -> &'static str;
}

/// Reads any format supported by `image`, writes PNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage> {
        let image = image::load_from_memory(bytes).map_err(CompactError::Decode)?;
        let rgba = image.into_rgba8();
        let (width, height) = rgba.dimensions();
        debug!(width, height, "decoded source image");
        Ok(DecodedImage {
            pixels: rgba.into_raw(),
            width,
            height,
        })
    }

    fn encode(&self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
        if width == 0 || height == 0 {
            return Err(CompactError::EmptyImage { width, height });
        }
        let mut output = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut output);
        encoder
            .write_image(pixels, width, height, ExtendedColorType::Rgba8)
            .map_err(CompactError::Encode)?;
        Ok(output)
    }

    fn mime_type(&self) -> &'static str {
        "image/png"
    }
}
