// THEORY:
// The `compactor` module is the core API of the engine. It takes a decoded RGBA
// buffer, runs every row through the classifier, and stitches the surviving
// rows back together into a new, shorter buffer.
//
// Key architectural principles:
// 1.  **Validate Once**: Dimension and parameter checks happen at the boundary,
//     before the row loop. The hot loop assumes a well-formed buffer.
// 2.  **Copy, Never Rewrite**: Surviving rows are appended byte-for-byte. The
//     quantized keys that drove the decision are thrown away.
// 3.  **Degenerate Is Valid**: An image with no content rows compacts to a
//     zero-height image. It is up to the caller to decide what that means.

use crate::core_modules::pixel::pixel::{CHANNELS, QuantizationFactor};
use crate::core_modules::row::classify_row;
use crate::error::{CompactError, Result};
use tracing::{debug, trace};

/// The threshold used when the caller does not pick one.
pub const DEFAULT_MAX_DIFFERENT_PIXELS: usize = 10;
/// Channel quantization applied before counting colors.
pub const DEFAULT_QUANTIZATION_FACTOR: QuantizationFactor = 16;

/// Tuning parameters for a compaction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionConfig {
    /// A row is kept only if it has strictly more distinct quantized colors than this.
    pub max_different_pixels: usize,
    /// Each color channel is divided by this before comparison. Must be non-zero.
    pub quantization_factor: QuantizationFactor,
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            max_different_pixels: DEFAULT_MAX_DIFFERENT_PIXELS,
            quantization_factor: DEFAULT_QUANTIZATION_FACTOR,
        }
    }
}

impl CompactionConfig {
    pub fn with_max_different_pixels(mut self, max_different_pixels: usize) -> Self {
        self.max_different_pixels = max_different_pixels;
        self
    }

    pub fn with_quantization_factor(mut self, quantization_factor: QuantizationFactor) -> Self {
        self.quantization_factor = quantization_factor;
        self
    }
}

/// The output of a compaction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactedImage {
    /// RGBA bytes of the surviving rows, top to bottom.
    pub pixels: Vec<u8>,
    /// Unchanged from the input.
    pub width: u32,
    /// Number of content rows. May be zero.
    pub height: u32,
    /// Height of the source image.
    pub original_height: u32,
}

impl CompactedImage {
    pub fn removed_rows(&self) -> u32 {
        self.original_height.saturating_sub(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }
}

/// Removes every row of `buffer` with at most `max_different_pixels` distinct quantized colors.
pub fn compact_rows(
    buffer: &[u8],
    width: u32,
    height: u32,
    max_different_pixels: usize,
    quantization_factor: QuantizationFactor,
) -> Result<CompactedImage> {
    let row_len = validate(buffer, width, height, quantization_factor)?;

    let mut pixels = Vec::with_capacity(buffer.len());
    let mut kept: u32 = 0;
    for (index, row) in buffer.chunks_exact(row_len).enumerate() {
        let class = classify_row(row, max_different_pixels, quantization_factor);
        trace!(row = index, ?class, "classified row");
        if class.is_content() {
            pixels.extend_from_slice(row);
            kept += 1;
        }
    }
    pixels.shrink_to_fit();

    debug!(
        width,
        original_height = height,
        height = kept,
        max_different_pixels,
        quantization_factor,
        "compacted rows"
    );

    Ok(CompactedImage {
        pixels,
        width,
        height: kept,
        original_height: height,
    })
}

/// Same as [`compact_rows`], with the parameters taken from a [`CompactionConfig`].
pub fn compact_with_config(
    buffer: &[u8],
    width: u32,
    height: u32,
    config: &CompactionConfig,
) -> Result<CompactedImage> {
    compact_rows(
        buffer,
        width,
        height,
        config.max_different_pixels,
        config.quantization_factor,
    )
}

/// Checks the buffer against its declared dimensions and returns the row length in bytes.
fn validate(
    buffer: &[u8],
    width: u32,
    height: u32,
    quantization_factor: QuantizationFactor,
) -> Result<usize> {
    if quantization_factor == 0 {
        return Err(CompactError::InvalidQuantizationFactor);
    }
    if width == 0 {
        return Err(CompactError::ZeroWidth);
    }
    let row_len = (width as usize).saturating_mul(CHANNELS);
    let expected = row_len.saturating_mul(height as usize);
    if buffer.len() != expected {
        return Err(CompactError::InvalidDimensions {
            width,
            height,
            expected,
            actual: buffer.len(),
        });
    }
    Ok(row_len)
}
