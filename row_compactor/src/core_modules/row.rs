// THEORY:
// The `row` module is the classification layer. It looks at one horizontal
// line of the image at a time and decides whether that line carries visible
// content or is a near-uniform band that can be dropped.
//
// Key architectural principles:
// 1.  **Bounded Cardinality**: A row is judged by how many distinct quantized
//     colors it contains. We never need the exact number beyond the threshold,
//     so counting stops as soon as the threshold is exceeded.
// 2.  **Row Scope**: Classification is purely local to one row. It knows
//     nothing about the rows above or below it.
// 3.  **Read-Only**: Rows are borrowed slices of the source buffer. They are
//     never mutated here; the compactor decides what to copy.

use crate::core_modules::pixel::pixel::{CHANNELS, Pixel, QuantizationFactor};
use std::collections::HashSet;

/// The verdict for a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClass {
    /// More distinct quantized colors than the threshold. Kept.
    Content,
    /// At most `threshold` distinct quantized colors. Dropped.
    Blank,
}

impl RowClass {
    pub fn is_content(&self) -> bool {
        matches!(self, RowClass::Content)
    }
}

/// Counts distinct quantized keys in `row`, stopping once the count exceeds `cap`.
///
/// The returned value is exact when it is `<= cap` and is `cap + 1` otherwise.
/// Trailing bytes that do not form a whole pixel are ignored.
pub fn distinct_key_count(row: &[u8], factor: QuantizationFactor, cap: usize) -> usize {
    let mut keys = HashSet::with_capacity(cap.saturating_add(1).min(row.len() / CHANNELS));
    for bytes in row.chunks_exact(CHANNELS) {
        keys.insert(Pixel::from(bytes).quantized_key(factor));
        if keys.len() > cap {
            break;
        }
    }
    keys.len()
}

/// Classifies `row` against `max_different_pixels` using strict `>`.
pub fn classify_row(
    row: &[u8],
    max_different_pixels: usize,
    factor: QuantizationFactor,
) -> RowClass {
    if distinct_key_count(row, factor, max_different_pixels) > max_different_pixels {
        RowClass::Content
    } else {
        RowClass::Blank
    }
}
