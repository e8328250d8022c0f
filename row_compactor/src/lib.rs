// THEORY:
// This file is the main entry point for the `row_compactor` library crate.
// It exposes the compactor and the pipeline that wraps it as the public API.
//
// The crate removes near-uniform horizontal bands from RGBA images. Rows are
// classified by how many distinct quantized colors they contain; rows at or
// below the threshold are dropped and the rest are stacked back together in
// their original order. The `core_modules` hold the pixel and row primitives,
// `codec` hides file formats behind a trait, and `debounce` lets interactive
// callers coalesce rapid parameter changes.

pub mod codec;
pub mod compactor;
pub mod core_modules;
pub mod debounce;
pub mod error;
pub mod pipeline;

pub use codec::{DecodedImage, ImageCodec, PngCodec};
pub use compactor::{
    CompactedImage, CompactionConfig, DEFAULT_MAX_DIFFERENT_PIXELS, DEFAULT_QUANTIZATION_FACTOR,
    compact_rows, compact_with_config,
};
pub use core_modules::row::{RowClass, classify_row, distinct_key_count};
pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use error::{CompactError, Result};
pub use pipeline::{CompactionPipeline, PipelineOutcome, ProcessedImage, processed_filename};
