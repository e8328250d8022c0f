// THEORY:
// The `pipeline` module is the top-level API for the whole engine. It wires the
// codec and the compactor together into a single call: file bytes in, file bytes
// out, plus a report of what happened.
//
// The one case that needs care is the degenerate one. When no row survives,
// there is nothing an image format can hold, so the pipeline reports
// `NoContentRows` instead of trying to encode an empty picture.

use crate::codec::ImageCodec;
use crate::compactor::{CompactionConfig, compact_with_config};
use crate::error::Result;
use std::path::Path;
use tracing::{info, warn};

const PROCESSED_PREFIX: &str = "processed-";
const FALLBACK_FILENAME: &str = "image.png";

/// A re-encoded, compacted image ready to be displayed or saved.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub original_height: u32,
}

/// The result of running one image through the pipeline.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Compacted(ProcessedImage),
    /// Every row was blank. Nothing was encoded.
    NoContentRows {
        width: u32,
        original_height: u32,
    },
}

impl PipelineOutcome {
    pub fn processed(&self) -> Option<&ProcessedImage> {
        match self {
            PipelineOutcome::Compacted(image) => Some(image),
            PipelineOutcome::NoContentRows { .. } => None,
        }
    }
}

/// Decode, compact and re-encode with a fixed codec and configuration.
pub struct CompactionPipeline<C: ImageCodec> {
    codec: C,
    config: CompactionConfig,
}

impl<C: ImageCodec> CompactionPipeline<C> {
    pub fn new(codec: C, config: CompactionConfig) -> Self {
        Self { codec, config }
    }

    pub fn config(&self) -> &CompactionConfig {
        &self.config
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn process(&self, source: &[u8], filename: &str) -> Result<PipelineOutcome> {
        let decoded = self.codec.decode(source)?;
        self.process_decoded(&decoded.pixels, decoded.width, decoded.height, filename)
    }

    /// Runs the compact and encode stages on an already decoded buffer.
    pub fn process_decoded(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        filename: &str,
    ) -> Result<PipelineOutcome> {
        let compacted = compact_with_config(pixels, width, height, &self.config)?;

        if compacted.is_empty() {
            warn!(
                width,
                original_height = height,
                max_different_pixels = self.config.max_different_pixels,
                "no content rows left after compaction"
            );
            return Ok(PipelineOutcome::NoContentRows {
                width,
                original_height: height,
            });
        }

        let bytes = self.codec.encode(&compacted.pixels, compacted.width, compacted.height)?;
        info!(
            file = filename,
            kept = compacted.height,
            removed = compacted.removed_rows(),
            "compacted image"
        );

        Ok(PipelineOutcome::Compacted(ProcessedImage {
            bytes,
            filename: processed_filename(filename),
            mime_type: self.codec.mime_type(),
            width: compacted.width,
            height: compacted.height,
            original_height: compacted.original_height,
        }))
    }
}

/// Name of the download for a given source file: `processed-<name>`.
pub fn processed_filename(original: &str) -> String {
    let name = Path::new(original)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_FILENAME);
    format!("{PROCESSED_PREFIX}{name}")
}
