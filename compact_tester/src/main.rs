use anyhow::{Context, Result};
use clap::Parser;
use row_compactor::{
    CompactionConfig, CompactionPipeline, DEFAULT_MAX_DIFFERENT_PIXELS,
    DEFAULT_QUANTIZATION_FACTOR, PipelineOutcome, PngCodec, processed_filename,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "compact_tester")]
#[command(about = "Remove near-uniform rows from an image and write the shorter result")]
struct Args {
    /// Input image path (PNG, JPEG, GIF, WebP, BMP)
    input: PathBuf,

    /// Output path. Defaults to `processed-<input name>` next to the input.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Rows with this many distinct quantized colors or fewer are removed
    #[arg(short, long, default_value_t = DEFAULT_MAX_DIFFERENT_PIXELS)]
    max_different_pixels: usize,

    /// Channel quantization applied before counting colors
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_QUANTIZATION_FACTOR,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    quantization_factor: u32,
}

#[derive(Debug, PartialEq, Eq)]
enum RunSummary {
    Written {
        path: PathBuf,
        height: u32,
        original_height: u32,
    },
    NothingWritten { original_height: u32 },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args)? {
        RunSummary::Written { path, height, original_height } => {
            info!(output = %path.display(), height, original_height, "processing complete");
        }
        RunSummary::NothingWritten { original_height } => {
            warn!(original_height, "every row was blank; no output written");
        }
    }
    Ok(())
}

fn run(args: &Args) -> Result<RunSummary> {
    // --- 1. Read Source ---
    let source = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let filename = args
        .input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();

    // --- 2. Pipeline ---
    let config = CompactionConfig::default()
        .with_max_different_pixels(args.max_different_pixels)
        .with_quantization_factor(args.quantization_factor);
    let pipeline = CompactionPipeline::new(PngCodec, config);
    let outcome = pipeline
        .process(&source, filename)
        .with_context(|| format!("compacting {}", args.input.display()))?;

    // --- 3. Write Output ---
    match outcome {
        PipelineOutcome::Compacted(processed) => {
            let path = args
                .output
                .clone()
                .unwrap_or_else(|| default_output(&args.input));
            std::fs::write(&path, &processed.bytes)
                .with_context(|| format!("writing {}", path.display()))?;
            Ok(RunSummary::Written {
                path,
                height: processed.height,
                original_height: processed.original_height,
            })
        }
        PipelineOutcome::NoContentRows { original_height, .. } => {
            Ok(RunSummary::NothingWritten { original_height })
        }
    }
}

fn default_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    input.with_file_name(processed_filename(name))
}
