use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompactError {
    #[error("Invalid dimensions {width}x{height}: expected {expected} bytes, got {actual}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("Image width must be greater than zero")]
    ZeroWidth,
    #[error("Quantization factor must be greater than zero")]
    InvalidQuantizationFactor,
    #[error("Decode error: {0}")]
    Decode(#[source] image::ImageError),
    #[error("Encode error: {0}")]
    Encode(#[source] image::ImageError),
    #[error("Cannot encode an image with zero width or height ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompactError {
    /// Whether the failure was caused by the caller's input rather than by the pipeline itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CompactError::InvalidDimensions { .. }
                | CompactError::ZeroWidth
                | CompactError::InvalidQuantizationFactor
                | CompactError::Decode(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CompactError>;
