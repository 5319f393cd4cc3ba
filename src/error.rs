use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpectrumError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("FFT error: {0}")]
    Fft(#[from] realfft::FftError),

    /// Two axes produced different frequency or time axes.
    #[error("Axis mismatch: {0} axis of {1} differs from X")]
    AxisMismatch(&'static str, &'static str),
}

pub type Result<T> = std::result::Result<T, SpectrumError>;
