//! Time-frequency energy profile of MRI gradient waveforms, for checking
//! gradient-induced vibration against the acoustic resonances of the scanner.

pub mod config;
pub mod dsp;
pub mod error;
pub mod resonance;
pub mod spectrum;
pub mod types;

pub use config::{AnalysisParams, CombineMode};
pub use error::{Result, SpectrumError};
pub use resonance::{check_resonances, resonance_bands_from_lists, BandOverlap, ResonanceBand};
pub use spectrum::{compute, GradientSpectrumAnalyzer, WaveformSource};
pub use types::{Axis, AxisWaveform, CombinedSpectrum, GradientSpectrum, GradientWaveforms};
