use crate::error::{Result, SpectrumError};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Fixed processing order. RSS accumulation sums in this order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

/// Irregularly sampled gradient waveform for one axis.
///
/// Times are in seconds and strictly increasing, amplitudes in Hz/m.
/// An empty waveform means the axis was never played.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWaveform")]
pub struct AxisWaveform {
    times: Vec<f64>,
    amplitudes: Vec<f64>,
}

#[derive(Deserialize)]
struct RawWaveform {
    times: Vec<f64>,
    amplitudes: Vec<f64>,
}

impl TryFrom<RawWaveform> for AxisWaveform {
    type Error = SpectrumError;

    fn try_from(raw: RawWaveform) -> Result<Self> {
        Self::new(raw.times, raw.amplitudes)
    }
}

impl AxisWaveform {
    pub fn new(times: Vec<f64>, amplitudes: Vec<f64>) -> Result<Self> {
        if times.len() != amplitudes.len() {
            return Err(SpectrumError::InvalidInput(format!(
                "waveform has {} times but {} amplitudes",
                times.len(),
                amplitudes.len()
            )));
        }
        if times.iter().any(|t| !t.is_finite()) {
            return Err(SpectrumError::InvalidInput(
                "waveform times must be finite".into(),
            ));
        }
        if amplitudes.iter().any(|a| !a.is_finite()) {
            return Err(SpectrumError::InvalidInput(
                "waveform amplitudes must be finite".into(),
            ));
        }
        if times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SpectrumError::InvalidInput(
                "waveform times must be strictly increasing".into(),
            ));
        }
        Ok(Self { times, amplitudes })
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        let (times, amplitudes) = pairs.iter().copied().unzip();
        Self::new(times, amplitudes)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn end_time(&self) -> Option<f64> {
        self.times.last().copied()
    }
}

/// Three-axis gradient waveforms plus the raster time of the sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientWaveforms {
    pub axes: [AxisWaveform; 3],
    /// Gradient raster time (seconds).
    pub raster_time: f64,
}

impl GradientWaveforms {
    pub fn new(x: AxisWaveform, y: AxisWaveform, z: AxisWaveform, raster_time: f64) -> Self {
        Self {
            axes: [x, y, z],
            raster_time,
        }
    }
}

/// Three axes resampled onto a shared bin-centred grid.
#[derive(Clone, Debug, PartialEq)]
pub struct UniformSignal {
    pub times: Vec<f64>,
    pub axes: [Vec<f64>; 3],
    pub dt: f64,
    /// Left edge of the grid; `times[k] = t_start + (k + 0.5) * dt`.
    pub t_start: f64,
}

impl UniformSignal {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn axis(&self, axis: Axis) -> &[f64] {
        &self.axes[axis.index()]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpectrogramColumn {
    pub magnitudes: Vec<f64>,
    pub time_offset: f64,
}

/// Magnitude STFT of one axis, masked to frequencies below the analysis limit.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisSpectrogram {
    pub columns: Vec<SpectrogramColumn>,
    pub freqs: Vec<f64>,
}

impl AxisSpectrogram {
    pub fn bin_count(&self) -> usize {
        self.freqs.len()
    }

    pub fn frame_count(&self) -> usize {
        self.columns.len()
    }

    pub fn times(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.time_offset).collect()
    }

    /// Magnitudes of one frequency bin across all frames.
    pub fn bin(&self, bin: usize) -> impl Iterator<Item = f64> + '_ {
        self.columns.iter().map(move |c| c.magnitudes[bin])
    }

    /// Rows indexed by (frequency bin, frame).
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.bin_count()).map(|b| self.bin(b).collect()).collect()
    }
}

/// An axis (or RSS) spectrum after time reduction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum CombinedSpectrum {
    /// One value per frequency bin.
    Curve(Vec<f64>),
    /// Unreduced rows indexed by (frequency bin, frame).
    Map(Vec<Vec<f64>>),
}

impl CombinedSpectrum {
    /// Number of frequency bins.
    pub fn len(&self) -> usize {
        match self {
            CombinedSpectrum::Curve(v) => v.len(),
            CombinedSpectrum::Map(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_curve(&self) -> Option<&[f64]> {
        match self {
            CombinedSpectrum::Curve(v) => Some(v),
            CombinedSpectrum::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&[Vec<f64>]> {
        match self {
            CombinedSpectrum::Map(rows) => Some(rows),
            CombinedSpectrum::Curve(_) => None,
        }
    }

    /// Per-bin peak, collapsing any remaining time dimension.
    pub fn peak_curve(&self) -> Vec<f64> {
        match self {
            CombinedSpectrum::Curve(v) => v.clone(),
            CombinedSpectrum::Map(rows) => rows
                .iter()
                .map(|r| r.iter().copied().fold(0.0f64, f64::max))
                .collect(),
        }
    }
}

/// Output of a full gradient-spectrum analysis.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GradientSpectrum {
    /// Per-axis spectra in X, Y, Z order.
    pub axes: [CombinedSpectrum; 3],
    /// Root-sum-of-squares across axes.
    pub combined: CombinedSpectrum,
    pub frequencies: Vec<f64>,
    /// Frame times. Only meaningful when the combine mode is `none`.
    pub times: Vec<f64>,
    /// Set when the signal was too short to analyse; all values are zero.
    pub insufficient_data: bool,
}

impl GradientSpectrum {
    pub fn axis(&self, axis: Axis) -> &CombinedSpectrum {
        &self.axes[axis.index()]
    }
}
