use crate::error::{Result, SpectrumError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the time-frame dimension of a spectrogram is reduced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CombineMode {
    #[default]
    Max,
    Mean,
    Rss,
    /// Keep the full (frequency × time) map.
    None,
}

impl CombineMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CombineMode::Max => "max",
            CombineMode::Mean => "mean",
            CombineMode::Rss => "rss",
            CombineMode::None => "none",
        }
    }
}

impl FromStr for CombineMode {
    type Err = SpectrumError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "max" => Ok(CombineMode::Max),
            "mean" => Ok(CombineMode::Mean),
            "rss" => Ok(CombineMode::Rss),
            "none" => Ok(CombineMode::None),
            other => Err(SpectrumError::InvalidInput(format!(
                "unknown combine_mode '{other}' (expected max, mean, rss or none)"
            ))),
        }
    }
}

impl TryFrom<String> for CombineMode {
    type Error = SpectrumError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<CombineMode> for String {
    fn from(mode: CombineMode) -> String {
        mode.as_str().to_string()
    }
}

impl fmt::Display for CombineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    /// Analyse the first difference (slew) instead of the raw amplitude.
    pub use_derivative: bool,
    /// FFT length as a multiple of the window length.
    pub frequency_oversampling: f64,
    /// STFT window width (seconds).
    pub window_width: f64,
    /// Bins at or above this frequency (Hz) are discarded.
    pub max_frequency: f64,
    pub combine_mode: CombineMode,
    /// Optional `[start, end]` in seconds. `None` analyses the whole sequence.
    pub time_range: Option<[f64; 2]>,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            use_derivative: false,
            frequency_oversampling: 3.0,
            window_width: 0.05,
            max_frequency: 2000.0,
            combine_mode: CombineMode::Max,
            time_range: None,
        }
    }
}

impl AnalysisParams {
    /// Preset used by the acoustic safety check: slew spectrum, long window,
    /// fine frequency interpolation.
    pub fn safety_check() -> Self {
        Self {
            use_derivative: true,
            frequency_oversampling: 10.0,
            window_width: 0.5,
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON document over the defaults.
    ///
    /// A string `combine_mode` goes through [`CombineMode::from_str`], so an
    /// unknown mode is an input error rather than a config error.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        let mut mode = None;
        if let Some(obj) = value.as_object_mut() {
            if let Some(serde_json::Value::String(name)) = obj.get("combine_mode") {
                mode = Some(name.parse::<CombineMode>()?);
                obj.remove("combine_mode");
            }
        }
        let mut params: Self = serde_json::from_value(value)?;
        if let Some(mode) = mode {
            params.combine_mode = mode;
        }
        params.validate()?;
        Ok(params)
    }

    pub fn with_derivative(mut self, use_derivative: bool) -> Self {
        self.use_derivative = use_derivative;
        self
    }

    pub fn with_oversampling(mut self, factor: f64) -> Self {
        self.frequency_oversampling = factor;
        self
    }

    pub fn with_window_width(mut self, seconds: f64) -> Self {
        self.window_width = seconds;
        self
    }

    pub fn with_max_frequency(mut self, hz: f64) -> Self {
        self.max_frequency = hz;
        self
    }

    pub fn with_combine_mode(mut self, mode: CombineMode) -> Self {
        self.combine_mode = mode;
        self
    }

    pub fn with_time_range(mut self, start: f64, end: f64) -> Self {
        self.time_range = Some([start, end]);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.frequency_oversampling.is_finite() && self.frequency_oversampling > 0.0) {
            return Err(SpectrumError::InvalidInput(format!(
                "frequency_oversampling must be positive, got {}",
                self.frequency_oversampling
            )));
        }
        if !self.window_width.is_finite() {
            return Err(SpectrumError::InvalidInput(format!(
                "window_width must be finite, got {}",
                self.window_width
            )));
        }
        if self.max_frequency.is_nan() {
            return Err(SpectrumError::InvalidInput(
                "max_frequency must not be NaN".into(),
            ));
        }
        if let Some([start, end]) = self.time_range {
            if !(start.is_finite() && end.is_finite()) {
                return Err(SpectrumError::InvalidInput(format!(
                    "time_range bounds must be finite, got [{start}, {end}]"
                )));
            }
        }
        Ok(())
    }
}
