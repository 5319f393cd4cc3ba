//! Gradient spectrum analysis.
//!
//! Resamples per-axis gradient waveforms onto the raster grid, optionally
//! differentiates, computes a Hamming-windowed magnitude STFT per axis and
//! combines the axes by root-sum-of-squares. Both the per-axis and the
//! combined spectrograms are then reduced over time according to the
//! configured [`CombineMode`].

use crate::config::{AnalysisParams, CombineMode};
use crate::dsp::combine::{reduce_time, rss_spectrogram};
use crate::dsp::resample::{differentiate, resample_uniform};
use crate::dsp::stft::magnitude_stft;
use crate::dsp::window::WindowPlan;
use crate::error::{Result, SpectrumError};
use crate::types::{
    Axis, AxisSpectrogram, AxisWaveform, CombinedSpectrum, GradientSpectrum, GradientWaveforms,
};

/// Anything that can hand over per-axis gradient waveforms and a raster time.
pub trait WaveformSource {
    fn waveform(&self, axis: Axis) -> &AxisWaveform;
    fn raster_time(&self) -> f64;
}

impl WaveformSource for GradientWaveforms {
    fn waveform(&self, axis: Axis) -> &AxisWaveform {
        &self.axes[axis.index()]
    }

    fn raster_time(&self) -> f64 {
        self.raster_time
    }
}

fn trivial_spectrum(mode: CombineMode) -> GradientSpectrum {
    let zero = match mode {
        CombineMode::None => CombinedSpectrum::Map(vec![vec![0.0]]),
        _ => CombinedSpectrum::Curve(vec![0.0]),
    };
    GradientSpectrum {
        axes: [zero.clone(), zero.clone(), zero.clone()],
        combined: zero,
        frequencies: vec![0.0],
        times: vec![0.0],
        insufficient_data: true,
    }
}

fn check_same_axes(reference: &AxisSpectrogram, other: &AxisSpectrogram, axis: Axis) -> Result<()> {
    if reference.freqs != other.freqs {
        return Err(SpectrumError::AxisMismatch("frequency", axis.name()));
    }
    if reference.columns.len() != other.columns.len()
        || reference
            .columns
            .iter()
            .zip(other.columns.iter())
            .any(|(a, b)| a.time_offset != b.time_offset)
    {
        return Err(SpectrumError::AxisMismatch("time", axis.name()));
    }
    Ok(())
}

/// Compute the gradient spectrum of `source` under `params`.
///
/// A signal of one sample or less cannot hold a window: the result is all
/// zeros with `insufficient_data` set, and a warning is logged.
pub fn compute<S: WaveformSource + ?Sized>(
    source: &S,
    params: &AnalysisParams,
) -> Result<GradientSpectrum> {
    params.validate()?;

    let dt = source.raster_time();
    let waveforms = Axis::ALL.map(|axis| source.waveform(axis));
    let mut signal = resample_uniform(waveforms, dt, params.time_range)?;
    if params.use_derivative {
        signal = differentiate(signal);
    }

    let n = signal.len();
    if n <= 1 {
        log::warn!(
            "Insufficient data for gradient spectrum: {} sample(s) after resampling",
            n
        );
        return Ok(trivial_spectrum(params.combine_mode));
    }

    let plan = WindowPlan::derive(params.window_width, dt, params.frequency_oversampling, n);
    log::debug!(
        "Gradient spectrum plan: nwin={} noverlap={} nfft={} over {} samples",
        plan.nwin,
        plan.noverlap,
        plan.nfft,
        n
    );

    let spectrograms = Axis::ALL
        .iter()
        .map(|&axis| {
            magnitude_stft(
                signal.axis(axis),
                signal.dt,
                signal.t_start,
                &plan,
                params.max_frequency,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    let reference = &spectrograms[Axis::X.index()];
    for &axis in &Axis::ALL[1..] {
        check_same_axes(reference, &spectrograms[axis.index()], axis)?;
    }

    let rss = rss_spectrogram(&[&spectrograms[0], &spectrograms[1], &spectrograms[2]]);
    let mode = params.combine_mode;

    Ok(GradientSpectrum {
        axes: [
            reduce_time(&spectrograms[0], mode),
            reduce_time(&spectrograms[1], mode),
            reduce_time(&spectrograms[2], mode),
        ],
        combined: reduce_time(&rss, mode),
        frequencies: rss.freqs.clone(),
        times: rss.times(),
        insufficient_data: false,
    })
}

/// Holds one parameter set and analyses any number of sources with it.
#[derive(Clone, Debug, Default)]
pub struct GradientSpectrumAnalyzer {
    params: AnalysisParams,
}

impl GradientSpectrumAnalyzer {
    pub fn new(params: AnalysisParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    pub fn analyze<S: WaveformSource + ?Sized>(&self, source: &S) -> Result<GradientSpectrum> {
        compute(source, &self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const DT: f64 = 1.0 / 16384.0;

    fn sampled(f: impl Fn(f64) -> f64, duration: f64) -> AxisWaveform {
        let n = (duration / DT) as usize;
        let times: Vec<f64> = (0..=n).map(|i| i as f64 * DT).collect();
        let amps = times.iter().map(|&t| f(t)).collect();
        AxisWaveform::new(times, amps).unwrap()
    }

    fn sine_source(freq: f64) -> GradientWaveforms {
        GradientWaveforms::new(
            sampled(|t| (2.0 * PI * freq * t).sin(), 0.25),
            AxisWaveform::empty(),
            sampled(|t| 0.5 * (2.0 * PI * freq * t).cos(), 0.25),
            DT,
        )
    }

    #[test]
    fn test_sine_peak_in_combined_curve() {
        let source = sine_source(750.0);
        let params = AnalysisParams::default().with_window_width(0.03125);
        let result = compute(&source, &params).unwrap();
        assert!(!result.insufficient_data);

        let curve = result.combined.as_curve().unwrap();
        assert_eq!(curve.len(), result.frequencies.len());
        assert!(result.frequencies.iter().all(|&f| f < 2000.0));

        let peak = curve
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap()
            .0;
        let df = result.frequencies[1];
        assert!((result.frequencies[peak] - 750.0).abs() <= 2.0 * df);

        // Y never played.
        assert!(result.axis(Axis::Y).as_curve().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_combined_is_rss_of_axes_before_reduction() {
        let source = sine_source(500.0);
        let params = AnalysisParams::default()
            .with_window_width(0.015625)
            .with_combine_mode(CombineMode::None);
        let result = compute(&source, &params).unwrap();
        let x = result.axis(Axis::X).as_map().unwrap();
        let y = result.axis(Axis::Y).as_map().unwrap();
        let z = result.axis(Axis::Z).as_map().unwrap();
        let c = result.combined.as_map().unwrap();
        for f in 0..c.len() {
            assert_eq!(c[f].len(), result.times.len());
            for k in 0..c[f].len() {
                let expected = (x[f][k].powi(2) + y[f][k].powi(2) + z[f][k].powi(2)).sqrt();
                assert!((c[f][k] - expected).abs() <= 1e-12 * expected.max(1.0));
            }
        }
    }

    #[test]
    fn test_max_of_rss_is_not_rss_of_max() {
        // X plays early, Z plays late: max over time of the RSS map equals
        // the per-axis max, never their vector sum.
        let early = sampled(|t| if t < 0.125 { (2.0 * PI * 1000.0 * t).sin() } else { 0.0 }, 0.25);
        let late = sampled(|t| if t >= 0.125 { (2.0 * PI * 1000.0 * t).sin() } else { 0.0 }, 0.25);
        let source = GradientWaveforms::new(early, AxisWaveform::empty(), late, DT);
        let params = AnalysisParams::default().with_window_width(0.015625);
        let result = compute(&source, &params).unwrap();
        let x = result.axis(Axis::X).as_curve().unwrap();
        let z = result.axis(Axis::Z).as_curve().unwrap();
        let c = result.combined.as_curve().unwrap();
        let peak = x
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap()
            .0;
        let vector_sum = (x[peak].powi(2) + z[peak].powi(2)).sqrt();
        assert!(c[peak] < vector_sum);
        assert!(c[peak] >= x[peak].max(z[peak]) - 1e-12);
    }

    #[test]
    fn test_derivative_removes_constant_offset() {
        let flat = sampled(|_| 7.0, 0.125);
        let source = GradientWaveforms::new(flat, AxisWaveform::empty(), AxisWaveform::empty(), DT);
        let params = AnalysisParams::default()
            .with_derivative(true)
            .with_window_width(0.0078125);
        let result = compute(&source, &params).unwrap();
        assert!(result.combined.as_curve().unwrap().iter().all(|&v| v.abs() < 1e-9));
    }

    #[test]
    fn test_short_sequence_is_trivial() {
        let source = sine_source(500.0);
        let params = AnalysisParams::default().with_time_range(0.0, DT * 0.5);
        let result = compute(&source, &params).unwrap();
        assert!(result.insufficient_data);
        assert_eq!(result.frequencies, vec![0.0]);
        assert_eq!(result.combined, CombinedSpectrum::Curve(vec![0.0]));
        for axis in Axis::ALL {
            assert_eq!(result.axis(axis), &CombinedSpectrum::Curve(vec![0.0]));
        }
    }

    #[test]
    fn test_short_derivative_sequence_is_trivial() {
        // Two samples, one after differentiating.
        let source = sine_source(500.0);
        let params = AnalysisParams::default()
            .with_derivative(true)
            .with_combine_mode(CombineMode::None)
            .with_time_range(0.0, DT * 2.0);
        let result = compute(&source, &params).unwrap();
        assert!(result.insufficient_data);
        assert_eq!(result.combined, CombinedSpectrum::Map(vec![vec![0.0]]));
    }

    #[test]
    fn test_empty_source_is_invalid_input() {
        let source = GradientWaveforms::new(
            AxisWaveform::empty(),
            AxisWaveform::empty(),
            AxisWaveform::empty(),
            DT,
        );
        let err = compute(&source, &AnalysisParams::default()).unwrap_err();
        assert!(matches!(err, SpectrumError::InvalidInput(_)));
    }

    #[test]
    fn test_analyzer_rejects_invalid_params() {
        let params = AnalysisParams::default().with_oversampling(-1.0);
        assert!(GradientSpectrumAnalyzer::new(params).is_err());
    }

    #[test]
    fn test_analyzer_matches_compute() {
        let source = sine_source(300.0);
        let params = AnalysisParams::default().with_combine_mode(CombineMode::Mean);
        let analyzer = GradientSpectrumAnalyzer::new(params.clone()).unwrap();
        assert_eq!(analyzer.analyze(&source).unwrap(), compute(&source, &params).unwrap());
    }
}
