use crate::dsp::window::{hamming_window, WindowPlan};
use crate::error::Result;
use crate::types::{AxisSpectrogram, SpectrogramColumn};
use realfft::RealFftPlanner;
use std::cell::RefCell;

thread_local! {
    static FFT_PLANNER: RefCell<RealFftPlanner<f64>> = RefCell::new(RealFftPlanner::new());
}

/// One-sided frequency axis for an `nfft`-point transform at step `dt`.
pub fn frequency_axis(nfft: usize, dt: f64) -> Vec<f64> {
    let df = 1.0 / (nfft as f64 * dt);
    (0..=nfft / 2).map(|k| k as f64 * df).collect()
}

/// Magnitude STFT of a uniformly sampled signal.
///
/// Each frame of `plan.nwin` samples is mean-detrended, Hamming-windowed and
/// zero-padded to `plan.nfft`. Magnitudes are density-scaled by
/// `sqrt(dt / Σw²)`. Bins at or above `max_frequency` are dropped. Frame
/// times are frame centres offset by `t_start`.
pub fn magnitude_stft(
    samples: &[f64],
    dt: f64,
    t_start: f64,
    plan: &WindowPlan,
    max_frequency: f64,
) -> Result<AxisSpectrogram> {
    let freqs: Vec<f64> = frequency_axis(plan.nfft, dt)
        .into_iter()
        .take_while(|&f| f < max_frequency)
        .collect();
    let kept = freqs.len();

    let frame_count = plan.frame_count(samples.len());
    if frame_count == 0 {
        return Ok(AxisSpectrogram {
            columns: Vec::new(),
            freqs,
        });
    }

    let fft = FFT_PLANNER.with(|p| p.borrow_mut().plan_fft_forward(plan.nfft));
    let window = hamming_window(plan.nwin);
    let scale = (dt / window.iter().map(|w| w * w).sum::<f64>()).sqrt();

    let mut input = fft.make_input_vec();
    let mut spectrum = fft.make_output_vec();

    let hop = plan.hop();
    let mut columns = Vec::with_capacity(frame_count);
    for frame_i in 0..frame_count {
        let pos = frame_i * hop;
        let frame = &samples[pos..pos + plan.nwin];
        let mean = frame.iter().sum::<f64>() / plan.nwin as f64;

        // The FFT scrambles its input, so the padding is rewritten every frame.
        for (inp, (&s, &w)) in input.iter_mut().zip(frame.iter().zip(window.iter())) {
            *inp = (s - mean) * w;
        }
        for inp in input[plan.nwin..].iter_mut() {
            *inp = 0.0;
        }

        fft.process(&mut input, &mut spectrum)?;

        let magnitudes: Vec<f64> = spectrum[..kept].iter().map(|c| c.norm() * scale).collect();
        let time_offset = t_start + (plan.nwin as f64 / 2.0 + pos as f64) * dt;
        columns.push(SpectrogramColumn {
            magnitudes,
            time_offset,
        });
    }

    Ok(AxisSpectrogram { columns, freqs })
}
