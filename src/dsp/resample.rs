use crate::error::{Result, SpectrumError};
use crate::types::{AxisWaveform, UniformSignal};

/// Linear interpolation at `t`, zero outside the waveform's own extent.
fn interp_or_zero(wave: &AxisWaveform, t: f64) -> f64 {
    let xs = wave.times();
    let ys = wave.amplitudes();
    let (first, last) = match (xs.first(), xs.last()) {
        (Some(&f), Some(&l)) => (f, l),
        _ => return 0.0,
    };
    if t < first || t > last {
        return 0.0;
    }
    // First index with xs[i] > t; t lies in [xs[i-1], xs[i]).
    let i = xs.partition_point(|&x| x <= t);
    if i >= xs.len() {
        return ys[xs.len() - 1];
    }
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    y0 + (y1 - y0) * (t - x0) / (x1 - x0)
}

/// Resample three axis waveforms onto a shared grid with step `dt`.
///
/// Samples sit at bin centres, `t[k] = tmin + (k + 0.5) * dt`. Without a
/// `time_range` the grid spans `[0, max_t]`, where `max_t` is the latest end
/// time across non-empty axes. A given range is clipped to that span.
pub fn resample_uniform(
    axes: [&AxisWaveform; 3],
    dt: f64,
    time_range: Option<[f64; 2]>,
) -> Result<UniformSignal> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SpectrumError::InvalidInput(format!(
            "raster time must be positive, got {dt}"
        )));
    }

    let max_t = axes
        .iter()
        .filter_map(|w| w.end_time())
        .reduce(f64::max)
        .ok_or_else(|| {
            SpectrumError::InvalidInput(
                "no gradient axis has any samples; sequence duration is undefined".into(),
            )
        })?;

    let (tmin, tmax) = match time_range {
        Some([start, end]) => (start.max(0.0), end.min(max_t)),
        None => (0.0, max_t),
    };

    let span = ((tmax - tmin) / dt).ceil();
    let nt = if span > 0.0 { span as usize } else { 0 };

    let times: Vec<f64> = (0..nt).map(|k| tmin + (k as f64 + 0.5) * dt).collect();
    let resample = |wave: &AxisWaveform| -> Vec<f64> {
        times.iter().map(|&t| interp_or_zero(wave, t)).collect()
    };
    let axes = axes.map(resample);

    log::debug!(
        "Resampled gradients: {} samples over [{:.6}, {:.6}] s at dt={}",
        nt,
        tmin,
        tmax,
        dt
    );

    Ok(UniformSignal {
        times,
        axes,
        dt,
        t_start: tmin,
    })
}

/// First difference along time on every axis; drops the last timestamp.
pub fn differentiate(signal: UniformSignal) -> UniformSignal {
    let diff = |x: &[f64]| -> Vec<f64> { x.windows(2).map(|w| w[1] - w[0]).collect() };
    let mut times = signal.times;
    times.pop();
    UniformSignal {
        axes: [
            diff(&signal.axes[0]),
            diff(&signal.axes[1]),
            diff(&signal.axes[2]),
        ],
        times,
        dt: signal.dt,
        t_start: signal.t_start,
    }
}
