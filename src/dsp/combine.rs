use crate::config::CombineMode;
use crate::types::{AxisSpectrogram, CombinedSpectrum, SpectrogramColumn};

/// Elementwise root-sum-of-squares of several spectrograms.
///
/// Squares are summed in slice order so results are reproducible. All
/// inputs must share a shape; the first one supplies frequencies and times.
pub fn rss_spectrogram(spectrograms: &[&AxisSpectrogram]) -> AxisSpectrogram {
    let Some(first) = spectrograms.first() else {
        return AxisSpectrogram {
            columns: Vec::new(),
            freqs: Vec::new(),
        };
    };

    let sum_sq = spectrograms.iter().fold(
        vec![vec![0.0f64; first.bin_count()]; first.frame_count()],
        |mut acc, spec| {
            for (acc_col, col) in acc.iter_mut().zip(spec.columns.iter()) {
                for (a, &m) in acc_col.iter_mut().zip(col.magnitudes.iter()) {
                    *a += m * m;
                }
            }
            acc
        },
    );

    let columns = sum_sq
        .into_iter()
        .zip(first.columns.iter())
        .map(|(col, src)| SpectrogramColumn {
            magnitudes: col.into_iter().map(f64::sqrt).collect(),
            time_offset: src.time_offset,
        })
        .collect();

    AxisSpectrogram {
        columns,
        freqs: first.freqs.clone(),
    }
}

/// Reduce the time dimension of a spectrogram.
pub fn reduce_time(spec: &AxisSpectrogram, mode: CombineMode) -> CombinedSpectrum {
    let bins = 0..spec.bin_count();
    match mode {
        CombineMode::Max => CombinedSpectrum::Curve(
            bins.map(|b| spec.bin(b).fold(f64::NEG_INFINITY, f64::max))
                .collect(),
        ),
        CombineMode::Mean => {
            let frames = spec.frame_count() as f64;
            CombinedSpectrum::Curve(bins.map(|b| spec.bin(b).sum::<f64>() / frames).collect())
        }
        CombineMode::Rss => CombinedSpectrum::Curve(
            bins.map(|b| spec.bin(b).map(|m| m * m).sum::<f64>().sqrt())
                .collect(),
        ),
        CombineMode::None => CombinedSpectrum::Map(spec.to_rows()),
    }
}
