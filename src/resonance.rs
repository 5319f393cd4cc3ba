//! Acoustic resonance bands of the scanner hardware.
//!
//! Bands are annotations: they never change the computed spectrum. The
//! overlap report only reads the combined curve.

use crate::types::GradientSpectrum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResonanceBand {
    /// Centre frequency (Hz).
    pub frequency: f64,
    /// Full bandwidth (Hz).
    pub bandwidth: f64,
}

impl ResonanceBand {
    pub fn new(frequency: f64, bandwidth: f64) -> Self {
        Self {
            frequency,
            bandwidth,
        }
    }

    pub fn lower(&self) -> f64 {
        self.frequency - self.bandwidth / 2.0
    }

    pub fn upper(&self) -> f64 {
        self.frequency + self.bandwidth / 2.0
    }

    pub fn contains(&self, f: f64) -> bool {
        f >= self.lower() && f <= self.upper()
    }

    /// Fallback bands for a 3T Prisma when no gradient system file is at hand.
    pub fn prisma_defaults() -> Vec<ResonanceBand> {
        vec![
            ResonanceBand::new(590.0, 100.0),
            ResonanceBand::new(1140.0, 220.0),
        ]
    }
}

/// Pair parallel frequency/bandwidth lists, dropping unused (zero) slots.
pub fn resonance_bands_from_lists(frequencies: &[f64], bandwidths: &[f64]) -> Vec<ResonanceBand> {
    let bands: Vec<ResonanceBand> = frequencies
        .iter()
        .zip(bandwidths.iter())
        .filter(|(&f, _)| f != 0.0)
        .map(|(&f, &bw)| ResonanceBand::new(f, bw))
        .collect();
    let dropped = frequencies.len().min(bandwidths.len()) - bands.len();
    if dropped > 0 {
        log::info!("Ignored {dropped} zero-frequency resonance entries");
    }
    bands
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BandOverlap {
    pub band: ResonanceBand,
    /// Frequency of the strongest retained bin inside the band, if any.
    pub peak_frequency: Option<f64>,
    pub peak_magnitude: f64,
    /// `peak_magnitude` relative to the global peak of the combined curve.
    pub relative_level: f64,
    pub flagged: bool,
}

/// Compare the combined spectrum against resonance bands.
///
/// A band is flagged when its peak reaches `threshold` times the global peak.
/// An all-zero spectrum flags nothing.
pub fn check_resonances(
    spectrum: &GradientSpectrum,
    bands: &[ResonanceBand],
    threshold: f64,
) -> Vec<BandOverlap> {
    let curve = spectrum.combined.peak_curve();
    let global_peak = curve.iter().copied().fold(0.0f64, f64::max);

    bands
        .iter()
        .map(|band| {
            let (peak_frequency, peak_magnitude) = spectrum
                .frequencies
                .iter()
                .zip(curve.iter())
                .filter(|(&f, _)| band.contains(f))
                .fold((None, 0.0f64), |(best_f, best_m), (&f, &m)| {
                    if best_f.is_none() || m > best_m {
                        (Some(f), m)
                    } else {
                        (best_f, best_m)
                    }
                });
            let relative_level = if global_peak > 0.0 {
                peak_magnitude / global_peak
            } else {
                0.0
            };
            let flagged = global_peak > 0.0 && relative_level >= threshold;
            if flagged {
                log::info!(
                    "Resonance band {:.0} Hz (±{:.0} Hz) reaches {:.0}% of peak gradient energy",
                    band.frequency,
                    band.bandwidth / 2.0,
                    relative_level * 100.0
                );
            }
            BandOverlap {
                band: *band,
                peak_frequency,
                peak_magnitude,
                relative_level,
                flagged,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CombinedSpectrum;

    fn spectrum(freqs: Vec<f64>, combined: CombinedSpectrum) -> GradientSpectrum {
        let zero = CombinedSpectrum::Curve(vec![0.0; freqs.len()]);
        GradientSpectrum {
            axes: [zero.clone(), zero.clone(), zero],
            combined,
            frequencies: freqs,
            times: vec![0.0],
            insufficient_data: false,
        }
    }

    #[test]
    fn test_band_edges() {
        let band = ResonanceBand::new(590.0, 100.0);
        assert_eq!(band.lower(), 540.0);
        assert_eq!(band.upper(), 640.0);
        assert!(band.contains(540.0));
        assert!(band.contains(640.0));
        assert!(!band.contains(641.0));
    }

    #[test]
    fn test_from_lists_drops_zero_frequency() {
        let bands = resonance_bands_from_lists(&[590.0, 0.0, 1140.0], &[100.0, 50.0, 220.0]);
        assert_eq!(bands, ResonanceBand::prisma_defaults());
    }

    #[test]
    fn test_flags_band_with_energy() {
        let freqs = vec![0.0, 500.0, 600.0, 1000.0, 1100.0];
        let s = spectrum(freqs, CombinedSpectrum::Curve(vec![0.1, 0.2, 1.0, 0.1, 0.3]));
        let report = check_resonances(&s, &ResonanceBand::prisma_defaults(), 0.5);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].peak_frequency, Some(600.0));
        assert!(report[0].flagged);
        assert_eq!(report[1].peak_frequency, Some(1100.0));
        assert!((report[1].relative_level - 0.3).abs() < 1e-12);
        assert!(!report[1].flagged);
    }

    #[test]
    fn test_map_is_collapsed_over_time() {
        let freqs = vec![0.0, 600.0];
        let s = spectrum(freqs, CombinedSpectrum::Map(vec![vec![0.5, 0.5], vec![0.2, 2.0]]));
        let report = check_resonances(&s, &[ResonanceBand::new(590.0, 100.0)], 0.9);
        assert_eq!(report[0].peak_magnitude, 2.0);
        assert!(report[0].flagged);
    }

    #[test]
    fn test_band_outside_analysed_range() {
        let s = spectrum(vec![0.0, 100.0], CombinedSpectrum::Curve(vec![1.0, 1.0]));
        let report = check_resonances(&s, &[ResonanceBand::new(5000.0, 100.0)], 0.1);
        assert_eq!(report[0].peak_frequency, None);
        assert!(!report[0].flagged);
    }

    #[test]
    fn test_zero_spectrum_flags_nothing() {
        let s = spectrum(vec![0.0, 600.0], CombinedSpectrum::Curve(vec![0.0, 0.0]));
        let report = check_resonances(&s, &ResonanceBand::prisma_defaults(), 0.0);
        assert!(report.iter().all(|r| !r.flagged));
    }
}
