use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    static HAMMING_CACHE: RefCell<HashMap<usize, Vec<f64>>> = RefCell::new(HashMap::new());
}

/// Smallest window that still gives a usable spectral estimate.
pub const MIN_WINDOW: usize = 4;

/// Periodic Hamming window: `0.54 - 0.46 cos(2πn/N)`.
pub fn hamming_window(size: usize) -> Vec<f64> {
    HAMMING_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .entry(size)
            .or_insert_with(|| {
                (0..size)
                    .map(|i| {
                        0.54 - 0.46 * (2.0 * std::f64::consts::PI * i as f64 / size as f64).cos()
                    })
                    .collect()
            })
            .clone()
    })
}

/// Window, overlap and FFT length derived for one analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowPlan {
    pub nwin: usize,
    pub noverlap: usize,
    pub nfft: usize,
}

impl WindowPlan {
    /// Derive the plan for a signal of `signal_len` samples.
    ///
    /// The window is capped to the signal, raised to [`MIN_WINDOW`], then
    /// capped again. The order matters for signals shorter than four samples.
    pub fn derive(window_width: f64, dt: f64, oversampling: f64, signal_len: usize) -> Self {
        let desired = ((window_width / dt).round() as usize).max(1);
        let nwin = desired.min(signal_len).max(MIN_WINDOW).min(signal_len);
        let nfft = ((oversampling * nwin as f64).round() as usize).max(nwin);
        let noverlap = (nwin / 2).min(nwin.saturating_sub(1));
        Self {
            nwin,
            noverlap,
            nfft,
        }
    }

    pub fn hop(&self) -> usize {
        self.nwin - self.noverlap
    }

    /// Number of full frames that fit in `signal_len` samples.
    pub fn frame_count(&self, signal_len: usize) -> usize {
        if signal_len < self.nwin || self.nwin == 0 {
            0
        } else {
            1 + (signal_len - self.nwin) / self.hop()
        }
    }

    /// One-sided bin count of the FFT.
    pub fn bin_count(&self) -> usize {
        self.nfft / 2 + 1
    }
}
