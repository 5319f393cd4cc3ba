pub mod combine;
pub mod resample;
pub mod stft;
pub mod window;
