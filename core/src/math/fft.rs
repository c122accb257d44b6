use num_complex::Complex64;
use rustfft::{num_traits::Zero, Fft, FftPlanner};
use std::sync::Arc;

/// Wraps a planned forward FFT for repeated spectrum estimates.
pub struct FftHelper {
    fft: Arc<dyn Fft<f64>>,
    size: usize,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self { fft, size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward transform; the input is zero-padded or truncated to the plan size.
    pub fn forward(&self, input: &[Complex64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input.iter().take(self.size).copied().collect();
        buffer.resize(self.size, Complex64::zero());
        self.fft.process(&mut buffer);
        buffer
    }

    /// Power per bin in dB, reordered so the lowest frequency comes first.
    pub fn power_spectrum_db(&self, input: &[Complex64]) -> Vec<f64> {
        let spectrum = self.forward(input);
        let scale = 1.0 / (self.size as f64 * self.size as f64);
        let mut power: Vec<f64> = spectrum
            .iter()
            .map(|bin| 10.0 * (bin.norm_sqr() * scale).max(1e-20).log10())
            .collect();
        power.rotate_left(self.size.div_ceil(2));
        power
    }
}
