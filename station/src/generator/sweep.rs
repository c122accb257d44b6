use num_complex::Complex64;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sondecore::math::FftHelper;
use sondecore::spectrum::{detect_peaks, ScanResult};
use std::f64::consts::PI;

/// Parameters of the synthetic scanner sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub bins: usize,
    /// Lower band edge in MHz.
    pub min_freq: f64,
    /// Upper band edge in MHz.
    pub max_freq: f64,
    pub snr_threshold: f64,
    /// Amplitude of the uniform noise added to each IQ sample.
    pub noise: f64,
    /// Amplitude of each sonde carrier.
    pub carrier: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            bins: 1024,
            min_freq: 400.05,
            max_freq: 403.0,
            snr_threshold: 10.0,
            noise: 0.05,
            carrier: 0.5,
        }
    }
}

impl SweepConfig {
    fn normalized_bins(&self) -> usize {
        self.bins.max(8)
    }

    fn span(&self) -> f64 {
        self.max_freq - self.min_freq
    }

    fn centre(&self) -> f64 {
        (self.min_freq + self.max_freq) / 2.0
    }
}

/// Produces sweeps from a seeded generator so a replayed scenario looks the same.
pub struct SweepGenerator {
    config: SweepConfig,
    fft: FftHelper,
    rng: StdRng,
}

impl SweepGenerator {
    pub fn new(config: SweepConfig, seed: u64) -> Self {
        let fft = FftHelper::new(config.normalized_bins());
        Self {
            config,
            fft,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn build_samples(&mut self, carriers_hz: &[f64]) -> Vec<Complex64> {
        let bins = self.config.normalized_bins();
        let span = self.config.span();
        let centre = self.config.centre();
        let offsets: Vec<f64> = carriers_hz
            .iter()
            .map(|hz| (hz / 1e6 - centre) / span)
            .filter(|offset| (-0.5..0.5).contains(offset))
            .collect();

        let noise = if self.config.noise.is_finite() {
            self.config.noise.abs()
        } else {
            0.0
        };
        (0..bins)
            .map(|n| {
                let mut sample = Complex64::new(
                    self.rng.gen_range(-noise..=noise),
                    self.rng.gen_range(-noise..=noise),
                );
                for offset in &offsets {
                    let phase = 2.0 * PI * offset * n as f64;
                    sample += Complex64::from_polar(self.config.carrier, phase);
                }
                sample
            })
            .collect()
    }

    /// One sweep with a carrier at every active decoder frequency.
    pub fn sweep(&mut self, carriers_hz: &[f64], timestamp: String) -> ScanResult {
        let bins = self.config.normalized_bins();
        let samples = self.build_samples(carriers_hz);
        let power: Vec<f64> = self
            .fft
            .power_spectrum_db(&samples)
            .into_iter()
            .map(|db| (db * 100.0).round() / 100.0)
            .collect();

        let span = self.config.span();
        let centre = self.config.centre();
        let freq: Vec<f64> = (0..bins)
            .map(|k| {
                let mhz = centre + (k as f64 - (bins / 2) as f64) / bins as f64 * span;
                (mhz * 1e6).round() / 1e6
            })
            .collect();

        let peaks = detect_peaks(&freq, &power, self.config.snr_threshold);
        ScanResult {
            freq,
            power,
            peak_freq: peaks.peak_freq,
            peak_lvl: peaks.peak_lvl,
            timestamp,
            threshold: peaks.noise_floor,
        }
    }
}
