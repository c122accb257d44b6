use crate::math::StatsHelper;

/// Peaks found in one sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeakReport {
    pub noise_floor: f64,
    pub peak_freq: Vec<f64>,
    pub peak_lvl: Vec<f64>,
}

/// Finds local maxima more than `snr_threshold` dB above the median power.
///
/// A plateau counts once, at its first bin.
pub fn detect_peaks(freq: &[f64], power: &[f64], snr_threshold: f64) -> PeakReport {
    let len = freq.len().min(power.len());
    let power = &power[..len];
    let noise_floor = StatsHelper::median(power);
    let level = noise_floor + snr_threshold;

    let mut report = PeakReport {
        noise_floor,
        ..Default::default()
    };

    let mut idx = 0;
    while idx < len {
        let value = power[idx];
        if value <= level {
            idx += 1;
            continue;
        }
        let mut end = idx;
        while end + 1 < len && power[end + 1] == value {
            end += 1;
        }
        let rises = idx == 0 || power[idx - 1] < value;
        let falls = end + 1 == len || power[end + 1] < value;
        if rises && falls {
            report.peak_freq.push(freq[idx]);
            report.peak_lvl.push(value);
        }
        idx = end + 1;
    }

    report
}
