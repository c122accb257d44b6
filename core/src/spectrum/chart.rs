use crate::control::StationSettings;
use crate::spectrum::scan::ScanResult;

/// Frequency span and default threshold of the scan chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLimits {
    pub min_freq: f64,
    pub max_freq: f64,
    pub snr_threshold: f64,
}

impl From<&StationSettings> for ChartLimits {
    fn from(settings: &StationSettings) -> Self {
        Self {
            min_freq: settings.min_freq,
            max_freq: settings.max_freq,
            snr_threshold: settings.snr_threshold,
        }
    }
}

/// Points of one plotted series as (MHz, dB).
pub type Series = Vec<(f64, f64)>;

/// Scan chart state: spectrum line, peak markers and threshold line.
///
/// Holds the timestamp of the last sweep drawn so an unchanged poll does not
/// trigger a redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanChart {
    limits: ChartLimits,
    spectra: Series,
    peaks: Series,
    threshold: Series,
    last_rendered: Option<String>,
}

impl ScanChart {
    pub fn new(limits: ChartLimits) -> Self {
        Self {
            spectra: vec![(limits.min_freq, 0.0), (limits.max_freq, 0.0)],
            peaks: vec![(0.0, 0.0)],
            threshold: vec![
                (limits.min_freq, limits.snr_threshold),
                (limits.max_freq, limits.snr_threshold),
            ],
            limits,
            last_rendered: None,
        }
    }

    /// Replaces the series from a new sweep. Returns `false` when the sweep
    /// was already drawn.
    pub fn update(&mut self, scan: &ScanResult) -> bool {
        if self.last_rendered.as_deref() == Some(scan.timestamp.as_str()) {
            return false;
        }

        self.spectra = scan
            .freq
            .iter()
            .copied()
            .zip(scan.power.iter().copied())
            .collect();
        self.peaks = scan
            .peak_freq
            .iter()
            .copied()
            .zip(scan.peak_lvl.iter().copied())
            .collect();
        self.threshold = vec![
            (self.limits.min_freq, scan.threshold),
            (self.limits.max_freq, scan.threshold),
        ];
        self.last_rendered = Some(scan.timestamp.clone());
        true
    }

    pub fn limits(&self) -> ChartLimits {
        self.limits
    }

    pub fn spectra(&self) -> &[(f64, f64)] {
        &self.spectra
    }

    pub fn peaks(&self) -> &[(f64, f64)] {
        &self.peaks
    }

    pub fn threshold(&self) -> &[(f64, f64)] {
        &self.threshold
    }

    pub fn last_rendered(&self) -> Option<&str> {
        self.last_rendered.as_deref()
    }

    /// Power range covering every series, padded so flat data still has height.
    pub fn power_bounds(&self) -> (f64, f64) {
        let (min, max) = self
            .spectra
            .iter()
            .chain(self.peaks.iter())
            .chain(self.threshold.iter())
            .map(|&(_, db)| db)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), db| {
                (lo.min(db), hi.max(db))
            });
        if min > max {
            return (0.0, 1.0);
        }
        if (max - min).abs() < 1.0 {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        }
    }
}

/// Tooltip title, e.g. `403.5 MHz`.
pub fn format_title(mhz: f64) -> String {
    format!("{} MHz", (mhz * 1000.0).round() / 1000.0)
}

pub fn format_value(db: f64) -> String {
    format!("{} dB", db)
}

pub fn format_tick(mhz: f64) -> String {
    format!("{:.3}", mhz)
}

/// Number of x-axis ticks to keep for a given window width.
pub fn tick_count(window_width: f32) -> usize {
    if window_width > 1100.0 {
        10
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> ChartLimits {
        ChartLimits {
            min_freq: 400.0,
            max_freq: 403.0,
            snr_threshold: 10.0,
        }
    }

    fn sweep(timestamp: &str) -> ScanResult {
        ScanResult {
            freq: vec![400.0, 401.0, 402.0],
            power: vec![-60.0, -30.0, -61.0],
            peak_freq: vec![401.0],
            peak_lvl: vec![-30.0],
            timestamp: timestamp.to_string(),
            threshold: -60.0,
        }
    }

    #[test]
    fn initial_series_span_scan_limits() {
        let chart = ScanChart::new(limits());
        assert_eq!(chart.spectra(), &[(400.0, 0.0), (403.0, 0.0)]);
        assert_eq!(chart.peaks(), &[(0.0, 0.0)]);
        assert_eq!(chart.threshold(), &[(400.0, 10.0), (403.0, 10.0)]);
        assert_eq!(chart.last_rendered(), None);
    }

    #[test]
    fn unchanged_timestamp_skips_redraw() {
        let mut chart = ScanChart::new(limits());
        assert!(chart.update(&sweep("2024-01-01T00:00:00Z")));
        assert_eq!(chart.spectra().len(), 3);
        assert_eq!(chart.threshold(), &[(400.0, -60.0), (403.0, -60.0)]);

        let mut stale = sweep("2024-01-01T00:00:00Z");
        stale.power = vec![0.0; 3];
        assert!(!chart.update(&stale));
        assert_eq!(chart.spectra()[1], (401.0, -30.0));

        assert!(chart.update(&sweep("2024-01-01T00:00:05Z")));
    }

    #[test]
    fn power_bounds_cover_all_series() {
        let mut chart = ScanChart::new(limits());
        chart.update(&sweep("t"));
        assert_eq!(chart.power_bounds(), (-61.0, -30.0));
    }

    #[test]
    fn labels_match_chart_formatting() {
        assert_eq!(format_title(403.2501), "403.25 MHz");
        assert_eq!(format_value(-42.5), "-42.5 dB");
        assert_eq!(format_tick(401.5), "401.500");
        assert_eq!(tick_count(1280.0), 10);
        assert_eq!(tick_count(800.0), 4);
    }
}
