use serde::{Deserialize, Serialize};

/// Latest scanner sweep, as served by `get_scan_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Bin centres in MHz.
    pub freq: Vec<f64>,
    /// Uncalibrated power in dB.
    pub power: Vec<f64>,
    pub peak_freq: Vec<f64>,
    pub peak_lvl: Vec<f64>,
    pub timestamp: String,
    /// Noise floor estimate, drawn as the threshold line.
    pub threshold: f64,
}

impl Default for ScanResult {
    fn default() -> Self {
        Self {
            freq: Vec::new(),
            power: Vec::new(),
            peak_freq: Vec::new(),
            peak_lvl: Vec::new(),
            timestamp: "No data yet.".to_string(),
            threshold: 0.0,
        }
    }
}
