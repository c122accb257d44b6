pub mod chart;
pub mod peaks;
pub mod scan;

pub use chart::{
    format_tick, format_title, format_value, tick_count, ChartLimits, ScanChart, Series,
};
pub use peaks::{detect_peaks, PeakReport};
pub use scan::ScanResult;
