use crate::dispatch::config::StationConfig;
use crate::dispatch::table::TaskTable;
use crate::generator::sweep::{SweepConfig, SweepGenerator};
use sondecore::control::StationSettings;
use sondecore::spectrum::ScanResult;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Everything the station's HTTP endpoints read or change.
pub struct StationState {
    pub table: TaskTable,
    pub scan: ScanResult,
    pub settings: StationSettings,
}

pub type SharedState = Arc<RwLock<StationState>>;

impl StationState {
    pub fn new(config: &StationConfig) -> Self {
        Self {
            table: TaskTable::new(config),
            scan: ScanResult::default(),
            settings: config.to_settings(),
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    /// Replaces the scan result if the scanner is running.
    pub fn refresh_scan(&mut self, generator: &mut SweepGenerator, timestamp: String) -> bool {
        if !self.table.is_scanning() {
            return false;
        }
        let carriers = self.table.active_frequencies();
        self.scan = generator.sweep(&carriers, timestamp);
        true
    }
}

pub fn sweep_config(config: &StationConfig) -> SweepConfig {
    SweepConfig {
        bins: config.scan_bins,
        min_freq: config.min_freq,
        max_freq: config.max_freq,
        snr_threshold: config.snr_threshold,
        noise: config.noise,
        ..Default::default()
    }
}

pub fn read_state(state: &SharedState) -> RwLockReadGuard<'_, StationState> {
    state.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn write_state(state: &SharedState) -> RwLockWriteGuard<'_, StationState> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_only_refreshes_while_scanning() {
        let config = StationConfig::from_args(1, None, 3);
        let mut generator = SweepGenerator::new(sweep_config(&config), config.seed);
        let mut state = StationState::new(&config);
        assert!(!state.refresh_scan(&mut generator, "t0".into()));
        assert_eq!(state.scan.timestamp, "No data yet.");

        state.table.housekeeping();
        assert!(state.refresh_scan(&mut generator, "t1".into()));
        assert_eq!(state.scan.timestamp, "t1");
        assert_eq!(state.scan.freq.len(), config.scan_bins);
    }
}
