use crate::dispatch::config::StationConfig;
use log::{info, warn};
use sondecore::tasks::{frequency_label, TaskEntry};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// What an SDR has been given to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Scan,
    Decode { frequency_hz: f64, sonde_type: String },
}

/// Why the station refused a control request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    Forbidden,
    NotFound,
    Malformed,
}

impl Refusal {
    pub fn status_code(&self) -> u16 {
        match self {
            Refusal::Forbidden => 403,
            Refusal::NotFound => 404,
            Refusal::Malformed => 500,
        }
    }
}

/// Receiver allocation for the emulated station.
pub struct TaskTable {
    sdrs: Vec<String>,
    assignments: BTreeMap<String, Assignment>,
    scan_inhibit: bool,
    web_control: bool,
    password: String,
    block_time: Duration,
    /// Locked-out frequencies and their expiry; `None` never expires.
    lockouts: Vec<(f64, Option<Instant>)>,
}

impl TaskTable {
    pub fn new(config: &StationConfig) -> Self {
        let mut table = Self {
            sdrs: config.sdrs.clone(),
            assignments: BTreeMap::new(),
            scan_inhibit: false,
            web_control: config.web_control_enabled(),
            password: config.web_password.clone(),
            block_time: Duration::from_secs(config.temporary_block_time.saturating_mul(60)),
            lockouts: Vec::new(),
        };
        for seed in &config.decoders {
            table.start_decoder(seed.frequency_hz, &seed.sonde_type, Instant::now());
        }
        table
    }

    pub fn check_password(&self, password: Option<&str>) -> Result<(), Refusal> {
        match password {
            Some(candidate) if self.web_control && candidate == self.password => Ok(()),
            _ => Err(Refusal::Forbidden),
        }
    }

    fn free_sdr(&self) -> Option<String> {
        self.sdrs
            .iter()
            .find(|sdr| !self.assignments.contains_key(*sdr))
            .cloned()
    }

    fn scanner_sdr(&self) -> Option<String> {
        self.assignments
            .iter()
            .find(|(_, assignment)| **assignment == Assignment::Scan)
            .map(|(sdr, _)| sdr.clone())
    }

    fn decoder_sdr(&self, frequency_hz: f64) -> Option<String> {
        self.assignments
            .iter()
            .find(|(_, assignment)| match assignment {
                Assignment::Decode { frequency_hz: f, .. } => *f == frequency_hz,
                Assignment::Scan => false,
            })
            .map(|(sdr, _)| sdr.clone())
    }

    pub fn is_scanning(&self) -> bool {
        self.scanner_sdr().is_some()
    }

    pub fn scan_inhibited(&self) -> bool {
        self.scan_inhibit
    }

    /// Frequencies with a running decoder, in Hz.
    pub fn active_frequencies(&self) -> Vec<f64> {
        self.assignments
            .values()
            .filter_map(|assignment| match assignment {
                Assignment::Decode { frequency_hz, .. } => Some(*frequency_hz),
                Assignment::Scan => None,
            })
            .collect()
    }

    fn locked_out(&mut self, frequency_hz: f64, now: Instant) -> bool {
        self.lockouts
            .retain(|(_, until)| until.map_or(true, |until| until > now));
        self.lockouts.iter().any(|(freq, _)| *freq == frequency_hz)
    }

    /// Queues a decoder the way a scan result would. Requests that cannot be
    /// placed are dropped, as the real station does.
    pub fn start_decoder(&mut self, frequency_hz: f64, sonde_type: &str, now: Instant) {
        if !frequency_hz.is_finite() {
            warn!("ignoring {} decoder on non-finite frequency", sonde_type);
            return;
        }
        if self.decoder_sdr(frequency_hz).is_some() {
            info!("decoder already running on {} MHz", frequency_label(frequency_hz));
            return;
        }
        if self.locked_out(frequency_hz, now) {
            warn!("{} MHz is locked out, ignoring start", frequency_label(frequency_hz));
            return;
        }
        let sdr = match self.free_sdr().or_else(|| self.scanner_sdr()) {
            Some(sdr) => sdr,
            None => {
                warn!(
                    "no receiver free for {} MHz {}",
                    frequency_label(frequency_hz),
                    sonde_type
                );
                return;
            }
        };
        info!(
            "starting {} decoder on {} MHz using SDR {}",
            sonde_type,
            frequency_label(frequency_hz),
            sdr
        );
        self.assignments.insert(
            sdr,
            Assignment::Decode {
                frequency_hz,
                sonde_type: sonde_type.to_string(),
            },
        );
    }

    pub fn stop_decoder(
        &mut self,
        frequency_hz: f64,
        lockout: bool,
        now: Instant,
    ) -> Result<(), Refusal> {
        let sdr = self.decoder_sdr(frequency_hz).ok_or(Refusal::NotFound)?;
        self.assignments.remove(&sdr);
        if lockout {
            self.lockouts
                .push((frequency_hz, now.checked_add(self.block_time)));
        }
        info!(
            "stopped decoder on {} MHz (lockout: {})",
            frequency_label(frequency_hz),
            lockout
        );
        Ok(())
    }

    pub fn enable_scanner(&mut self) {
        self.scan_inhibit = false;
    }

    pub fn disable_scanner(&mut self) -> Result<(), Refusal> {
        let sdr = self.scanner_sdr().ok_or(Refusal::NotFound)?;
        self.scan_inhibit = true;
        self.assignments.remove(&sdr);
        info!("scanner on SDR {} stopped", sdr);
        Ok(())
    }

    /// Periodic pass that restarts the scanner on an idle SDR.
    pub fn housekeeping(&mut self) {
        if self.scan_inhibit || self.is_scanning() {
            return;
        }
        if let Some(sdr) = self.free_sdr() {
            info!("starting scanner on SDR {}", sdr);
            self.assignments.insert(sdr, Assignment::Scan);
        }
    }

    /// The `get_task_list` payload: every configured SDR, tasked or not.
    pub fn task_list(&self) -> BTreeMap<String, TaskEntry> {
        self.sdrs
            .iter()
            .map(|sdr| {
                let entry = match self.assignments.get(sdr) {
                    None => TaskEntry {
                        freq: 0.0,
                        task: "Not Tasked".to_string(),
                        decoder_type: None,
                    },
                    Some(Assignment::Scan) => TaskEntry {
                        freq: 0.0,
                        task: "Scanning".to_string(),
                        decoder_type: None,
                    },
                    Some(Assignment::Decode {
                        frequency_hz,
                        sonde_type,
                    }) => TaskEntry {
                        freq: *frequency_hz,
                        task: format!("Decoding ({} MHz)", frequency_label(*frequency_hz)),
                        decoder_type: Some(sonde_type.clone()),
                    },
                };
                (sdr.clone(), entry)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(sdrs: usize) -> TaskTable {
        TaskTable::new(&StationConfig::from_args(sdrs, Some("pw".into()), 0))
    }

    #[test]
    fn idle_station_starts_scanner() {
        let mut table = table(2);
        assert_eq!(table.task_list()["0"].task, "Not Tasked");
        table.housekeeping();
        assert_eq!(table.task_list()["0"].task, "Scanning");
        assert_eq!(table.task_list()["1"].task, "Not Tasked");
    }

    #[test]
    fn decoder_takes_free_sdr_then_scanner() {
        let mut table = table(2);
        let now = Instant::now();
        table.housekeeping();
        table.start_decoder(403_500_000.0, "RS41", now);
        let list = table.task_list();
        assert_eq!(list["1"].task, "Decoding (403.500 MHz)");
        assert_eq!(list["1"].decoder_type.as_deref(), Some("RS41"));

        table.start_decoder(402_000_000.0, "DFM", now);
        assert!(!table.is_scanning());
        assert_eq!(table.task_list()["0"].freq, 402_000_000.0);

        table.start_decoder(401_000_000.0, "M10", now);
        assert_eq!(table.active_frequencies().len(), 2);
    }

    #[test]
    fn non_finite_frequency_never_takes_an_sdr() {
        let mut table = table(1);
        table.start_decoder(f64::NAN, "RS41", Instant::now());
        table.start_decoder(f64::INFINITY, "RS41", Instant::now());
        assert!(table.active_frequencies().is_empty());
        table.housekeeping();
        assert!(table.is_scanning());
    }

    #[test]
    fn huge_block_time_does_not_overflow() {
        let config = StationConfig {
            temporary_block_time: u64::MAX,
            ..StationConfig::from_args(1, Some("pw".into()), 0)
        };
        let mut table = TaskTable::new(&config);
        let now = Instant::now();
        table.start_decoder(403_000_000.0, "RS41", now);
        assert!(table.stop_decoder(403_000_000.0, true, now).is_ok());
        table.start_decoder(403_000_000.0, "RS41", now + Duration::from_secs(86_400));
        assert!(table.active_frequencies().is_empty());
    }

    #[test]
    fn stop_unknown_decoder_is_not_found() {
        let mut table = table(1);
        assert_eq!(
            table.stop_decoder(403_000_000.0, false, Instant::now()),
            Err(Refusal::NotFound)
        );
    }

    #[test]
    fn lockout_blocks_restart_until_expiry() {
        let mut table = table(1);
        let now = Instant::now();
        table.start_decoder(403_000_000.0, "RS41", now);
        table.stop_decoder(403_000_000.0, true, now).unwrap();
        table.start_decoder(403_000_000.0, "RS41", now);
        assert!(table.active_frequencies().is_empty());

        let later = now + Duration::from_secs(121 * 60);
        table.start_decoder(403_000_000.0, "RS41", later);
        assert_eq!(table.active_frequencies(), vec![403_000_000.0]);
    }

    #[test]
    fn disabled_scanner_stays_off_until_enabled() {
        let mut table = table(1);
        assert_eq!(table.disable_scanner(), Err(Refusal::NotFound));
        table.housekeeping();
        table.disable_scanner().unwrap();
        assert!(table.scan_inhibited());
        table.housekeeping();
        assert!(!table.is_scanning());
        table.enable_scanner();
        table.housekeeping();
        assert!(table.is_scanning());
    }

    #[test]
    fn password_requires_web_control() {
        let table = table(1);
        assert!(table.check_password(Some("pw")).is_ok());
        assert_eq!(table.check_password(Some("nope")), Err(Refusal::Forbidden));
        assert_eq!(table.check_password(None), Err(Refusal::Forbidden));

        let closed = TaskTable::new(&StationConfig::from_args(1, None, 0));
        assert_eq!(closed.check_password(Some("none")), Err(Refusal::Forbidden));
    }
}
