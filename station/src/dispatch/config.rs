use anyhow::Context;
use serde::{Deserialize, Serialize};
use sondecore::control::StationSettings;
use std::fs;
use std::path::Path;

/// A decoder running when the station starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecoderSeed {
    pub frequency_hz: f64,
    pub sonde_type: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Receiver identifiers, e.g. SDR serials or `SPY-host:port`.
    pub sdrs: Vec<String>,
    pub web_control: bool,
    /// `none` disables every privileged endpoint.
    pub web_password: String,
    pub min_freq: f64,
    pub max_freq: f64,
    pub snr_threshold: f64,
    pub station_lat: f64,
    pub station_lon: f64,
    pub station_alt: f64,
    /// Minutes a stopped-with-lockout frequency stays blocked.
    pub temporary_block_time: u64,
    pub scan_bins: usize,
    pub scan_interval_secs: u64,
    pub noise: f64,
    pub seed: u64,
    pub port: u16,
    pub decoders: Vec<DecoderSeed>,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            sdrs: vec!["0".to_string()],
            web_control: false,
            web_password: "none".to_string(),
            min_freq: 400.05,
            max_freq: 403.0,
            snr_threshold: 10.0,
            station_lat: 0.0,
            station_lon: 0.0,
            station_alt: 0.0,
            temporary_block_time: 120,
            scan_bins: 1024,
            scan_interval_secs: 10,
            noise: 0.05,
            seed: 0,
            port: 9000,
            decoders: Vec::new(),
        }
    }
}

impl StationConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading station config {}", path_ref.display()))?;
        let config: StationConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing station config {}", path_ref.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_args(sdr_count: usize, password: Option<String>, seed: u64) -> Self {
        let sdrs = (0..sdr_count.max(1)).map(|idx| idx.to_string()).collect();
        let (web_control, web_password) = match password {
            Some(password) => (true, password),
            None => (false, "none".to_string()),
        };
        Self {
            sdrs,
            web_control,
            web_password,
            seed,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sdrs.is_empty() {
            anyhow::bail!("station config lists no SDRs");
        }
        if !self.min_freq.is_finite() || !self.max_freq.is_finite() {
            anyhow::bail!("scan band {}..{} MHz is not finite", self.min_freq, self.max_freq);
        }
        if self.min_freq >= self.max_freq {
            anyhow::bail!(
                "min_freq {} must be below max_freq {}",
                self.min_freq,
                self.max_freq
            );
        }
        if !self.noise.is_finite() || self.noise < 0.0 {
            anyhow::bail!("noise {} must be a non-negative amplitude", self.noise);
        }
        Ok(())
    }

    /// Web control needs a real password as well as the flag.
    pub fn web_control_enabled(&self) -> bool {
        self.web_control && self.web_password != "none"
    }

    pub fn to_settings(&self) -> StationSettings {
        StationSettings {
            web_control: self.web_control_enabled(),
            min_freq: self.min_freq,
            max_freq: self.max_freq,
            snr_threshold: self.snr_threshold,
            station_lat: self.station_lat,
            station_lon: self.station_lon,
            station_alt: self.station_alt,
        }
    }
}
