use crate::geo::GeodeticPoint;
use crate::prelude::{SondeError, SondeResult};
use serde::{Deserialize, Serialize};

/// Station settings the control panel depends on, as served by `get_config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSettings {
    #[serde(default)]
    pub web_control: bool,
    /// Lower scan limit in MHz.
    pub min_freq: f64,
    /// Upper scan limit in MHz.
    pub max_freq: f64,
    #[serde(default = "default_snr_threshold")]
    pub snr_threshold: f64,
    #[serde(default)]
    pub station_lat: f64,
    #[serde(default)]
    pub station_lon: f64,
    #[serde(default)]
    pub station_alt: f64,
}

fn default_snr_threshold() -> f64 {
    10.0
}

impl Default for StationSettings {
    fn default() -> Self {
        Self {
            web_control: false,
            min_freq: 400.05,
            max_freq: 403.0,
            snr_threshold: default_snr_threshold(),
            station_lat: 0.0,
            station_lon: 0.0,
            station_alt: 0.0,
        }
    }
}

impl StationSettings {
    /// The receiving station's location, used as the look-angle observer.
    pub fn observer(&self) -> GeodeticPoint {
        GeodeticPoint::new(self.station_lat, self.station_lon, self.station_alt)
    }
}

/// A validated manual decoder start.
#[derive(Debug, Clone, PartialEq)]
pub struct StartRequest {
    pub frequency_hz: f64,
    pub sonde_type: String,
}

impl StartRequest {
    /// Validates a frequency typed in MHz against the station's scan limits.
    pub fn from_input(
        frequency_mhz: &str,
        sonde_type: &str,
        settings: &StationSettings,
    ) -> SondeResult<Self> {
        let mhz: f64 = frequency_mhz.trim().parse().map_err(|_| {
            SondeError::InvalidInput(format!("Invalid frequency '{}'", frequency_mhz.trim()))
        })?;
        if !mhz.is_finite() {
            return Err(SondeError::InvalidInput(format!(
                "Invalid frequency '{}'",
                frequency_mhz.trim()
            )));
        }
        if mhz > settings.max_freq {
            return Err(SondeError::InvalidInput(format!(
                "Supplied frequency above maximum ({} MHz)",
                settings.max_freq
            )));
        }
        if mhz < settings.min_freq {
            return Err(SondeError::InvalidInput(format!(
                "Supplied frequency below minimum ({} MHz)",
                settings.min_freq
            )));
        }
        Ok(Self {
            frequency_hz: mhz * 1e6,
            sonde_type: sonde_type.to_string(),
        })
    }
}

/// Privileged requests the dashboard can send to a station.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    CheckPassword,
    StartDecoder(StartRequest),
    StopDecoder { frequency_hz: f64, lockout: bool },
    EnableScanner,
    DisableScanner,
}

impl ControlAction {
    pub fn endpoint(&self) -> &'static str {
        match self {
            ControlAction::CheckPassword => "check_password",
            ControlAction::StartDecoder(_) => "start_decoder",
            ControlAction::StopDecoder { .. } => "stop_decoder",
            ControlAction::EnableScanner => "enable_scanner",
            ControlAction::DisableScanner => "disable_scanner",
        }
    }

    /// Form-encoded body for the request.
    pub fn form(&self, password: &str) -> Vec<(&'static str, String)> {
        let mut fields = vec![("password", password.to_string())];
        match self {
            ControlAction::StartDecoder(request) => {
                fields.push(("freq", format!("{:.1}", request.frequency_hz)));
                fields.push(("type", request.sonde_type.clone()));
            }
            ControlAction::StopDecoder {
                frequency_hz,
                lockout,
            } => {
                fields.push(("freq", format!("{}", frequency_hz)));
                if *lockout {
                    fields.push(("lockout", "1".to_string()));
                }
            }
            ControlAction::CheckPassword
            | ControlAction::EnableScanner
            | ControlAction::DisableScanner => {}
        }
        fields
    }

    /// Whether an accepted request should pause the control panel while the
    /// station acts on it.
    pub fn pauses_controls(&self) -> bool {
        !matches!(self, ControlAction::CheckPassword)
    }

    pub fn confirmation(&self) -> Option<&'static str> {
        match self {
            ControlAction::StartDecoder(_) => Some("Added requested decoder to results queue."),
            _ => None,
        }
    }
}

/// Why a station refused a control request.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlFailure {
    #[error("Incorrect Password")]
    Forbidden,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    ServerError(&'static str),
    #[error("unexpected station response ({0})")]
    Unexpected(u16),
}

/// Maps the HTTP status of a control request onto its outcome.
pub fn classify_response(action: &ControlAction, status: u16) -> Result<(), ControlFailure> {
    match status {
        200..=299 => Ok(()),
        403 => Err(ControlFailure::Forbidden),
        404 => Err(ControlFailure::NotFound(match action {
            ControlAction::DisableScanner => "Scanner not running!",
            ControlAction::StopDecoder { .. } => "Decoder on supplied frequency not running!",
            _ => "Station does not support this request",
        })),
        500 => Err(ControlFailure::ServerError(match action {
            ControlAction::DisableScanner => "Scanner not initialised... (try again!)",
            _ => "Station could not process the request",
        })),
        other => Err(ControlFailure::Unexpected(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> StationSettings {
        StationSettings {
            web_control: true,
            min_freq: 400.0,
            max_freq: 406.0,
            snr_threshold: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn start_request_converts_mhz_to_hz() {
        let request = StartRequest::from_input("403.5", "RS41", &settings()).unwrap();
        assert_eq!(request.frequency_hz, 403_500_000.0);
        let form = ControlAction::StartDecoder(request).form("hunter2");
        assert_eq!(
            form,
            vec![
                ("password", "hunter2".to_string()),
                ("freq", "403500000.0".to_string()),
                ("type", "RS41".to_string()),
            ]
        );
    }

    #[test]
    fn start_request_enforces_scan_limits() {
        let err = StartRequest::from_input("407", "DFM", &settings()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid input: Supplied frequency above maximum (406 MHz)"
        );
        let err = StartRequest::from_input("399.9", "DFM", &settings()).unwrap_err();
        assert!(err.to_string().contains("below minimum (400 MHz)"));
        assert!(StartRequest::from_input("abc", "DFM", &settings()).is_err());
    }

    #[test]
    fn start_request_rejects_non_finite_frequency() {
        for text in ["NaN", "inf", "-inf"] {
            let err = StartRequest::from_input(text, "RS41", &settings()).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("invalid input: Invalid frequency '{}'", text)
            );
        }
    }

    #[test]
    fn stop_with_lockout_adds_flag() {
        let action = ControlAction::StopDecoder {
            frequency_hz: 403_500_000.0,
            lockout: true,
        };
        assert_eq!(action.endpoint(), "stop_decoder");
        assert_eq!(
            action.form("pw"),
            vec![
                ("password", "pw".to_string()),
                ("freq", "403500000".to_string()),
                ("lockout", "1".to_string()),
            ]
        );
    }

    #[test]
    fn status_codes_map_to_messages() {
        assert!(classify_response(&ControlAction::EnableScanner, 200).is_ok());
        assert_eq!(
            classify_response(&ControlAction::CheckPassword, 403),
            Err(ControlFailure::Forbidden)
        );
        assert_eq!(
            classify_response(&ControlAction::DisableScanner, 404)
                .unwrap_err()
                .to_string(),
            "Scanner not running!"
        );
        assert_eq!(
            classify_response(&ControlAction::DisableScanner, 500)
                .unwrap_err()
                .to_string(),
            "Scanner not initialised... (try again!)"
        );
        let stop = ControlAction::StopDecoder {
            frequency_hz: 1.0,
            lockout: false,
        };
        assert_eq!(
            classify_response(&stop, 404).unwrap_err().to_string(),
            "Decoder on supplied frequency not running!"
        );
        assert_eq!(
            classify_response(&stop, 502),
            Err(ControlFailure::Unexpected(502))
        );
    }

    #[test]
    fn settings_parse_from_station_config() {
        let body = r#"{"web_control": true, "min_freq": 400.4, "max_freq": 404.0,
                       "snr_threshold": 12, "station_code": "ABC"}"#;
        let settings: StationSettings = serde_json::from_str(body).unwrap();
        assert!(settings.web_control);
        assert_eq!(settings.snr_threshold, 12.0);
        assert_eq!(settings.observer().altitude, 0.0);
    }
}
