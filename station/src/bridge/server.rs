use crate::bridge::state::{read_state, write_state, SharedState};
use crate::dispatch::table::Refusal;
use log::{info, warn};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Instant;
use warp::{http::StatusCode, Filter, Rejection, Reply};

const CONTROL_ENDPOINTS: [&str; 5] = [
    "check_password",
    "start_decoder",
    "stop_decoder",
    "enable_scanner",
    "disable_scanner",
];

fn with_state(
    state: SharedState,
) -> impl Filter<Extract = (SharedState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn parse_frequency(form: &HashMap<String, String>) -> Result<f64, Refusal> {
    form.get("freq")
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|frequency| frequency.is_finite())
        .ok_or(Refusal::Malformed)
}

/// Applies one control request to the station.
pub fn handle_control(
    endpoint: &str,
    form: &HashMap<String, String>,
    state: &SharedState,
) -> Result<(), Refusal> {
    if !CONTROL_ENDPOINTS.contains(&endpoint) {
        return Err(Refusal::NotFound);
    }

    let mut guard = write_state(state);
    guard
        .table
        .check_password(form.get("password").map(String::as_str))?;

    let now = Instant::now();
    match endpoint {
        "start_decoder" => {
            let frequency_hz = parse_frequency(form)?;
            let sonde_type = form.get("type").ok_or(Refusal::Malformed)?;
            info!("web start request: {} {}", sonde_type, frequency_hz);
            guard.table.start_decoder(frequency_hz, sonde_type, now);
            Ok(())
        }
        "stop_decoder" => {
            let frequency_hz = parse_frequency(form)?;
            let lockout = form
                .get("lockout")
                .map(|value| value.trim() == "1")
                .unwrap_or(false);
            guard.table.stop_decoder(frequency_hz, lockout, now)
        }
        "enable_scanner" => {
            guard.table.enable_scanner();
            Ok(())
        }
        "disable_scanner" => guard.table.disable_scanner(),
        _ => Ok(()),
    }
}

fn control_reply(
    endpoint: String,
    form: HashMap<String, String>,
    state: SharedState,
) -> warp::reply::WithStatus<&'static str> {
    match handle_control(&endpoint, &form, &state) {
        Ok(()) => warp::reply::with_status("OK", StatusCode::OK),
        Err(refusal) => {
            warn!("{} refused: {:?}", endpoint, refusal);
            let status = StatusCode::from_u16(refusal.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            warp::reply::with_status("", status)
        }
    }
}

/// The station's HTTP surface.
pub fn routes(
    state: SharedState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let task_list = warp::path("get_task_list")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .map(|state: SharedState| warp::reply::json(&read_state(&state).table.task_list()));

    let scan_data = warp::path("get_scan_data")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .map(|state: SharedState| warp::reply::json(&read_state(&state).scan));

    let config = warp::path("get_config")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .map(|state: SharedState| warp::reply::json(&read_state(&state).settings));

    let control = warp::post()
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::body::form::<HashMap<String, String>>())
        .and(with_state(state))
        .map(control_reply);

    task_list.or(scan_data).or(config).or(control)
}

/// Hosts the station endpoints.
pub struct StationBridge {
    state: SharedState,
}

impl StationBridge {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    pub async fn serve(&self, address: SocketAddr) {
        info!("station API listening on http://{}", address);
        warp::serve(routes(self.state.clone())).run(address).await;
    }

    pub fn publish_status(&self, message: &str) {
        info!("[station] {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::state::StationState;
    use crate::dispatch::config::StationConfig;
    use sondecore::tasks::{parse_snapshot, TaskKind};

    fn shared(password: Option<&str>) -> SharedState {
        let config = StationConfig::from_args(2, password.map(str::to_string), 0);
        let mut state = StationState::new(&config);
        state.table.housekeeping();
        state.shared()
    }

    async fn post(state: &SharedState, path: &str, body: &str) -> u16 {
        warp::test::request()
            .method("POST")
            .path(path)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body.to_string())
            .reply(&routes(state.clone()))
            .await
            .status()
            .as_u16()
    }

    #[tokio::test]
    async fn task_list_matches_dashboard_contract() {
        let state = shared(Some("pw"));
        let response = warp::test::request()
            .path("/get_task_list")
            .reply(&routes(state))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = std::str::from_utf8(response.body()).unwrap();
        let parsed = parse_snapshot(body).unwrap();
        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.snapshot["0"].kind, TaskKind::Scanning);
        assert_eq!(parsed.snapshot["1"].kind, TaskKind::Idle);
    }

    #[tokio::test]
    async fn control_requests_follow_status_contract() {
        let state = shared(Some("pw"));
        assert_eq!(post(&state, "/check_password", "password=pw").await, 200);
        assert_eq!(post(&state, "/check_password", "password=bad").await, 403);
        assert_eq!(post(&state, "/check_password", "").await, 403);
        assert_eq!(
            post(&state, "/start_decoder", "password=pw&freq=403500000.0&type=RS41").await,
            200
        );
        assert_eq!(
            read_state(&state).table.active_frequencies(),
            vec![403_500_000.0]
        );
        assert_eq!(
            post(&state, "/start_decoder", "password=pw&freq=abc&type=RS41").await,
            500
        );
        assert_eq!(
            post(&state, "/stop_decoder", "password=pw&freq=402000000").await,
            404
        );
        assert_eq!(
            post(&state, "/stop_decoder", "password=pw&freq=403500000&lockout=1").await,
            200
        );
        assert_eq!(post(&state, "/disable_scanner", "password=pw").await, 200);
        assert_eq!(post(&state, "/disable_scanner", "password=pw").await, 404);
        assert_eq!(post(&state, "/enable_scanner", "password=pw").await, 200);
        assert_eq!(post(&state, "/reboot", "password=pw").await, 404);
    }

    #[tokio::test]
    async fn non_finite_frequencies_are_malformed() {
        let state = shared(Some("pw"));
        for freq in ["NaN", "inf", "-inf"] {
            let start = format!("password=pw&freq={}&type=RS41", freq);
            assert_eq!(post(&state, "/start_decoder", &start).await, 500);
            let stop = format!("password=pw&freq={}", freq);
            assert_eq!(post(&state, "/stop_decoder", &stop).await, 500);
        }
        assert!(read_state(&state).table.active_frequencies().is_empty());
        let snapshot = parse_snapshot(
            &serde_json::to_string(&read_state(&state).table.task_list()).unwrap(),
        )
        .unwrap();
        assert!(snapshot.skipped.is_empty());
    }

    #[tokio::test]
    async fn closed_station_forbids_control() {
        let state = shared(None);
        assert_eq!(post(&state, "/enable_scanner", "password=none").await, 403);
    }
}
