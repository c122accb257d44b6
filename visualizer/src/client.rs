use reqwest::{Response, StatusCode};
use sondecore::control::{ControlAction, StationSettings};
use sondecore::spectrum::ScanResult;
use std::env;

pub const DEFAULT_STATION_URL: &str = "http://127.0.0.1:9000";

/// Base URL of the station, from `SONDE_STATION_URL`.
pub fn station_url() -> String {
    env::var("SONDE_STATION_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_STATION_URL.to_string())
}

fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base, path)
}

fn require_success(path: &str, status: StatusCode) -> Result<(), String> {
    if status.is_success() {
        Ok(())
    } else {
        Err(format!("{}: {}", path, status))
    }
}

async fn get(base: &str, path: &str) -> Result<Response, String> {
    let response = reqwest::get(endpoint(base, path))
        .await
        .map_err(|e| e.to_string())?;
    require_success(path, response.status())?;
    Ok(response)
}

/// Raw `get_task_list` body; parsing is left to the reconciler.
pub async fn fetch_task_list(base: String) -> Result<String, String> {
    let response = get(&base, "get_task_list").await?;
    response.text().await.map_err(|e| e.to_string())
}

pub async fn fetch_scan(base: String) -> Result<ScanResult, String> {
    let response = get(&base, "get_scan_data").await?;
    response
        .json::<ScanResult>()
        .await
        .map_err(|e| e.to_string())
}

pub async fn fetch_config(base: String) -> Result<StationSettings, String> {
    let response = get(&base, "get_config").await?;
    response
        .json::<StationSettings>()
        .await
        .map_err(|e| e.to_string())
}

/// Posts a control action and returns the HTTP status for classification.
pub async fn post_control(
    base: String,
    action: ControlAction,
    password: String,
) -> Result<u16, String> {
    let client = reqwest::Client::new();
    let response = client
        .post(endpoint(&base, action.endpoint()))
        .form(&action.form(&password))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    Ok(response.status().as_u16())
}
