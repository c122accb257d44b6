mod client;
mod plot;

use client::{fetch_config, fetch_scan, fetch_task_list, post_control, station_url};
use iced::{
    time,
    widget::{
        button, canvas::Cache, column, pick_list, row, scrollable, text, text_input, tooltip,
        Canvas, Column, Container, Row, TextInput,
    },
    Alignment, Element, Length, Subscription, Task, Theme,
};
use log::{info, warn};
use plot::SpectrumPlot;
use sondecore::control::{
    classify_response, resolve_password, ControlAction, ControlFailure, ControlGate,
    FileCredentialCache, PasswordStatus, StartRequest, StationSettings,
};
use sondecore::geo::{compute_look_angle, GeodeticPoint, LookAngle};
use sondecore::prelude::SondeError;
use sondecore::spectrum::{format_title, format_value, ScanChart, ScanResult};
use sondecore::tasks::{
    FrequencyOption, FrequencyPicker, RenderView, TaskListReconciler, NO_DECODERS_LABEL,
};
use std::env;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_PASSWORD_FILE: &str = ".sonde_password";
const SONDE_TYPES: &[&str] = &[
    "RS41", "RS92", "DFM", "M10", "M20", "IMET", "IMET5", "LMS6", "MK2LMS", "MEISEI", "MRZ",
];

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Dashboard::boot, Dashboard::update, Dashboard::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Dashboard) -> String {
    "Radiosonde Station Dashboard".into()
}

fn application_subscription(_: &Dashboard) -> Subscription<Message> {
    time::every(POLL_INTERVAL).map(|_| Message::Tick)
}

fn application_theme(_: &Dashboard) -> Theme {
    Theme::Dark
}

struct Dashboard {
    station: String,
    settings: StationSettings,
    reconciler: TaskListReconciler,
    tasks: Option<RenderView>,
    show_details: bool,
    picker: FrequencyPicker,
    stop_frequency: Option<FrequencyOption>,
    chart: ScanChart,
    chart_cache: Cache,
    gate: ControlGate,
    password_status: PasswordStatus,
    credentials: FileCredentialCache,
    password: String,
    frequency: String,
    sonde_type: Option<&'static str>,
    look: LookForm,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    TaskListFetched(Result<String, String>),
    ScanFetched(Result<ScanResult, String>),
    ConfigFetched(Result<StationSettings, String>),
    ToggleDetails,
    PasswordChanged(String),
    FrequencyChanged(String),
    SondeTypeSelected(&'static str),
    StopFrequencySelected(FrequencyOption),
    Control(ControlRequest),
    ControlFinished(ControlAction, Result<u16, String>),
    LookFieldChanged(LookField, String),
}

#[derive(Debug, Clone, Copy)]
enum ControlRequest {
    VerifyPassword,
    StartDecoder,
    StopDecoder { lockout: bool },
    EnableScanner,
    DisableScanner,
}

#[derive(Debug, Clone, Copy)]
enum LookField {
    ObserverLat,
    ObserverLon,
    ObserverAlt,
    TargetLat,
    TargetLon,
    TargetAlt,
}

impl Dashboard {
    fn boot() -> (Self, Task<Message>) {
        let station = station_url();
        let settings = StationSettings::default();
        let password_file =
            env::var("SONDE_PASSWORD_FILE").unwrap_or_else(|_| DEFAULT_PASSWORD_FILE.into());
        info!("polling station at {}", station);

        let dashboard = Dashboard {
            station: station.clone(),
            chart: ScanChart::new((&settings).into()),
            chart_cache: Cache::new(),
            gate: ControlGate::new(settings.web_control),
            look: LookForm::from_observer(settings.observer()),
            settings,
            reconciler: TaskListReconciler::default(),
            tasks: None,
            show_details: false,
            picker: FrequencyPicker::new(),
            stop_frequency: None,
            password_status: PasswordStatus::Unverified,
            credentials: FileCredentialCache::new(password_file),
            password: String::new(),
            frequency: String::new(),
            sonde_type: Some(SONDE_TYPES[0]),
            status: "Waiting for station...".into(),
            history: Vec::new(),
        };

        (
            dashboard,
            Task::batch([
                Task::perform(fetch_config(station.clone()), Message::ConfigFetched),
                Task::perform(fetch_task_list(station.clone()), Message::TaskListFetched),
                Task::perform(fetch_scan(station), Message::ScanFetched),
            ]),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => Task::batch([
                Task::perform(
                    fetch_task_list(state.station.clone()),
                    Message::TaskListFetched,
                ),
                Task::perform(fetch_scan(state.station.clone()), Message::ScanFetched),
            ]),
            Message::TaskListFetched(Ok(body)) => {
                match state.reconciler.ingest(&body) {
                    Ok(reconciled) => {
                        state.picker.rebuild(&reconciled.snapshot);
                        let selectable = state.picker.selectable();
                        if !state
                            .stop_frequency
                            .as_ref()
                            .is_some_and(|current| selectable.contains(current))
                        {
                            state.stop_frequency = selectable.first().cloned();
                        }
                        state.tasks = Some(reconciled.view);
                        state.gate.task_list_refreshed(Instant::now());
                    }
                    Err(err) => {
                        warn!("task list rejected: {}", err);
                        state.status = format!("Task list error: {err}");
                    }
                }
                Task::none()
            }
            Message::TaskListFetched(Err(err)) => {
                state.reconciler.metrics().record_failed_poll();
                state.status = format!("Station unreachable: {err}");
                Task::none()
            }
            Message::ScanFetched(Ok(scan)) => {
                if state.chart.update(&scan) {
                    state.chart_cache.clear();
                }
                Task::none()
            }
            Message::ScanFetched(Err(err)) => {
                warn!("scan poll failed: {}", err);
                Task::none()
            }
            Message::ConfigFetched(Ok(settings)) => {
                state.chart = ScanChart::new((&settings).into());
                state.chart_cache.clear();
                state.gate.set_web_control(settings.web_control);
                state.look = LookForm::from_observer(settings.observer());
                if !settings.web_control {
                    state.password_status = PasswordStatus::WebControlDisabled;
                }
                state.settings = settings;
                state.push_history("Station configuration loaded".into());
                Task::none()
            }
            Message::ConfigFetched(Err(err)) => {
                state.status = format!("Config error: {err}");
                Task::none()
            }
            Message::ToggleDetails => {
                state.show_details = !state.show_details;
                Task::none()
            }
            Message::PasswordChanged(value) => {
                state.password = value;
                Task::none()
            }
            Message::FrequencyChanged(value) => {
                state.frequency = value;
                Task::none()
            }
            Message::SondeTypeSelected(value) => {
                state.sonde_type = Some(value);
                Task::none()
            }
            Message::StopFrequencySelected(option) => {
                state.stop_frequency = Some(option);
                Task::none()
            }
            Message::Control(request) => state.submit(request),
            Message::ControlFinished(action, Ok(status)) => {
                match classify_response(&action, status) {
                    Ok(()) => {
                        if action.pauses_controls() {
                            state.gate.action_accepted(Instant::now());
                        } else {
                            state.password_status = PasswordStatus::Accepted;
                        }
                        state.status = action
                            .confirmation()
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("{} accepted", action.endpoint()));
                        state.push_history(state.status.clone());
                    }
                    Err(ControlFailure::Forbidden) => {
                        state.password_status = PasswordStatus::Incorrect;
                        state.status = ControlFailure::Forbidden.to_string();
                    }
                    Err(failure) => {
                        warn!("{} refused: {}", action.endpoint(), failure);
                        state.status = failure.to_string();
                        state.push_history(format!("{}: {}", action.endpoint(), failure));
                    }
                }
                Task::none()
            }
            Message::ControlFinished(action, Err(err)) => {
                state.status = format!("{} failed: {err}", action.endpoint());
                Task::none()
            }
            Message::LookFieldChanged(field, value) => {
                state.look.update_field(field, value);
                Task::none()
            }
        }
    }

    fn submit(&mut self, request: ControlRequest) -> Task<Message> {
        let action = match request {
            ControlRequest::VerifyPassword => ControlAction::CheckPassword,
            ControlRequest::StartDecoder => {
                let sonde_type = self.sonde_type.unwrap_or(SONDE_TYPES[0]);
                match StartRequest::from_input(&self.frequency, sonde_type, &self.settings) {
                    Ok(request) => ControlAction::StartDecoder(request),
                    Err(SondeError::InvalidInput(message)) => {
                        self.status = message;
                        return Task::none();
                    }
                    Err(err) => {
                        self.status = err.to_string();
                        return Task::none();
                    }
                }
            }
            ControlRequest::StopDecoder { lockout } => match &self.stop_frequency {
                Some(option) => ControlAction::StopDecoder {
                    frequency_hz: option.value_hz,
                    lockout,
                },
                None => {
                    self.status = NO_DECODERS_LABEL.into();
                    return Task::none();
                }
            },
            ControlRequest::EnableScanner => ControlAction::EnableScanner,
            ControlRequest::DisableScanner => ControlAction::DisableScanner,
        };

        let password = match resolve_password(&self.password, &mut self.credentials) {
            Ok(password) => password,
            Err(err) => {
                warn!(
                    "password cache {} unavailable: {}",
                    self.credentials.path().display(),
                    err
                );
                self.password.clone()
            }
        };

        let pending = action.clone();
        Task::perform(
            post_control(self.station.clone(), action, password),
            move |result| Message::ControlFinished(pending.clone(), result),
        )
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let controls = Container::new(state.control_panel())
            .padding(6)
            .width(Length::Fixed(360.0));

        let look_column = column![
            text("Look angle").size(22),
            state.look_panel(),
            text("Activity log").size(16),
            Container::new(scrollable(state.history_list()).height(Length::Fixed(120.0)))
                .padding(6),
        ]
        .spacing(10)
        .padding(10);

        let chart_title = match state.chart.last_rendered() {
            Some(stamp) => format!("Scan result: {stamp}"),
            None => "Scan result: No data yet.".into(),
        };
        let spectrum = Canvas::new(SpectrumPlot {
            chart: &state.chart,
            cache: &state.chart_cache,
        })
        .width(Length::Fill)
        .height(Length::Fixed(260.0));

        let peaks = state.chart.peaks().iter().take(6).fold(
            Column::new().spacing(2),
            |col, &(mhz, db)| {
                col.push(text(format!("{}: {}", format_title(mhz), format_value(db))).size(12))
            },
        );

        let main_column = column![
            text("Tasking").size(26),
            state.task_panel(),
            text(chart_title).size(18),
            spectrum,
            text("Peaks").size(16),
            Container::new(peaks).padding(6),
            text(&state.status).size(14),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![column![controls, look_column].spacing(10), main_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn task_panel(&self) -> Element<'_, Message> {
        let Some(view) = &self.tasks else {
            return text("No task list yet").size(14).into();
        };

        let details = view
            .lines()
            .iter()
            .fold(Column::new().spacing(4), |col, line| {
                col.push(text(format!("{} {}", line.glyph, line.label)).size(14))
            });

        if !view.is_summary() {
            return details.into();
        }

        let glyphs = view.glyphs().iter().fold(Row::new().spacing(6), |row, line| {
            row.push(tooltip(
                text(line.glyph.clone()).size(20),
                text(line.label.clone()).size(12),
                tooltip::Position::Bottom,
            ))
        });
        let toggle = button(text(format!("{} tasks", view.lines().len())).size(12))
            .on_press(Message::ToggleDetails)
            .padding(4);

        let mut panel = column![glyphs, toggle].spacing(6);
        if self.show_details {
            panel = panel.push(details);
        }
        panel.into()
    }

    fn control_panel(&self) -> Element<'_, Message> {
        let enabled = self.gate.is_enabled(Instant::now());
        let action = |request: ControlRequest| enabled.then_some(Message::Control(request));

        let stop_options = self.picker.selectable();
        let stop_picker = pick_list(
            stop_options,
            self.stop_frequency.clone(),
            Message::StopFrequencySelected,
        )
        .placeholder(NO_DECODERS_LABEL);

        column![
            text(self.password_status.header()).size(22),
            row![
                text_input("Password", &self.password)
                    .secure(true)
                    .on_input(Message::PasswordChanged)
                    .padding(6),
                button("Verify")
                    .on_press_maybe(action(ControlRequest::VerifyPassword))
                    .padding(6),
            ]
            .spacing(6),
            text("Start decoder").size(16),
            row![
                text_input("Frequency (MHz)", &self.frequency)
                    .on_input(Message::FrequencyChanged)
                    .padding(6),
                pick_list(SONDE_TYPES, self.sonde_type, Message::SondeTypeSelected),
            ]
            .spacing(6),
            button("Start")
                .on_press_maybe(action(ControlRequest::StartDecoder))
                .padding(8),
            text("Stop decoder").size(16),
            stop_picker,
            row![
                button("Stop")
                    .on_press_maybe(action(ControlRequest::StopDecoder { lockout: false }))
                    .padding(8),
                button("Stop + Lockout")
                    .on_press_maybe(action(ControlRequest::StopDecoder { lockout: true }))
                    .padding(8),
            ]
            .spacing(6),
            text("Scanner").size(16),
            row![
                button("Enable")
                    .on_press_maybe(action(ControlRequest::EnableScanner))
                    .padding(8),
                button("Disable")
                    .on_press_maybe(action(ControlRequest::DisableScanner))
                    .padding(8),
            ]
            .spacing(6),
        ]
        .spacing(8)
        .into()
    }

    fn look_panel(&self) -> Element<'_, Message> {
        let result = match self.look.solve() {
            Some(look) => column![
                text(format!("Azimuth {:.1}° ({})", look.azimuth, look.bearing)).size(14),
                text(format!("Elevation {:.1}°", look.elevation)).size(14),
                text(format!("Range {:.2} km", look.range / 1000.0)).size(14),
            ]
            .spacing(2),
            None => column![text("Enter target position").size(14)],
        };

        column![
            text("Observer").size(14),
            row![
                look_input("Lat", &self.look.observer_lat, LookField::ObserverLat),
                look_input("Lon", &self.look.observer_lon, LookField::ObserverLon),
                look_input("Alt (m)", &self.look.observer_alt, LookField::ObserverAlt),
            ]
            .spacing(4),
            text("Target").size(14),
            row![
                look_input("Lat", &self.look.target_lat, LookField::TargetLat),
                look_input("Lon", &self.look.target_lon, LookField::TargetLon),
                look_input("Alt (m)", &self.look.target_alt, LookField::TargetAlt),
            ]
            .spacing(4),
            result,
        ]
        .spacing(6)
        .into()
    }

    fn history_list(&self) -> Column<'_, Message> {
        if self.history.is_empty() {
            return Column::new().push(text("No activity yet").size(12));
        }
        self.history
            .iter()
            .rev()
            .fold(Column::new().spacing(4), |col, entry| {
                col.push(text(entry.clone()).size(12))
            })
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

fn look_input<'a>(
    placeholder: &'a str,
    value: &'a str,
    field: LookField,
) -> TextInput<'a, Message> {
    text_input(placeholder, value)
        .on_input(move |value| Message::LookFieldChanged(field, value))
        .padding(4)
}

#[derive(Debug, Clone, Default, PartialEq)]
struct LookForm {
    observer_lat: String,
    observer_lon: String,
    observer_alt: String,
    target_lat: String,
    target_lon: String,
    target_alt: String,
}

impl LookForm {
    fn from_observer(observer: GeodeticPoint) -> Self {
        Self {
            observer_lat: observer.latitude.to_string(),
            observer_lon: observer.longitude.to_string(),
            observer_alt: observer.altitude.to_string(),
            ..Self::default()
        }
    }

    fn update_field(&mut self, field: LookField, value: String) {
        match field {
            LookField::ObserverLat => self.observer_lat = value,
            LookField::ObserverLon => self.observer_lon = value,
            LookField::ObserverAlt => self.observer_alt = value,
            LookField::TargetLat => self.target_lat = value,
            LookField::TargetLon => self.target_lon = value,
            LookField::TargetAlt => self.target_alt = value,
        }
    }

    fn point(lat: &str, lon: &str, alt: &str) -> Option<GeodeticPoint> {
        Some(GeodeticPoint::new(
            lat.trim().parse().ok()?,
            lon.trim().parse().ok()?,
            alt.trim().parse().ok()?,
        ))
    }

    /// Look angle for the entered positions; `None` until every field parses.
    fn solve(&self) -> Option<LookAngle> {
        let observer = Self::point(&self.observer_lat, &self.observer_lon, &self.observer_alt)?;
        let target = Self::point(&self.target_lat, &self.target_lon, &self.target_alt)?;
        Some(compute_look_angle(observer, target))
    }
}
