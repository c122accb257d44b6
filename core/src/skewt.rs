//! Geometry of the skew-T log-P diagram used to display sounding profiles.
//!
//! Pressures are in hPa, temperatures in °C and plot coordinates in pixels with
//! the origin at the top-left of the plotting area.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

pub const SKEW_ANGLE_DEG: f64 = 55.0;
pub const BASE_PRESSURE: f64 = 1050.0;
pub const TOP_PRESSURE: f64 = 100.0;
pub const PRESSURE_LINES: [f64; 7] = [1000.0, 850.0, 700.0, 500.0, 300.0, 200.0, 100.0];
pub const PRESSURE_TICKS: [f64; 12] = [
    950.0, 900.0, 800.0, 750.0, 650.0, 600.0, 550.0, 450.0, 400.0, 350.0, 250.0, 150.0,
];
pub const TEMPERATURE_DOMAIN: (f64, f64) = (-45.0, 50.0);

const KELVIN: f64 = 273.15;
const POISSON_EXPONENT: f64 = 0.286;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 30.0,
            right: 40.0,
            bottom: 20.0,
            left: 35.0,
        }
    }
}

/// Scales for a square skew-T plot of a given outer width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkewTGeometry {
    pub width: f64,
    pub height: f64,
    tan_skew: f64,
}

impl SkewTGeometry {
    pub fn new(outer_width: f64) -> Self {
        Self::with_margins(outer_width, Margins::default())
    }

    pub fn with_margins(outer_width: f64, margins: Margins) -> Self {
        Self {
            width: (outer_width - margins.left - margins.right).max(1.0),
            height: (outer_width - margins.top - margins.bottom).max(1.0),
            tan_skew: SKEW_ANGLE_DEG.to_radians().tan(),
        }
    }

    /// Unskewed temperature position.
    pub fn x(&self, temp: f64) -> f64 {
        let (lo, hi) = TEMPERATURE_DOMAIN;
        (temp - lo) / (hi - lo) * self.width
    }

    /// Log-pressure position; higher pressure is further down.
    pub fn y(&self, press: f64) -> f64 {
        (press.ln() - TOP_PRESSURE.ln()) / (BASE_PRESSURE.ln() - TOP_PRESSURE.ln()) * self.height
    }

    pub fn skewed_x(&self, temp: f64, press: f64) -> f64 {
        self.x(temp) + (self.y(BASE_PRESSURE) - self.y(press)) / self.tan_skew
    }

    pub fn point(&self, temp: f64, press: f64) -> (f64, f64) {
        (self.skewed_x(temp, press), self.y(press))
    }

    /// Dry adiabats as polylines in plot coordinates.
    pub fn dry_adiabat_paths(&self) -> Vec<Vec<(f64, f64)>> {
        let pressures = adiabat_pressures();
        dry_adiabats()
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .zip(pressures.iter())
                    .map(|(&temp, &press)| self.point(temp, press))
                    .collect()
            })
            .collect()
    }

    pub fn trace_path(&self, levels: &[SoundingLevel], dewpoint: bool) -> Vec<(f64, f64)> {
        levels
            .iter()
            .map(|level| {
                let temp = if dewpoint { level.dwpt } else { level.temp };
                self.point(temp, level.press)
            })
            .collect()
    }
}

fn adiabat_pressures() -> Array1<f64> {
    Array1::range(TOP_PRESSURE, BASE_PRESSURE + 1.0, 10.0)
}

/// Temperatures along each dry adiabat: one row per potential temperature
/// (−30 to 230 °C in 20 °C steps), one column per pressure level
/// (100 to 1050 hPa in 10 hPa steps).
pub fn dry_adiabats() -> Array2<f64> {
    let pressures = adiabat_pressures();
    let thetas = Array1::range(-30.0, 240.0, 20.0);
    Array2::from_shape_fn((thetas.len(), pressures.len()), |(i, j)| {
        (KELVIN + thetas[i]) / (1000.0 / pressures[j]).powf(POISSON_EXPONENT) - KELVIN
    })
}

/// One level of a sounding profile. Missing values use large negative sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundingLevel {
    pub press: f64,
    pub hght: f64,
    pub temp: f64,
    pub dwpt: f64,
    pub wdir: f64,
    /// Wind speed in m/s.
    pub wspd: f64,
}

pub fn temperature_trace(levels: &[SoundingLevel]) -> Vec<SoundingLevel> {
    levels
        .iter()
        .filter(|level| level.temp > -1000.0 && level.dwpt > -1000.0)
        .copied()
        .collect()
}

pub fn dewpoint_trace(levels: &[SoundingLevel]) -> Vec<SoundingLevel> {
    levels
        .iter()
        .filter(|level| level.temp > -1000.0 && level.dwpt > -800.0)
        .copied()
        .collect()
}

/// Levels that get a wind barb, taken from the temperature trace.
pub fn wind_levels(levels: &[SoundingLevel]) -> Vec<SoundingLevel> {
    temperature_trace(levels)
        .into_iter()
        .filter(|level| level.wdir >= 0.0 && level.wspd >= 0.0 && level.press >= TOP_PRESSURE)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedUnit {
    Knots,
    Kmh,
    Ms,
}

impl SpeedUnit {
    pub fn label(&self) -> &'static str {
        match self {
            SpeedUnit::Knots => "kt",
            SpeedUnit::Kmh => "kmh",
            SpeedUnit::Ms => "m/s",
        }
    }
}

pub fn convert_speed(ms: f64, unit: SpeedUnit) -> f64 {
    match unit {
        SpeedUnit::Knots => ms * 1.943844492,
        SpeedUnit::Kmh => ms * 3.6,
        SpeedUnit::Ms => ms,
    }
}

/// Decomposition of a wind speed into barb symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindBarb {
    /// Speed in knots, rounded to 5.
    pub speed_kt: u32,
    /// 50 kt each.
    pub flags: u32,
    /// 10 kt each.
    pub pennants: u32,
    /// 5 kt each.
    pub half_pennants: u32,
}

impl WindBarb {
    pub fn for_speed_kt(speed_kt: f64) -> Self {
        let speed = ((speed_kt.max(0.0) / 5.0).round() * 5.0) as u32;
        let flags = speed / 50;
        let pennants = (speed - flags * 50) / 10;
        let half_pennants = (speed - flags * 50 - pennants * 10) / 5;
        Self {
            speed_kt: speed,
            flags,
            pennants,
            half_pennants,
        }
    }

    pub fn for_level(level: &SoundingLevel) -> Self {
        Self::for_speed_kt(convert_speed(level.wspd, SpeedUnit::Knots))
    }
}

/// Tooltip text for a level, e.g. `Temp: -12°C`.
pub fn level_readout(level: &SoundingLevel, unit: SpeedUnit) -> [String; 4] {
    [
        format!("Temp: {}°C", level.temp.round()),
        format!("DP: {}°C", level.dwpt.round()),
        format!("-- {} m", level.hght.round()),
        format!(
            "{} {}, {}˚ ",
            (convert_speed(level.wspd, unit) * 10.0).round() / 10.0,
            unit.label(),
            level.wdir.round()
        ),
    ]
}
