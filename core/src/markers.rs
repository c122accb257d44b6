use serde::{Deserialize, Serialize};

/// Colours assigned to successive sonde tracks.
pub const TRACK_COLOURS: [&str; 6] = ["red", "green", "blue", "purple", "yellow", "cyan"];

/// Hands out track colours in a fixed rotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColourCycle {
    next: usize,
}

impl ColourCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_colour(&mut self) -> &'static str {
        let colour = TRACK_COLOURS[self.next % TRACK_COLOURS.len()];
        self.next = (self.next + 1) % TRACK_COLOURS.len();
        colour
    }
}

/// Map icon description: image URL, pixel size and anchor point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SondeIcon {
    pub url: String,
    pub size: (u32, u32),
    pub anchor: (u32, u32),
}

/// Balloon (ascent) and parachute (descent) icons for every track colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconTable {
    ascent: Vec<SondeIcon>,
    descent: Vec<SondeIcon>,
}

impl IconTable {
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let build = |kind: &str, size: (u32, u32)| -> Vec<SondeIcon> {
            TRACK_COLOURS
                .iter()
                .map(|colour| SondeIcon {
                    url: format!("{}/{}-{}.png", base, kind, colour),
                    size,
                    anchor: (23, 76),
                })
                .collect()
        };
        Self {
            ascent: build("balloon", (46, 85)),
            descent: build("parachute", (46, 84)),
        }
    }

    /// Icon for a colour; unknown colours fall back to the first one.
    pub fn icon(&self, colour: &str, descending: bool) -> &SondeIcon {
        let idx = TRACK_COLOURS
            .iter()
            .position(|candidate| *candidate == colour)
            .unwrap_or(0);
        if descending {
            &self.descent[idx]
        } else {
            &self.ascent[idx]
        }
    }
}

impl Default for IconTable {
    fn default() -> Self {
        Self::new("static/img")
    }
}
