use std::time::{Duration, Instant};

/// How long the panel stays paused after an accepted control request.
pub const ACTION_PAUSE: Duration = Duration::from_secs(10);
/// Controls resume this long after a task-list refresh.
pub const REFRESH_RESUME: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Web control is switched off on the station.
    Disabled,
    Paused { until: Instant },
    Ready,
}

/// Enables and pauses the control panel around requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlGate {
    state: GateState,
}

impl ControlGate {
    pub fn new(web_control: bool) -> Self {
        Self {
            state: if web_control {
                GateState::Ready
            } else {
                GateState::Disabled
            },
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn set_web_control(&mut self, enabled: bool) {
        self.state = match (enabled, self.state) {
            (false, _) => GateState::Disabled,
            (true, GateState::Disabled) => GateState::Ready,
            (true, state) => state,
        };
    }

    pub fn action_accepted(&mut self, now: Instant) {
        if self.state != GateState::Disabled {
            self.state = GateState::Paused {
                until: now + ACTION_PAUSE,
            };
        }
    }

    /// A fresh task list shortens any pause to [`REFRESH_RESUME`].
    pub fn task_list_refreshed(&mut self, now: Instant) {
        if let GateState::Paused { until } = self.state {
            self.state = GateState::Paused {
                until: until.min(now + REFRESH_RESUME),
            };
        }
    }

    pub fn is_enabled(&self, now: Instant) -> bool {
        match self.state {
            GateState::Disabled => false,
            GateState::Paused { until } => now >= until,
            GateState::Ready => true,
        }
    }
}

/// Result of the last password check, shown as the control panel header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStatus {
    Unverified,
    Accepted,
    Incorrect,
    WebControlDisabled,
}

impl PasswordStatus {
    pub fn header(&self) -> &'static str {
        match self {
            PasswordStatus::Unverified => "Enter Password",
            PasswordStatus::Accepted => "Password OK!",
            PasswordStatus::Incorrect => "Incorrect Password",
            PasswordStatus::WebControlDisabled => "Web Control Disabled",
        }
    }
}
