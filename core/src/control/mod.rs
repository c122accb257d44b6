pub mod action;
pub mod credentials;
pub mod gate;

pub use action::{classify_response, ControlAction, ControlFailure, StartRequest, StationSettings};
pub use credentials::{
    resolve_password, CredentialCache, FileCredentialCache, MemoryCredentialCache,
};
pub use gate::{ControlGate, GateState, PasswordStatus, ACTION_PAUSE, REFRESH_RESUME};
