//! Core models for the radiosonde station dashboard.
//!
//! Everything here is synchronous and free of I/O apart from the credential
//! cache: the dashboard and the station emulator drive these types from their
//! own polling loops and HTTP handlers.

pub mod control;
pub mod geo;
pub mod markers;
pub mod math;
pub mod prelude;
pub mod skewt;
pub mod spectrum;
pub mod tasks;
pub mod telemetry;

pub use geo::{compute_look_angle, GeodeticPoint, LookAngle};
pub use prelude::{SondeError, SondeResult};
pub use tasks::{FrequencyPicker, RenderView, Snapshot, TaskListReconciler, TaskRecord};
