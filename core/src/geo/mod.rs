pub mod look_angle;

pub use look_angle::{
    compass_label, compute_look_angle, great_circle_distance, GeodeticPoint, LookAngle,
    EARTH_RADIUS,
};
