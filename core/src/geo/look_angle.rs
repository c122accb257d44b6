use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Mean Earth radius used by the spherical model, in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

const DEG_TO_RAD: f64 = PI / 180.0;

/// Latitude/longitude in degrees, altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl GeodeticPoint {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

/// Pointing solution from an observer to a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookAngle {
    /// Degrees above the local horizon; negative below it.
    pub elevation: f64,
    /// Degrees clockwise from true north, in `[0, 360)`.
    pub azimuth: f64,
    /// Straight-line distance in meters.
    pub range: f64,
    /// Compass-style label such as `N 45° E`.
    pub bearing: String,
}

/// Terms shared by the look-angle and great-circle computations.
struct CentralAngle {
    bearing: f64,
    angle_at_centre: f64,
}

fn central_angle(a: &GeodeticPoint, b: &GeodeticPoint) -> CentralAngle {
    let lat_a = a.latitude * DEG_TO_RAD;
    let lat_b = b.latitude * DEG_TO_RAD;
    let d_lon = (b.longitude - a.longitude) * DEG_TO_RAD;

    let sa = lat_b.cos() * d_lon.sin();
    let sb = lat_a.cos() * lat_b.sin() - lat_a.sin() * lat_b.cos() * d_lon.cos();
    let aa = (sa * sa + sb * sb).sqrt();
    let ab = lat_a.sin() * lat_b.sin() + lat_a.cos() * lat_b.cos() * d_lon.cos();

    CentralAngle {
        bearing: sa.atan2(sb),
        angle_at_centre: aa.atan2(ab),
    }
}

/// Computes elevation, azimuth and range from `observer` to `target` on a
/// spherical Earth.
///
/// No point pair is special-cased. Coincident points give azimuth 0, range 0
/// and an elevation of `atan2(alt_target - alt_observer, 0)`.
pub fn compute_look_angle(observer: GeodeticPoint, target: GeodeticPoint) -> LookAngle {
    let CentralAngle {
        bearing,
        angle_at_centre,
    } = central_angle(&observer, &target);

    let ta = EARTH_RADIUS + observer.altitude;
    let tb = EARTH_RADIUS + target.altitude;
    let ea = angle_at_centre.cos() * tb - ta;
    let eb = angle_at_centre.sin() * tb;
    let elevation = ea.atan2(eb) / DEG_TO_RAD;

    // Law of cosines on the two geocentric radii.
    let range = (ta * ta + tb * tb - 2.0 * ta * tb * angle_at_centre.cos())
        .max(0.0)
        .sqrt();

    let bearing = if bearing < 0.0 {
        bearing + 2.0 * PI
    } else {
        bearing
    };
    let mut azimuth = bearing / DEG_TO_RAD;
    // A bearing of -0.0 or a tiny negative value can round up to exactly 360.
    if azimuth >= 360.0 {
        azimuth -= 360.0;
    }

    LookAngle {
        elevation,
        azimuth,
        range,
        bearing: compass_label(azimuth),
    }
}

/// Surface distance along the great circle, ignoring altitude.
pub fn great_circle_distance(observer: GeodeticPoint, target: GeodeticPoint) -> f64 {
    central_angle(&observer, &target).angle_at_centre * EARTH_RADIUS
}

/// Formats an azimuth as `<N|S> <offset>° <E|W>`.
///
/// The offset is the angle within the quadrant, measured from the north/south
/// axis.
pub fn compass_label(azimuth: f64) -> String {
    let mut offset = (azimuth % 90.0).round();
    if (azimuth > 90.0 && azimuth < 180.0) || (azimuth > 270.0 && azimuth < 360.0) {
        offset = 90.0 - offset;
    }
    let north_south = if azimuth < 90.0 || azimuth > 270.0 {
        'N'
    } else {
        'S'
    };
    let east_west = if azimuth < 180.0 { 'E' } else { 'W' };
    format!("{} {}° {}", north_south, offset as i64, east_west)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sea_level(latitude: f64, longitude: f64) -> GeodeticPoint {
        GeodeticPoint::new(latitude, longitude, 0.0)
    }

    #[test]
    fn one_degree_east_on_equator() {
        let result = compute_look_angle(sea_level(0.0, 0.0), sea_level(0.0, 1.0));
        assert!((result.azimuth - 90.0).abs() < 1e-9);
        assert!(result.elevation < 0.0);
        assert!((result.range - 111_195.0).abs() < 100.0);
    }

    #[test]
    fn balloon_overhead_is_straight_up() {
        let observer = GeodeticPoint::new(-34.9, 138.6, 50.0);
        let target = GeodeticPoint::new(-34.9, 138.6, 20_050.0);
        let result = compute_look_angle(observer, target);
        assert!((result.elevation - 90.0).abs() < 1e-9);
        assert!((result.range - 20_000.0).abs() < 1e-3);
    }

    #[test]
    fn coincident_points_are_not_special_cased() {
        let point = GeodeticPoint::new(51.5, -0.1, 120.0);
        let result = compute_look_angle(point, point);
        assert_eq!(result.azimuth, 0.0);
        assert_eq!(result.range, 0.0);
        assert_eq!(result.elevation, 0.0);
        assert_eq!(result.bearing, "N 0° E");
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let observer = GeodeticPoint::new(-37.8, 144.9, 10.0);
        let target = GeodeticPoint::new(-36.2, 146.1, 31_000.0);
        let first = compute_look_angle(observer, target);
        let second = compute_look_angle(observer, target);
        assert_eq!(first.elevation.to_bits(), second.elevation.to_bits());
        assert_eq!(first.azimuth.to_bits(), second.azimuth.to_bits());
        assert_eq!(first.range.to_bits(), second.range.to_bits());
        assert_eq!(first.bearing, second.bearing);
    }

    #[test]
    fn range_is_symmetric_but_bearing_is_not() {
        let a = GeodeticPoint::new(48.1, 11.5, 520.0);
        let b = GeodeticPoint::new(47.3, 13.0, 15_400.0);
        let ab = compute_look_angle(a, b);
        let ba = compute_look_angle(b, a);
        assert!((ab.range - ba.range).abs() < 1e-3);
        assert!((ab.azimuth - ba.azimuth).abs() > 90.0);
    }

    #[test]
    fn azimuth_stays_within_compass_circle() {
        let observer = sea_level(10.0, 20.0);
        for lat in [-80.0, -30.0, 0.0, 9.999, 10.0, 45.0, 89.0] {
            for lon in [-179.0, -90.0, 0.0, 19.999, 20.0, 20.001, 120.0, 180.0] {
                let result = compute_look_angle(observer, sea_level(lat, lon));
                assert!(
                    (0.0..360.0).contains(&result.azimuth),
                    "azimuth {} out of range for ({}, {})",
                    result.azimuth,
                    lat,
                    lon
                );
            }
        }
    }

    #[test]
    fn compass_label_quadrants() {
        assert_eq!(compass_label(45.0), "N 45° E");
        assert_eq!(compass_label(135.0), "S 45° E");
        assert_eq!(compass_label(225.0), "S 45° W");
        assert_eq!(compass_label(315.0), "N 45° W");
        assert_eq!(compass_label(30.0), "N 30° E");
        assert_eq!(compass_label(120.0), "S 60° E");
        assert_eq!(compass_label(200.0), "S 20° W");
        assert_eq!(compass_label(350.0), "N 10° W");
    }

    #[test]
    fn compass_label_axis_boundaries() {
        assert_eq!(compass_label(0.0), "N 0° E");
        assert_eq!(compass_label(90.0), "S 0° E");
        assert_eq!(compass_label(180.0), "S 0° W");
        assert_eq!(compass_label(270.0), "S 0° W");
    }

    #[test]
    fn great_circle_distance_matches_arc_length() {
        let distance = great_circle_distance(sea_level(0.0, 0.0), sea_level(0.0, 1.0));
        assert!((distance - EARTH_RADIUS * DEG_TO_RAD).abs() < 1e-6);
    }
}
