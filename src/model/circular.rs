use std::f64::consts::PI;

/// Signed angular distance `a - b`, wrapped to `(-pi, pi]`.
pub fn circ_dist(a: f64, b: f64) -> f64 {
    let d = (a - b).sin().atan2((a - b).cos());
    if d <= -PI {
        d + 2.0 * PI
    } else {
        d
    }
}

/// Mean direction of a set of angles, in `(-pi, pi]`.
pub fn circ_mean(angles: &[f64]) -> f64 {
    let (sin_sum, cos_sum) = angles
        .iter()
        .fold((0.0, 0.0), |(s, c), a| (s + a.sin(), c + a.cos()));
    sin_sum.atan2(cos_sum)
}

/// Maps a feature value on a circular range of `width` units to an angle on
/// the full circle.
pub fn to_angle(value: f64, range_start: f64, width: f64) -> f64 {
    2.0 * PI * (value - range_start) / width
}

/// Signed difference `a - b` wrapped onto a circle of `period` units.
pub fn wrap_difference(a: f64, b: f64, period: f64) -> f64 {
    let half = period / 2.0;
    (a - b + half).rem_euclid(period) - half
}
