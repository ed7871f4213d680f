use std::f32::consts::{PI, TAU};

/// Normalize an angle into [0, 2π).
#[inline(always)]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Angle of the vector pointing from `(from_x, from_y)` to `(to_x, to_y)`, in [0, 2π).
#[inline(always)]
pub fn bearing(from_x: f32, from_y: f32, to_x: f32, to_y: f32) -> f32 {
    wrap_angle((to_y - from_y).atan2(to_x - from_x))
}

/// Smallest absolute difference between two angles, in [0, π].
#[inline(always)]
pub fn angle_distance(a: f32, b: f32) -> f32 {
    let diff = wrap_angle(a - b);
    if diff > PI { TAU - diff } else { diff }
}
