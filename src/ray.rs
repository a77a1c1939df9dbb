//! Ray casting: march from an edge pixel along the gradient direction until
//! an opposing edge is found.

use glam::Vec2;

use crate::geometry::angle_between;
use crate::grid::{EdgeField, Polarity};

/// An ordered pixel path from a seed edge pixel to the opposing edge pixel
/// that terminated it. `(row, col)` pairs, length >= 2.
pub type Ray = Vec<(usize, usize)>;

/// Cast a ray from `(row, col)` along `polarity * gradient(row, col)`.
///
/// Returns `None` ("no ray") if the seed gradient is zero, the ray steps out
/// of bounds before finding an opposing edge, or the opposing edge's gradient
/// is not within `theta_max` of pointing back at the seed.
pub fn cast_ray(
    field: &EdgeField,
    row: usize,
    col: usize,
    polarity: Polarity,
    theta_max: f32,
) -> Option<Ray> {
    let d = polarity.sign();
    let (gr, gc) = field.gradient(row, col);
    let g = Vec2::new(gr * d, gc * d);
    if g == Vec2::ZERO {
        return None;
    }
    let n = g.normalize();

    let mut walked: Ray = Vec::new();
    let mut i = 1.0f32;
    loop {
        let next_row = (row as f32 + 0.5 + n.x * i).floor();
        let next_col = (col as f32 + 0.5 + n.y * i).floor();
        i += 1.0;

        if !field.in_bounds(next_row as isize, next_col as isize) {
            return None;
        }
        let next_row = next_row as usize;
        let next_col = next_col as usize;

        if !field.is_edge(next_row, next_col) {
            walked.push((next_row, next_col));
            continue;
        }

        let (gr2, gc2) = field.gradient(next_row, next_col);
        let g_opp = Vec2::new(gr2 * d, gc2 * d);
        let theta = angle_between(n, -g_opp);
        return if theta < theta_max {
            let mut out = Vec::with_capacity(walked.len() + 2);
            out.push((row, col));
            out.extend(walked);
            out.push((next_row, next_col));
            Some(out)
        } else {
            None
        };
    }
}
