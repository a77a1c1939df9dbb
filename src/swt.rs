//! The Stroke Width Transform pass: ray-cast every edge pixel, assign the
//! minimum observed stroke width, then smooth each ray to its median.

use rayon::prelude::*;

use crate::grid::{EdgeField, Polarity};
use crate::ray::{cast_ray, Ray};
use crate::stats::median;

/// Stroke-width raster: one `f32` per pixel, `0.0` where no accepted ray
/// covered the pixel.
pub type StrokeWidths = Vec<f32>;

/// Compute the Stroke Width Transform for one polarity.
///
/// Ray casting across edge pixels is embarrassingly parallel (each ray only
/// reads the shared immutable `field`), so it runs on a `rayon` thread pool;
/// the resulting `(ray, width)` pairs are then folded into the output raster
/// in the same row-major order a sequential pass would use, so the result is
/// identical to running single-threaded.
pub fn stroke_width_transform(field: &EdgeField, polarity: Polarity, theta_max: f32) -> StrokeWidths {
    let len = field.width * field.height;

    let edge_coords: Vec<(usize, usize)> = (0..field.height)
        .flat_map(|r| (0..field.width).map(move |c| (r, c)))
        .filter(|&(r, c)| field.is_edge(r, c))
        .collect();

    let rays: Vec<(Ray, f32)> = edge_coords
        .par_iter()
        .filter_map(|&(r, c)| {
            let ray = cast_ray(field, r, c, polarity, theta_max)?;
            let (first, last) = (*ray.first().unwrap(), *ray.last().unwrap());
            let width = row_col_distance(first, last);
            Some((ray, width))
        })
        .collect();

    let mut s = vec![f32::INFINITY; len];
    for (ray, width) in &rays {
        for &(r, c) in ray {
            let idx = field.index(r, c);
            if *width < s[idx] {
                s[idx] = *width;
            }
        }
    }

    for v in s.iter_mut() {
        if v.is_infinite() {
            *v = 0.0;
        }
    }

    adjust_to_ray_medians(field, &rays, &mut s);

    s
}

/// Smooth every pixel in `s` down to its ray's median, one ray at a time.
///
/// Every ray's median is taken over the pristine post-minimum raster (a
/// `minima` snapshot taken once, up front), not over values other rays have
/// already adjusted earlier in this same pass: two rays that cross at a
/// shared pixel must each see that pixel's pre-smoothing minimum, or the
/// result depends on which ray happens to run first.
fn adjust_to_ray_medians(field: &EdgeField, rays: &[(Ray, f32)], s: &mut [f32]) {
    let minima = s.to_vec();
    for (ray, _) in rays {
        let values: Vec<f32> = ray.iter().map(|&(r, c)| minima[field.index(r, c)]).collect();
        let m = median(&values);
        for &(r, c) in ray {
            let idx = field.index(r, c);
            if s[idx] > m {
                s[idx] = m;
            }
        }
    }
}

fn row_col_distance(a: (usize, usize), b: (usize, usize)) -> f32 {
    let dr = a.0 as f32 - b.0 as f32;
    let dc = a.1 as f32 - b.1 as f32;
    (dr * dr + dc * dc).sqrt()
}
