//! Connected-component extraction: a constrained 8-connected flood fill over
//! the stroke-width raster, and the resulting component record type.

use crate::grid::GrayImage;
use crate::stats::{mean, median, variance};

/// A connected region of same-stroke pixels, closed and read-only.
///
/// All derived statistics are computed once, eagerly, when the component is
/// closed — never lazily from a mutable cache, and never aliased across
/// fields.
#[derive(Debug, Clone)]
pub struct Component {
    pub label: u32,
    pub pixels: Vec<(usize, usize)>,
    pub stroke_widths: Vec<f32>,
    pub gray_values: Vec<u8>,
    pub row_min: usize,
    pub row_max: usize,
    pub col_min: usize,
    pub col_max: usize,
    pub area: usize,
    pub centroid: (f32, f32),
    pub mean_stroke_width: f32,
    pub median_stroke_width: f32,
    pub variance_stroke_width: f32,
    pub mean_gray: f32,
    pub variance_gray: f32,
}

impl Component {
    pub fn height(&self) -> usize {
        self.row_max - self.row_min
    }

    pub fn width(&self) -> usize {
        self.col_max - self.col_min
    }

    /// True iff `other`'s bounding box is wholly contained within this
    /// component's bounding box (componentwise, on both axes).
    pub fn contains_bounds(&self, other: &Component) -> bool {
        other.row_min >= self.row_min
            && other.row_max <= self.row_max
            && other.col_min >= self.col_min
            && other.col_max <= self.col_max
    }
}

/// Accumulates pixels during region growing; produces an immutable
/// [`Component`] once growth is finished.
struct ComponentBuilder {
    label: u32,
    pixels: Vec<(usize, usize)>,
    stroke_widths: Vec<f32>,
    gray_values: Vec<u8>,
    row_min: usize,
    row_max: usize,
    col_min: usize,
    col_max: usize,
}

impl ComponentBuilder {
    fn new(label: u32, row: usize, col: usize) -> Self {
        Self {
            label,
            pixels: Vec::new(),
            stroke_widths: Vec::new(),
            gray_values: Vec::new(),
            row_min: row,
            row_max: row,
            col_min: col,
            col_max: col,
        }
    }

    fn add(&mut self, row: usize, col: usize, stroke_width: f32, gray: u8) {
        self.pixels.push((row, col));
        self.stroke_widths.push(stroke_width);
        self.gray_values.push(gray);
        self.row_min = self.row_min.min(row);
        self.row_max = self.row_max.max(row);
        self.col_min = self.col_min.min(col);
        self.col_max = self.col_max.max(col);
    }

    fn close(self) -> Component {
        let area = self.pixels.len();
        let row_sum: usize = self.pixels.iter().map(|p| p.0).sum();
        let col_sum: usize = self.pixels.iter().map(|p| p.1).sum();
        let centroid = (row_sum as f32 / area as f32, col_sum as f32 / area as f32);
        let gray_f32: Vec<f32> = self.gray_values.iter().map(|&g| g as f32).collect();

        Component {
            label: self.label,
            mean_stroke_width: mean(&self.stroke_widths),
            median_stroke_width: median(&self.stroke_widths),
            variance_stroke_width: variance(&self.stroke_widths),
            mean_gray: mean(&gray_f32),
            variance_gray: variance(&gray_f32),
            pixels: self.pixels,
            stroke_widths: self.stroke_widths,
            gray_values: self.gray_values,
            row_min: self.row_min,
            row_max: self.row_max,
            col_min: self.col_min,
            col_max: self.col_max,
            area,
            centroid,
        }
    }
}

const NEIGHBORS_8: [(isize, isize); 8] = [
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
];

/// Minimum component area to retain (strictly greater than this is kept).
pub const MIN_COMPONENT_AREA: usize = 5;

/// Stroke-width ratio bound: neighboring pixels must satisfy
/// `max(a,b)/min(a,b) < RATIO_BOUND` to be merged into the same component.
pub const RATIO_BOUND: f32 = 3.0;

/// Label every stroke-width-consistent connected region and return the
/// per-pixel label raster alongside the retained component records.
///
/// Labels are assigned in row-major discovery order starting at 1 and are
/// never reused, even for components discarded for being too small
/// (`area <= min_area`). `ratio_bound` is the maximum `max(a,b)/min(a,b)`
/// stroke-width ratio allowed between merged neighbors.
pub fn label_components(
    gray: &GrayImage,
    stroke_widths: &[f32],
    min_area: usize,
    ratio_bound: f32,
) -> (Vec<u32>, Vec<Component>) {
    let width = gray.width;
    let height = gray.height;
    let len = width * height;
    debug_assert_eq!(stroke_widths.len(), len);

    let mut working = stroke_widths.to_vec();
    let mut labels = vec![0u32; len];
    let mut label = 1u32;
    let mut out = Vec::new();

    for row in 0..height {
        for col in 0..width {
            let idx = row * width + col;
            if working[idx] <= 0.0 {
                continue;
            }

            let seed_sw = working[idx];
            working[idx] = 0.0;
            labels[idx] = label;

            let mut builder = ComponentBuilder::new(label, row, col);
            builder.add(row, col, seed_sw, gray.get(row, col));

            let mut stack: Vec<(usize, usize, f32)> = vec![(row, col, seed_sw)];
            while let Some((pr, pc, p_sw)) = stack.pop() {
                for &(dr, dc) in &NEIGHBORS_8 {
                    let nr = pr as isize + dr;
                    let nc = pc as isize + dc;
                    if nr < 0 || nc < 0 || nr as usize >= height || nc as usize >= width {
                        continue;
                    }
                    let (nr, nc) = (nr as usize, nc as usize);
                    let nidx = nr * width + nc;
                    let q_sw = working[nidx];
                    if q_sw <= 0.0 {
                        continue;
                    }
                    if p_sw / q_sw < ratio_bound && q_sw / p_sw < ratio_bound {
                        working[nidx] = 0.0;
                        labels[nidx] = label;
                        builder.add(nr, nc, q_sw, gray.get(nr, nc));
                        stack.push((nr, nc, q_sw));
                    }
                }
            }

            let component = builder.close();
            if component.area > min_area {
                out.push(component);
            }
            label += 1;
        }
    }

    (labels, out)
}
