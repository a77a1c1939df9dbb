//! Stroke Width Transform text-region detection.
//!
//! This crate detects likely text regions in an image via the Stroke Width
//! Transform: ray-cast along gradient directions to estimate local stroke
//! width, group stroke-width-consistent pixels into connected components,
//! filter components by geometric and statistical plausibility, then chain
//! compatible components into text-line bounding boxes.
//!
//! # Pipeline Overview
//!
//! 1. **Ray casting** (`ray`): march from each edge pixel along its gradient
//!    direction until an opposing edge is found.
//! 2. **SWT pass** (`swt`): assign each pixel the minimum ray width covering
//!    it, then smooth each ray to its median.
//! 3. **Connected components** (`component`): constrained 8-connected flood
//!    fill over the stroke-width raster.
//! 4. **Component filter** (`filter`): height, aspect-ratio, stroke-variance
//!    and containment predicates.
//! 5. **Letter chaining** (`chain`): pairwise compatibility and union-find
//!    aggregation into text-line candidates.
//!
//! Both passes run once per polarity (light-on-dark, dark-on-light); the two
//! passes are independent and run concurrently.
//!
//! # Example
//!
//! ```ignore
//! use swt_text_detect::{detect, DetectOptions};
//! use swt_text_detect::grid::{EdgeField, GrayImage};
//!
//! let output = detect(&gray, &edges, &DetectOptions::default())?;
//! for b in &output.boxes {
//!     println!("{:?}", b);
//! }
//! ```

pub mod chain;
pub mod component;
pub mod filter;
pub mod geometry;
pub mod grid;
pub mod ray;
pub mod stats;
pub mod swt;

use std::time::{Duration, Instant};

use image::{Rgb, RgbImage};
use thiserror::Error;

use chain::{build_chains, Chain, ChainOptions};
use component::{label_components, Component};
use filter::{filter_components, FilterOptions};
use grid::{EdgeField, GrayImage, Polarity};
use swt::{stroke_width_transform, StrokeWidths};

/// The one fatal error class: malformed input. Every other anomaly
/// (degenerate gradients, rays that leave the image, acos domain errors,
/// division by zero) is handled locally as a silent reject.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("image has zero width or height")]
    EmptyImage,

    #[error("grayscale raster and edge field have mismatched dimensions: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Tunable thresholds for the detection core. `SwtOptions::default()`
/// reproduces the literal bounds of the original algorithm.
#[derive(Debug, Clone, Copy)]
pub struct SwtOptions {
    /// Maximum angle (radians) between a ray's direction and the opposing
    /// edge's (negated) gradient for the ray to be accepted.
    pub theta_max: f32,
    /// Stroke-width ratio bound for merging adjacent pixels into one
    /// connected component.
    pub stroke_ratio_bound: f32,
    /// Minimum component area to retain (strictly greater than this).
    pub min_component_area: usize,
    pub height_min: usize,
    pub height_max: usize,
    pub aspect_ratio_min: f32,
    pub aspect_ratio_max: f32,
    pub stroke_variance_per_area_max: f32,
    pub containment_cap: usize,
    pub chain_distance_multiplier: f32,
    pub chain_ratio_max: f32,
    pub chain_gray_diff_max: f32,
    pub min_chain_size: usize,
}

impl Default for SwtOptions {
    fn default() -> Self {
        Self {
            theta_max: std::f32::consts::FRAC_PI_2,
            stroke_ratio_bound: component::RATIO_BOUND,
            min_component_area: component::MIN_COMPONENT_AREA,
            height_min: 10,
            height_max: 300,
            aspect_ratio_min: 0.1,
            aspect_ratio_max: 10.0,
            stroke_variance_per_area_max: 0.05,
            containment_cap: 3,
            chain_distance_multiplier: 3.0,
            chain_ratio_max: 2.0,
            chain_gray_diff_max: 10.0,
            min_chain_size: 3,
        }
    }
}

/// Caller-facing options: the tunable core plus the three output flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectOptions {
    pub swt: SwtOptions,
    /// Return intermediate rasters (SWT, labeled components) per polarity.
    pub emit_diagnostics: bool,
    /// Return an image with boxes drawn, in addition to the box list.
    pub emit_image: bool,
    /// Measure and return per-stage wall-clock durations per polarity.
    pub report_timing: bool,
}

/// Axis-aligned pixel-space bounding box of a detected text-line chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub row_min: usize,
    pub row_max: usize,
    pub col_min: usize,
    pub col_max: usize,
}

impl From<&Chain> for BoundingBox {
    fn from(chain: &Chain) -> Self {
        Self {
            row_min: chain.row_min,
            row_max: chain.row_max,
            col_min: chain.col_min,
            col_max: chain.col_max,
        }
    }
}

/// Wall-clock duration of each stage of one polarity pass, mirroring the
/// original implementation's per-stage timing breakdown. The core never
/// prints or logs these; it is the caller's decision whether to surface them.
#[derive(Debug, Clone, Copy)]
pub struct StageTimings {
    pub swt: Duration,
    pub components: Duration,
    pub filter: Duration,
    pub chaining: Duration,
}

/// Per-polarity timing, returned when `report_timing` is set.
#[derive(Debug, Clone, Copy)]
pub struct PassTimings {
    pub light: StageTimings,
    pub dark: StageTimings,
}

/// Intermediate rasters from both polarity passes, returned when
/// `emit_diagnostics` is set.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub swt_light: StrokeWidths,
    pub swt_dark: StrokeWidths,
    pub labels_light: Vec<u32>,
    pub labels_dark: Vec<u32>,
}

/// Result of a single `detect` call.
#[derive(Debug, Clone)]
pub struct DetectOutput {
    pub boxes: Vec<BoundingBox>,
    pub image: Option<RgbImage>,
    pub diagnostics: Option<Diagnostics>,
    pub timings: Option<PassTimings>,
}

/// Draws detection boxes onto an image. Exposed as a trait so the core can
/// be exercised in tests without an actual rasterizer, and so the default
/// `image`-backed renderer can be swapped for another collaborator.
pub trait BoxRenderer {
    fn draw_rectangle(
        &self,
        img: &mut RgbImage,
        top_left: (u32, u32),
        bottom_right: (u32, u32),
        color: Rgb<u8>,
    );
}

/// Default `BoxRenderer`, drawing a one-pixel-wide outline using the `image`
/// crate's own pixel primitives.
pub struct ImageBoxRenderer;

impl BoxRenderer for ImageBoxRenderer {
    fn draw_rectangle(
        &self,
        img: &mut RgbImage,
        top_left: (u32, u32),
        bottom_right: (u32, u32),
        color: Rgb<u8>,
    ) {
        let (x0, y0) = top_left;
        let (x1, y1) = bottom_right;
        let max_x = img.width().saturating_sub(1);
        let max_y = img.height().saturating_sub(1);

        for x in x0..=x1.min(max_x) {
            img.put_pixel(x, y0.min(max_y), color);
            img.put_pixel(x, y1.min(max_y), color);
        }
        for y in y0..=y1.min(max_y) {
            img.put_pixel(x0.min(max_x), y, color);
            img.put_pixel(x1.min(max_x), y, color);
        }
    }
}

/// Detect text-line bounding boxes given a precomputed edge field and
/// grayscale raster, using the default `image`-backed box renderer.
///
/// `gray` and `edges` must come from the caller's own decode/Canny/Sobel
/// collaborators; constructing them from a raw image is out of scope here.
pub fn detect(
    gray: &GrayImage,
    edges: &EdgeField,
    options: &DetectOptions,
) -> Result<DetectOutput, DetectError> {
    detect_with_renderer(gray, edges, options, &ImageBoxRenderer)
}

/// Like [`detect`], but with an explicit [`BoxRenderer`] collaborator.
pub fn detect_with_renderer(
    gray: &GrayImage,
    edges: &EdgeField,
    options: &DetectOptions,
    renderer: &dyn BoxRenderer,
) -> Result<DetectOutput, DetectError> {
    if gray.width == 0 || gray.height == 0 {
        return Err(DetectError::EmptyImage);
    }
    if gray.width != edges.width || gray.height != edges.height {
        return Err(DetectError::DimensionMismatch {
            expected: (gray.width as u32, gray.height as u32),
            actual: (edges.width as u32, edges.height as u32),
        });
    }

    let (light, dark) = rayon::join(
        || run_pass(gray, edges, Polarity::Light, &options.swt),
        || run_pass(gray, edges, Polarity::Dark, &options.swt),
    );

    let mut boxes: Vec<BoundingBox> = Vec::with_capacity(light.chains.len() + dark.chains.len());
    boxes.extend(light.chains.iter().map(BoundingBox::from));
    boxes.extend(dark.chains.iter().map(BoundingBox::from));

    let diagnostics = options.emit_diagnostics.then(|| Diagnostics {
        swt_light: light.swt.clone(),
        swt_dark: dark.swt.clone(),
        labels_light: light.labels.clone(),
        labels_dark: dark.labels.clone(),
    });

    let timings = options.report_timing.then_some(PassTimings {
        light: light.timings,
        dark: dark.timings,
    });

    let image = options.emit_image.then(|| {
        let mut img = RgbImage::new(gray.width as u32, gray.height as u32);
        for row in 0..gray.height {
            for col in 0..gray.width {
                let v = gray.get(row, col);
                img.put_pixel(col as u32, row as u32, Rgb([v, v, v]));
            }
        }
        for b in &boxes {
            renderer.draw_rectangle(
                &mut img,
                (b.col_min as u32, b.row_min as u32),
                (b.col_max as u32, b.row_max as u32),
                Rgb([255, 0, 0]),
            );
        }
        img
    });

    Ok(DetectOutput {
        boxes,
        image,
        diagnostics,
        timings,
    })
}

struct PassResult {
    chains: Vec<Chain>,
    swt: StrokeWidths,
    labels: Vec<u32>,
    timings: StageTimings,
}

fn run_pass(gray: &GrayImage, edges: &EdgeField, polarity: Polarity, opts: &SwtOptions) -> PassResult {
    let t0 = Instant::now();
    let swt = stroke_width_transform(edges, polarity, opts.theta_max);
    let swt_time = t0.elapsed();

    let t1 = Instant::now();
    let (labels, components): (Vec<u32>, Vec<Component>) =
        label_components(gray, &swt, opts.min_component_area, opts.stroke_ratio_bound);
    let components_time = t1.elapsed();

    let t2 = Instant::now();
    let filter_opts = FilterOptions {
        height_min: opts.height_min,
        height_max: opts.height_max,
        aspect_ratio_min: opts.aspect_ratio_min,
        aspect_ratio_max: opts.aspect_ratio_max,
        stroke_variance_per_area_max: opts.stroke_variance_per_area_max,
        containment_cap: opts.containment_cap,
    };
    let filtered = filter_components(components, &filter_opts);
    let filter_time = t2.elapsed();

    let t3 = Instant::now();
    let chain_opts = ChainOptions {
        distance_multiplier: opts.chain_distance_multiplier,
        height_ratio_max: opts.chain_ratio_max,
        gray_diff_max: opts.chain_gray_diff_max,
        stroke_ratio_max: opts.chain_ratio_max,
        min_chain_size: opts.min_chain_size,
    };
    let chains = build_chains(&filtered, &chain_opts);
    let chaining_time = t3.elapsed();

    PassResult {
        chains,
        swt,
        labels,
        timings: StageTimings {
            swt: swt_time,
            components: components_time,
            filter: filter_time,
            chaining: chaining_time,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_field(width: usize, height: usize) -> (GrayImage, EdgeField) {
        let len = width * height;
        let gray = GrayImage::new(width, height, vec![128u8; len]).unwrap();
        let edges = EdgeField::new(width, height, vec![false; len], vec![0.0; len], vec![0.0; len]).unwrap();
        (gray, edges)
    }

    #[test]
    fn zero_width_image_is_rejected() {
        let gray = GrayImage::new(0, 0, vec![]).unwrap();
        let edges = EdgeField::new(0, 0, vec![], vec![], vec![]).unwrap();
        let err = detect(&gray, &edges, &DetectOptions::default()).unwrap_err();
        assert!(matches!(err, DetectError::EmptyImage));
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let gray = GrayImage::new(4, 4, vec![128u8; 16]).unwrap();
        let edges = EdgeField::new(8, 8, vec![false; 64], vec![0.0; 64], vec![0.0; 64]).unwrap();
        let err = detect(&gray, &edges, &DetectOptions::default()).unwrap_err();
        assert!(matches!(err, DetectError::DimensionMismatch { .. }));
    }

    #[test]
    fn all_zero_image_yields_empty_box_list() {
        let (gray, edges) = empty_field(32, 32);
        let output = detect(&gray, &edges, &DetectOptions::default()).unwrap();
        assert!(output.boxes.is_empty());
    }

    #[test]
    fn diagnostics_are_absent_unless_requested() {
        let (gray, edges) = empty_field(16, 16);
        let output = detect(&gray, &edges, &DetectOptions::default()).unwrap();
        assert!(output.diagnostics.is_none());
        assert!(output.timings.is_none());
        assert!(output.image.is_none());
    }

    #[test]
    fn diagnostics_are_present_when_requested() {
        let (gray, edges) = empty_field(16, 16);
        let options = DetectOptions {
            emit_diagnostics: true,
            report_timing: true,
            emit_image: true,
            ..DetectOptions::default()
        };
        let output = detect(&gray, &edges, &options).unwrap();
        let diagnostics = output.diagnostics.expect("diagnostics requested");
        assert_eq!(diagnostics.swt_light.len(), 16 * 16);
        assert_eq!(diagnostics.labels_dark.len(), 16 * 16);
        assert!(output.timings.is_some());
        let image = output.image.expect("image requested");
        assert_eq!((image.width(), image.height()), (16, 16));
    }

    struct NullRenderer;
    impl BoxRenderer for NullRenderer {
        fn draw_rectangle(&self, _img: &mut RgbImage, _tl: (u32, u32), _br: (u32, u32), _c: Rgb<u8>) {}
    }

    #[test]
    fn detect_with_renderer_accepts_a_stub_collaborator() {
        let (gray, edges) = empty_field(8, 8);
        let options = DetectOptions {
            emit_image: true,
            ..DetectOptions::default()
        };
        let output = detect_with_renderer(&gray, &edges, &options, &NullRenderer).unwrap();
        assert!(output.image.is_some());
    }

    fn three_stroke_field(width: usize, height: usize) -> (GrayImage, EdgeField) {
        let len = width * height;
        let mut gray = vec![200u8; len];
        let mut edges = vec![false; len];
        let mut grad_col = vec![0.0f32; len];

        let (row_start, row_end) = (10, height - 10);
        for bar in 0..3 {
            let left = 4 + bar * 12;
            let right = left + 4;
            for row in row_start..row_end {
                edges[row * width + left] = true;
                grad_col[row * width + left] = 1.0;
                edges[row * width + right] = true;
                grad_col[row * width + right] = -1.0;
                for c in left..=right {
                    gray[row * width + c] = 30;
                }
            }
        }

        (
            GrayImage::new(width, height, gray).unwrap(),
            EdgeField::new(width, height, edges, vec![0.0; len], grad_col).unwrap(),
        )
    }

    #[test]
    fn three_aligned_strokes_yield_one_chain_end_to_end() {
        let (gray, edges) = three_stroke_field(48, 50);
        let output = detect(&gray, &edges, &DetectOptions::default()).unwrap();
        assert_eq!(output.boxes.len(), 1);
        let b = &output.boxes[0];
        assert_eq!(b.row_min, 10);
        assert_eq!(b.row_max, 39);
        assert_eq!(b.col_min, 4);
        assert_eq!(b.col_max, 32);
    }

    #[test]
    fn vertical_bar_produces_no_chain_without_enough_strokes() {
        // A single stroke never reaches the chain minimum size of 3.
        let width = 16;
        let height = 64;
        let len = width * height;
        let mut edges = vec![false; len];
        let mut grad_col = vec![0.0; len];
        for r in 10..50 {
            edges[r * width + 4] = true;
            grad_col[r * width + 4] = 1.0;
            edges[r * width + 8] = true;
            grad_col[r * width + 8] = -1.0;
        }
        let edge_field = EdgeField::new(width, height, edges, vec![0.0; len], grad_col).unwrap();
        let gray = GrayImage::new(width, height, vec![128u8; len]).unwrap();
        let output = detect(&gray, &edge_field, &DetectOptions::default()).unwrap();
        assert!(output.boxes.is_empty());
    }
}
