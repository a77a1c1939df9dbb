//! Component filters: geometric and statistical predicates that narrow
//! connected components down to letter candidates.

use crate::component::Component;

/// Thresholds for the component filter stage. Defaults reproduce the
/// literal bounds from the original algorithm.
#[derive(Debug, Clone, Copy)]
pub struct FilterOptions {
    pub height_min: usize,
    pub height_max: usize,
    pub aspect_ratio_min: f32,
    pub aspect_ratio_max: f32,
    pub stroke_variance_per_area_max: f32,
    pub containment_cap: usize,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            height_min: 10,
            height_max: 300,
            aspect_ratio_min: 0.1,
            aspect_ratio_max: 10.0,
            stroke_variance_per_area_max: 0.05,
            containment_cap: 3,
        }
    }
}

/// Apply the four component-filter predicates in order, cheapest first.
pub fn filter_components(components: Vec<Component>, opts: &FilterOptions) -> Vec<Component> {
    let components = filter_by_height(components, opts);
    let components = filter_by_aspect_ratio(components, opts);
    let components = filter_by_stroke_variance(components, opts);
    filter_by_containment(components, opts)
}

fn filter_by_height(components: Vec<Component>, opts: &FilterOptions) -> Vec<Component> {
    components
        .into_iter()
        .filter(|c| {
            let h = c.height();
            h >= opts.height_min && h <= opts.height_max
        })
        .collect()
}

fn filter_by_aspect_ratio(components: Vec<Component>, opts: &FilterOptions) -> Vec<Component> {
    components
        .into_iter()
        .filter(|c| {
            let w = c.width();
            if w == 0 {
                return false;
            }
            let ratio = c.height() as f32 / w as f32;
            ratio >= opts.aspect_ratio_min && ratio <= opts.aspect_ratio_max
        })
        .collect()
}

fn filter_by_stroke_variance(components: Vec<Component>, opts: &FilterOptions) -> Vec<Component> {
    components
        .into_iter()
        .filter(|c| c.variance_stroke_width / (c.area as f32) < opts.stroke_variance_per_area_max)
        .collect()
}

fn filter_by_containment(components: Vec<Component>, opts: &FilterOptions) -> Vec<Component> {
    components
        .iter()
        .enumerate()
        .filter(|(i, c)| {
            let embedded = components
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != *i && c.contains_bounds(other))
                .count();
            embedded <= opts.containment_cap
        })
        .map(|(_, c)| c.clone())
        .collect()
}
