//! Letter chaining: pairwise candidate construction between letter
//! candidates, pairwise compatibility filters, and union-find aggregation
//! into text-line chains.

use rayon::prelude::*;

use crate::component::Component;

/// Thresholds for pair construction and the pairwise chain filters.
/// Defaults reproduce the literal bounds from the original algorithm.
#[derive(Debug, Clone, Copy)]
pub struct ChainOptions {
    pub distance_multiplier: f32,
    pub height_ratio_max: f32,
    pub gray_diff_max: f32,
    pub stroke_ratio_max: f32,
    pub min_chain_size: usize,
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            distance_multiplier: 3.0,
            height_ratio_max: 2.0,
            gray_diff_max: 10.0,
            stroke_ratio_max: 2.0,
            min_chain_size: 3,
        }
    }
}

/// A merged set of component indices hypothesized to form a text line.
#[derive(Debug, Clone)]
pub struct Chain {
    pub members: Vec<usize>,
    pub row_min: usize,
    pub row_max: usize,
    pub col_min: usize,
    pub col_max: usize,
}

/// Disjoint-set forest with path compression and union by rank, used to
/// aggregate pairwise chain candidates into their transitive closure without
/// the quadratic rescan the original algorithm used.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Vertical overlap + bottom-corner-distance "nearness" test from the
/// pair-construction stage.
fn is_near(a: &Component, b: &Component, opts: &ChainOptions) -> bool {
    if a.row_min >= b.row_max || b.row_min >= a.row_max {
        return false;
    }
    let dr = b.row_max as f32 - a.row_max as f32;
    let dc = b.col_min as f32 - a.col_max as f32;
    let dist = (dr * dr + dc * dc).sqrt();
    let largest_width = a.width().max(b.width()) as f32;
    dist <= largest_width * opts.distance_multiplier
}

/// `max(a, b) / min(a, b) <= bound`, i.e. "the two values are within `bound`
/// of each other". Phrasing this as a single max/min ratio rather than an
/// "either direction's ratio is within bound" OR is deliberate: the latter
/// is a tautology (one of the two ratios is always <= 1), which would make
/// the height and stroke-width compatibility checks below no-ops. Treated
/// as compatible when both values are zero.
fn ratio_within(a: f32, b: f32, bound: f32) -> bool {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if lo == 0.0 {
        return hi == 0.0;
    }
    hi / lo <= bound
}

/// The three pairwise compatibility filters, applied to a direct (a, b)
/// candidate pair before it is allowed to union.
fn pairwise_compatible(a: &Component, b: &Component, opts: &ChainOptions) -> bool {
    let height_ok = ratio_within(a.height() as f32, b.height() as f32, opts.height_ratio_max);
    let gray_ok = (a.mean_gray - b.mean_gray).abs() < opts.gray_diff_max;
    let stroke_ok = ratio_within(a.median_stroke_width, b.median_stroke_width, opts.stroke_ratio_max);

    height_ok && gray_ok && stroke_ok
}

/// Build text-line chains from filtered letter candidates.
///
/// Pair construction and the pairwise filters are independent per `(i, j)`
/// pair, so candidate edges are found in parallel via `rayon`; the edges are
/// then folded into a union-find forest sequentially (equivalence classes
/// are order-independent, so this is no less deterministic than a
/// single-threaded scan). Only chains whose final member count is at least
/// `opts.min_chain_size` are returned.
pub fn build_chains(components: &[Component], opts: &ChainOptions) -> Vec<Chain> {
    let n = components.len();
    if n == 0 {
        return Vec::new();
    }

    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect();

    let edges: Vec<(usize, usize)> = pairs
        .par_iter()
        .filter(|&&(i, j)| {
            is_near(&components[i], &components[j], opts)
                && pairwise_compatible(&components[i], &components[j], opts)
        })
        .copied()
        .collect();

    let mut uf = UnionFind::new(n);
    for (i, j) in edges {
        uf.union(i, j);
    }

    // A BTreeMap (rather than a HashMap) keeps iteration order deterministic
    // across runs: output chain order must not depend on hash randomization.
    let mut groups: std::collections::BTreeMap<usize, Vec<usize>> = std::collections::BTreeMap::new();
    for i in 0..n {
        let root = uf.find(i);
        groups.entry(root).or_default().push(i);
    }

    groups
        .into_values()
        .filter(|members| members.len() >= opts.min_chain_size)
        .map(|members| {
            let row_min = members.iter().map(|&i| components[i].row_min).min().unwrap();
            let row_max = members.iter().map(|&i| components[i].row_max).max().unwrap();
            let col_min = members.iter().map(|&i| components[i].col_min).min().unwrap();
            let col_max = members.iter().map(|&i| components[i].col_max).max().unwrap();
            Chain {
                members,
                row_min,
                row_max,
                col_min,
                col_max,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component_at(label: u32, row_min: usize, row_max: usize, col_min: usize, col_max: usize, median_sw: f32, gray: f32) -> Component {
        Component {
            label,
            pixels: vec![],
            stroke_widths: vec![],
            gray_values: vec![],
            row_min,
            row_max,
            col_min,
            col_max,
            area: (row_max - row_min + 1) * (col_max - col_min + 1),
            centroid: (0.0, 0.0),
            mean_stroke_width: median_sw,
            median_stroke_width: median_sw,
            variance_stroke_width: 0.0,
            mean_gray: gray,
            variance_gray: 0.0,
        }
    }

    #[test]
    fn three_aligned_strokes_form_one_chain() {
        let opts = ChainOptions::default();
        // Three 4-wide, 30-tall strokes, 8px gaps, same row band.
        let a = component_at(1, 0, 30, 0, 4, 4.0, 50.0);
        let b = component_at(2, 0, 30, 12, 16, 4.0, 50.0);
        let c = component_at(3, 0, 30, 24, 28, 4.0, 50.0);
        let chains = build_chains(&[a, b, c], &opts);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].members.len(), 3);
        assert_eq!(chains[0].row_min, 0);
        assert_eq!(chains[0].row_max, 30);
        assert_eq!(chains[0].col_min, 0);
        assert_eq!(chains[0].col_max, 28);
    }

    #[test]
    fn pair_with_no_third_member_is_discarded_by_min_size() {
        let opts = ChainOptions::default();
        let a = component_at(1, 0, 30, 0, 4, 4.0, 50.0);
        let b = component_at(2, 0, 30, 12, 16, 4.0, 50.0);
        let chains = build_chains(&[a, b], &opts);
        assert!(chains.is_empty());
    }

    #[test]
    fn height_mismatch_rejects_pair() {
        let opts = ChainOptions::default();
        // heights 20 and 50, bottoms aligned so the pair is geometrically
        // near: ratio 50/20 = 2.5 > 2, rejected.
        let short = component_at(1, 30, 50, 0, 4, 4.0, 50.0);
        let tall = component_at(2, 0, 50, 8, 12, 4.0, 50.0);
        assert!(is_near(&short, &tall, &opts));
        assert!(!pairwise_compatible(&short, &tall, &opts));
    }

    #[test]
    fn gray_dissimilarity_rejects_pair() {
        let opts = ChainOptions::default();
        let dark = component_at(1, 0, 30, 0, 4, 4.0, 10.0);
        let light = component_at(2, 0, 30, 8, 12, 4.0, 100.0);
        assert!(is_near(&dark, &light, &opts));
        assert!(!pairwise_compatible(&dark, &light, &opts));
    }

    #[test]
    fn stroke_width_mismatch_rejects_pair() {
        let opts = ChainOptions::default();
        // median stroke widths 2.0 and 8.0: ratio 4 > 2, rejected.
        let thin = component_at(1, 0, 30, 0, 4, 2.0, 50.0);
        let thick = component_at(2, 0, 30, 8, 12, 8.0, 50.0);
        assert!(is_near(&thin, &thick, &opts));
        assert!(!pairwise_compatible(&thin, &thick, &opts));
    }

    #[test]
    fn vertical_overlap_required() {
        let opts = ChainOptions::default();
        // `b` floats entirely above `a`.
        let a = component_at(1, 50, 80, 0, 4, 4.0, 50.0);
        let b = component_at(2, 0, 20, 8, 12, 4.0, 50.0);
        assert!(!is_near(&a, &b, &opts));
    }

    #[test]
    fn chain_bounding_box_is_componentwise_min_max_of_members() {
        let opts = ChainOptions::default();
        let a = component_at(1, 0, 30, 0, 4, 4.0, 50.0);
        let b = component_at(2, 5, 35, 12, 16, 4.0, 50.0);
        let c = component_at(3, 2, 32, 24, 28, 4.0, 50.0);
        let chains = build_chains(&[a, b, c], &opts);
        assert_eq!(chains.len(), 1);
        let chain = &chains[0];
        assert_eq!(chain.row_min, 0);
        assert_eq!(chain.row_max, 35);
        assert_eq!(chain.col_min, 0);
        assert_eq!(chain.col_max, 28);
    }

    #[test]
    fn chain_order_is_deterministic_across_repeated_runs() {
        let opts = ChainOptions::default();
        let a = component_at(1, 0, 30, 0, 4, 4.0, 50.0);
        let b = component_at(2, 0, 30, 12, 16, 4.0, 50.0);
        let c = component_at(3, 0, 30, 24, 28, 4.0, 50.0);
        let d = component_at(4, 40, 70, 0, 4, 4.0, 50.0);
        let e = component_at(5, 40, 70, 12, 16, 4.0, 50.0);
        let f = component_at(6, 40, 70, 24, 28, 4.0, 50.0);
        let components = [a, b, c, d, e, f];

        let first: Vec<Vec<usize>> = build_chains(&components, &opts).into_iter().map(|ch| ch.members).collect();
        for _ in 0..8 {
            let again: Vec<Vec<usize>> = build_chains(&components, &opts).into_iter().map(|ch| ch.members).collect();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn no_duplicate_members_in_final_chain() {
        let opts = ChainOptions::default();
        let a = component_at(1, 0, 30, 0, 4, 4.0, 50.0);
        let b = component_at(2, 0, 30, 12, 16, 4.0, 50.0);
        let c = component_at(3, 0, 30, 24, 28, 4.0, 50.0);
        let chains = build_chains(&[a, b, c], &opts);
        let mut members = chains[0].members.clone();
        let before = members.len();
        members.sort();
        members.dedup();
        assert_eq!(members.len(), before);
    }
}
