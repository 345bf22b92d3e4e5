use super::interpolate::{linspace, ResampledGrid, Triangulation};

// ---------------------------------------------------------------------------
// Iso-line extraction
// ---------------------------------------------------------------------------

/// One straight piece of an iso-line at a given level, in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsoSegment {
    pub level: f64,
    pub start: [f64; 2],
    pub end: [f64; 2],
}

/// Evenly spaced contour levels strictly inside the value range, matching
/// `count` interior levels (the panels default to 14).
pub fn contour_levels(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !(max > min) {
        return Vec::new();
    }
    linspace(min, max, count + 2)[1..=count].to_vec()
}

/// Value range over the defined cells of a grid, `None` when the grid has
/// no defined cell at all.
pub fn grid_value_range(grid: &ResampledGrid) -> Option<(f64, f64)> {
    let mut range: Option<(f64, f64)> = None;
    for row in &grid.values {
        for v in row.iter().flatten() {
            range = Some(match range {
                Some((lo, hi)) => (lo.min(*v), hi.max(*v)),
                None => (*v, *v),
            });
        }
    }
    range
}

// ---------------------------------------------------------------------------
// Marching squares over the resampled grid
// ---------------------------------------------------------------------------

/// Extract iso-segments from a resampled grid with marching squares.
/// Cells with any undefined corner (outside the convex hull) are skipped
/// entirely, so holes stay holes.
pub fn grid_contours(grid: &ResampledGrid, levels: &[f64]) -> Vec<IsoSegment> {
    let mut segments = Vec::new();
    let ny = grid.ys.len();
    let nx = grid.xs.len();
    if nx < 2 || ny < 2 {
        return segments;
    }

    for iy in 0..ny - 1 {
        for ix in 0..nx - 1 {
            // Corner values, counter-clockwise from bottom-left.
            let corners = [
                grid.values[iy][ix],
                grid.values[iy][ix + 1],
                grid.values[iy + 1][ix + 1],
                grid.values[iy + 1][ix],
            ];
            let Some(vals) = all_defined(corners) else {
                continue;
            };
            let pos = [
                [grid.xs[ix], grid.ys[iy]],
                [grid.xs[ix + 1], grid.ys[iy]],
                [grid.xs[ix + 1], grid.ys[iy + 1]],
                [grid.xs[ix], grid.ys[iy + 1]],
            ];

            for &level in levels {
                cell_segments(&pos, &vals, level, &mut segments);
            }
        }
    }
    segments
}

fn all_defined(corners: [Option<f64>; 4]) -> Option<[f64; 4]> {
    Some([corners[0]?, corners[1]?, corners[2]?, corners[3]?])
}

/// Marching-squares case analysis for one cell and one level: collect the
/// level crossings on the cell's edges and pair them into segments.
fn cell_segments(pos: &[[f64; 2]; 4], vals: &[f64; 4], level: f64, out: &mut Vec<IsoSegment>) {
    let mut crossings: Vec<[f64; 2]> = Vec::with_capacity(2);
    for edge in 0..4 {
        let next = (edge + 1) % 4;
        if let Some(p) = edge_crossing(pos[edge], vals[edge], pos[next], vals[next], level) {
            crossings.push(p);
        }
    }
    // 0 or 2 crossings for simple cells; 4 for the ambiguous saddle, which
    // we pair in edge order.
    for pair in crossings.chunks_exact(2) {
        out.push(IsoSegment {
            level,
            start: pair[0],
            end: pair[1],
        });
    }
}

/// Linear crossing of `level` on the edge from `(pa, va)` to `(pb, vb)`.
fn edge_crossing(pa: [f64; 2], va: f64, pb: [f64; 2], vb: f64, level: f64) -> Option<[f64; 2]> {
    let below_a = va < level;
    let below_b = vb < level;
    if below_a == below_b || va == vb {
        return None;
    }
    let t = (level - va) / (vb - va);
    Some([pa[0] + t * (pb[0] - pa[0]), pa[1] + t * (pb[1] - pa[1])])
}

// ---------------------------------------------------------------------------
// Direct triangulated contour (no resampling step)
// ---------------------------------------------------------------------------

/// Extract iso-segments directly on the triangulation.  Near the hull
/// boundary and in sparse regions this can differ visibly from the
/// grid-based result; both are expected outputs.
pub fn triangle_contours(tri: &Triangulation, levels: &[f64]) -> Vec<IsoSegment> {
    let points = tri.points();
    let z = tri.z();
    let mut segments = Vec::new();

    for &[a, b, c] in tri.triangles() {
        for &level in levels {
            let mut crossings: Vec<[f64; 2]> = Vec::with_capacity(2);
            for (i, j) in [(a, b), (b, c), (c, a)] {
                if let Some(p) = edge_crossing(points[i], z[i], points[j], z[j], level) {
                    crossings.push(p);
                }
            }
            if crossings.len() == 2 {
                segments.push(IsoSegment {
                    level,
                    start: crossings[0],
                    end: crossings[1],
                });
            }
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::interpolate::ScatterSample;

    #[test]
    fn levels_are_interior_and_evenly_spaced() {
        let levels = contour_levels(0.0, 1.0, 4);
        assert_eq!(levels.len(), 4);
        assert!((levels[0] - 0.2).abs() < 1e-9);
        assert!((levels[3] - 0.8).abs() < 1e-9);
        assert!(contour_levels(1.0, 1.0, 4).is_empty());
    }

    #[test]
    fn single_cell_crossing_interpolates_linearly() {
        // One cell, z rises from 0 on the left edge to 1 on the right.
        let grid = ResampledGrid {
            xs: vec![0.0, 1.0],
            ys: vec![0.0, 1.0],
            values: vec![
                vec![Some(0.0), Some(1.0)],
                vec![Some(0.0), Some(1.0)],
            ],
        };
        let segs = grid_contours(&grid, &[0.25]);
        assert_eq!(segs.len(), 1);
        // The iso-line is the vertical line x = 0.25.
        assert!((segs[0].start[0] - 0.25).abs() < 1e-9);
        assert!((segs[0].end[0] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn cells_with_holes_are_skipped() {
        let grid = ResampledGrid {
            xs: vec![0.0, 1.0],
            ys: vec![0.0, 1.0],
            values: vec![vec![Some(0.0), None], vec![Some(0.0), Some(1.0)]],
        };
        assert!(grid_contours(&grid, &[0.5]).is_empty());
    }

    #[test]
    fn triangle_contour_crosses_one_triangle() {
        let sample = ScatterSample {
            x: vec![0.0, 1.0, 0.0],
            y: vec![0.0, 0.0, 1.0],
            z: vec![0.0, 1.0, 0.0],
        };
        let tri = Triangulation::build(&sample).unwrap();
        let segs = triangle_contours(&tri, &[0.5]);
        assert_eq!(segs.len(), 1);
        // z rises linearly with x, so the iso-line is the line x = 0.5.
        assert!((segs[0].start[0] - 0.5).abs() < 1e-9);
        assert!((segs[0].end[0] - 0.5).abs() < 1e-9);
    }
}
