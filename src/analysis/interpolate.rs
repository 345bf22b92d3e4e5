use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Scattered (x, y, z) samples and their triangulation
// ---------------------------------------------------------------------------

/// Scattered surface samples with no ordering or grid constraint.
#[derive(Debug, Clone, Default)]
pub struct ScatterSample {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl ScatterSample {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// A planar Delaunay triangulation over the sample's (x, y) coordinates
/// with a piecewise-linear interpolant over the triangles.
#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<[f64; 2]>,
    z: Vec<f64>,
    triangles: Vec<[usize; 3]>,
}

/// A regular lattice of interpolated values.  `values[iy][ix]` corresponds
/// to `(xs[ix], ys[iy])`; nodes outside the convex hull are `None` and
/// must render as holes, never as fabricated numbers.
#[derive(Debug, Clone)]
pub struct ResampledGrid {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl Triangulation {
    /// Build a Delaunay triangulation via incremental Bowyer–Watson
    /// insertion.  Requires at least 3 distinct points.
    pub fn build(sample: &ScatterSample) -> Result<Self, PipelineError> {
        let n = sample.len();
        if n < 3 {
            return Err(PipelineError::InsufficientPoints { got: n });
        }

        let points: Vec<[f64; 2]> = sample
            .x
            .iter()
            .zip(&sample.y)
            .map(|(&x, &y)| [x, y])
            .collect();

        let triangles = bowyer_watson(&points);

        Ok(Triangulation {
            points,
            z: sample.z.clone(),
            triangles,
        })
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// Evaluate the piecewise-linear interpolant at `(x, y)`.  Returns
    /// `None` outside the triangulation's convex hull.
    pub fn interpolate(&self, x: f64, y: f64) -> Option<f64> {
        for &[a, b, c] in &self.triangles {
            if let Some((wa, wb, wc)) =
                barycentric(self.points[a], self.points[b], self.points[c], [x, y])
            {
                return Some(wa * self.z[a] + wb * self.z[b] + wc * self.z[c]);
            }
        }
        None
    }

    /// Evaluate the interpolant on an `nx` × `ny` lattice spanning the
    /// input's bounding box.
    pub fn resample(&self, nx: usize, ny: usize) -> ResampledGrid {
        let (min_x, max_x) = bounds(self.points.iter().map(|p| p[0]));
        let (min_y, max_y) = bounds(self.points.iter().map(|p| p[1]));

        let xs = linspace(min_x, max_x, nx);
        let ys = linspace(min_y, max_y, ny);

        let values = ys
            .iter()
            .map(|&y| xs.iter().map(|&x| self.interpolate(x, y)).collect())
            .collect();

        ResampledGrid { xs, ys, values }
    }
}

// ---------------------------------------------------------------------------
// Bowyer–Watson incremental Delaunay
// ---------------------------------------------------------------------------

fn bowyer_watson(points: &[[f64; 2]]) -> Vec<[usize; 3]> {
    // Super-triangle comfortably enclosing the bounding box.  Its three
    // synthetic vertices live past the end of the real point list.
    let (min_x, max_x) = bounds(points.iter().map(|p| p[0]));
    let (min_y, max_y) = bounds(points.iter().map(|p| p[1]));
    let span = (max_x - min_x).max(max_y - min_y).max(1.0);
    let cx = (min_x + max_x) / 2.0;
    let cy = (min_y + max_y) / 2.0;

    let mut verts: Vec<[f64; 2]> = points.to_vec();
    let s0 = verts.len();
    verts.push([cx - 20.0 * span, cy - span]);
    verts.push([cx + 20.0 * span, cy - span]);
    verts.push([cx, cy + 20.0 * span]);

    let mut triangles: Vec<[usize; 3]> = vec![[s0, s0 + 1, s0 + 2]];

    for p in 0..points.len() {
        // Triangles whose circumcircle contains the new point.
        let (bad, rest): (Vec<[usize; 3]>, Vec<[usize; 3]>) = triangles
            .into_iter()
            .partition(|&[a, b, c]| in_circumcircle(verts[a], verts[b], verts[c], verts[p]));
        triangles = rest;

        // The cavity boundary: edges belonging to exactly one bad triangle.
        let mut boundary: Vec<(usize, usize)> = Vec::new();
        for &[a, b, c] in &bad {
            for edge in [(a, b), (b, c), (c, a)] {
                let twin = (edge.1, edge.0);
                if let Some(pos) = boundary.iter().position(|&e| e == twin) {
                    boundary.remove(pos);
                } else {
                    boundary.push(edge);
                }
            }
        }

        // Re-triangulate the cavity around the new point.
        for (a, b) in boundary {
            triangles.push([a, b, p]);
        }
    }

    // Drop every triangle touching the super-triangle, then any sliver
    // with (near-)zero area left by duplicate or collinear input.
    triangles.retain(|&[a, b, c]| {
        a < s0 && b < s0 && c < s0 && triangle_area(verts[a], verts[b], verts[c]).abs() > 1e-12
    });
    triangles
}

fn triangle_area(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])) / 2.0
}

/// Does `p` lie strictly inside the circumcircle of triangle `abc`?
fn in_circumcircle(a: [f64; 2], b: [f64; 2], c: [f64; 2], p: [f64; 2]) -> bool {
    // Standard incircle determinant, sign-adjusted for orientation.
    let (ax, ay) = (a[0] - p[0], a[1] - p[1]);
    let (bx, by) = (b[0] - p[0], b[1] - p[1]);
    let (cx, cy) = (c[0] - p[0], c[1] - p[1]);

    let det = (ax * ax + ay * ay) * (bx * cy - cx * by)
        - (bx * bx + by * by) * (ax * cy - cx * ay)
        + (cx * cx + cy * cy) * (ax * by - bx * ay);

    if triangle_area(a, b, c) > 0.0 {
        det > 0.0
    } else {
        det < 0.0
    }
}

/// Barycentric coordinates of `p` in triangle `abc`, or `None` when `p`
/// falls outside (with a small tolerance so hull-edge queries hit).
fn barycentric(a: [f64; 2], b: [f64; 2], c: [f64; 2], p: [f64; 2]) -> Option<(f64, f64, f64)> {
    let area = triangle_area(a, b, c);
    if area.abs() < 1e-12 {
        return None;
    }
    let wa = triangle_area(p, b, c) / area;
    let wb = triangle_area(a, p, c) / area;
    let wc = triangle_area(a, b, p) / area;

    const EPS: f64 = 1e-9;
    if wa >= -EPS && wb >= -EPS && wc >= -EPS {
        Some((wa, wb, wc))
    } else {
        None
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// `n` evenly spaced values from `lo` to `hi` inclusive.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> ScatterSample {
        ScatterSample {
            x: vec![0.0, 1.0, 1.0, 0.0],
            y: vec![0.0, 0.0, 1.0, 1.0],
            z: vec![1.0, 2.0, 3.0, 4.0],
        }
    }

    #[test]
    fn too_few_points_fail() {
        let sample = ScatterSample {
            x: vec![0.0, 1.0],
            y: vec![0.0, 1.0],
            z: vec![0.0, 1.0],
        };
        assert!(matches!(
            Triangulation::build(&sample),
            Err(PipelineError::InsufficientPoints { got: 2 })
        ));
    }

    #[test]
    fn square_triangulates_into_two_triangles() {
        let tri = Triangulation::build(&unit_square()).unwrap();
        assert_eq!(tri.triangles().len(), 2);
    }

    #[test]
    fn no_input_point_falls_inside_any_circumcircle() {
        // Delaunay property on a small irregular cloud.
        let sample = ScatterSample {
            x: vec![0.0, 2.0, 1.0, 3.0, 0.5, 2.5],
            y: vec![0.0, 0.2, 2.0, 1.5, 1.0, 2.2],
            z: vec![0.0; 6],
        };
        let tri = Triangulation::build(&sample).unwrap();
        for &[a, b, c] in tri.triangles() {
            for (i, &p) in tri.points().iter().enumerate() {
                if i == a || i == b || i == c {
                    continue;
                }
                assert!(
                    !in_circumcircle(tri.points()[a], tri.points()[b], tri.points()[c], p),
                    "point {i} inside circumcircle of [{a},{b},{c}]"
                );
            }
        }
    }

    #[test]
    fn center_of_square_stays_within_corner_bounds() {
        let tri = Triangulation::build(&unit_square()).unwrap();
        let v = tri.interpolate(0.5, 0.5).unwrap();
        // Linear interpolation never overshoots the convex combination of
        // the corner values.
        assert!((1.0..=4.0).contains(&v));
    }

    #[test]
    fn vertices_interpolate_exactly() {
        let tri = Triangulation::build(&unit_square()).unwrap();
        assert!((tri.interpolate(0.0, 0.0).unwrap() - 1.0).abs() < 1e-9);
        assert!((tri.interpolate(1.0, 1.0).unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn outside_hull_is_undefined() {
        let tri = Triangulation::build(&unit_square()).unwrap();
        assert_eq!(tri.interpolate(2.0, 2.0), None);
        assert_eq!(tri.interpolate(-0.5, 0.5), None);
    }

    #[test]
    fn resampled_grid_has_holes_outside_the_hull() {
        // A right triangle: the opposite grid corner lies outside.
        let sample = ScatterSample {
            x: vec![0.0, 1.0, 0.0],
            y: vec![0.0, 0.0, 1.0],
            z: vec![0.0, 1.0, 2.0],
        };
        let tri = Triangulation::build(&sample).unwrap();
        let grid = tri.resample(11, 11);
        assert_eq!(grid.xs.len(), 11);
        assert_eq!(grid.ys.len(), 11);
        assert!(grid.values[0][0].is_some()); // (0, 0)
        assert!(grid.values[10][10].is_none()); // (1, 1) outside hypotenuse
    }

    #[test]
    fn linspace_is_inclusive() {
        let v = linspace(0.0, 1.0, 5);
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }
}
