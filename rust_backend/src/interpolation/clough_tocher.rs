//! Piecewise cubic, C¹ smooth interpolation over a Delaunay triangulation.
//!
//! Each triangle is split into three sub-triangles around its centroid and a
//! cubic Bézier patch is built on each, from the data values and gradients at
//! the three vertices. Gradients are estimated globally by minimising the
//! curvature of the interpolant along the triangulation edges.

use super::triangulation::{Triangulation, TriangulationError, NONE};

/// Iteration cap for the global gradient estimation.
pub const GRADIENT_MAX_ITER: usize = 400;
/// Convergence tolerance for the global gradient estimation.
pub const GRADIENT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InterpolationError {
    #[error(transparent)]
    Triangulation(#[from] TriangulationError),

    #[error("got {points} points but {values} values")]
    LengthMismatch { points: usize, values: usize },

    #[error("value {0} is not finite")]
    NonFiniteValue(usize),
}

/// Clough–Tocher interpolant over scattered 2D data.
///
/// Immutable after construction; evaluation only reads shared state, so one
/// instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct CloughTocher2d {
    tri: Triangulation,
    values: Vec<f64>,
    gradients: Vec<[f64; 2]>,
}

impl CloughTocher2d {
    pub fn new(points: &[[f64; 2]], values: &[f64]) -> Result<Self, InterpolationError> {
        if points.len() != values.len() {
            return Err(InterpolationError::LengthMismatch {
                points: points.len(),
                values: values.len(),
            });
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(InterpolationError::NonFiniteValue(i));
        }

        let tri = Triangulation::new(points)?;
        let values: Vec<f64> = tri.source_indices().iter().map(|&i| values[i]).collect();
        let gradients = estimate_gradients(&tri, &values, GRADIENT_MAX_ITER, GRADIENT_TOLERANCE);

        Ok(Self {
            tri,
            values,
            gradients,
        })
    }

    pub fn triangulation(&self) -> &Triangulation {
        &self.tri
    }

    /// Estimated gradient at each triangulation vertex.
    pub fn gradients(&self) -> &[[f64; 2]] {
        &self.gradients
    }

    /// Interpolated value at `(x, y)`, or `None` outside the convex hull.
    pub fn evaluate(&self, x: f64, y: f64) -> Option<f64> {
        let (t, bary) = self.tri.locate([x, y])?;
        Some(self.patch_value(t, bary))
    }

    fn patch_value(&self, t: usize, b: [f64; 3]) -> f64 {
        let triangle = &self.tri.triangles()[t];
        let [i1, i2, i3] = triangle.vertices;
        let points = self.tri.points();

        let e12 = sub(points[i2], points[i1]);
        let e23 = sub(points[i3], points[i2]);
        let e31 = sub(points[i1], points[i3]);

        let (f1, f2, f3) = (self.values[i1], self.values[i2], self.values[i3]);
        let (g1, g2, g3) = (self.gradients[i1], self.gradients[i2], self.gradients[i3]);

        // Directional derivatives along the edges
        let df12 = dot(g1, e12);
        let df21 = -dot(g2, e12);
        let df23 = dot(g2, e23);
        let df32 = -dot(g3, e23);
        let df31 = dot(g3, e31);
        let df13 = -dot(g1, e31);

        // Bézier control values of the three sub-triangle patches
        let c3000 = f1;
        let c2100 = (df12 + 3.0 * c3000) / 3.0;
        let c2010 = (df13 + 3.0 * c3000) / 3.0;
        let c0300 = f2;
        let c1200 = (df21 + 3.0 * c0300) / 3.0;
        let c0210 = (df23 + 3.0 * c0300) / 3.0;
        let c0030 = f3;
        let c1020 = (df31 + 3.0 * c0030) / 3.0;
        let c0120 = (df32 + 3.0 * c0030) / 3.0;

        let c2001 = (c2100 + c2010 + c3000) / 3.0;
        let c0201 = (c1200 + c0300 + c0210) / 3.0;
        let c0021 = (c1020 + c0120 + c0030) / 3.0;

        let g = self.edge_weights(t);

        let c0111 = (g[0] * (-c0300 + 3.0 * c0210 - 3.0 * c0120 + c0030)
            + (-c0300 + 2.0 * c0210 - c0120 + c0021 + c0201))
            / 2.0;
        let c1011 = (g[1] * (-c0030 + 3.0 * c1020 - 3.0 * c2010 + c3000)
            + (-c0030 + 2.0 * c1020 - c2010 + c2001 + c0021))
            / 2.0;
        let c1101 = (g[2] * (-c3000 + 3.0 * c2100 - 3.0 * c1200 + c0300)
            + (-c3000 + 2.0 * c2100 - c1200 + c2001 + c0201))
            / 2.0;

        let c1002 = (c1101 + c1011 + c2001) / 3.0;
        let c0102 = (c1101 + c0111 + c0201) / 3.0;
        let c0012 = (c1011 + c0111 + c0021) / 3.0;

        let c0003 = (c1002 + c0102 + c0012) / 3.0;

        // Barycentric coordinates in the sub-triangle containing the point
        let minval = b[0].min(b[1]).min(b[2]);
        let b1 = b[0] - minval;
        let b2 = b[1] - minval;
        let b3 = b[2] - minval;
        let b4 = 3.0 * minval;

        b1.powi(3) * c3000
            + 3.0 * b1.powi(2) * b2 * c2100
            + 3.0 * b1.powi(2) * b3 * c2010
            + 3.0 * b1.powi(2) * b4 * c2001
            + 3.0 * b1 * b2.powi(2) * c1200
            + 6.0 * b1 * b2 * b4 * c1101
            + 3.0 * b1 * b3.powi(2) * c1020
            + 6.0 * b1 * b3 * b4 * c1011
            + 3.0 * b1 * b4.powi(2) * c1002
            + b2.powi(3) * c0300
            + 3.0 * b2.powi(2) * b3 * c0210
            + 3.0 * b2.powi(2) * b4 * c0201
            + 3.0 * b2 * b3.powi(2) * c0120
            + 6.0 * b2 * b3 * b4 * c0111
            + 3.0 * b2 * b4.powi(2) * c0102
            + b3.powi(3) * c0030
            + 3.0 * b3.powi(2) * b4 * c0021
            + 3.0 * b3 * b4.powi(2) * c0012
            + b4.powi(3) * c0003
    }

    /// Continuity weights across each edge, taken from where the centroid of
    /// the neighbouring triangle falls in this triangle's barycentric frame.
    fn edge_weights(&self, t: usize) -> [f64; 3] {
        let triangle = &self.tri.triangles()[t];
        let points = self.tri.points();
        let mut g = [-0.5; 3];

        for k in 0..3 {
            let nb = triangle.neighbors[k];
            if nb == NONE {
                continue;
            }
            let [a, b, c] = self.tri.triangles()[nb].vertices.map(|v| points[v]);
            let centroid = [(a[0] + b[0] + c[0]) / 3.0, (a[1] + b[1] + c[1]) / 3.0];
            let cb = self.tri.barycentric(t, centroid);

            let weight = match k {
                0 => (2.0 * cb[2] + cb[1] - 1.0) / (2.0 - 3.0 * cb[2] - 3.0 * cb[1]),
                1 => (2.0 * cb[0] + cb[2] - 1.0) / (2.0 - 3.0 * cb[0] - 3.0 * cb[2]),
                _ => (2.0 * cb[1] + cb[0] - 1.0) / (2.0 - 3.0 * cb[1] - 3.0 * cb[0]),
            };
            if weight.is_finite() {
                g[k] = weight;
            }
        }
        g
    }
}

fn sub(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

fn dot(a: [f64; 2], b: [f64; 2]) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

/// Estimate vertex gradients by minimising the second derivative of the
/// cubic interpolant along every edge.
///
/// Each sweep solves a 2x2 system per vertex with the neighbours' current
/// gradients held fixed, until the largest relative change drops below
/// `tolerance` or `max_iter` sweeps have run.
pub fn estimate_gradients(
    tri: &Triangulation,
    values: &[f64],
    max_iter: usize,
    tolerance: f64,
) -> Vec<[f64; 2]> {
    let points = tri.points();
    let neighbors = tri.vertex_neighbors();
    let mut gradients = vec![[0.0; 2]; points.len()];

    for iteration in 0..max_iter {
        let mut err = 0.0f64;

        for i in 0..points.len() {
            let (mut q00, mut q01, mut q11) = (0.0, 0.0, 0.0);
            let (mut s0, mut s1) = (0.0, 0.0);

            for &j in &neighbors[i] {
                let ex = points[j][0] - points[i][0];
                let ey = points[j][1] - points[i][1];
                let l3 = ex.hypot(ey).powi(3);

                let f1 = values[i];
                let f2 = values[j];
                let df2 = -ex * gradients[j][0] - ey * gradients[j][1];

                q00 += 4.0 * ex * ex / l3;
                q01 += 4.0 * ex * ey / l3;
                q11 += 4.0 * ey * ey / l3;

                let t = (6.0 * (f1 - f2) - 2.0 * df2) / l3;
                s0 += t * ex;
                s1 += t * ey;
            }

            let det = q00 * q11 - q01 * q01;
            if det == 0.0 || !det.is_finite() {
                continue;
            }
            let r0 = (q11 * s0 - q01 * s1) / det;
            let r1 = (-q01 * s0 + q00 * s1) / det;

            let change = (gradients[i][0] + r0).abs().max((gradients[i][1] + r1).abs());
            gradients[i] = [-r0, -r1];

            let scale = r0.abs().max(r1.abs()).max(1.0);
            err = err.max(change / scale);
        }

        if err < tolerance {
            log::debug!("Gradient estimation converged after {} sweeps", iteration + 1);
            return gradients;
        }
    }

    log::warn!(
        "Gradient estimation did not converge within {} sweeps (tolerance {})",
        max_iter,
        tolerance
    );
    gradients
}
