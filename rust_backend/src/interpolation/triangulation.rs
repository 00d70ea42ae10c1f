//! Incremental Delaunay triangulation of scattered 2D points.
//!
//! Points are inserted one at a time (Bowyer–Watson): the triangles whose
//! circumcircle contains the new point are removed and the resulting cavity
//! is re-triangulated as a fan around the point. A large enclosing triangle
//! seeds the process and is stripped at the end, so the result covers the
//! convex hull of the input up to thin slivers along hull edges.
//!
//! ## Edge cases
//! - Exact and near-duplicate sites keep the first occurrence
//! - Points on an existing edge split both adjacent triangles
//! - Fully collinear or coincident input yields [`TriangulationError::Degenerate`]

use std::collections::{HashMap, HashSet};

/// Marker for a missing neighbour (hull edge).
pub const NONE: usize = usize::MAX;

/// Size of the enclosing triangle relative to the input bounding box.
const SUPER_SCALE: f64 = 100.0;
/// Sites closer than this fraction of the bounding box are merged.
const DUPLICATE_TOLERANCE: f64 = 1e-9;
/// Barycentric slack accepted when locating query points.
const BARYCENTRIC_EPS: f64 = 1e-10;
const MAX_REPAIR_ROUNDS: usize = 16;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TriangulationError {
    #[error("at least 3 points are required, got {0}")]
    TooFewPoints(usize),

    #[error("point {0} has a non-finite coordinate")]
    NonFinite(usize),

    #[error("points are collinear or coincident, no triangle can be formed")]
    Degenerate,
}

/// A triangle with counter-clockwise vertices.
///
/// `neighbors[k]` is the triangle across the edge opposite `vertices[k]`,
/// or [`NONE`] on the hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub vertices: [usize; 3],
    pub neighbors: [usize; 3],
}

/// Delaunay triangulation, read-only once built.
#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<[f64; 2]>,
    source_index: Vec<usize>,
    triangles: Vec<Triangle>,
    duplicates: usize,
    locator: Locator,
}

impl Triangulation {
    pub fn new(input: &[[f64; 2]]) -> Result<Self, TriangulationError> {
        if input.len() < 3 {
            return Err(TriangulationError::TooFewPoints(input.len()));
        }
        if let Some(i) = input
            .iter()
            .position(|p| !p[0].is_finite() || !p[1].is_finite())
        {
            return Err(TriangulationError::NonFinite(i));
        }

        let mut builder = Builder::new(input)?;
        for i in insertion_order(input) {
            builder.insert(i);
        }
        let triangulation = builder.finish()?;

        log::debug!(
            "Triangulated {} sites into {} triangles ({} duplicates merged)",
            triangulation.points.len(),
            triangulation.triangles.len(),
            triangulation.duplicates
        );
        Ok(triangulation)
    }

    /// Vertex coordinates; vertices are the distinct input sites.
    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// Input index each vertex came from.
    pub fn source_indices(&self) -> &[usize] {
        &self.source_index
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of input sites dropped as duplicates.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Sorted, de-duplicated neighbour lists of every vertex.
    pub fn vertex_neighbors(&self) -> Vec<Vec<usize>> {
        let mut neighbors = vec![Vec::new(); self.points.len()];
        for tri in &self.triangles {
            for k in 0..3 {
                let a = tri.vertices[k];
                let b = tri.vertices[(k + 1) % 3];
                neighbors[a].push(b);
                neighbors[b].push(a);
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }
        neighbors
    }

    /// Barycentric coordinates of `p` with respect to triangle `t`.
    pub fn barycentric(&self, t: usize, p: [f64; 2]) -> [f64; 3] {
        let [a, b, c] = self.triangles[t].vertices.map(|v| self.points[v]);
        let det = (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]);
        let dx = p[0] - a[0];
        let dy = p[1] - a[1];
        let b1 = (dx * (c[1] - a[1]) - (c[0] - a[0]) * dy) / det;
        let b2 = ((b[0] - a[0]) * dy - dx * (b[1] - a[1])) / det;
        [1.0 - b1 - b2, b1, b2]
    }

    /// Find the triangle containing `p` and its barycentric coordinates.
    ///
    /// Returns `None` outside the triangulated area.
    pub fn locate(&self, p: [f64; 2]) -> Option<(usize, [f64; 3])> {
        if !p[0].is_finite() || !p[1].is_finite() || !self.locator.covers(p) {
            return None;
        }

        let mut t = self.locator.hint(p);
        for _ in 0..self.triangles.len() {
            let bary = self.barycentric(t, p);
            let (k, min) = argmin(&bary);
            if min >= -BARYCENTRIC_EPS {
                return Some((t, bary));
            }
            let next = self.triangles[t].neighbors[k];
            if next == NONE {
                break;
            }
            t = next;
        }

        // The hull can be slightly non-convex, so a walk that leaves it is
        // not proof the point is outside.
        (0..self.triangles.len()).find_map(|t| {
            let bary = self.barycentric(t, p);
            (argmin(&bary).1 >= -BARYCENTRIC_EPS).then_some((t, bary))
        })
    }
}

fn argmin(values: &[f64; 3]) -> (usize, f64) {
    let mut k = 0;
    for i in 1..3 {
        if values[i] < values[k] {
            k = i;
        }
    }
    (k, values[k])
}

/// Positive when `p` lies left of the directed line `a -> b`.
fn orient(a: [f64; 2], b: [f64; 2], p: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

/// Positive when `p` lies inside the circumcircle of counter-clockwise `a, b, c`.
fn incircle(a: [f64; 2], b: [f64; 2], c: [f64; 2], p: [f64; 2]) -> f64 {
    let (adx, ady) = (a[0] - p[0], a[1] - p[1]);
    let (bdx, bdy) = (b[0] - p[0], b[1] - p[1]);
    let (cdx, cdy) = (c[0] - p[0], c[1] - p[1]);
    let alift = adx * adx + ady * ady;
    let blift = bdx * bdx + bdy * bdy;
    let clift = cdx * cdx + cdy * cdy;
    alift * (bdx * cdy - cdx * bdy) + blift * (cdx * ady - adx * cdy) + clift * (adx * bdy - bdx * ady)
}

fn dist2(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: [f64; 2],
    max: [f64; 2],
}

impl Bounds {
    fn of(points: &[[f64; 2]]) -> Self {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for p in points {
            for d in 0..2 {
                min[d] = min[d].min(p[d]);
                max[d] = max[d].max(p[d]);
            }
        }
        Self { min, max }
    }

    fn extent(&self) -> f64 {
        (self.max[0] - self.min[0]).max(self.max[1] - self.min[1])
    }

    /// Cell of `p` on an `nx` by `ny` grid, clamped to the grid.
    fn cell(&self, p: [f64; 2], nx: usize, ny: usize) -> (usize, usize) {
        let fx = (p[0] - self.min[0]) / (self.max[0] - self.min[0]).max(f64::MIN_POSITIVE);
        let fy = (p[1] - self.min[1]) / (self.max[1] - self.min[1]).max(f64::MIN_POSITIVE);
        let cx = ((fx * nx as f64) as isize).clamp(0, nx as isize - 1) as usize;
        let cy = ((fy * ny as f64) as isize).clamp(0, ny as isize - 1) as usize;
        (cx, cy)
    }
}

/// Spatially coherent insertion order: row-snake traversal of a coarse grid.
fn insertion_order(points: &[[f64; 2]]) -> Vec<usize> {
    let bounds = Bounds::of(points);
    let side = ((points.len() as f64 / 8.0).sqrt().ceil() as usize).max(1);
    let mut keyed: Vec<(usize, usize)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let (cx, cy) = bounds.cell(*p, side, side);
            let cx = if cy % 2 == 0 { cx } else { side - 1 - cx };
            (cy * side + cx, i)
        })
        .collect();
    keyed.sort_unstable();
    keyed.into_iter().map(|(_, i)| i).collect()
}

/// Coarse grid of starting triangles for point location walks.
#[derive(Debug, Clone)]
struct Locator {
    bounds: Bounds,
    nx: usize,
    ny: usize,
    cells: Vec<usize>,
}

impl Locator {
    fn new(points: &[[f64; 2]], triangles: &[Triangle]) -> Self {
        let bounds = Bounds::of(points);
        let side = ((triangles.len() as f64 / 2.0).sqrt().ceil() as usize).clamp(1, 512);
        let mut cells = vec![NONE; side * side];

        for (t, tri) in triangles.iter().enumerate() {
            let [a, b, c] = tri.vertices.map(|v| points[v]);
            let centroid = [(a[0] + b[0] + c[0]) / 3.0, (a[1] + b[1] + c[1]) / 3.0];
            let (cx, cy) = bounds.cell(centroid, side, side);
            let slot = &mut cells[cy * side + cx];
            if *slot == NONE {
                *slot = t;
            }
        }

        let mut fill = cells.iter().copied().find(|&t| t != NONE).unwrap_or(0);
        for slot in &mut cells {
            if *slot == NONE {
                *slot = fill;
            } else {
                fill = *slot;
            }
        }

        Self {
            bounds,
            nx: side,
            ny: side,
            cells,
        }
    }

    fn covers(&self, p: [f64; 2]) -> bool {
        (0..2).all(|d| p[d] >= self.bounds.min[d] && p[d] <= self.bounds.max[d])
    }

    fn hint(&self, p: [f64; 2]) -> usize {
        let (cx, cy) = self.bounds.cell(p, self.nx, self.ny);
        self.cells[cy * self.nx + cx]
    }
}

#[derive(Debug, Clone, Copy)]
struct WorkTriangle {
    v: [usize; 3],
    n: [usize; 3],
    alive: bool,
}

/// Mutable state while points are being inserted.
///
/// The three enclosing vertices sit at indices `n_input..n_input + 3`.
struct Builder {
    points: Vec<[f64; 2]>,
    n_input: usize,
    tris: Vec<WorkTriangle>,
    mark: Vec<u32>,
    stamp: u32,
    last: usize,
    tolerance2: f64,
    duplicates: usize,
    failed: usize,
}

impl Builder {
    fn new(input: &[[f64; 2]]) -> Result<Self, TriangulationError> {
        let bounds = Bounds::of(input);
        let extent = bounds.extent();
        if extent <= 0.0 {
            return Err(TriangulationError::Degenerate);
        }

        let cx = 0.5 * (bounds.min[0] + bounds.max[0]);
        let cy = 0.5 * (bounds.min[1] + bounds.max[1]);
        let s = SUPER_SCALE * extent;

        let mut points = Vec::with_capacity(input.len() + 3);
        points.extend_from_slice(input);
        points.push([cx - s, cy - s]);
        points.push([cx + s, cy - s]);
        points.push([cx, cy + s]);

        let n_input = input.len();
        let root = WorkTriangle {
            v: [n_input, n_input + 1, n_input + 2],
            n: [NONE; 3],
            alive: true,
        };

        Ok(Self {
            points,
            n_input,
            tris: vec![root],
            mark: vec![0],
            stamp: 0,
            last: 0,
            tolerance2: (DUPLICATE_TOLERANCE * extent).powi(2),
            duplicates: 0,
            failed: 0,
        })
    }

    fn edge(&self, t: usize, k: usize) -> (usize, usize) {
        let v = self.tris[t].v;
        (v[(k + 1) % 3], v[(k + 2) % 3])
    }

    fn in_cavity(&self, t: usize) -> bool {
        t != NONE && self.mark[t] == self.stamp
    }

    /// Visibility walk from the last created triangle.
    fn locate(&self, p: [f64; 2]) -> Option<usize> {
        let mut t = self.last;
        let mut steps = 0usize;
        'walk: while steps <= self.tris.len() {
            steps += 1;
            // Rotating the first edge tested keeps the walk from cycling.
            for j in 0..3 {
                let k = (j + steps) % 3;
                let (a, b) = self.edge(t, k);
                if orient(self.points[a], self.points[b], p) < 0.0 {
                    let next = self.tris[t].n[k];
                    if next == NONE {
                        return None;
                    }
                    t = next;
                    continue 'walk;
                }
            }
            return Some(t);
        }

        (0..self.tris.len()).find(|&t| {
            self.tris[t].alive
                && (0..3).all(|k| {
                    let (a, b) = self.edge(t, k);
                    orient(self.points[a], self.points[b], p) >= 0.0
                })
        })
    }

    fn insert(&mut self, pi: usize) {
        let p = self.points[pi];
        let Some(t0) = self.locate(p) else {
            self.failed += 1;
            return;
        };

        if self.tris[t0]
            .v
            .iter()
            .any(|&v| dist2(self.points[v], p) <= self.tolerance2)
        {
            self.duplicates += 1;
            return;
        }

        self.stamp += 1;
        let mut cavity = self.grow_cavity(t0, p);
        if !self.repair_cavity(t0, p, &mut cavity) {
            log::debug!("Skipping site {} after failed cavity repair", pi);
            self.failed += 1;
            return;
        }

        let mut boundary = Vec::new();
        for &t in &cavity {
            for k in 0..3 {
                let outer = self.tris[t].n[k];
                if !self.in_cavity(outer) {
                    let (a, b) = self.edge(t, k);
                    boundary.push((a, b, outer));
                }
            }
        }

        // The cavity must be a topological disk: every boundary vertex starts
        // exactly one edge and ends exactly one edge.
        let starts: HashSet<usize> = boundary.iter().map(|e| e.0).collect();
        let ends: HashSet<usize> = boundary.iter().map(|e| e.1).collect();
        if starts.len() != boundary.len() || starts != ends {
            log::debug!("Skipping site {} with a non-manifold cavity", pi);
            self.failed += 1;
            return;
        }

        for &t in &cavity {
            self.tris[t].alive = false;
        }

        let first_new = self.tris.len();
        let mut start_of = HashMap::with_capacity(boundary.len());
        let mut end_of = HashMap::with_capacity(boundary.len());
        for &(a, b, outer) in &boundary {
            let id = self.tris.len();
            self.tris.push(WorkTriangle {
                v: [a, b, pi],
                n: [NONE, NONE, outer],
                alive: true,
            });
            self.mark.push(0);
            if outer != NONE {
                let opposite = self.tris[outer].v.iter().position(|&v| v != a && v != b);
                if let Some(j) = opposite {
                    self.tris[outer].n[j] = id;
                }
            }
            start_of.insert(a, id);
            end_of.insert(b, id);
        }

        for id in first_new..self.tris.len() {
            let [a, b, _] = self.tris[id].v;
            self.tris[id].n[0] = start_of.get(&b).copied().unwrap_or(NONE);
            self.tris[id].n[1] = end_of.get(&a).copied().unwrap_or(NONE);
        }
        self.last = first_new;
    }

    /// Flood-fill the triangles whose circumcircle contains `p`.
    fn grow_cavity(&mut self, t0: usize, p: [f64; 2]) -> Vec<usize> {
        self.mark[t0] = self.stamp;
        let mut cavity = vec![t0];
        let mut stack = vec![t0];
        while let Some(t) = stack.pop() {
            for k in 0..3 {
                let nb = self.tris[t].n[k];
                if nb == NONE || self.mark[nb] == self.stamp {
                    continue;
                }
                let [a, b, c] = self.tris[nb].v.map(|v| self.points[v]);
                if incircle(a, b, c, p) > 0.0 {
                    self.mark[nb] = self.stamp;
                    cavity.push(nb);
                    stack.push(nb);
                }
            }
        }
        cavity
    }

    /// Make every boundary edge strictly visible from `p`.
    ///
    /// Triangles whose outer edge is not visible are dropped from the cavity,
    /// except the containing triangle, whose neighbour across such an edge is
    /// pulled in instead (`p` lies on that edge).
    fn repair_cavity(&mut self, t0: usize, p: [f64; 2], cavity: &mut Vec<usize>) -> bool {
        for _ in 0..MAX_REPAIR_ROUNDS {
            let mut changed = false;
            let count = cavity.len();
            for idx in 0..count {
                let t = cavity[idx];
                if !self.in_cavity(t) {
                    continue;
                }
                for k in 0..3 {
                    let nb = self.tris[t].n[k];
                    if self.in_cavity(nb) {
                        continue;
                    }
                    let (a, b) = self.edge(t, k);
                    if orient(self.points[a], self.points[b], p) > 0.0 {
                        continue;
                    }
                    if t == t0 {
                        if nb == NONE {
                            return false;
                        }
                        self.mark[nb] = self.stamp;
                        cavity.push(nb);
                    } else {
                        self.mark[t] = 0;
                    }
                    changed = true;
                    break;
                }
            }

            if !changed {
                return true;
            }
            self.keep_connected(t0, cavity);
        }
        false
    }

    /// Drop cavity triangles no longer reachable from `t0`.
    fn keep_connected(&mut self, t0: usize, cavity: &mut Vec<usize>) {
        let mut reached = HashSet::new();
        let mut stack = vec![t0];
        reached.insert(t0);
        while let Some(t) = stack.pop() {
            for k in 0..3 {
                let nb = self.tris[t].n[k];
                if self.in_cavity(nb) && reached.insert(nb) {
                    stack.push(nb);
                }
            }
        }
        for &t in cavity.iter() {
            if !reached.contains(&t) {
                self.mark[t] = 0;
            }
        }
        cavity.retain(|t| reached.contains(t));
    }

    fn finish(self) -> Result<Triangulation, TriangulationError> {
        if self.failed > 0 {
            log::warn!("{} sites could not be inserted into the triangulation", self.failed);
        }

        let n_input = self.n_input;
        let kept: Vec<usize> = (0..self.tris.len())
            .filter(|&t| self.tris[t].alive && self.tris[t].v.iter().all(|&v| v < n_input))
            .collect();
        if kept.is_empty() {
            return Err(TriangulationError::Degenerate);
        }

        let mut vertex_id = vec![NONE; n_input];
        for &t in &kept {
            for &v in &self.tris[t].v {
                vertex_id[v] = 0;
            }
        }
        let mut points = Vec::new();
        let mut source_index = Vec::new();
        for (i, id) in vertex_id.iter_mut().enumerate() {
            if *id != NONE {
                *id = points.len();
                points.push(self.points[i]);
                source_index.push(i);
            }
        }

        let mut triangle_id = vec![NONE; self.tris.len()];
        for (new, &old) in kept.iter().enumerate() {
            triangle_id[old] = new;
        }

        let triangles: Vec<Triangle> = kept
            .iter()
            .map(|&t| {
                let work = &self.tris[t];
                Triangle {
                    vertices: work.v.map(|v| vertex_id[v]),
                    neighbors: work.n.map(|n| if n == NONE { NONE } else { triangle_id[n] }),
                }
            })
            .collect();

        let locator = Locator::new(&points, &triangles);
        Ok(Triangulation {
            points,
            source_index,
            triangles,
            duplicates: self.duplicates,
            locator,
        })
    }
}
