use crate::bounds::Boundary;

/// Scratch buffer to reuse allocations during clipping.
#[derive(Default, Clone)]
pub struct PolygonScratch {
    vertices: Vec<f64>,
    labels: Vec<i64>,
    dists: Vec<f64>,
}

/// A convex polygon in counter-clockwise order with a label per edge.
///
/// Labels are site indices (`>= 0`) for edges cut by a bisector and negative
/// side IDs for edges inherited from the starting rectangle.
#[derive(Clone, Debug, Default)]
pub struct ConvexPolygon {
    // Flat array of vertices [x, y, x, y, ...]
    pub(crate) vertices: Vec<f64>,
    // edge_labels[i] corresponds to the edge starting at vertices[2*i]
    pub(crate) edge_labels: Vec<i64>,
}

impl ConvexPolygon {
    pub fn new(bounds: &Boundary) -> ConvexPolygon {
        let mut vertices = Vec::with_capacity(8);
        for corner in bounds.corners() {
            vertices.extend_from_slice(&corner);
        }
        let edge_labels = bounds.half_planes().iter().map(|&(_, _, side)| side).collect();

        ConvexPolygon {
            vertices,
            edge_labels,
        }
    }

    /// Builds a polygon from counter-clockwise `points` and one label per edge.
    pub fn from_points(points: &[[f64; 2]], labels: &[i64]) -> ConvexPolygon {
        debug_assert_eq!(points.len(), labels.len());
        ConvexPolygon {
            vertices: points.iter().flat_map(|p| [p[0], p[1]]).collect(),
            edge_labels: labels.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn point(&self, k: usize) -> [f64; 2] {
        [self.vertices[k * 2], self.vertices[k * 2 + 1]]
    }

    pub fn points(&self) -> Vec<[f64; 2]> {
        (0..self.len()).map(|k| self.point(k)).collect()
    }

    pub fn labels(&self) -> &[i64] {
        &self.edge_labels
    }

    /// Shoelace area, positive for counter-clockwise polygons.
    pub fn signed_area(&self) -> f64 {
        let n = self.len();
        if n < 3 {
            return 0.0;
        }

        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            let [xi, yi] = self.point(i);
            let [xj, yj] = self.point(j);
            area += xi * yj - xj * yi;
        }
        area * 0.5
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn centroid(&self) -> [f64; 2] {
        centroid(&self.points())
    }

    /// Squared distance from `center` to the furthest vertex.
    pub fn max_radius_sq(&self, center: &[f64; 2]) -> f64 {
        (0..self.len())
            .map(|k| {
                let [x, y] = self.point(k);
                let dx = x - center[0];
                let dy = y - center[1];
                dx * dx + dy * dy
            })
            .fold(0.0, f64::max)
    }

    /// Removes vertices that coincide with their successor within `tolerance`,
    /// together with the zero-length edge starting at them.
    pub fn dedup(&mut self, tolerance: f64) {
        let n = self.len();
        if n < 2 {
            return;
        }
        let tol_sq = tolerance * tolerance;
        let mut vertices = Vec::with_capacity(self.vertices.len());
        let mut labels = Vec::with_capacity(n);
        for i in 0..n {
            let [xi, yi] = self.point(i);
            let [xj, yj] = self.point((i + 1) % n);
            let d2 = (xj - xi) * (xj - xi) + (yj - yi) * (yj - yi);
            if d2 <= tol_sq {
                continue;
            }
            vertices.push(xi);
            vertices.push(yi);
            labels.push(self.edge_labels[i]);
        }
        // Everything collapsed onto a single point.
        if labels.is_empty() {
            vertices.extend_from_slice(&self.vertices[..2]);
            labels.push(self.edge_labels[0]);
        }
        self.vertices = vertices;
        self.edge_labels = labels;
    }

    /// Clips the polygon by the half-plane through `point` with outward unit `normal`.
    ///
    /// Vertices within `tolerance` of the line count as inside. The new edge
    /// along the line is labelled `label`. Returns `(true, new_max_radius_sq)`
    /// if the polygon was modified, or `(false, 0.0)` if not; the radius is
    /// measured from `generator` when given.
    pub fn clip(
        &mut self,
        point: &[f64; 2],
        normal: &[f64; 2],
        label: i64,
        tolerance: f64,
        scratch: &mut PolygonScratch,
        generator: Option<&[f64; 2]>,
    ) -> (bool, f64) {
        let [px, py] = *point;
        let [nx, ny] = *normal;

        let num_verts = self.len();
        if num_verts < 3 {
            return (false, 0.0);
        }

        scratch.dists.clear();
        scratch.dists.reserve(num_verts);

        let mut all_inside = true;
        let mut all_outside = true;

        for i in 0..num_verts {
            let [vx, vy] = self.point(i);
            let d = (vx - px) * nx + (vy - py) * ny;
            scratch.dists.push(d);

            if d > tolerance {
                all_inside = false;
            } else if d < -tolerance {
                all_outside = false;
            }
        }

        if all_inside {
            return (false, 0.0);
        }
        if all_outside {
            self.vertices.clear();
            self.edge_labels.clear();
            return (true, 0.0);
        }

        scratch.vertices.clear();
        scratch.labels.clear();
        let mut max_d2 = 0.0;
        let mut track = |x: f64, y: f64| {
            if let Some(g) = generator {
                let dx = x - g[0];
                let dy = y - g[1];
                let d2 = dx * dx + dy * dy;
                if d2 > max_d2 {
                    max_d2 = d2;
                }
            }
        };

        for i in 0..num_verts {
            let j = (i + 1) % num_verts;

            let d_i = scratch.dists[i];
            let d_j = scratch.dists[j];
            let edge_label = self.edge_labels[i];
            let [xi, yi] = self.point(i);

            if d_i <= tolerance {
                // V_i is inside
                scratch.vertices.push(xi);
                scratch.vertices.push(yi);
                track(xi, yi);

                if d_j <= tolerance {
                    // V_j is inside: keep edge
                    scratch.labels.push(edge_label);
                } else {
                    // V_j is outside: leaving, the edge from V_i to I keeps its label
                    let [xj, yj] = self.point(j);
                    let t = d_i / (d_i - d_j);
                    let ix = xi + t * (xj - xi);
                    let iy = yi + t * (yj - yi);

                    scratch.labels.push(edge_label);
                    scratch.vertices.push(ix);
                    scratch.vertices.push(iy);
                    track(ix, iy);

                    // The edge starting at I runs along the clipping line.
                    scratch.labels.push(label);
                }
            } else if d_j <= tolerance {
                // V_i outside, V_j inside: entering
                let [xj, yj] = self.point(j);
                let t = d_i / (d_i - d_j);
                let ix = xi + t * (xj - xi);
                let iy = yi + t * (yj - yi);

                scratch.vertices.push(ix);
                scratch.vertices.push(iy);
                track(ix, iy);

                // The edge from I to V_j keeps its label
                scratch.labels.push(edge_label);
            }
            // Else V_j outside: skip
        }

        std::mem::swap(&mut self.vertices, &mut scratch.vertices);
        std::mem::swap(&mut self.edge_labels, &mut scratch.labels);
        (true, max_d2)
    }
}

/// Area centroid of a simple polygon, or the vertex mean when the area vanishes.
pub fn centroid(points: &[[f64; 2]]) -> [f64; 2] {
    let n = points.len();
    if n == 0 {
        return [0.0, 0.0];
    }

    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut area = 0.0;

    for i in 0..n {
        let [xi, yi] = points[i];
        let [xj, yj] = points[(i + 1) % n];
        let cross = xi * yj - xj * yi;
        area += cross;
        cx += (xi + xj) * cross;
        cy += (yi + yj) * cross;
    }

    if area.abs() < 1e-12 {
        let inv = 1.0 / n as f64;
        let sx: f64 = points.iter().map(|p| p[0]).sum();
        let sy: f64 = points.iter().map(|p| p[1]).sum();
        return [sx * inv, sy * inv];
    }

    let factor = 1.0 / (3.0 * area);
    [cx * factor, cy * factor]
}
