use log::{debug, trace};
use rayon::prelude::*;

use crate::bounds::Boundary;
use crate::builder::EPSILON;
use crate::diagram::{Cell, Diagram};
use crate::polygon::{self, ConvexPolygon, PolygonScratch};

/// The visible part of one cell inside the boundary.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClippedRegion {
    /// Nothing of the cell lies inside the boundary (or only a point or segment does).
    Empty,
    /// A simple polygon in counter-clockwise order.
    Polygon(Vec<[f64; 2]>),
}

impl ClippedRegion {
    pub fn is_empty(&self) -> bool {
        matches!(self, ClippedRegion::Empty)
    }

    /// Polygon vertices, empty for [`ClippedRegion::Empty`].
    pub fn vertices(&self) -> &[[f64; 2]] {
        match self {
            ClippedRegion::Empty => &[],
            ClippedRegion::Polygon(points) => points,
        }
    }

    pub fn area(&self) -> f64 {
        let points = self.vertices();
        let n = points.len();
        let mut area = 0.0;
        for i in 0..n {
            let [xi, yi] = points[i];
            let [xj, yj] = points[(i + 1) % n];
            area += xi * yj - xj * yi;
        }
        0.5 * area
    }

    pub fn centroid(&self) -> Option<[f64; 2]> {
        match self {
            ClippedRegion::Empty => None,
            ClippedRegion::Polygon(points) => Some(polygon::centroid(points)),
        }
    }

    /// Whether `point` lies inside the region or within `tolerance` of its edges.
    pub fn contains(&self, point: &[f64; 2], tolerance: f64) -> bool {
        let points = self.vertices();
        let n = points.len();
        if n < 3 {
            return false;
        }
        (0..n).all(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            let ex = b[0] - a[0];
            let ey = b[1] - a[1];
            let len = ex.hypot(ey);
            // Signed distance to the left of a -> b.
            let side = (ex * (point[1] - a[1]) - ey * (point[0] - a[0])) / len;
            side >= -tolerance
        })
    }
}

/// Restricts cells of a [`Diagram`] to a rectangular boundary.
#[derive(Clone, Copy, Debug)]
pub struct BoundaryClipper {
    boundary: Boundary,
    relative_epsilon: f64,
}

impl BoundaryClipper {
    pub fn new(boundary: Boundary) -> Self {
        Self {
            boundary,
            relative_epsilon: EPSILON,
        }
    }

    /// Sets the tolerance relative to the boundary diagonal.
    pub fn epsilon(mut self, relative_epsilon: f64) -> Self {
        self.relative_epsilon = relative_epsilon;
        self
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn clip(&self, cell: &Cell<'_>) -> ClippedRegion {
        self.clip_with_scratch(cell, &mut PolygonScratch::default())
    }

    /// Clips every cell of `diagram` in parallel, returning regions in site order.
    pub fn clip_all(&self, diagram: &Diagram) -> Vec<ClippedRegion> {
        if !diagram.covers(&self.boundary) {
            debug!("boundary reaches past the far field, unbounded cells are cut by every site");
        }
        let regions: Vec<ClippedRegion> = (0..diagram.count_sites())
            .into_par_iter()
            .map_init(PolygonScratch::default, |scratch, i| match diagram.cell(i) {
                Some(cell) => self.clip_with_scratch(&cell, scratch),
                None => ClippedRegion::Empty,
            })
            .collect();

        debug!(
            "clipped {} cells, {} without a visible region",
            regions.len(),
            regions.iter().filter(|r| r.is_empty()).count()
        );
        regions
    }

    fn clip_with_scratch(&self, cell: &Cell<'_>, scratch: &mut PolygonScratch) -> ClippedRegion {
        let diagonal = self.boundary.diagonal();
        let eps = self.relative_epsilon * diagonal;

        let mut poly = match cell.polygon() {
            // A bounded cell against the four sides of the boundary.
            Some(points) => {
                let labels: Vec<i64> = cell.half_edges().map(|h| h.neighbor as i64).collect();
                let mut poly = ConvexPolygon::from_points(&points, &labels);
                for (point, normal, side) in self.boundary.half_planes() {
                    poly.clip(&point, &normal, side, eps, scratch, None);
                    if poly.is_empty() {
                        break;
                    }
                }
                poly
            }
            // Unbounded cells are the intersection of their edges' half-planes,
            // so the boundary is cut by each bisector instead of truncating rays.
            None => {
                let diagram = cell.diagram();
                let site = cell.site();
                let mut poly = ConvexPolygon::new(&self.boundary);
                if diagram.covers(&self.boundary) {
                    for half in cell.half_edges() {
                        let other = diagram.site(half.neighbor);
                        if !cut_by_bisector(&mut poly, site, other, half.neighbor, eps, scratch) {
                            break;
                        }
                    }
                } else {
                    // Edges beyond the far field are missing, so every site is
                    // tried, nearest first, until none can reach the polygon.
                    let mut others: Vec<(f64, usize)> = (0..diagram.count_sites())
                        .filter(|&j| j != cell.index())
                        .map(|j| (dist_sq(&site, &diagram.site(j)), j))
                        .collect();
                    others.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                    for (d2, j) in others {
                        if d2 > 4.0 * poly.max_radius_sq(&site) {
                            break;
                        }
                        if !cut_by_bisector(&mut poly, site, diagram.site(j), j, eps, scratch) {
                            break;
                        }
                    }
                }
                poly
            }
        };

        poly.dedup(eps);
        if poly.len() < 3 || poly.area() <= eps * diagonal {
            trace!("site {}: no visible region", cell.index());
            return ClippedRegion::Empty;
        }
        ClippedRegion::Polygon(poly.points())
    }
}

fn dist_sq(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

/// Keeps the part of `poly` on the side of `site` of its bisector with
/// `other`. Returns `false` once nothing is left.
fn cut_by_bisector(
    poly: &mut ConvexPolygon,
    site: [f64; 2],
    other: [f64; 2],
    label: usize,
    eps: f64,
    scratch: &mut PolygonScratch,
) -> bool {
    let dx = other[0] - site[0];
    let dy = other[1] - site[1];
    let len = dx.hypot(dy);
    let mid = [site[0] + 0.5 * dx, site[1] + 0.5 * dy];
    poly.clip(&mid, &[dx / len, dy / len], label as i64, eps, scratch, None);
    !poly.is_empty()
}

/// Clips one cell to `boundary` with the default tolerance.
pub fn clip(cell: &Cell<'_>, boundary: &Boundary) -> ClippedRegion {
    BoundaryClipper::new(*boundary).clip(cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;

    fn field() -> Boundary {
        Boundary::default()
    }

    #[test]
    fn test_single_site_gets_whole_boundary() {
        let diagram = build(&[[40.0, 20.0]]).unwrap();
        let region = clip(&diagram.cell(0).unwrap(), &field());
        assert!((region.area() - 7140.0).abs() < 1e-9);
        assert_eq!(region.vertices().len(), 4);
    }

    #[test]
    fn test_cell_outside_boundary_is_empty() {
        // The right-hand site's cell is x > 500, far beyond the pitch.
        let diagram = build(&[[50.0, 30.0], [950.0, 30.0]]).unwrap();
        let regions = diagram.clip_all(&field());
        assert!(!regions[0].is_empty());
        assert!(regions[1].is_empty());
        assert!((regions[0].area() - 7140.0).abs() < 1e-6);
    }

    #[test]
    fn test_bounded_cell_inside_boundary_is_unchanged() {
        let mut sites = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                sites.push([40.0 + x as f64 * 10.0, 20.0 + y as f64 * 10.0]);
            }
        }
        let diagram = build(&sites).unwrap();
        let region = clip(&diagram.cell(4).unwrap(), &field());
        assert!((region.area() - 100.0).abs() < 1e-9);
        assert!(region.contains(&[50.0, 30.0], 0.0));
        assert!(!region.contains(&[56.0, 30.0], 0.0));
    }

    #[test]
    fn test_bounded_cell_straddling_boundary() {
        let sites = [[1.0, 34.0], [-9.0, 34.0], [11.0, 34.0], [1.0, 24.0], [1.0, 44.0]];
        let diagram = build(&sites).unwrap();
        let cell = diagram.cell(0).unwrap();
        assert!(cell.is_bounded());

        // Cell is [-4, 6] x [29, 39]; the pitch keeps x >= 0.
        let region = clip(&cell, &field());
        assert!((region.area() - 60.0).abs() < 1e-9);
        assert!(region.vertices().iter().all(|p| p[0] >= -1e-9));
    }

    #[test]
    fn test_contains_with_tolerance() {
        let region = ClippedRegion::Polygon(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        assert!(region.contains(&[0.5, 0.5], 0.0));
        assert!(region.contains(&[1.0, 0.5], 0.0));
        assert!(!region.contains(&[1.001, 0.5], 0.0));
        assert!(region.contains(&[1.001, 0.5], 0.01));
        assert!(!ClippedRegion::Empty.contains(&[0.5, 0.5], 1.0));
    }
}
