use std::collections::HashMap;

use log::{debug, trace, warn};
use rayon::prelude::*;

use crate::bounds::Boundary;
use crate::diagram::{ccw_tangent, Diagram, Edge, Endpoint, Vertex};
use crate::error::{Error, InvalidInput, Result};
use crate::grid::SiteGrid;
use crate::polygon::{ConvexPolygon, PolygonScratch};

/// Default tolerance, relative to the diagonal of the sites' bounding box.
///
/// Used for every equality, collinearity and emptiness test.
pub const EPSILON: f64 = 1e-9;

/// Half-size of the far-field square cells start from, in bounding-box diagonals.
///
/// Voronoi vertices further out than this are reported as rays to infinity.
/// The square is grown further when a domain is set, see
/// [`VoronoiBuilder::domain`].
pub const FAR_FIELD_SCALE: f64 = 1e4;

/// Average number of sites per bin of the neighbour search grid.
pub const SITES_PER_BIN: f64 = 2.0;

/// Builds Voronoi diagrams by incremental half-plane intersection.
///
/// Every cell starts as a far-field square around the sites and is clipped by
/// the bisectors of its neighbours, nearest bins first, until no remaining
/// site can reach it.
#[derive(Clone, Copy, Debug)]
pub struct VoronoiBuilder {
    epsilon: f64,
    far_field_scale: f64,
    sites_per_bin: f64,
    domain: Option<Boundary>,
}

impl Default for VoronoiBuilder {
    fn default() -> Self {
        Self {
            epsilon: EPSILON,
            far_field_scale: FAR_FIELD_SCALE,
            sites_per_bin: SITES_PER_BIN,
            domain: None,
        }
    }
}

impl VoronoiBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tolerance relative to the sites' bounding-box diagonal.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn far_field_scale(mut self, scale: f64) -> Self {
        self.far_field_scale = scale;
        self
    }

    pub fn sites_per_bin(mut self, sites_per_bin: f64) -> Self {
        self.sites_per_bin = sites_per_bin;
        self
    }

    /// Guarantees that every edge and vertex inside `domain` is part of the
    /// diagram, however small the spread of the sites is compared to it.
    ///
    /// Without a domain, only the far field around the sites is covered and
    /// cells clipped to a larger boundary take a slower path.
    pub fn domain(mut self, domain: Boundary) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Computes the Voronoi diagram of `sites`.
    ///
    /// Site `i` of the input owns cell `i` of the result.
    pub fn build(&self, sites: &[[f64; 2]]) -> Result<Diagram> {
        self.validate_settings()?;
        if sites.is_empty() {
            return Err(InvalidInput::NoSites.into());
        }
        if let Some((index, site)) = sites
            .iter()
            .enumerate()
            .find(|(_, s)| !(s[0].is_finite() && s[1].is_finite()))
        {
            return Err(InvalidInput::NonFiniteSite { index, position: *site }.into());
        }

        let (min, max) = bounding_box(sites);
        let diagonal = (max[0] - min[0]).hypot(max[1] - min[1]);
        let eps = self.epsilon * diagonal;

        check_duplicates(sites, eps)?;

        if sites.len() == 1 {
            debug!("single site, cell covers the whole plane");
            return Ok(Diagram {
                sites: sites.to_vec(),
                vertices: Vec::new(),
                edges: Vec::new(),
                cells: vec![Vec::new()],
                far_field: None,
                relative_epsilon: self.epsilon,
                epsilon: eps,
            });
        }

        let center = [0.5 * (min[0] + max[0]), 0.5 * (min[1] + max[1])];
        let mut half = self.far_field_scale * diagonal;
        if let Some(domain) = &self.domain {
            let reach = domain
                .corners()
                .iter()
                .map(|c| (c[0] - center[0]).abs().max((c[1] - center[1]).abs()))
                .fold(0.0, f64::max);
            half = half.max(2.0 * reach);
        }
        let far_field = Boundary {
            min: [center[0] - half, center[1] - half],
            max: [center[0] + half, center[1] + half],
        };

        // Collinear sites give a flat box; pad it so the grid has area.
        let pad = 1e-3 * diagonal;
        let grid_bounds = Boundary {
            min: [min[0] - pad, min[1] - pad],
            max: [max[0] + pad, max[1] + pad],
        };
        let mut grid = SiteGrid::with_density(sites.len(), self.sites_per_bin, &grid_bounds);
        grid.set_sites(sites);

        debug!(
            "building diagram for {} sites: grid {}x{}, eps {:e}, far field +/-{:e}",
            sites.len(),
            grid.res_x,
            grid.res_y,
            eps,
            half
        );

        let polygons: Vec<ConvexPolygon> = (0..sites.len())
            .into_par_iter()
            .map_init(PolygonScratch::default, |scratch, i| {
                site_polygon(sites, i, &far_field, &grid, eps, scratch)
            })
            .collect();

        let mut diagram = assemble(sites, &polygons, self.epsilon, eps)?;
        diagram.far_field = Some(far_field);
        debug!(
            "diagram built: {} vertices, {} edges",
            diagram.vertices.len(),
            diagram.edges.len()
        );
        Ok(diagram)
    }

    fn validate_settings(&self) -> Result<()> {
        let settings = [
            ("epsilon", self.epsilon),
            ("far_field_scale", self.far_field_scale),
            ("sites_per_bin", self.sites_per_bin),
        ];
        for (name, value) in settings {
            if !(value.is_finite() && value > 0.0) {
                return Err(InvalidInput::InvalidTolerance { name, value }.into());
            }
        }
        Ok(())
    }
}

/// Builds the diagram of `sites` with default settings.
pub fn build(sites: &[[f64; 2]]) -> Result<Diagram> {
    VoronoiBuilder::default().build(sites)
}

fn bounding_box(sites: &[[f64; 2]]) -> ([f64; 2], [f64; 2]) {
    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];
    for s in sites {
        for k in 0..2 {
            min[k] = min[k].min(s[k]);
            max[k] = max[k].max(s[k]);
        }
    }
    (min, max)
}

/// Fails on the first pair of sites within `eps` of each other, reported in
/// input order.
fn check_duplicates(sites: &[[f64; 2]], eps: f64) -> Result<()> {
    let mut order: Vec<usize> = (0..sites.len()).collect();
    order.sort_unstable_by(|&a, &b| {
        sites[a][0]
            .total_cmp(&sites[b][0])
            .then(sites[a][1].total_cmp(&sites[b][1]))
            .then(a.cmp(&b))
    });

    for (k, &a) in order.iter().enumerate() {
        for &b in &order[k + 1..] {
            if sites[b][0] - sites[a][0] > eps {
                break;
            }
            let d = (sites[b][0] - sites[a][0]).hypot(sites[b][1] - sites[a][1]);
            if d <= eps {
                return Err(Error::DuplicateSite {
                    first: a.min(b),
                    second: a.max(b),
                    position: sites[a.min(b)],
                });
            }
        }
    }
    Ok(())
}

/// Clips the far-field square down to the cell of site `i`.
fn site_polygon(
    sites: &[[f64; 2]],
    i: usize,
    far_field: &Boundary,
    grid: &SiteGrid,
    eps: f64,
    scratch: &mut PolygonScratch,
) -> ConvexPolygon {
    let site = sites[i];
    let mut cell = ConvexPolygon::new(far_field);
    let mut max_dist_sq = cell.max_radius_sq(&site);

    grid.visit_neighbors(sites, i, site, &mut max_dist_sq, |j, other, cur_dist| {
        let dx = other[0] - site[0];
        let dy = other[1] - site[1];

        // The bisector cannot reach a cell of radius sqrt(cur_dist).
        let dist_sq = dx * dx + dy * dy;
        if dist_sq > 4.0 * cur_dist {
            return cur_dist;
        }

        let len = dist_sq.sqrt();
        let mid = [site[0] + dx * 0.5, site[1] + dy * 0.5];
        let normal = [dx / len, dy / len];

        match cell.clip(&mid, &normal, j as i64, eps, scratch, Some(&site)) {
            (true, new_radius) => new_radius,
            (false, _) => cur_dist,
        }
    });

    cell.dedup(eps);
    trace!("site {}: {} polygon vertices", i, cell.len());
    cell
}

/// Merges vertices that lie within a tolerance of each other.
struct VertexMerger {
    tolerance: f64,
    buckets: HashMap<(i64, i64), Vec<usize>>,
}

impl VertexMerger {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            buckets: HashMap::new(),
        }
    }

    fn key(&self, p: &[f64; 2]) -> (i64, i64) {
        (
            (p[0] / self.tolerance).floor() as i64,
            (p[1] / self.tolerance).floor() as i64,
        )
    }

    fn insert(&mut self, p: [f64; 2], vertices: &mut Vec<Vertex>) -> usize {
        let (kx, ky) = self.key(&p);
        for bx in kx.saturating_sub(1)..=kx.saturating_add(1) {
            for by in ky.saturating_sub(1)..=ky.saturating_add(1) {
                if let Some(ids) = self.buckets.get(&(bx, by)) {
                    for &id in ids {
                        let v = vertices[id];
                        if (v[0] - p[0]).hypot(v[1] - p[1]) <= self.tolerance {
                            return id;
                        }
                    }
                }
            }
        }
        let id = vertices.len();
        vertices.push(p);
        self.buckets.entry((kx, ky)).or_default().push(id);
        id
    }
}

/// Turns the per-site polygons into shared vertices and edges.
fn assemble(
    sites: &[[f64; 2]],
    polygons: &[ConvexPolygon],
    relative_epsilon: f64,
    eps: f64,
) -> Result<Diagram> {
    let mut vertices = Vec::new();
    let mut merger = VertexMerger::new(eps);
    let mut edges: Vec<Edge> = Vec::new();
    let mut edge_ids: HashMap<(usize, usize), usize> = HashMap::new();
    let mut cells = Vec::with_capacity(sites.len());

    for (i, poly) in polygons.iter().enumerate() {
        let m = poly.len();
        if m < 3 {
            return Err(Error::DegenerateGeometry {
                site: i,
                reason: "cell collapsed below three vertices",
            });
        }
        let labels = poly.labels();

        // Start right after the run of far-field sides, if any.
        let first = (0..m)
            .find(|&k| labels[k] >= 0 && labels[(k + m - 1) % m] < 0)
            .unwrap_or(0);

        let mut cell_edges = Vec::new();
        for step in 0..m {
            let k = (first + step) % m;
            if labels[k] < 0 {
                continue;
            }
            let j = labels[k] as usize;
            let key = (i.min(j), i.max(j));
            if let Some(&id) = edge_ids.get(&key) {
                cell_edges.push(id);
                continue;
            }

            let tangent = ccw_tangent(&sites[i], &sites[j]);
            let start = if labels[(k + m - 1) % m] < 0 {
                Endpoint::Infinite([-tangent[0], -tangent[1]])
            } else {
                Endpoint::Finite(merger.insert(poly.point(k), &mut vertices))
            };
            let end = if labels[(k + 1) % m] < 0 {
                Endpoint::Infinite(tangent)
            } else {
                Endpoint::Finite(merger.insert(poly.point((k + 1) % m), &mut vertices))
            };

            // Cells are processed in index order, so `i` is the lower site
            // unless site `j` dropped this edge as degenerate.
            edges.push(Edge {
                sites: [i, j],
                endpoints: [start, end],
            });
            edge_ids.insert(key, edges.len() - 1);
            cell_edges.push(edges.len() - 1);
        }

        if cell_edges.is_empty() {
            return Err(Error::DegenerateGeometry {
                site: i,
                reason: "no bisector bounds the cell",
            });
        }
        cells.push(cell_edges);
    }

    for (id, edge) in edges.iter().enumerate() {
        let [a, b] = edge.sites;
        if !cells[b].contains(&id) || !cells[a].contains(&id) {
            warn!("edge between sites {} and {} is only reported by one of them", a, b);
        }
    }

    Ok(Diagram {
        sites: sites.to_vec(),
        vertices,
        edges,
        cells,
        far_field: None,
        relative_epsilon,
        epsilon: eps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_sites() {
        assert_eq!(build(&[]).unwrap_err(), Error::InvalidInput(InvalidInput::NoSites));
    }

    #[test]
    fn test_non_finite_site() {
        let err = build(&[[1.0, 1.0], [f64::NAN, 2.0]]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidInput(InvalidInput::NonFiniteSite { index: 1, .. })
        ));
    }

    #[test]
    fn test_duplicate_sites_reported_in_input_order() {
        let err = build(&[[5.0, 5.0], [1.0, 1.0], [9.0, 2.0], [1.0, 1.0]]).unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateSite { first: 1, second: 3, position: [1.0, 1.0] }
        );
    }

    #[test]
    fn test_near_duplicate_within_epsilon() {
        let accepted = build(&[[0.0, 0.0], [100.0, 0.0], [50.0, 1e-12]]);
        assert!(accepted.is_ok(), "distinct sites must be accepted");

        let err = build(&[[0.0, 0.0], [100.0, 0.0], [1e-12, 0.0]]).unwrap_err();
        assert!(matches!(err, Error::DuplicateSite { first: 0, second: 2, .. }));
    }

    #[test]
    fn test_invalid_settings() {
        let err = VoronoiBuilder::new().epsilon(0.0).build(&[[0.0, 0.0]]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidInput(InvalidInput::InvalidTolerance { name: "epsilon", .. })
        ));
    }

    #[test]
    fn test_single_site_has_whole_plane_cell() {
        let diagram = build(&[[3.0, 4.0]]).unwrap();
        let cell = diagram.cell(0).unwrap();
        assert!(cell.is_whole_plane());
        assert!(!cell.is_bounded());
        assert!(diagram.edges().is_empty());
    }

    #[test]
    fn test_two_sites_share_one_full_bisector() {
        let diagram = build(&[[20.0, 34.0], [85.0, 34.0]]).unwrap();
        assert_eq!(diagram.edges().len(), 1);
        assert!(diagram.vertices().is_empty());

        let edge = diagram.edges()[0];
        assert_eq!(edge.sites, [0, 1]);
        match edge.endpoints {
            [Endpoint::Infinite(a), Endpoint::Infinite(b)] => {
                // Counter-clockwise around the left site means heading up.
                assert!((a[1] + 1.0).abs() < 1e-12);
                assert!((b[1] - 1.0).abs() < 1e-12);
            }
            other => panic!("expected a full line, got {:?}", other),
        }
        let (mid, _) = diagram.bisector(&edge);
        assert!((mid[0] - 52.5).abs() < 1e-12);
    }

    #[test]
    fn test_square_center_cell_is_bounded() {
        let mut sites = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                sites.push([x as f64 * 10.0, y as f64 * 10.0]);
            }
        }
        let diagram = build(&sites).unwrap();
        let center = diagram.cell(4).unwrap();
        assert!(center.is_bounded());

        let polygon = center.polygon().unwrap();
        assert_eq!(polygon.len(), 4);
        let mut neighbors = center.neighbors();
        neighbors.sort_unstable();
        assert_eq!(neighbors, vec![1, 3, 5, 7]);

        // Corner vertices are shared, not duplicated.
        assert_eq!(diagram.vertices().len(), 4);
    }

    #[test]
    fn test_domain_keeps_distant_vertex_of_tight_cluster() {
        // The three sites meet at (50.002, 10), far beyond the default far field.
        let sites = [[50.0, 60.0], [50.004, 60.0], [50.002, 60.0 + 4e-8]];
        let pitch = Boundary::default();

        let local = build(&sites).unwrap();
        assert!(!local.covers(&pitch));

        let diagram = VoronoiBuilder::new().domain(pitch).build(&sites).unwrap();
        assert!(diagram.covers(&pitch));
        assert!(diagram.adjacency().contains(&(0, 1)));
        // The bisectors are nearly parallel, so the vertex is only located
        // roughly along them.
        assert!(!diagram.vertices().is_empty());
        for v in diagram.vertices() {
            assert!((v[0] - 50.002).abs() < 1e-6, "vertex at {:?}", v);
            assert!((v[1] - 10.0).abs() < 1e-3, "vertex at {:?}", v);
        }
    }

    #[test]
    fn test_vertex_merger() {
        let mut vertices = Vec::new();
        let mut merger = VertexMerger::new(1e-6);
        let a = merger.insert([1.0, 1.0], &mut vertices);
        let b = merger.insert([1.0 + 5e-7, 1.0], &mut vertices);
        let c = merger.insert([1.0 + 5e-6, 1.0], &mut vertices);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(vertices.len(), 2);
    }
}
