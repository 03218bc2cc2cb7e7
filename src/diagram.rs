use std::collections::BTreeSet;

use crate::bounds::Boundary;
use crate::clip::{BoundaryClipper, ClippedRegion};

/// A Voronoi vertex, equidistant from at least three sites.
pub type Vertex = [f64; 2];

/// One end of an [`Edge`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Endpoint {
    /// Index into [`Diagram::vertices`].
    Finite(usize),
    /// The edge runs off to infinity along this unit direction.
    Infinite([f64; 2]),
}

impl Endpoint {
    pub fn is_finite(&self) -> bool {
        matches!(self, Endpoint::Finite(_))
    }
}

/// A piece of the perpendicular bisector between two adjacent sites.
///
/// `endpoints` follow the counter-clockwise order of the cell of `sites[0]`,
/// normally the lower of the two indices. Both endpoints are infinite when the
/// edge spans the whole bisector, which happens for collinear sites.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub sites: [usize; 2],
    pub endpoints: [Endpoint; 2],
}

impl Edge {
    pub fn is_bounded(&self) -> bool {
        self.endpoints.iter().all(Endpoint::is_finite)
    }

    /// The site on the other side of the edge, as seen from `site`.
    pub fn other(&self, site: usize) -> usize {
        if self.sites[0] == site { self.sites[1] } else { self.sites[0] }
    }
}

/// An edge as seen from one cell, oriented counter-clockwise around its site.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HalfEdge {
    pub edge: usize,
    pub neighbor: usize,
    pub start: Endpoint,
    pub end: Endpoint,
}

/// The Voronoi diagram of a set of sites.
///
/// Built once by [`crate::VoronoiBuilder`] and never mutated afterwards, so a
/// shared reference can be clipped from many threads at once.
#[derive(Clone, Debug)]
pub struct Diagram {
    pub(crate) sites: Vec<[f64; 2]>,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,
    // Edge IDs per site in counter-clockwise order.
    pub(crate) cells: Vec<Vec<usize>>,
    // Square the cells were cut from, `None` for a single whole-plane cell.
    pub(crate) far_field: Option<Boundary>,
    pub(crate) relative_epsilon: f64,
    pub(crate) epsilon: f64,
}

impl Diagram {
    pub fn sites(&self) -> &[[f64; 2]] {
        &self.sites
    }

    pub fn site(&self, index: usize) -> [f64; 2] {
        self.sites[index]
    }

    pub fn count_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Absolute tolerance the diagram was built with.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Tolerance relative to the sites' bounding-box diagonal.
    pub fn relative_epsilon(&self) -> f64 {
        self.relative_epsilon
    }

    /// Whether every edge and vertex inside `boundary` is part of the diagram.
    ///
    /// Edges far from the sites are left out unless the diagram was built
    /// with a domain covering `boundary`.
    pub fn covers(&self, boundary: &Boundary) -> bool {
        self.far_field.is_none_or(|far| far.covers(boundary))
    }

    pub fn cell(&self, index: usize) -> Option<Cell<'_>> {
        (index < self.sites.len()).then_some(Cell { diagram: self, site: index })
    }

    pub fn cells(&self) -> impl ExactSizeIterator<Item = Cell<'_>> + '_ {
        (0..self.sites.len()).map(move |site| Cell { diagram: self, site })
    }

    /// Position of a finite endpoint, `None` for rays.
    pub fn endpoint_position(&self, endpoint: Endpoint) -> Option<[f64; 2]> {
        match endpoint {
            Endpoint::Finite(v) => Some(self.vertices[v]),
            Endpoint::Infinite(_) => None,
        }
    }

    /// Midpoint of the two sites and the unit direction of their bisector,
    /// oriented counter-clockwise around `sites[0]`.
    pub fn bisector(&self, edge: &Edge) -> ([f64; 2], [f64; 2]) {
        let a = self.sites[edge.sites[0]];
        let b = self.sites[edge.sites[1]];
        let mid = [0.5 * (a[0] + b[0]), 0.5 * (a[1] + b[1])];
        (mid, ccw_tangent(&a, &b))
    }

    /// Unordered pairs of sites that share an edge, lower index first.
    pub fn adjacency(&self) -> BTreeSet<(usize, usize)> {
        self.edges
            .iter()
            .map(|e| (e.sites[0].min(e.sites[1]), e.sites[0].max(e.sites[1])))
            .collect()
    }

    pub fn neighbors(&self, index: usize) -> Vec<usize> {
        self.cell(index).map(|c| c.neighbors()).unwrap_or_default()
    }

    /// Clips every cell to `boundary`, in site order.
    pub fn clip_all(&self, boundary: &Boundary) -> Vec<ClippedRegion> {
        BoundaryClipper::new(*boundary)
            .epsilon(self.relative_epsilon)
            .clip_all(self)
    }
}

/// A read-only view of one site's cell.
#[derive(Clone, Copy, Debug)]
pub struct Cell<'a> {
    diagram: &'a Diagram,
    site: usize,
}

impl<'a> Cell<'a> {
    pub fn diagram(&self) -> &'a Diagram {
        self.diagram
    }

    pub fn index(&self) -> usize {
        self.site
    }

    pub fn site(&self) -> [f64; 2] {
        self.diagram.sites[self.site]
    }

    pub fn edge_ids(&self) -> &'a [usize] {
        &self.diagram.cells[self.site]
    }

    /// The cell boundary in counter-clockwise order. Unbounded cells start
    /// with the edge coming in from infinity.
    pub fn half_edges(&self) -> impl Iterator<Item = HalfEdge> + 'a {
        let diagram = self.diagram;
        let site = self.site;
        diagram.cells[site].iter().map(move |&id| {
            let edge = &diagram.edges[id];
            let [start, end] = if edge.sites[0] == site {
                edge.endpoints
            } else {
                [edge.endpoints[1], edge.endpoints[0]]
            };
            HalfEdge {
                edge: id,
                neighbor: edge.other(site),
                start,
                end,
            }
        })
    }

    pub fn neighbors(&self) -> Vec<usize> {
        self.half_edges().map(|h| h.neighbor).collect()
    }

    /// A cell without edges covers the whole plane (single-site diagram).
    pub fn is_whole_plane(&self) -> bool {
        self.edge_ids().is_empty()
    }

    pub fn is_bounded(&self) -> bool {
        !self.is_whole_plane() && self.half_edges().all(|h| h.start.is_finite() && h.end.is_finite())
    }

    /// Vertices in counter-clockwise order for a bounded cell.
    pub fn polygon(&self) -> Option<Vec<[f64; 2]>> {
        if !self.is_bounded() {
            return None;
        }
        self.half_edges()
            .map(|h| self.diagram.endpoint_position(h.start))
            .collect()
    }
}

/// Unit direction of the bisector of `a` and `b`, running counter-clockwise
/// around `a`.
pub(crate) fn ccw_tangent(a: &[f64; 2], b: &[f64; 2]) -> [f64; 2] {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let len = dx.hypot(dy);
    [-dy / len, dx / len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ccw_tangent() {
        let t = ccw_tangent(&[0.0, 0.0], &[2.0, 0.0]);
        assert!((t[0] - 0.0).abs() < 1e-12);
        assert!((t[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_edge_other() {
        let e = Edge {
            sites: [1, 4],
            endpoints: [Endpoint::Finite(0), Endpoint::Infinite([0.0, 1.0])],
        };
        assert_eq!(e.other(1), 4);
        assert_eq!(e.other(4), 1);
        assert!(!e.is_bounded());
    }
}
