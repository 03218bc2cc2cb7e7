use crate::bounds::Boundary;

/// A spatial index based on a uniform grid over the sites.
///
/// Sites are binned once; neighbours are then visited bin by bin in order of
/// increasing distance, so a caller can stop as soon as the remaining bins are
/// too far away to matter.
pub struct SiteGrid {
    /// Number of bins along the X axis.
    pub res_x: usize,
    /// Number of bins along the Y axis.
    pub res_y: usize,
    origin: [f64; 2],
    bin_size: [f64; 2],
    bins: Vec<Vec<usize>>,
    // Bin of each site, as (column, row).
    site_bins: Vec<(usize, usize)>,
    // Bin offsets with a lower bound on the gap to any point of the centre bin.
    rings: Vec<(isize, isize, f64)>,
}

impl SiteGrid {
    /// Creates an empty grid of `nx * ny` bins covering `bounds`.
    pub fn new(nx: usize, ny: usize, bounds: &Boundary) -> Self {
        let nx = nx.max(1);
        let ny = ny.max(1);
        let bin_size = [bounds.length() / nx as f64, bounds.width() / ny as f64];

        let (rx, ry) = (nx as isize, ny as isize);
        let mut rings = Vec::with_capacity(((2 * rx + 1) * (2 * ry + 1)) as usize);
        for dy in -ry..=ry {
            for dx in -rx..=rx {
                let gx = dx.unsigned_abs().saturating_sub(1) as f64 * bin_size[0];
                let gy = dy.unsigned_abs().saturating_sub(1) as f64 * bin_size[1];
                rings.push((dx, dy, gx * gx + gy * gy));
            }
        }
        rings.sort_unstable_by(|a, b| a.2.total_cmp(&b.2).then(a.1.cmp(&b.1)).then(a.0.cmp(&b.0)));

        SiteGrid {
            res_x: nx,
            res_y: ny,
            origin: bounds.min(),
            bin_size,
            bins: vec![Vec::new(); nx * ny],
            site_bins: Vec::new(),
            rings,
        }
    }

    /// Picks a resolution giving roughly `sites_per_bin` sites per bin while
    /// keeping the bins close to square.
    pub fn with_density(count: usize, sites_per_bin: f64, bounds: &Boundary) -> Self {
        let target_bins = (count as f64 / sites_per_bin).max(1.0);
        let aspect = bounds.length() / bounds.width();
        let cap = count.max(1) as f64;
        let nx = (target_bins * aspect).sqrt().ceil().clamp(1.0, cap) as usize;
        let ny = (target_bins / aspect).sqrt().ceil().clamp(1.0, cap) as usize;
        Self::new(nx, ny, bounds)
    }

    /// Column and row of the bin holding `point`, clamped onto the grid.
    fn locate(&self, point: &[f64; 2]) -> (usize, usize) {
        let column = ((point[0] - self.origin[0]) / self.bin_size[0]).floor();
        let row = ((point[1] - self.origin[1]) / self.bin_size[1]).floor();
        (
            column.clamp(0.0, (self.res_x - 1) as f64) as usize,
            row.clamp(0.0, (self.res_y - 1) as f64) as usize,
        )
    }

    /// Calculates the linear index of the bin containing `(x, y)`.
    pub fn bin_index(&self, x: f64, y: f64) -> usize {
        let (column, row) = self.locate(&[x, y]);
        column + row * self.res_x
    }

    /// Squared distance from `point` to the rectangle of bin `(column, row)`.
    fn gap_sq(&self, column: usize, row: usize, point: &[f64; 2]) -> f64 {
        let axis_gap = |k: usize, index: usize| {
            let lo = self.origin[k] + index as f64 * self.bin_size[k];
            let hi = lo + self.bin_size[k];
            (lo - point[k]).max(point[k] - hi).max(0.0)
        };
        let gx = axis_gap(0, column);
        let gy = axis_gap(1, row);
        gx * gx + gy * gy
    }

    /// Rebuilds the index for `sites`.
    pub fn set_sites(&mut self, sites: &[[f64; 2]]) {
        self.bins.iter_mut().for_each(Vec::clear);
        self.site_bins = sites.iter().map(|s| self.locate(s)).collect();
        for (i, &(column, row)) in self.site_bins.iter().enumerate() {
            self.bins[column + row * self.res_x].push(i);
        }
    }

    /// Visits candidate neighbours of site `index` located at `pos`.
    ///
    /// Bins are visited while they may hold a site within `2 * sqrt(max_dist_sq)`
    /// of `pos`. The visitor receives the neighbour's index, its position and
    /// the current `max_dist_sq`, and returns the updated value.
    pub fn visit_neighbors<F>(
        &self,
        sites: &[[f64; 2]],
        index: usize,
        pos: [f64; 2],
        max_dist_sq: &mut f64,
        mut visitor: F,
    ) where
        F: FnMut(usize, [f64; 2], f64) -> f64,
    {
        let (column, row) = self.site_bins[index];

        for &(dx, dy, lower_bound) in &self.rings {
            // Sites further than twice the cell radius cannot cut it.
            let reach = 4.0 * *max_dist_sq;
            if lower_bound > reach {
                break;
            }
            let (Some(c), Some(r)) = (column.checked_add_signed(dx), row.checked_add_signed(dy)) else {
                continue;
            };
            if c >= self.res_x || r >= self.res_y || self.gap_sq(c, r, &pos) > reach {
                continue;
            }
            for &j in &self.bins[c + r * self.res_x] {
                if j != index {
                    *max_dist_sq = visitor(j, sites[j], *max_dist_sq);
                }
            }
        }
    }
}
