use pitchzones::{build, Boundary, ClippedRegion, VoronoiBuilder};
use proptest::prelude::*;

fn dist_sq(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

/// Sites on the pitch (and a little beyond), at least 0.01 apart.
fn sites_strategy() -> impl Strategy<Value = Vec<[f64; 2]>> {
    prop::collection::vec((-5.0f64..110.0, -5.0f64..73.0), 2..40).prop_map(|raw| {
        let mut sites: Vec<[f64; 2]> = Vec::new();
        for (x, y) in raw {
            let p = [x, y];
            if sites.iter().all(|s| dist_sq(s, &p) > 1e-4) {
                sites.push(p);
            }
        }
        sites
    })
}

/// A handful of sites packed into a patch of `scale` metres somewhere on the pitch.
fn cluster_strategy() -> impl Strategy<Value = Vec<[f64; 2]>> {
    (
        (1.0f64..104.0, 1.0f64..67.0),
        1e-3f64..0.5,
        prop::collection::vec((-1.0f64..1.0, -1.0f64..1.0), 2..8),
    )
        .prop_map(|((cx, cy), scale, offsets)| {
            let mut sites: Vec<[f64; 2]> = Vec::new();
            for (ox, oy) in offsets {
                let p = [cx + ox * scale, cy + oy * scale];
                if sites.iter().all(|s| dist_sq(s, &p).sqrt() > 1e-2 * scale) {
                    sites.push(p);
                }
            }
            sites
        })
}

fn owners_match_nearest(sites: &[[f64; 2]], regions: &[ClippedRegion], p: [f64; 2]) -> Result<(), TestCaseError> {
    let mut d: Vec<(f64, usize)> = sites.iter().enumerate().map(|(i, s)| (dist_sq(s, &p).sqrt(), i)).collect();
    d.sort_by(|a, b| a.0.total_cmp(&b.0));
    // Skip points that sit on a bisector.
    if d.len() > 1 && d[1].0 - d[0].0 < 1e-6 {
        return Ok(());
    }
    let owners: Vec<usize> = (0..regions.len()).filter(|&i| regions[i].contains(&p, 1e-9)).collect();
    prop_assert_eq!(owners, vec![d[0].1], "point {:?}", p);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn regions_partition_the_boundary(sites in sites_strategy()) {
        let boundary = Boundary::default();
        let diagram = build(&sites).unwrap();
        let regions = diagram.clip_all(&boundary);

        prop_assert_eq!(regions.len(), sites.len());
        let total: f64 = regions.iter().map(|r| r.area()).sum();
        prop_assert!((total - boundary.area()).abs() < 1e-6 * boundary.area(), "areas sum to {}", total);
        for region in &regions {
            prop_assert!(region.area() >= 0.0);
            for p in region.vertices() {
                prop_assert!(boundary.contains(p, 1e-7));
            }
        }
    }

    #[test]
    fn points_belong_to_their_nearest_site(
        sites in sites_strategy(),
        points in prop::collection::vec((0.0f64..105.0, 0.0f64..68.0), 16),
    ) {
        let boundary = Boundary::default();
        let diagram = build(&sites).unwrap();
        let regions = diagram.clip_all(&boundary);

        for (x, y) in points {
            owners_match_nearest(&sites, &regions, [x, y])?;
        }
    }

    #[test]
    fn tight_clusters_partition_the_boundary(
        sites in cluster_strategy(),
        points in prop::collection::vec((0.0f64..105.0, 0.0f64..68.0), 16),
    ) {
        let boundary = Boundary::default();
        let plain = build(&sites).unwrap();
        let with_domain = VoronoiBuilder::new().domain(boundary).build(&sites).unwrap();

        for diagram in [&plain, &with_domain] {
            let regions = diagram.clip_all(&boundary);
            let total: f64 = regions.iter().map(|r| r.area()).sum();
            prop_assert!((total - boundary.area()).abs() < 1e-6 * boundary.area(), "areas sum to {}", total);
            for &(x, y) in &points {
                owners_match_nearest(&sites, &regions, [x, y])?;
            }
        }
    }

    #[test]
    fn translated_sites_give_translated_regions(sites in sites_strategy(), dx in -3.0f64..3.0) {
        let boundary = Boundary::default();
        let shifted: Vec<[f64; 2]> = sites.iter().map(|s| [s[0] + dx, s[1]]).collect();
        let wide = Boundary::new([-10.0, 0.0], [115.0, 68.0]).unwrap();

        let a = build(&sites).unwrap().clip_all(&wide);
        let b = build(&shifted).unwrap().clip_all(&Boundary::new([-10.0 + dx, 0.0], [115.0 + dx, 68.0]).unwrap());
        for (ra, rb) in a.iter().zip(&b) {
            prop_assert!((ra.area() - rb.area()).abs() < 1e-6 * boundary.area());
        }
    }
}
