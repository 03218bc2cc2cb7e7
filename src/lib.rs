//! # pitchzones
//!
//! `pitchzones` partitions a rectangular pitch into zones of control, one per
//! player, using a from-scratch 2D Voronoi diagram. It can be used from Rust
//! as well as compiled to WebAssembly (WASM).
//!
//! ## Features
//!
//! - **Voronoi diagrams**: [`VoronoiBuilder`] computes vertices, edges and a
//!   counter-clockwise cell per site, with explicit rays for unbounded cells.
//! - **Boundary clipping**: [`BoundaryClipper`] restricts each cell to the
//!   pitch, reporting invisible cells as [`ClippedRegion::Empty`].
//! - **Parallel**: cells are built and clipped in parallel with `rayon`.
//! - **WASM-ready**: `PitchVoronoi` is exported with `wasm-bindgen`.
//!
//! ## Example
//!
//! ```
//! use pitchzones::Pitch;
//!
//! let pitch = Pitch::default(); // 105 x 68
//! let zones = pitch
//!     .zones_for_match(vec![[20.0, 34.0]], vec![[85.0, 34.0]])
//!     .unwrap();
//! assert!((zones[0].region.area() - 3570.0).abs() < 1e-6);
//! ```
//!
//! ## Tolerance
//!
//! All comparisons use [`EPSILON`] relative to the scale of the input (the
//! sites' bounding-box diagonal while building, the boundary diagonal while
//! clipping). Tune it with [`VoronoiBuilder::epsilon`] and
//! [`BoundaryClipper::epsilon`].

mod bounds;
mod builder;
mod clip;
mod diagram;
mod error;
mod grid;
mod pitch;
mod polygon;
pub mod wasm;

pub use bounds::Boundary;
pub use bounds::DEFAULT_FIELD_LENGTH;
pub use bounds::DEFAULT_FIELD_WIDTH;
pub use bounds::SIDE_ID_BOTTOM;
pub use bounds::SIDE_ID_LEFT;
pub use bounds::SIDE_ID_RIGHT;
pub use bounds::SIDE_ID_TOP;
pub use builder::build;
pub use builder::VoronoiBuilder;
pub use builder::EPSILON;
pub use builder::FAR_FIELD_SCALE;
pub use clip::clip;
pub use clip::BoundaryClipper;
pub use clip::ClippedRegion;
pub use diagram::Cell;
pub use diagram::Diagram;
pub use diagram::Edge;
pub use diagram::Endpoint;
pub use diagram::HalfEdge;
pub use diagram::Vertex;
pub use error::Error;
pub use error::InvalidInput;
pub use error::Result;
pub use pitch::Pitch;
pub use pitch::Team;
pub use pitch::Zone;
pub use pitch::AWAY_COLOR;
pub use pitch::HOME_COLOR;
pub use polygon::ConvexPolygon;
pub use polygon::PolygonScratch;
