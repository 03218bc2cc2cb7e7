//! Zones of control for players on a pitch.
//!
//! Players of all teams are stacked into one list of sites (team by team, in
//! the order given), the Voronoi diagram of those sites is built and every
//! cell is clipped to the pitch. The style of a team (usually a colour) is
//! opaque and passed through unchanged for the renderer.

use log::debug;

use crate::bounds::Boundary;
use crate::builder::VoronoiBuilder;
use crate::clip::{BoundaryClipper, ClippedRegion};
use crate::error::Result;

/// Default colour for the first team's zones.
pub const HOME_COLOR: &str = "#ff4444";
/// Default colour for the second team's zones.
pub const AWAY_COLOR: &str = "#3366ff";

/// Players of one team and the style their zones are drawn with.
#[derive(Clone, Debug, PartialEq)]
pub struct Team<T> {
    pub players: Vec<[f64; 2]>,
    pub style: T,
}

impl<T> Team<T> {
    pub fn new(players: Vec<[f64; 2]>, style: T) -> Self {
        Self { players, style }
    }
}

impl Team<&'static str> {
    pub fn home(players: Vec<[f64; 2]>) -> Self {
        Self::new(players, HOME_COLOR)
    }

    pub fn away(players: Vec<[f64; 2]>) -> Self {
        Self::new(players, AWAY_COLOR)
    }
}

/// The zone of control of one player.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Zone<T> {
    /// Index of the player in the stacked list of all players.
    pub site: usize,
    /// Index of the player's team.
    pub team: usize,
    pub position: [f64; 2],
    pub style: T,
    /// An empty region means "draw nothing for this player".
    pub region: ClippedRegion,
}

/// A rectangular pitch `[0, length] x [0, width]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pitch {
    boundary: Boundary,
    builder: VoronoiBuilder,
}

impl Pitch {
    pub fn new(length: f64, width: f64) -> Result<Self> {
        Ok(Self {
            boundary: Boundary::field(length, width)?,
            builder: VoronoiBuilder::default(),
        })
    }

    /// Uses `builder` for the diagram, e.g. to tune the tolerance.
    pub fn with_builder(mut self, builder: VoronoiBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn length(&self) -> f64 {
        self.boundary.length()
    }

    pub fn width(&self) -> f64 {
        self.boundary.width()
    }

    /// Computes one zone per player, in team order then player order.
    ///
    /// Players of different teams standing on the same spot are rejected as
    /// duplicate sites.
    pub fn zones<T: Clone>(&self, teams: &[Team<T>]) -> Result<Vec<Zone<T>>> {
        let sites: Vec<[f64; 2]> = teams.iter().flat_map(|t| t.players.iter().copied()).collect();
        let diagram = self.builder.domain(self.boundary).build(&sites)?;
        let regions = BoundaryClipper::new(self.boundary)
            .epsilon(diagram.relative_epsilon())
            .clip_all(&diagram);

        let owners = teams
            .iter()
            .enumerate()
            .flat_map(|(team, t)| std::iter::repeat(team).take(t.players.len()));

        let zones: Vec<Zone<T>> = owners
            .zip(sites.iter().zip(regions))
            .enumerate()
            .map(|(site, (team, (&position, region)))| Zone {
                site,
                team,
                position,
                style: teams[team].style.clone(),
                region,
            })
            .collect();

        debug!(
            "{} zones on a {} x {} pitch",
            zones.len(),
            self.length(),
            self.width()
        );
        Ok(zones)
    }

    /// Zones for two teams drawn in the default home and away colours.
    pub fn zones_for_match(
        &self,
        home: Vec<[f64; 2]>,
        away: Vec<[f64; 2]>,
    ) -> Result<Vec<Zone<&'static str>>> {
        self.zones(&[Team::home(home), Team::away(away)])
    }
}
