use js_sys::Array;
use wasm_bindgen::prelude::*;

use crate::error::InvalidInput;
use crate::pitch::{AWAY_COLOR, HOME_COLOR, Pitch, Team, Zone};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

fn parse_points(flat: &[f64]) -> Result<Vec<[f64; 2]>, InvalidInput> {
    if flat.len() % 2 != 0 {
        return Err(InvalidInput::UnpairedCoordinates { length: flat.len() });
    }
    Ok(flat.chunks_exact(2).map(|c| [c[0], c[1]]).collect())
}

// --- Zone Wrapper ---

#[wasm_bindgen(js_name = Zone)]
pub struct ZoneWASM {
    inner: Zone<String>,
}

#[wasm_bindgen(js_class = Zone)]
impl ZoneWASM {
    #[wasm_bindgen(getter)]
    pub fn site(&self) -> usize { self.inner.site }
    #[wasm_bindgen(getter)]
    pub fn team(&self) -> usize { self.inner.team }
    #[wasm_bindgen(getter)]
    pub fn x(&self) -> f64 { self.inner.position[0] }
    #[wasm_bindgen(getter)]
    pub fn y(&self) -> f64 { self.inner.position[1] }
    #[wasm_bindgen(getter)]
    pub fn color(&self) -> String { self.inner.style.clone() }
    /// Flat `[x, y, x, y, ...]` outline, empty when nothing is visible.
    #[wasm_bindgen(getter)]
    pub fn vertices(&self) -> Vec<f64> {
        self.inner.region.vertices().iter().flat_map(|p| [p[0], p[1]]).collect()
    }
    #[wasm_bindgen(getter, js_name = isEmpty)]
    pub fn is_empty(&self) -> bool { self.inner.region.is_empty() }
    pub fn area(&self) -> f64 { self.inner.region.area() }
}

// --- Pitch ---

#[wasm_bindgen]
pub struct PitchVoronoi {
    pitch: Pitch,
    teams: Option<[Team<String>; 2]>,
    zones: Vec<Zone<String>>,
}

#[wasm_bindgen]
impl PitchVoronoi {
    #[wasm_bindgen(constructor)]
    pub fn new(length: f64, width: f64) -> Result<PitchVoronoi, JsError> {
        Ok(PitchVoronoi {
            pitch: Pitch::new(length, width)?,
            teams: None,
            zones: Vec::new(),
        })
    }

    /// Sets both teams from flat `[x, y, ...]` arrays.
    ///
    /// An array of odd length is rejected and the previous teams are kept.
    #[wasm_bindgen(js_name = setPlayers)]
    pub fn set_players(
        &mut self,
        team1: &[f64],
        team2: &[f64],
        team1_color: Option<String>,
        team2_color: Option<String>,
    ) -> Result<(), JsError> {
        let home = parse_points(team1)?;
        let away = parse_points(team2)?;
        self.teams = Some([
            Team::new(home, team1_color.unwrap_or_else(|| HOME_COLOR.to_string())),
            Team::new(away, team2_color.unwrap_or_else(|| AWAY_COLOR.to_string())),
        ]);
        self.zones.clear();
        Ok(())
    }

    pub fn calculate(&mut self) -> Result<(), JsError> {
        let teams = self
            .teams
            .as_ref()
            .ok_or_else(|| JsError::new("Please call set_players() first"))?;
        self.zones = self.pitch.zones(teams)?;
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> f64 { self.pitch.length() }
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> f64 { self.pitch.width() }
    #[wasm_bindgen(getter)]
    pub fn count(&self) -> usize { self.zones.len() }

    #[wasm_bindgen(js_name = getZone)]
    pub fn get_zone(&self, index: usize) -> Option<ZoneWASM> {
        self.zones.get(index).map(|z| ZoneWASM { inner: z.clone() })
    }

    #[wasm_bindgen(getter)]
    pub fn zones(&self) -> Array {
        self.zones
            .iter()
            .map(|z| JsValue::from(ZoneWASM { inner: z.clone() }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_points_pairs_coordinates() {
        let points = parse_points(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(points, vec![[1.0, 2.0], [3.0, 4.0]]);
        assert!(parse_points(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_parse_points_rejects_dangling_coordinate() {
        assert_eq!(
            parse_points(&[1.0, 2.0, 3.0]).unwrap_err(),
            InvalidInput::UnpairedCoordinates { length: 3 }
        );
    }
}
