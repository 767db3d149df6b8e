//! Browser binding
//!
//! JS owns the canvas, pointer lock and the render loop; it forwards
//! `KeyboardEvent.code` strings, clicks, lock changes and
//! `requestAnimationFrame` timestamps, and reads back world matrices.

use wasm_bindgen::prelude::*;

use super::GameHost;

#[wasm_bindgen]
pub struct WebGame {
    host: GameHost,
}

#[wasm_bindgen]
impl WebGame {
    /// Build a game from a scene description and an optional config (JSON)
    #[wasm_bindgen(constructor)]
    pub fn new(scene_json: &str, config_json: Option<String>) -> Result<WebGame, JsValue> {
        let host = GameHost::from_json(scene_json, config_json.as_deref())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        log::info!("WebGame created");
        Ok(Self { host })
    }

    pub fn key_down(&mut self, code: &str) -> bool {
        self.host.key_down(code)
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.host.key_up(code)
    }

    pub fn click(&mut self) {
        self.host.click();
    }

    pub fn set_active(&mut self, active: bool) {
        self.host.set_active(active);
    }

    /// Advance to a `requestAnimationFrame` timestamp (ms)
    pub fn frame(&mut self, time_ms: f64) {
        self.host.frame(time_ms);
    }

    /// Advance by an explicit `dt` (seconds)
    pub fn tick(&mut self, dt: f32) {
        self.host.step(dt);
    }

    pub fn score(&self) -> f64 {
        self.host.world().score as f64
    }

    pub fn fps(&self) -> u32 {
        self.host.fps()
    }

    /// Column-major world matrices of attached nodes, 16 floats each
    pub fn world_matrices(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(self.host.world().world_matrices().as_slice())
    }

    /// Mesh index per entry of `world_matrices` (`-1` for none)
    pub fn mesh_ids(&self) -> js_sys::Int32Array {
        js_sys::Int32Array::from(self.host.world().mesh_ids().as_slice())
    }

    /// Index of the player's matrix in `world_matrices`, or -1
    pub fn player_index(&self) -> i32 {
        self.host
            .world()
            .player_index()
            .map_or(-1, |index| index as i32)
    }
}
