//! Platform abstraction layer
//!
//! `GameHost` owns a `World` plus the host-side frame state (held keys,
//! pending click, frame timing) and is shared by the browser binding and
//! the native runner. It turns host events into `TickInput`s:
//! - Key codes in, held-key bitmask out
//! - Timestamps in, clamped `dt` out
//! - One-shot inputs cleared after the tick that consumed them

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::config::GameConfig;
use crate::consts::MAX_FRAME_DT;
use crate::loader::{LoadError, SceneDescription};
use crate::sim::{SimError, TickInput, World, tick};

/// Host setup errors
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Invalid game config: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    World(#[from] SimError),
}

/// A running game driven by host frames
#[derive(Debug)]
pub struct GameHost {
    world: World,
    input: TickInput,
    last_time: Option<f64>,
    // FPS tracking
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl GameHost {
    pub fn new(world: World) -> Self {
        Self {
            world,
            input: TickInput::default(),
            last_time: None,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }

    /// Load the default scene of `scene_json` with an optional JSON config
    pub fn from_json(scene_json: &str, config_json: Option<&str>) -> Result<Self, HostError> {
        let config = match config_json {
            Some(json) => GameConfig::from_json(json)?,
            None => GameConfig::default(),
        };
        let scene = SceneDescription::from_json(scene_json)?.load_default(&config)?;
        Ok(Self::new(World::new(scene, config)?))
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Returns false for codes that aren't bound
    pub fn key_down(&mut self, code: &str) -> bool {
        self.input.keys.set_code(code, true)
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.input.keys.set_code(code, false)
    }

    /// Queue a drop for the next tick
    pub fn click(&mut self) {
        self.input.drop = true;
    }

    /// Pointer lock gained/lost. Held keys are forgotten on release.
    pub fn set_active(&mut self, active: bool) {
        if !active {
            self.input = TickInput::default();
        }
        self.world.set_active(active);
    }

    /// Advance by a host timestamp in milliseconds.
    ///
    /// The first frame only records the timestamp.
    pub fn frame(&mut self, time_ms: f64) {
        let dt = match self.last_time {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_time = Some(time_ms);

        self.frame_times[self.frame_index] = time_ms;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 && time_ms > oldest {
            self.fps = (60_000.0 / (time_ms - oldest)).round() as u32;
        }

        if dt > 0.0 {
            self.step(dt);
        }
    }

    /// Advance by `dt` seconds, clamped to `MAX_FRAME_DT`
    pub fn step(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        tick(&mut self.world, &self.input, dt);
        // Clear one-shot inputs after processing
        self.input.drop = false;
    }
}
