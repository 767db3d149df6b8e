//! Drone Drop entry point
//!
//! On the web the page constructs `platform::web::WebGame` itself; this only
//! installs logging. Natively it flies a scripted route over the bundled demo
//! scene and logs what happened.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }
    log::info!("Drone Drop starting...");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use drone_drop::platform::{GameHost, HostError};

    const DEMO_SCENE: &str = include_str!("../assets/demo_scene.json");
    const FRAME_DT: f32 = 1.0 / 60.0;

    /// (seconds, held key codes, click at phase start)
    const ROUTE: &[(f32, &[&str], bool)] = &[
        (1.0, &["Space"], false),
        (2.0, &["KeyW"], true),
        (0.8, &["KeyD"], false),
        (2.0, &["KeyW", "KeyE"], true),
        (1.5, &[], false),
        (1.0, &["ShiftLeft"], true),
        (3.0, &[], false),
    ];

    pub fn run(config_path: Option<String>) -> Result<(), HostError> {
        let config = match config_path {
            Some(path) => match std::fs::read_to_string(&path) {
                Ok(json) => Some(json),
                Err(e) => {
                    log::warn!("Could not read {}: {}; using defaults", path, e);
                    None
                }
            },
            None => None,
        };
        let mut host = GameHost::from_json(DEMO_SCENE, config.as_deref())?;

        for &(seconds, keys, click) in ROUTE {
            for key in keys {
                host.key_down(key);
            }
            if click {
                host.click();
            }
            let frames = (seconds / FRAME_DT).round() as u32;
            for _ in 0..frames {
                host.step(FRAME_DT);
            }
            for key in keys {
                host.key_up(key);
            }

            let world = host.world();
            log::info!(
                "t={} keys={:?} pos={:?} speed={:.2} props={} score={}",
                world.time_ticks,
                keys,
                world.scene.get(world.player).map(|n| n.translation()),
                world.player_vehicle().map(|v| v.speed()).unwrap_or(0.0),
                world.spawner.live_count(&world.scene),
                world.score
            );
        }

        log::info!("Demo finished with score {}", host.world().score);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Drone Drop (native) starting...");

    if let Err(e) = demo::run(std::env::args().nth(1)) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
