//! Scrap engine demo
//!
//! Shows a splash screen that fades in and hands over to a menu after a short
//! delay. Runs against the headless window and graphics backends for a fixed
//! number of frames, so it works on machines without a display.

mod scenes;

use scrap_engine::audio::SilentAudio;
use scrap_engine::config::{Config, ConfigError};
use scrap_engine::foundation::logging;
use scrap_engine::platform::HeadlessWindow;
use scrap_engine::prelude::*;
use scrap_engine::render::HeadlessBackend;
use thiserror::Error;

use crate::scenes::{MenuScene, SplashScene};

/// Optional configuration file next to the working directory
const CONFIG_PATH: &str = "demo.toml";
/// Frames the headless window presents before it asks to close
const DEMO_FRAMES: u64 = 300;

#[derive(Error, Debug)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

struct DemoApp;

impl Application for DemoApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        engine.context_mut().audio = Some(Box::new(SilentAudio::new()));

        engine.scenes_mut().add_scene(SplashScene::new(1.5));
        engine.scenes_mut().add_scene(MenuScene::new());
        engine.load_scene(SplashScene::NAME)?;
        Ok(())
    }

    fn on_frame(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        let timer = &engine.context().timer;
        if timer.frame_count() % 120 == 0 {
            log::debug!(
                "Frame {}: {:.1} fps, {} entities",
                timer.frame_count(),
                timer.average_fps(),
                engine.world().entity_count()
            );
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        log::info!("Leaving scene {:?}", engine.scenes().current_scene());
    }
}

fn run() -> Result<(), DemoError> {
    let config = EngineConfig::load_or_default(CONFIG_PATH)?.with_title("Scrap Demo");
    let window = HeadlessWindow::new(&config.window).with_frame_limit(DEMO_FRAMES);
    let mut engine = Engine::new(config, Box::new(window), Box::new(HeadlessBackend::new()))?;
    engine.run(&mut DemoApp)?;
    Ok(())
}

fn main() {
    logging::init_with_filter("info");
    log::info!("Starting Scrap demo");

    // Failures are reported through the log; the exit code stays 0
    match run() {
        Ok(()) => log::info!("Demo finished"),
        Err(e) => log::error!("Demo failed: {}", e),
    }
}
