//! Core engine implementation

use crate::{
    application::Application,
    core::{
        config::{ConfigError, EngineConfig},
        context::EngineContext,
    },
    ecs::World,
    foundation::time::FramePacer,
    input::KeyCode,
    platform::{HeadlessWindow, WindowBackend, WindowEvent},
    render::{GraphicsBackend, HeadlessBackend},
    scene::{SceneError, SceneStateMachine},
};
use thiserror::Error;

/// Main engine struct
///
/// The engine owns the window, the engine services, the entity world and the
/// scene state machine, and drives them once per frame:
///
/// 1. wait out the frame budget and advance the timer,
/// 2. pump window events and take the input snapshot,
/// 3. run due scheduler tasks,
/// 4. update the current scene, then the application,
/// 5. render the current scene between `begin_frame` and `end_frame`,
/// 6. present.
pub struct Engine {
    window: Box<dyn WindowBackend>,
    context: EngineContext,
    world: World,
    scenes: SceneStateMachine,
    pacer: FramePacer,
    config: EngineConfig,
    running: bool,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(
        config: EngineConfig,
        window: Box<dyn WindowBackend>,
        backend: Box<dyn GraphicsBackend>,
    ) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");
        config.validate()?;

        let context = EngineContext::from_config(&config, backend);
        let pacer = FramePacer::new(config.timing.target_frame_rate, config.timing.pacing);

        log::info!(
            "Engine ready: '{}' {}x{}",
            config.window.title,
            config.window.width,
            config.window.height
        );
        Ok(Self {
            window,
            context,
            world: World::new(),
            scenes: SceneStateMachine::new(),
            pacer,
            config,
            running: true,
        })
    }

    /// Engine with a [`HeadlessWindow`] and a [`HeadlessBackend`]
    pub fn headless(config: EngineConfig) -> Result<Self, EngineError> {
        let window = HeadlessWindow::new(&config.window);
        Self::new(config, Box::new(window), Box::new(HeadlessBackend::new()))
    }

    /// Run the engine main loop with the given application
    ///
    /// Returns once the window is closed, Escape is pressed or
    /// [`Engine::quit`] is called. Scenes and cached resources are released
    /// before returning, also when initialization fails.
    pub fn run<A: Application>(&mut self, app: &mut A) -> Result<(), EngineError> {
        if let Err(e) = app.initialize(self) {
            self.shutdown();
            return Err(EngineError::ApplicationError(format!("App initialization: {}", e)));
        }

        log::info!("Starting main loop...");
        let mut result = Ok(());
        while self.running {
            if let Err(e) = self.frame(app) {
                result = Err(e);
                break;
            }
        }

        app.cleanup(self);
        self.shutdown();
        log::info!("Engine shutdown complete");
        result
    }

    /// Run a single frame
    pub fn frame<A: Application>(&mut self, app: &mut A) -> Result<(), EngineError> {
        self.pacer.wait();
        self.context.timer.update();
        let delta_time = self.context.timer.delta_time();

        self.handle_window_events();
        if !self.running {
            return Ok(());
        }

        self.context.input.update(self.window.as_ref());
        if self.context.input.key_down(KeyCode::Escape) {
            self.quit();
            return Ok(());
        }

        self.context.scheduler.update(delta_time);
        self.scenes
            .update(delta_time, &mut self.world, &mut self.context);

        app.on_frame(self, delta_time)
            .map_err(|e| EngineError::ApplicationError(format!("App frame: {}", e)))?;

        self.context.renderer.begin_frame(&self.context.camera);
        self.scenes.render(&mut self.world, &mut self.context);
        self.context.renderer.end_frame();

        self.window.present();
        Ok(())
    }

    fn handle_window_events(&mut self) {
        for event in self.window.poll_events() {
            match event {
                WindowEvent::CloseRequested => self.quit(),
                WindowEvent::Resized { width, height } => {
                    if width == 0 || height == 0 {
                        log::debug!("Ignoring resize to {}x{}", width, height);
                        continue;
                    }
                    self.context.renderer.set_viewport(width, height);
                    self.context.camera.set_viewport_size(width, height);
                }
            }
        }
    }

    /// Release scenes, scheduled tasks and every cached texture and mesh
    ///
    /// Called by [`Engine::run`]; safe to call again.
    pub fn shutdown(&mut self) {
        self.scenes.dispose(&mut self.world, &mut self.context);
        self.context.scheduler.dispose();

        let backend = self.context.renderer.backend_mut();
        self.context.textures.release_all(backend);
        self.context.meshes.release_all(backend);
        self.context.font_bitmaps.drain();
        self.running = false;
    }

    /// Free every cached texture and mesh no component holds anymore
    ///
    /// Scene transitions sweep on their own; returns the number of textures
    /// and meshes freed.
    pub fn release_unused(&mut self) -> (usize, usize) {
        self.context.release_unused()
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        if self.running {
            log::info!("Engine shutdown requested");
        }
        self.running = false;
    }

    /// Whether the main loop keeps going
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Load a registered scene immediately
    pub fn load_scene(&mut self, name: &str) -> Result<(), SceneError> {
        self.scenes
            .load_scene(name, &mut self.world, &mut self.context)
    }

    /// Get the scene state machine
    pub const fn scenes(&self) -> &SceneStateMachine {
        &self.scenes
    }

    /// Get mutable access to the scene state machine
    pub fn scenes_mut(&mut self) -> &mut SceneStateMachine {
        &mut self.scenes
    }

    /// Get the entity world
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the entity world
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Get the engine services
    pub const fn context(&self) -> &EngineContext {
        &self.context
    }

    /// Get mutable access to the engine services
    pub fn context_mut(&mut self) -> &mut EngineContext {
        &mut self.context
    }

    /// Get the window
    pub fn window(&self) -> &dyn WindowBackend {
        self.window.as_ref()
    }

    /// Get mutable access to the window
    pub fn window_mut(&mut self) -> &mut dyn WindowBackend {
        self.window.as_mut()
    }

    /// Configuration the engine was created with
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the current frame delta time
    pub const fn delta_time(&self) -> f32 {
        self.context.timer.delta_time()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("context", &self.context)
            .field("world", &self.world)
            .field("scenes", &self.scenes)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Initialization error
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::AppError;
    use crate::render::BackendCall;
    use crate::scene::{Scene, SceneContext};
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn config() -> EngineConfig {
        EngineConfig::default().with_target_frame_rate(0)
    }

    fn headless_window(engine: &mut Engine) -> &mut HeadlessWindow {
        engine
            .window_mut()
            .as_any_mut()
            .downcast_mut::<HeadlessWindow>()
            .expect("headless window")
    }

    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Scene for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn on_initialize(&mut self, _ctx: &mut SceneContext<'_>) {
            self.log.borrow_mut().push(format!("{}:init", self.name));
        }

        fn on_update(&mut self, _ctx: &mut SceneContext<'_>, _delta_time: f32) {
            self.log.borrow_mut().push(format!("{}:update", self.name));
        }

        fn on_dispose(&mut self) {
            self.log.borrow_mut().push(format!("{}:dispose", self.name));
        }
    }

    #[derive(Default)]
    struct TestApp {
        log: Rc<RefCell<Vec<String>>>,
        frames: u32,
        quit_after: Option<u32>,
        fail_init: bool,
        cleaned_up: bool,
    }

    impl Application for TestApp {
        fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
            if self.fail_init {
                return Err(AppError::Custom("no assets".to_string()));
            }
            engine.scenes_mut().add_scene(Recorder {
                name: "main",
                log: Rc::clone(&self.log),
            });
            engine.load_scene("main")?;
            Ok(())
        }

        fn on_frame(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
            self.frames += 1;
            if self.quit_after == Some(self.frames) {
                engine.quit();
            }
            Ok(())
        }

        fn cleanup(&mut self, _engine: &mut Engine) {
            self.cleaned_up = true;
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Engine::headless(config().with_size(0, 0));
        assert!(matches!(result, Err(EngineError::Config(ConfigError::Invalid(_)))));
    }

    #[test]
    fn test_quit_from_frame_hook_ends_loop() {
        let mut engine = Engine::headless(config()).unwrap();
        let mut app = TestApp {
            quit_after: Some(3),
            ..TestApp::default()
        };

        engine.run(&mut app).unwrap();
        assert_eq!(app.frames, 3);
        assert!(app.cleaned_up);
        assert!(!engine.is_running());

        let log = app.log.borrow();
        assert_eq!(log.first().map(String::as_str), Some("main:init"));
        assert_eq!(log.iter().filter(|entry| *entry == "main:update").count(), 3);
        assert_eq!(log.last().map(String::as_str), Some("main:dispose"));
    }

    #[test]
    fn test_close_request_stops_before_update() {
        let mut engine = Engine::headless(config()).unwrap();
        let mut app = TestApp::default();
        app.initialize(&mut engine).unwrap();

        headless_window(&mut engine).request_close();
        engine.frame(&mut app).unwrap();
        assert!(!engine.is_running());
        assert_eq!(app.frames, 0);
    }

    #[test]
    fn test_escape_quits() {
        let mut engine = Engine::headless(config()).unwrap();
        let mut app = TestApp::default();
        app.initialize(&mut engine).unwrap();

        headless_window(&mut engine).set_key(KeyCode::Escape, true);
        engine.frame(&mut app).unwrap();
        assert!(!engine.is_running());
    }

    #[test]
    fn test_resize_updates_viewport_and_camera() {
        let mut engine = Engine::headless(config()).unwrap();
        let mut app = TestApp::default();
        app.initialize(&mut engine).unwrap();

        headless_window(&mut engine).resize(400, 400);
        engine.frame(&mut app).unwrap();
        assert_relative_eq!(engine.context().camera.aspect_ratio(), 1.0);

        let backend = engine.context().headless_backend().unwrap();
        assert!(backend.calls().contains(&BackendCall::SetViewport {
            x: 0,
            y: 0,
            width: 400,
            height: 400
        }));
    }

    #[test]
    fn test_failed_initialization_skips_loop() {
        let mut engine = Engine::headless(config()).unwrap();
        let mut app = TestApp {
            fail_init: true,
            ..TestApp::default()
        };

        let result = engine.run(&mut app);
        assert!(matches!(result, Err(EngineError::ApplicationError(_))));
        assert_eq!(app.frames, 0);
        assert!(!app.cleaned_up);
    }

    #[test]
    fn test_destroyed_sprite_mesh_is_swept() {
        use crate::ecs::components::SpriteRenderer;

        let mut engine = Engine::headless(config()).unwrap();
        let mut app = TestApp::default();
        app.initialize(&mut engine).unwrap();
        let sprite = engine.world_mut().spawn("sprite");
        engine.world_mut().add_component(sprite, SpriteRenderer::new());
        engine.frame(&mut app).unwrap();
        assert_eq!(engine.context().headless_backend().unwrap().vertex_buffer_count(), 1);

        engine.world_mut().destroy(sprite);
        engine.frame(&mut app).unwrap();
        assert!(!engine.world().contains(sprite));
        assert_eq!(engine.release_unused(), (0, 1));
        assert_eq!(engine.context().headless_backend().unwrap().vertex_buffer_count(), 0);
    }

    #[test]
    fn test_shutdown_releases_cached_resources() {
        let mut engine = Engine::headless(config()).unwrap();
        let context = engine.context_mut();
        let texture = context.blank_texture();
        assert!(texture.is_some());
        assert_eq!(context.textures.len(), 1);

        engine.shutdown();
        assert!(engine.context().textures.is_empty());
        assert_eq!(engine.context().headless_backend().unwrap().texture_count(), 0);
    }
}
