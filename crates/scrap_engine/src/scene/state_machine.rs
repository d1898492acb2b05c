//! Registry of scenes with one active scene at a time

use std::collections::{HashMap, HashSet};

use crate::core::context::EngineContext;
use crate::ecs::World;
use crate::scene::{Scene, SceneContext, SceneError, SceneLoader, SceneRequest, SceneState};

/// Registration index of a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(pub usize);

struct SceneEntry {
    scene: Box<dyn Scene>,
    state: SceneState,
}

/// Owns the registered scenes and runs transitions between them
#[derive(Default)]
pub struct SceneStateMachine {
    scenes: Vec<SceneEntry>,
    by_name: HashMap<String, usize>,
    /// Names of scenes dropped by `dispose`
    disposed: HashSet<String>,
    current: Option<usize>,
    loader: SceneLoader,
}

impl SceneStateMachine {
    /// Create an empty state machine
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scene; a name that is already registered is rejected
    pub fn add_scene<S: Scene + 'static>(&mut self, scene: S) -> Option<SceneId> {
        self.add_boxed(Box::new(scene))
    }

    /// Register a boxed scene
    pub fn add_boxed(&mut self, scene: Box<dyn Scene>) -> Option<SceneId> {
        let name = scene.name().to_string();
        if self.by_name.contains_key(&name) {
            log::error!("Scene '{}' is already registered", name);
            return None;
        }

        let id = self.scenes.len();
        self.scenes.push(SceneEntry {
            scene,
            state: SceneState::Uninitialized,
        });
        self.disposed.remove(&name);
        self.by_name.insert(name.clone(), id);
        log::debug!("Registered scene '{}' as {}", name, id);
        Some(SceneId(id))
    }

    /// Make the scene named `name` current
    ///
    /// An unknown name leaves the current scene running.
    pub fn load_scene(&mut self, name: &str, world: &mut World, engine: &mut EngineContext) -> Result<(), SceneError> {
        log::info!("Loading scene: {}", name);
        let Some(&target) = self.by_name.get(name) else {
            log::error!("Scene '{}' not found", name);
            return Err(SceneError::NotFound(name.to_string()));
        };
        self.transition(target, world, engine);
        Ok(())
    }

    /// Make the scene at registration index `index` current
    pub fn load_scene_index(&mut self, index: usize, world: &mut World, engine: &mut EngineContext) -> Result<(), SceneError> {
        if index >= self.scenes.len() {
            log::error!("Invalid scene index {} ({} scenes)", index, self.scenes.len());
            return Err(SceneError::IndexOutOfRange {
                index,
                count: self.scenes.len(),
            });
        }
        let name = self.scenes[index].scene.name().to_string();
        self.load_scene(&name, world, engine)
    }

    fn transition(&mut self, target: usize, world: &mut World, engine: &mut EngineContext) {
        if let Some(current) = self.current.take() {
            let entry = &mut self.scenes[current];
            entry
                .scene
                .on_deactivate(&mut SceneContext::new(world, engine, &self.loader));
            entry.state = SceneState::Inactive;
            log::info!("Deactivated scene: {}", entry.scene.name());
        }

        world.dispose(engine);
        let (textures, meshes) = engine.release_unused();
        if textures + meshes > 0 {
            log::debug!("Released {} textures and {} meshes", textures, meshes);
        }

        let entry = &mut self.scenes[target];
        let mut ctx = SceneContext::new(world, engine, &self.loader);
        entry.scene.on_initialize(&mut ctx);
        entry.state = SceneState::Initialized;
        entry.scene.on_activate(&mut ctx);
        entry.state = SceneState::Active;
        self.current = Some(target);
    }

    /// Update the current scene's world, then the scene, then run queued loads
    pub fn update(&mut self, delta_time: f32, world: &mut World, engine: &mut EngineContext) {
        if let Some(current) = self.current {
            world.update(delta_time, engine);
            self.scenes[current]
                .scene
                .on_update(&mut SceneContext::new(world, engine, &self.loader), delta_time);
        }
        self.process_requests(world, engine);
    }

    /// Run every queued scene request in order
    pub fn process_requests(&mut self, world: &mut World, engine: &mut EngineContext) {
        while let Some(request) = self.loader.pop() {
            // Failures are already logged by the load itself
            let _ = match request {
                SceneRequest::Name(name) => self.load_scene(&name, world, engine),
                SceneRequest::Index(index) => self.load_scene_index(index, world, engine),
            };
        }
    }

    /// Render the current scene's world, then the scene
    pub fn render(&mut self, world: &mut World, engine: &mut EngineContext) {
        if let Some(current) = self.current {
            world.render(engine);
            self.scenes[current]
                .scene
                .on_render(&mut SceneContext::new(world, engine, &self.loader));
        }
    }

    /// Free every entity and drop every scene
    ///
    /// Dropped scenes report [`SceneState::Disposed`] until a scene with the
    /// same name is registered again.
    pub fn dispose(&mut self, world: &mut World, engine: &mut EngineContext) {
        world.dispose(engine);
        for mut entry in self.scenes.drain(..) {
            entry.scene.on_dispose();
            log::info!("Disposing scene: {}", entry.scene.name());
            self.disposed.insert(entry.scene.name().to_string());
        }
        self.by_name.clear();
        self.current = None;
        self.loader.clear();
    }

    /// Name of the active scene
    pub fn current_scene(&self) -> Option<&str> {
        self.current.map(|index| self.scenes[index].scene.name())
    }

    /// State of the scene registered under `name`
    pub fn scene_state(&self, name: &str) -> Option<SceneState> {
        match self.by_name.get(name) {
            Some(&index) => Some(self.scenes[index].state),
            None if self.disposed.contains(name) => Some(SceneState::Disposed),
            None => None,
        }
    }

    /// Handle for queueing scene loads
    pub const fn loader(&self) -> &SceneLoader {
        &self.loader
    }

    /// Number of registered scenes
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether no scene is registered
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

impl std::fmt::Debug for SceneStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneStateMachine")
            .field("scenes", &self.scenes.len())
            .field("current", &self.current_scene())
            .field("pending_requests", &self.loader.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::SpriteRenderer;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Tracker {
        log: Rc<RefCell<Vec<String>>>,
        active: Rc<Cell<u32>>,
    }

    struct TestScene {
        name: &'static str,
        tracker: Tracker,
    }

    impl TestScene {
        fn new(name: &'static str, tracker: &Tracker) -> Self {
            Self {
                name,
                tracker: tracker.clone(),
            }
        }

        fn record(&self, event: String) {
            self.tracker.log.borrow_mut().push(event);
        }
    }

    impl Scene for TestScene {
        fn name(&self) -> &str {
            self.name
        }

        fn on_initialize(&mut self, ctx: &mut SceneContext<'_>) {
            self.record(format!("{}.initialize entities={}", self.name, ctx.world.entity_count()));
            ctx.world.spawn(self.name);
        }

        fn on_activate(&mut self, _ctx: &mut SceneContext<'_>) {
            self.tracker.active.set(self.tracker.active.get() + 1);
            assert!(self.tracker.active.get() <= 1, "two scenes active at once");
            self.record(format!("{}.activate", self.name));
        }

        fn on_deactivate(&mut self, ctx: &mut SceneContext<'_>) {
            self.tracker.active.set(self.tracker.active.get() - 1);
            self.record(format!("{}.deactivate entities={}", self.name, ctx.world.entity_count()));
        }

        fn on_update(&mut self, ctx: &mut SceneContext<'_>, _delta_time: f32) {
            if self.name == "A" {
                ctx.load_scene("B");
            }
        }

        fn on_dispose(&mut self) {
            self.record(format!("{}.dispose", self.name));
        }
    }

    fn setup(tracker: &Tracker) -> (SceneStateMachine, World, EngineContext) {
        let mut scenes = SceneStateMachine::new();
        scenes.add_scene(TestScene::new("A", tracker));
        scenes.add_scene(TestScene::new("B", tracker));
        (scenes, World::new(), EngineContext::headless(800, 600))
    }

    #[test]
    fn test_transition_order() {
        let tracker = Tracker::default();
        let (mut scenes, mut world, mut engine) = setup(&tracker);

        scenes.load_scene("A", &mut world, &mut engine).unwrap();
        scenes.load_scene("B", &mut world, &mut engine).unwrap();

        assert_eq!(
            *tracker.log.borrow(),
            vec![
                "A.initialize entities=0",
                "A.activate",
                "A.deactivate entities=1",
                "B.initialize entities=0",
                "B.activate",
            ]
        );
        assert_eq!(scenes.current_scene(), Some("B"));
        assert_eq!(scenes.scene_state("A"), Some(SceneState::Inactive));
        assert_eq!(scenes.scene_state("B"), Some(SceneState::Active));
        assert_eq!(world.find("A"), None);
        assert!(world.find("B").is_some());
    }

    #[test]
    fn test_unknown_scene_keeps_current() {
        let tracker = Tracker::default();
        let (mut scenes, mut world, mut engine) = setup(&tracker);
        scenes.load_scene("A", &mut world, &mut engine).unwrap();

        assert_eq!(
            scenes.load_scene("missing", &mut world, &mut engine),
            Err(SceneError::NotFound("missing".to_string()))
        );
        assert_eq!(scenes.current_scene(), Some("A"));
        assert!(world.find("A").is_some());
    }

    #[test]
    fn test_load_by_index_uses_registration_order() {
        let tracker = Tracker::default();
        let (mut scenes, mut world, mut engine) = setup(&tracker);

        scenes.load_scene_index(1, &mut world, &mut engine).unwrap();
        assert_eq!(scenes.current_scene(), Some("B"));
        assert_eq!(
            scenes.load_scene_index(5, &mut world, &mut engine),
            Err(SceneError::IndexOutOfRange { index: 5, count: 2 })
        );
        assert_eq!(scenes.current_scene(), Some("B"));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let tracker = Tracker::default();
        let (mut scenes, _, _) = setup(&tracker);
        assert!(scenes.add_scene(TestScene::new("A", &tracker)).is_none());
        assert_eq!(scenes.len(), 2);
    }

    #[test]
    fn test_request_from_update_runs_after_update() {
        let tracker = Tracker::default();
        let (mut scenes, mut world, mut engine) = setup(&tracker);
        scenes.load_scene("A", &mut world, &mut engine).unwrap();

        scenes.update(0.016, &mut world, &mut engine);
        assert_eq!(scenes.current_scene(), Some("B"));
        assert!(scenes.loader().is_empty());
    }

    #[test]
    fn test_dispose_drops_every_scene() {
        let tracker = Tracker::default();
        let (mut scenes, mut world, mut engine) = setup(&tracker);
        scenes.load_scene("A", &mut world, &mut engine).unwrap();
        tracker.log.borrow_mut().clear();

        scenes.dispose(&mut world, &mut engine);
        assert_eq!(*tracker.log.borrow(), vec!["A.dispose", "B.dispose"]);
        assert_eq!(scenes.current_scene(), None);
        assert!(scenes.is_empty());
        assert_eq!(world.entity_count(), 0);
        assert_eq!(scenes.scene_state("A"), Some(SceneState::Disposed));
        assert_eq!(scenes.scene_state("B"), Some(SceneState::Disposed));
        assert_eq!(scenes.scene_state("C"), None);
    }

    #[test]
    fn test_reregistered_scene_starts_uninitialized() {
        let tracker = Tracker::default();
        let (mut scenes, mut world, mut engine) = setup(&tracker);
        scenes.dispose(&mut world, &mut engine);

        scenes.add_scene(TestScene::new("A", &tracker));
        assert_eq!(scenes.scene_state("A"), Some(SceneState::Uninitialized));
        assert_eq!(scenes.scene_state("B"), Some(SceneState::Disposed));
    }

    #[test]
    fn test_transition_frees_previous_scene_resources() {
        let tracker = Tracker::default();
        let (mut scenes, mut world, mut engine) = setup(&tracker);
        scenes.load_scene("A", &mut world, &mut engine).unwrap();
        let sprite = world.find("A").unwrap();
        world.add_component(sprite, SpriteRenderer::new());
        world.update(0.016, &mut engine);
        assert_eq!(engine.headless_backend().unwrap().vertex_buffer_count(), 1);

        scenes.load_scene("B", &mut world, &mut engine).unwrap();
        assert!(engine.meshes.is_empty());
        assert_eq!(engine.headless_backend().unwrap().vertex_buffer_count(), 0);
    }
}
