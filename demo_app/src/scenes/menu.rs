use std::cell::Cell;
use std::rc::Rc;

use scrap_engine::prelude::*;

use super::SplashScene;

/// Title, background music and a play button that restarts the splash
#[derive(Default)]
pub struct MenuScene {
    clicks: Rc<Cell<u32>>,
}

impl MenuScene {
    pub const NAME: &'static str = "menu";

    pub fn new() -> Self {
        Self::default()
    }
}

impl Scene for MenuScene {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_initialize(&mut self, ctx: &mut SceneContext<'_>) {
        let background = ctx.world.spawn("background");
        ctx.world.add_component(
            background,
            SpriteRenderer::new()
                .with_color(Color::rgb(0.15, 0.15, 0.2))
                .with_size(Vec2::new(14.0, 10.0)),
        );
        let mut music = AudioSource::from_file("assets/audio/menu.ogg", true);
        music.set_volume(0.6);
        music.play();
        ctx.world.add_component(background, music);

        let title = ctx.world.spawn("title");
        if let Some(transform) = ctx.world.transform_mut(title) {
            transform.set_position(Vec2::new(0.0, 3.0));
        }
        ctx.world
            .add_component(title, Text::new("SCRAP", "assets/fonts/title.ttf"));

        let play = ctx.world.spawn("play");
        let button = Button::new(Vec2::new(3.0, 1.0))
            .with_colors(Color::rgb(0.3, 0.6, 0.3), Color::rgb(0.4, 0.8, 0.4));
        button
            .on_hover
            .connect(|_| log::debug!("Play hovered"))
            .detach();
        let clicks = Rc::clone(&self.clicks);
        let loader = ctx.loader.clone();
        button
            .on_click
            .connect(move |_| {
                clicks.set(clicks.get() + 1);
                loader.load(SplashScene::NAME);
            })
            .detach();
        ctx.world.add_component(play, button);
        ctx.world.add_component(
            play,
            Tween::to(
                TweenTarget::Scale(Vec2::new(1.1, 1.1)),
                0.8,
                Easing::EaseInOutBounce,
            ),
        );
    }

    fn on_update(&mut self, ctx: &mut SceneContext<'_>, _delta_time: f32) {
        if ctx.engine.input.key_down(KeyCode::Enter) {
            ctx.load_scene(SplashScene::NAME);
        }
    }

    fn on_dispose(&mut self) {
        log::info!("Play was clicked {} times", self.clicks.get());
    }
}
