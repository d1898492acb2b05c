use scrap_engine::prelude::*;

use super::MenuScene;

/// Logo that fades in, then hands over to the menu
pub struct SplashScene {
    duration: f32,
}

impl SplashScene {
    pub const NAME: &'static str = "splash";

    /// Splash shown for `duration` seconds
    pub const fn new(duration: f32) -> Self {
        Self { duration }
    }
}

impl Scene for SplashScene {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_initialize(&mut self, ctx: &mut SceneContext<'_>) {
        let logo = ctx.world.spawn("logo");
        let mut sprite = SpriteRenderer::new()
            .with_color(Color::rgb(0.9, 0.55, 0.2))
            .with_size(Vec2::new(4.0, 2.0));
        sprite.set_opacity(0.0);
        ctx.world.add_component(logo, sprite);
        ctx.world.add_component(
            logo,
            Tween::to(TweenTarget::Fade(1.0), self.duration * 0.5, Easing::EaseOut),
        );

        let loader = ctx.loader.clone();
        ctx.engine
            .scheduler
            .add_delayed_task(move || loader.load(MenuScene::NAME), self.duration);
    }

    fn on_deactivate(&mut self, _ctx: &mut SceneContext<'_>) {
        log::info!("Splash finished");
    }
}
