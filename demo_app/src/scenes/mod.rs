//! Demo scenes

mod menu;
mod splash;

pub use menu::MenuScene;
pub use splash::SplashScene;
