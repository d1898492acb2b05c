//! Sound playback attached to an entity

use std::path::PathBuf;

use crate::audio::{AudioBackend, AudioError, SoundHandle};
use crate::ecs::{Component, ComponentContext};

#[derive(Debug, Clone, Copy, PartialEq)]
enum AudioCommand {
    Play,
    Pause,
    Stop,
    Volume(f32),
    Looping(bool),
}

/// Plays one sound file through the engine's [`AudioBackend`]
///
/// Playback calls are queued and applied on the next update, so they can be
/// made before the component is attached or while the engine has no audio
/// device yet. Without a device the queue is dropped with a warning.
#[derive(Debug)]
pub struct AudioSource {
    path: Option<PathBuf>,
    sound: Option<SoundHandle>,
    volume: f32,
    looping: bool,
    playing: bool,
    queue: Vec<AudioCommand>,
}

impl Default for AudioSource {
    fn default() -> Self {
        Self {
            path: None,
            sound: None,
            volume: 1.0,
            looping: false,
            playing: false,
            queue: Vec::new(),
        }
    }
}

impl AudioSource {
    /// Source with no sound loaded
    pub fn new() -> Self {
        Self::default()
    }

    /// Source playing the file at `path`
    pub fn from_file(path: impl Into<PathBuf>, looping: bool) -> Self {
        let mut source = Self::new();
        source.load(path, looping);
        source
    }

    /// Switch to the file at `path`; it is opened on the next update
    pub fn load(&mut self, path: impl Into<PathBuf>, looping: bool) {
        self.path = Some(path.into());
        self.looping = looping;
        self.queue.clear();
        self.queue.push(AudioCommand::Stop);
        self.queue.push(AudioCommand::Looping(looping));
    }

    /// Start or resume playback
    pub fn play(&mut self) {
        self.queue.push(AudioCommand::Play);
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.queue.push(AudioCommand::Pause);
    }

    /// Stop playback
    pub fn stop(&mut self) {
        self.queue.push(AudioCommand::Stop);
    }

    /// Set the volume, clamped to `0.0..=1.0`
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.queue.push(AudioCommand::Volume(self.volume));
    }

    /// Volume in `0.0..=1.0`
    pub const fn volume(&self) -> f32 {
        self.volume
    }

    /// Loop playback at the end of the sound
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
        self.queue.push(AudioCommand::Looping(looping));
    }

    /// Whether playback loops
    pub const fn is_looping(&self) -> bool {
        self.looping
    }

    /// Whether the sound was playing at the last update
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Handle of the opened sound
    pub const fn sound(&self) -> Option<SoundHandle> {
        self.sound
    }

    fn open(&mut self, audio: &mut dyn AudioBackend) -> Result<Option<SoundHandle>, AudioError> {
        if self.sound.is_none() {
            if let Some(path) = &self.path {
                let sound = audio.load(path)?;
                audio.set_volume(sound, self.volume)?;
                self.sound = Some(sound);
            }
        }
        Ok(self.sound)
    }

    fn apply(&mut self, command: AudioCommand, audio: &mut dyn AudioBackend) -> Result<(), AudioError> {
        if command == AudioCommand::Stop {
            // A stop after `load` also closes the previous file
            if let Some(sound) = self.sound.take() {
                audio.stop(sound)?;
                audio.unload(sound);
            }
            self.playing = false;
            return Ok(());
        }

        let Some(sound) = self.open(audio)? else {
            log::warn!("AudioSource has no file loaded; {:?} ignored", command);
            return Ok(());
        };
        match command {
            AudioCommand::Play => {
                audio.play(sound)?;
                self.playing = true;
            }
            AudioCommand::Pause => {
                audio.pause(sound)?;
                self.playing = false;
            }
            AudioCommand::Volume(volume) => audio.set_volume(sound, volume)?,
            AudioCommand::Looping(looping) => audio.set_looping(sound, looping)?,
            AudioCommand::Stop => {}
        }
        Ok(())
    }
}

impl Component for AudioSource {
    fn update(&mut self, ctx: &mut ComponentContext<'_>, _delta_time: f32) {
        let Some(audio) = ctx.engine.audio.as_deref_mut() else {
            if !self.queue.is_empty() {
                log::warn!("No audio backend; dropping {} audio commands", self.queue.len());
                self.queue.clear();
            }
            return;
        };

        for command in std::mem::take(&mut self.queue) {
            if let Err(e) = self.apply(command, audio) {
                log::error!("Audio command {:?} failed: {}", command, e);
            }
        }

        if let Some(sound) = self.sound {
            if self.playing && audio.is_finished(sound) {
                self.playing = false;
            }
        }
    }

    fn on_destroy(&mut self, ctx: &mut ComponentContext<'_>) {
        self.queue.clear();
        self.playing = false;
        let (Some(sound), Some(audio)) = (self.sound.take(), ctx.engine.audio.as_deref_mut()) else {
            return;
        };
        if let Err(e) = audio.stop(sound) {
            log::warn!("Failed to stop {:?}: {}", sound, e);
        }
        audio.unload(sound);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{PlaybackState, SilentAudio};
    use crate::core::context::EngineContext;
    use crate::ecs::World;
    use approx::assert_relative_eq;

    fn silent(engine: &mut EngineContext) -> &mut SilentAudio {
        engine
            .audio
            .as_deref_mut()
            .and_then(|audio| audio.as_any_mut().downcast_mut::<SilentAudio>())
            .expect("silent audio backend")
    }

    #[test]
    fn test_queued_play_applied_on_update() {
        let mut world = World::new();
        let mut engine = EngineContext::headless(800, 600).with_audio(Box::new(SilentAudio::new()));
        let entity = world.spawn("music");
        let mut source = AudioSource::from_file("theme.ogg", false);
        source.set_volume(0.4);
        source.play();
        world.add_component(entity, source);

        world.update(0.016, &mut engine);
        let sound = world.get_component::<AudioSource>(entity).unwrap().sound().unwrap();
        assert!(world.get_component::<AudioSource>(entity).unwrap().is_playing());
        assert_eq!(silent(&mut engine).state(sound), Some(PlaybackState::Playing));
        assert_relative_eq!(silent(&mut engine).volume(sound).unwrap(), 0.4);
    }

    #[test]
    fn test_finished_sound_stops_playing() {
        let mut world = World::new();
        let mut engine = EngineContext::headless(800, 600).with_audio(Box::new(SilentAudio::new()));
        let entity = world.spawn("click");
        let mut source = AudioSource::from_file("click.wav", false);
        source.play();
        world.add_component(entity, source);
        world.update(0.016, &mut engine);

        let sound = world.get_component::<AudioSource>(entity).unwrap().sound().unwrap();
        silent(&mut engine).finish(sound);
        world.update(0.016, &mut engine);
        assert!(!world.get_component::<AudioSource>(entity).unwrap().is_playing());
    }

    #[test]
    fn test_without_backend_commands_are_dropped() {
        let mut world = World::new();
        let mut engine = EngineContext::headless(800, 600);
        let entity = world.spawn("mute");
        let mut source = AudioSource::from_file("theme.ogg", true);
        source.play();
        world.add_component(entity, source);

        world.update(0.016, &mut engine);
        let source = world.get_component::<AudioSource>(entity).unwrap();
        assert!(!source.is_playing());
        assert!(source.sound().is_none());
    }

    #[test]
    fn test_destroyed_source_unloads_sound() {
        let mut world = World::new();
        let mut engine = EngineContext::headless(800, 600).with_audio(Box::new(SilentAudio::new()));
        let entity = world.spawn("music");
        let mut source = AudioSource::from_file("theme.ogg", true);
        source.play();
        world.add_component(entity, source);
        world.update(0.016, &mut engine);
        assert_eq!(silent(&mut engine).len(), 1);

        world.destroy(entity);
        world.update(0.016, &mut engine);
        assert!(silent(&mut engine).is_empty());
    }
}
