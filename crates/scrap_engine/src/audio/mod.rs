//! Audio playback abstraction
//!
//! Playback devices sit behind [`AudioBackend`]. The engine only ever talks to
//! the trait; [`SilentAudio`] tracks playback state without producing sound and
//! stands in wherever no device is available.

use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Handle to a sound loaded by an [`AudioBackend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoundHandle(pub u64);

/// Audio errors
#[derive(Error, Debug)]
pub enum AudioError {
    /// The sound file does not exist
    #[error("Sound file not found: {0}")]
    FileNotFound(PathBuf),

    /// The file exists but could not be decoded
    #[error("Failed to decode sound: {0}")]
    Decode(String),

    /// The handle does not refer to a loaded sound
    #[error("Invalid sound handle: {0:?}")]
    InvalidHandle(SoundHandle),

    /// Backend-specific failure
    #[error("Audio backend error: {0}")]
    Backend(String),
}

/// Audio device interface
pub trait AudioBackend {
    /// Load a sound from disk
    fn load(&mut self, path: &Path) -> Result<SoundHandle, AudioError>;

    /// Start or resume playback
    fn play(&mut self, sound: SoundHandle) -> Result<(), AudioError>;

    /// Pause playback, keeping the position
    fn pause(&mut self, sound: SoundHandle) -> Result<(), AudioError>;

    /// Stop playback and rewind
    fn stop(&mut self, sound: SoundHandle) -> Result<(), AudioError>;

    /// Set the volume, 0.0 to 1.0
    fn set_volume(&mut self, sound: SoundHandle, volume: f32) -> Result<(), AudioError>;

    /// Loop playback when the sound ends
    fn set_looping(&mut self, sound: SoundHandle, looping: bool) -> Result<(), AudioError>;

    /// Whether the sound has played to its end (never true while looping)
    fn is_finished(&self, sound: SoundHandle) -> bool;

    /// Free a loaded sound
    fn unload(&mut self, sound: SoundHandle);

    /// Downcast to the concrete backend type
    fn as_any(&self) -> &dyn Any;

    /// Downcast to the concrete backend type, mutably
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Playback state of a sound in [`SilentAudio`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Loaded, never played or stopped
    Stopped,
    /// Playing
    Playing,
    /// Paused mid-playback
    Paused,
    /// Played to the end
    Finished,
}

#[derive(Debug)]
struct SilentSound {
    path: PathBuf,
    state: PlaybackState,
    volume: f32,
    looping: bool,
}

/// Audio backend that tracks state and plays nothing
#[derive(Debug, Default)]
pub struct SilentAudio {
    sounds: HashMap<SoundHandle, SilentSound>,
    next_handle: u64,
    require_files: bool,
}

impl SilentAudio {
    /// Create a backend that accepts any path
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail [`AudioBackend::load`] for paths that do not exist
    #[must_use]
    pub const fn require_files(mut self) -> Self {
        self.require_files = true;
        self
    }

    /// Playback state of a sound
    pub fn state(&self, sound: SoundHandle) -> Option<PlaybackState> {
        self.sounds.get(&sound).map(|s| s.state)
    }

    /// Volume of a sound
    pub fn volume(&self, sound: SoundHandle) -> Option<f32> {
        self.sounds.get(&sound).map(|s| s.volume)
    }

    /// Path a sound was loaded from
    pub fn path(&self, sound: SoundHandle) -> Option<&Path> {
        self.sounds.get(&sound).map(|s| s.path.as_path())
    }

    /// Simulate a playing sound reaching its end
    ///
    /// Looping sounds keep playing.
    pub fn finish(&mut self, sound: SoundHandle) {
        if let Some(s) = self.sounds.get_mut(&sound) {
            if s.state == PlaybackState::Playing && !s.looping {
                s.state = PlaybackState::Finished;
            }
        }
    }

    /// Number of loaded sounds
    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    /// Whether no sounds are loaded
    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    fn sound_mut(&mut self, sound: SoundHandle) -> Result<&mut SilentSound, AudioError> {
        self.sounds
            .get_mut(&sound)
            .ok_or(AudioError::InvalidHandle(sound))
    }
}

impl AudioBackend for SilentAudio {
    fn load(&mut self, path: &Path) -> Result<SoundHandle, AudioError> {
        if self.require_files && !path.exists() {
            return Err(AudioError::FileNotFound(path.to_path_buf()));
        }
        self.next_handle += 1;
        let handle = SoundHandle(self.next_handle);
        self.sounds.insert(
            handle,
            SilentSound {
                path: path.to_path_buf(),
                state: PlaybackState::Stopped,
                volume: 1.0,
                looping: false,
            },
        );
        log::debug!("Loaded sound {:?} from {}", handle, path.display());
        Ok(handle)
    }

    fn play(&mut self, sound: SoundHandle) -> Result<(), AudioError> {
        self.sound_mut(sound)?.state = PlaybackState::Playing;
        Ok(())
    }

    fn pause(&mut self, sound: SoundHandle) -> Result<(), AudioError> {
        let s = self.sound_mut(sound)?;
        if s.state == PlaybackState::Playing {
            s.state = PlaybackState::Paused;
        }
        Ok(())
    }

    fn stop(&mut self, sound: SoundHandle) -> Result<(), AudioError> {
        self.sound_mut(sound)?.state = PlaybackState::Stopped;
        Ok(())
    }

    fn set_volume(&mut self, sound: SoundHandle, volume: f32) -> Result<(), AudioError> {
        self.sound_mut(sound)?.volume = volume.clamp(0.0, 1.0);
        Ok(())
    }

    fn set_looping(&mut self, sound: SoundHandle, looping: bool) -> Result<(), AudioError> {
        self.sound_mut(sound)?.looping = looping;
        Ok(())
    }

    fn is_finished(&self, sound: SoundHandle) -> bool {
        self.state(sound) == Some(PlaybackState::Finished)
    }

    fn unload(&mut self, sound: SoundHandle) {
        self.sounds.remove(&sound);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
