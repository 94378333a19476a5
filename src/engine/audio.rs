// Audio cue playback
//
// A cue is a short sound that restarts from the beginning every time it is
// played; rapid repeated triggers cut the previous playback off instead of
// queueing behind it.

use std::path::Path;

/// Audio playback errors
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("No audio output device available: {0}")]
    DeviceUnavailable(String),

    #[error("Failed to load cue {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("Playback failed: {0}")]
    Playback(String),
}

/// Something that can play the collision cue
pub trait CuePlayer {
    /// Restart the cue from the beginning at the given volume (0.0..1.0)
    fn play(&mut self, volume: f32) -> Result<(), AudioError>;
}

/// Cue player used when no audio device is wanted or available
#[derive(Debug, Default)]
pub struct SilentCuePlayer;

impl CuePlayer for SilentCuePlayer {
    fn play(&mut self, volume: f32) -> Result<(), AudioError> {
        log::trace!("Collision cue (silent) at volume {:.2}", volume);
        Ok(())
    }
}

/// Open the best available cue player
///
/// Falls back to the silent player when audio support is compiled out or the
/// output device can't be opened.
pub fn open_cue_player(cue_path: Option<&Path>) -> Box<dyn CuePlayer> {
    #[cfg(feature = "audio")]
    {
        match rodio_player::RodioCuePlayer::open(cue_path) {
            Ok(player) => {
                log::info!("Audio output opened");
                return Box::new(player);
            }
            Err(e) => log::warn!("{}; collision sounds disabled", e),
        }
    }

    #[cfg(not(feature = "audio"))]
    if let Some(path) = cue_path {
        log::info!(
            "Built without the `audio` feature, ignoring cue {}",
            path.display()
        );
    }

    Box::new(SilentCuePlayer)
}

#[cfg(feature = "audio")]
mod rodio_player {
    use super::{AudioError, CuePlayer};
    use rodio::source::{SineWave, Source};
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use std::io::Cursor;
    use std::path::Path;
    use std::time::Duration;

    /// Cue player backed by the default system output device
    pub struct RodioCuePlayer {
        // Dropping the stream closes the device, so it lives as long as the player
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sink: Option<Sink>,
        /// Encoded cue file; `None` plays a synthesized click
        cue: Option<Vec<u8>>,
    }

    impl RodioCuePlayer {
        pub fn open(cue_path: Option<&Path>) -> Result<Self, AudioError> {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| AudioError::DeviceUnavailable(e.to_string()))?;

            let cue = match cue_path {
                Some(path) => {
                    let bytes = std::fs::read(path).map_err(|e| AudioError::Load {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    })?;
                    // Fail at startup rather than on the first collision
                    Decoder::new(Cursor::new(bytes.clone())).map_err(|e| AudioError::Load {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    })?;
                    Some(bytes)
                }
                None => None,
            };

            Ok(Self {
                _stream: stream,
                handle,
                sink: None,
                cue,
            })
        }
    }

    impl CuePlayer for RodioCuePlayer {
        fn play(&mut self, volume: f32) -> Result<(), AudioError> {
            // A fresh sink restarts the cue; dropping the old one stops it
            let sink =
                Sink::try_new(&self.handle).map_err(|e| AudioError::Playback(e.to_string()))?;
            sink.set_volume(volume);

            match &self.cue {
                Some(bytes) => {
                    let source = Decoder::new(Cursor::new(bytes.clone()))
                        .map_err(|e| AudioError::Playback(e.to_string()))?;
                    sink.append(source);
                }
                None => {
                    let click = SineWave::new(660.0)
                        .take_duration(Duration::from_millis(60))
                        .fade_in(Duration::from_millis(2))
                        .amplify(0.5);
                    sink.append(click);
                }
            }

            self.sink = Some(sink);
            Ok(())
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_player_never_fails() {
        let mut player = SilentCuePlayer;
        assert!(player.play(0.0).is_ok());
        assert!(player.play(0.99).is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = AudioError::DeviceUnavailable("no ALSA".to_string());
        assert_eq!(err.to_string(), "No audio output device available: no ALSA");
    }

    #[cfg(not(feature = "audio"))]
    #[test]
    fn test_open_without_audio_feature_is_silent() {
        let mut player = open_cue_player(None);
        assert!(player.play(0.5).is_ok());
    }
}
