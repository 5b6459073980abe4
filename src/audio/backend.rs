//! Audio output boundary
//!
//! The mixer talks to a bank of voices through [`AudioBackend`]. Real output
//! goes through `rodio` when the `playback` feature is on; otherwise the
//! silent [`NullBackend`] keeps the mixer logic running without a device.

use super::synth::RenderedSound;

/// Audio backend failures
#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    /// No output device could be opened
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The device rejected a playback request
    #[error("Playback failed: {0}")]
    Playback(String),

    /// Voice index outside the pool
    #[error("Invalid voice index {0}")]
    InvalidVoice(usize),
}

/// A fixed pool of voices, each able to play one sound at a time
pub trait AudioBackend {
    fn voice_count(&self) -> usize;

    fn is_busy(&self, voice: usize) -> bool;

    /// Start `sound` on `voice`, replacing whatever it was playing
    fn play(
        &mut self,
        voice: usize,
        sound: &RenderedSound,
        volume: f32,
        fade_in_ms: u32,
    ) -> Result<(), AudioError>;

    /// Cut a voice immediately
    fn stop(&mut self, voice: usize);

    /// Let the current sound on `voice` fade out over `fade_ms`
    fn fade_out(&mut self, voice: usize, fade_ms: u32);

    /// Advance time-based work (fades); called once per frame
    fn pump(&mut self) {}
}

impl<T: AudioBackend + ?Sized> AudioBackend for Box<T> {
    fn voice_count(&self) -> usize {
        (**self).voice_count()
    }

    fn is_busy(&self, voice: usize) -> bool {
        (**self).is_busy(voice)
    }

    fn play(
        &mut self,
        voice: usize,
        sound: &RenderedSound,
        volume: f32,
        fade_in_ms: u32,
    ) -> Result<(), AudioError> {
        (**self).play(voice, sound, volume, fade_in_ms)
    }

    fn stop(&mut self, voice: usize) {
        (**self).stop(voice)
    }

    fn fade_out(&mut self, voice: usize, fade_ms: u32) {
        (**self).fade_out(voice, fade_ms)
    }

    fn pump(&mut self) {
        (**self).pump()
    }
}

/// Silent backend: accepts everything, every voice always idle
#[derive(Debug, Clone)]
pub struct NullBackend {
    voices: usize,
}

impl NullBackend {
    pub fn new(voices: usize) -> Self {
        Self { voices }
    }
}

impl AudioBackend for NullBackend {
    fn voice_count(&self) -> usize {
        self.voices
    }

    fn is_busy(&self, _voice: usize) -> bool {
        false
    }

    fn play(
        &mut self,
        voice: usize,
        _sound: &RenderedSound,
        _volume: f32,
        _fade_in_ms: u32,
    ) -> Result<(), AudioError> {
        if voice >= self.voices {
            return Err(AudioError::InvalidVoice(voice));
        }
        Ok(())
    }

    fn stop(&mut self, _voice: usize) {}

    fn fade_out(&mut self, _voice: usize, _fade_ms: u32) {}
}

#[cfg(feature = "playback")]
pub use device::RodioBackend;

#[cfg(feature = "playback")]
mod device {
    use std::time::{Duration, Instant};

    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

    use super::{AudioBackend, AudioError, RenderedSound};

    /// A sink being faded out after it lost its voice
    struct Fading {
        sink: Sink,
        start_volume: f32,
        started: Instant,
        length: Duration,
    }

    /// Device output: one `rodio` sink per voice
    pub struct RodioBackend {
        /// Must outlive every sink created from the handle
        _stream: OutputStream,
        handle: OutputStreamHandle,
        voices: Vec<Option<Sink>>,
        fading: Vec<Fading>,
    }

    impl RodioBackend {
        /// Open the default output device
        pub fn open(voices: usize) -> Result<Self, AudioError> {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| AudioError::DeviceUnavailable(e.to_string()))?;
            Ok(Self {
                _stream: stream,
                handle,
                voices: (0..voices).map(|_| None).collect(),
                fading: Vec::new(),
            })
        }
    }

    impl AudioBackend for RodioBackend {
        fn voice_count(&self) -> usize {
            self.voices.len()
        }

        fn is_busy(&self, voice: usize) -> bool {
            self.voices
                .get(voice)
                .and_then(|slot| slot.as_ref())
                .is_some_and(|sink| !sink.empty())
        }

        fn play(
            &mut self,
            voice: usize,
            sound: &RenderedSound,
            volume: f32,
            fade_in_ms: u32,
        ) -> Result<(), AudioError> {
            let slot = self
                .voices
                .get_mut(voice)
                .ok_or(AudioError::InvalidVoice(voice))?;
            if let Some(old) = slot.take() {
                old.stop();
            }
            let sink =
                Sink::try_new(&self.handle).map_err(|e| AudioError::Playback(e.to_string()))?;
            sink.set_volume(volume);
            let source = SamplesBuffer::new(1, sound.sample_rate, sound.samples.clone())
                .fade_in(Duration::from_millis(fade_in_ms as u64));
            sink.append(source);
            *slot = Some(sink);
            Ok(())
        }

        fn stop(&mut self, voice: usize) {
            if let Some(sink) = self.voices.get_mut(voice).and_then(|slot| slot.take()) {
                sink.stop();
            }
        }

        fn fade_out(&mut self, voice: usize, fade_ms: u32) {
            if let Some(sink) = self.voices.get_mut(voice).and_then(|slot| slot.take()) {
                self.fading.push(Fading {
                    start_volume: sink.volume(),
                    sink,
                    started: Instant::now(),
                    length: Duration::from_millis(fade_ms.max(1) as u64),
                });
            }
        }

        fn pump(&mut self) {
            self.fading.retain(|fade| {
                let t = fade.started.elapsed().as_secs_f32() / fade.length.as_secs_f32();
                if t >= 1.0 || fade.sink.empty() {
                    fade.sink.stop();
                    false
                } else {
                    fade.sink.set_volume(fade.start_volume * (1.0 - t));
                    true
                }
            });
        }
    }
}
