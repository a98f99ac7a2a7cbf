//! Audio output sinks
//!
//! A sink starts voices immediately and never blocks on them. Implementations
//! must let voices overlap: a new voice never cuts off one still sounding.

use super::voice::Voice;
use crate::core::time::Clock;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Error, PartialEq)]
pub enum AudioError {
    #[error("No audio output available")]
    Unavailable,

    #[error("Audio device error: {0}")]
    Device(String),
}

/// Destination for synthesized voices
pub trait AudioSink {
    /// Output sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Start `voice` now, fire-and-forget
    fn play(&mut self, voice: Voice) -> Result<(), AudioError>;
}

/// Sink for environments without sound; every `play` fails with
/// [`AudioError::Unavailable`]
#[derive(Debug, Clone, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn sample_rate(&self) -> u32 {
        DEFAULT_SAMPLE_RATE
    }

    fn play(&mut self, _voice: Voice) -> Result<(), AudioError> {
        Err(AudioError::Unavailable)
    }
}

/// A voice together with the clock reading at which it started
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledVoice {
    pub start_ms: f64,
    pub voice: Voice,
}

/// Offline mixer
///
/// Records every voice with its start time and renders any window of the
/// resulting mix by summing all voices that overlap it. Clones share the
/// same voice list, so a handle kept outside the engine sees what was played.
#[derive(Clone)]
pub struct MixerSink {
    sample_rate: u32,
    clock: Arc<dyn Clock + Send + Sync>,
    voices: Arc<Mutex<Vec<ScheduledVoice>>>,
}

impl MixerSink {
    pub fn new(sample_rate: u32, clock: impl Clock + Send + Sync + 'static) -> Self {
        Self {
            sample_rate,
            clock: Arc::new(clock),
            voices: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of everything played so far
    pub fn voices(&self) -> Vec<ScheduledVoice> {
        match self.voices.lock() {
            Ok(voices) => voices.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn voice_count(&self) -> usize {
        self.voices().len()
    }

    /// Mix `len_ms` of output starting at clock reading `from_ms`
    pub fn render(&self, from_ms: f64, len_ms: f64) -> Vec<f32> {
        let rate = self.sample_rate as f64;
        let frames = (len_ms * rate / 1000.0).floor() as usize;
        let mut out = vec![0.0f32; frames];

        for scheduled in self.voices() {
            let voice_frames = scheduled.voice.frame_count(self.sample_rate);
            let offset = ((scheduled.start_ms - from_ms) * rate / 1000.0).round() as i64;

            for (i, slot) in out.iter_mut().enumerate() {
                let local = i as i64 - offset;
                if local < 0 || local as usize >= voice_frames {
                    continue;
                }
                *slot += scheduled.voice.sample_at(local as usize, self.sample_rate);
            }
        }
        out
    }
}

impl std::fmt::Debug for MixerSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixerSink")
            .field("sample_rate", &self.sample_rate)
            .field("voices", &self.voice_count())
            .finish()
    }
}

impl AudioSink for MixerSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn play(&mut self, voice: Voice) -> Result<(), AudioError> {
        let start_ms = self.clock.now_ms();
        let mut voices = self
            .voices
            .lock()
            .map_err(|_| AudioError::Device("mixer lock poisoned".to_string()))?;
        voices.push(ScheduledVoice { start_ms, voice });
        Ok(())
    }
}

#[cfg(feature = "rodio")]
pub use self::device::RodioSink;

#[cfg(feature = "rodio")]
mod device {
    use super::{AudioError, AudioSink, DEFAULT_SAMPLE_RATE};
    use crate::audio::voice::Voice;
    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    /// Plays voices on the default output device
    ///
    /// Each voice gets its own detached [`Sink`], so overlapping beats are
    /// mixed by rodio rather than queued behind each other.
    pub struct RodioSink {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sample_rate: u32,
    }

    impl RodioSink {
        pub fn try_default() -> Result<Self, AudioError> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()))?;
            Ok(Self {
                _stream: stream,
                handle,
                sample_rate: DEFAULT_SAMPLE_RATE,
            })
        }
    }

    impl AudioSink for RodioSink {
        fn sample_rate(&self) -> u32 {
            self.sample_rate
        }

        fn play(&mut self, voice: Voice) -> Result<(), AudioError> {
            let sink = Sink::try_new(&self.handle).map_err(|e| AudioError::Device(e.to_string()))?;
            sink.append(SamplesBuffer::new(1, self.sample_rate, voice.render(self.sample_rate)));
            sink.detach();
            Ok(())
        }
    }
}
