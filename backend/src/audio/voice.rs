//! Self-contained sound voices
//!
//! A voice is one source (oscillator or noise buffer) together with its
//! amplitude envelope. Voices share nothing, so any number can sound at once.

use super::envelope::Envelope;
use std::f64::consts::TAU;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum VoiceSource {
    /// Sine oscillator
    Tone { frequency_hz: f64 },

    /// Pre-generated sample buffer, played once from the start
    Noise { samples: Arc<[f32]> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    pub source: VoiceSource,
    pub envelope: Envelope,
}

impl Voice {
    pub fn tone(frequency_hz: f64, envelope: Envelope) -> Self {
        Self {
            source: VoiceSource::Tone { frequency_hz },
            envelope,
        }
    }

    pub fn noise(samples: Vec<f32>, envelope: Envelope) -> Self {
        Self {
            source: VoiceSource::Noise {
                samples: samples.into(),
            },
            envelope,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.envelope.duration_ms()
    }

    /// Number of samples the voice spans at `sample_rate`
    pub fn frame_count(&self, sample_rate: u32) -> usize {
        (self.duration_ms() * sample_rate as f64 / 1000.0).floor() as usize
    }

    /// Enveloped sample `index` frames after the voice started
    pub fn sample_at(&self, index: usize, sample_rate: u32) -> f32 {
        let t_ms = index as f64 * 1000.0 / sample_rate as f64;
        let raw = match &self.source {
            VoiceSource::Tone { frequency_hz } => (TAU * frequency_hz * t_ms / 1000.0).sin(),
            VoiceSource::Noise { samples } => match samples.get(index) {
                Some(s) => *s as f64,
                None => 0.0,
            },
        };
        (raw * self.envelope.gain_at(t_ms)) as f32
    }

    /// Render the whole voice as mono samples
    ///
    /// # Example
    /// ```
    /// use korotkoff_trainer_core::audio::{Envelope, Voice};
    ///
    /// let voice = Voice::tone(70.0, Envelope::korotkoff(1.0));
    /// let samples = voice.render(44_100);
    /// assert_eq!(samples.len(), 4_410);
    /// assert_eq!(samples[0], 0.0);
    /// ```
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        (0..self.frame_count(sample_rate))
            .map(|i| self.sample_at(i, sample_rate))
            .collect()
    }
}
