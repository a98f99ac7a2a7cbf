//! Procedural Korotkoff sound
//!
//! Each beat is a 100 ms burst made of two voices started together:
//! a 70 Hz sine "thump" and a quieter white-noise layer, both shaped by the
//! same attack/decay envelope. Nothing carries over between beats.

use super::envelope::Envelope;
use super::sink::AudioSink;
use super::voice::Voice;
use crate::rng::RngManager;
use tracing::debug;

pub const TONE_FREQUENCY_HZ: f64 = 70.0;

/// Noise peak relative to the tone peak
pub const NOISE_LEVEL: f64 = 0.1;

/// Length of the noise buffer in seconds
pub const NOISE_SECONDS: f64 = 0.1;

/// Turns an intensity into sound on an [`AudioSink`]
pub struct SoundSynthesizer {
    sink: Box<dyn AudioSink>,
    noise_rng: RngManager,
}

impl SoundSynthesizer {
    pub fn new(sink: Box<dyn AudioSink>, noise_seed: u64) -> Self {
        Self {
            sink,
            noise_rng: RngManager::new(noise_seed),
        }
    }

    /// Play one Korotkoff beat at `intensity` (clamped to `[0, 1]`)
    ///
    /// Returns immediately. A non-finite intensity plays nothing, and if the
    /// sink cannot play, the beat is dropped.
    pub fn emit(&mut self, intensity: f64) {
        if !intensity.is_finite() {
            debug!(intensity, "non-finite intensity, beat skipped");
            return;
        }
        let intensity = intensity.clamp(0.0, 1.0);
        let sample_rate = self.sink.sample_rate();

        let tone = Voice::tone(TONE_FREQUENCY_HZ, Envelope::korotkoff(intensity));
        let noise = Voice::noise(
            self.noise_buffer(sample_rate),
            Envelope::korotkoff(intensity * NOISE_LEVEL),
        );

        for voice in [tone, noise] {
            if let Err(e) = self.sink.play(voice) {
                debug!(error = %e, "Korotkoff beat dropped");
                return;
            }
        }
    }

    fn noise_buffer(&mut self, sample_rate: u32) -> Vec<f32> {
        let len = (sample_rate as f64 * NOISE_SECONDS) as usize;
        (0..len).map(|_| self.noise_rng.next_signed()).collect()
    }
}

impl std::fmt::Debug for SoundSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundSynthesizer")
            .field("sample_rate", &self.sink.sample_rate())
            .finish()
    }
}
