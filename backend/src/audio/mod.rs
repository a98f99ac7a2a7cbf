//! Korotkoff sound synthesis
//!
//! - **envelope**: attack/decay amplitude shape
//! - **voice**: a single oscillator or noise source with its envelope
//! - **sink**: where voices go (device, offline mixer, or nowhere)
//! - **synth**: builds the two voices of one beat

pub mod envelope;
pub mod sink;
pub mod synth;
pub mod voice;

pub use envelope::Envelope;
pub use sink::{AudioError, AudioSink, MixerSink, NullSink, ScheduledVoice, DEFAULT_SAMPLE_RATE};
pub use synth::SoundSynthesizer;
pub use voice::{Voice, VoiceSource};

#[cfg(feature = "rodio")]
pub use sink::RodioSink;
