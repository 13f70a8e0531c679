//! Procedural audio cues.
//!
//! This module synthesizes the transition whoosh from first principles
//! and plays it through rodio. It provides:
//! - Web-Audio-style parameter automation
//! - Offline rendering of the noise and tone layers
//! - Per-playback output sessions with a capability probe
//! - WAV export of a single render

pub mod export;
pub mod param;
pub mod player;
pub mod session;
pub mod whoosh;

pub use export::export_whoosh_wav;
pub use param::AutomationParam;
pub use player::{Cue, WhooshPlayer};
pub use session::{AudioBackend, Capability, NullBackend, OutputSession, RodioBackend};
pub use whoosh::{NoiseBuffer, WhooshGraph, WhooshParams, MIN_SAMPLE_RATE};
