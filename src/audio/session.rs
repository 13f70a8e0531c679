//! Audio output capability and per-playback sessions.
//!
//! A backend is probed before anything is built. When the probe reports
//! the capability as absent, the caller skips synthesis entirely. Each
//! playback opens its own [`OutputSession`]; sessions are never shared or
//! reused and are closed once the sound has finished.

use crate::error::AudioError;
use rodio::buffer::SamplesBuffer;
use rodio::cpal::traits::{DeviceTrait, HostTrait};
use rodio::{OutputStream, OutputStreamHandle};

/// Sample rate assumed when the device does not report one.
pub const FALLBACK_SAMPLE_RATE: u32 = 44_100;

/// Result of probing a backend for audio output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Output is available at the given host sample rate.
    Available { sample_rate: u32 },
    /// Output is unavailable, with a human-readable reason.
    Absent(String),
}

/// A source of audio output sessions.
pub trait AudioBackend {
    /// Reports whether output is available without opening anything.
    fn probe(&self) -> Capability;

    /// Opens a fresh session on the default output device.
    fn open(&self) -> Result<Box<dyn OutputSession>, AudioError>;
}

/// One short-lived connection to the output device.
pub trait OutputSession {
    /// Sample rate the session expects buffers at.
    fn sample_rate(&self) -> u32;

    /// Queues a mono buffer for playback. Returns immediately.
    fn play(&mut self, samples: Vec<f32>) -> Result<(), AudioError>;

    /// Releases the device.
    fn close(self: Box<Self>) -> Result<(), AudioError>;
}

/// Output through rodio on the host's default device.
#[derive(Debug, Default, Clone, Copy)]
pub struct RodioBackend;

impl RodioBackend {
    pub fn new() -> Self {
        Self
    }
}

impl AudioBackend for RodioBackend {
    fn probe(&self) -> Capability {
        let host = rodio::cpal::default_host();
        let Some(device) = host.default_output_device() else {
            return Capability::Absent("no default output device".to_string());
        };
        match device.default_output_config() {
            Ok(config) => Capability::Available {
                sample_rate: config.sample_rate().0,
            },
            Err(e) => Capability::Absent(format!("output device has no usable config: {e}")),
        }
    }

    fn open(&self) -> Result<Box<dyn OutputSession>, AudioError> {
        let sample_rate = match self.probe() {
            Capability::Available { sample_rate } => sample_rate,
            Capability::Absent(reason) => return Err(AudioError::CapabilityAbsent(reason)),
        };
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Box::new(RodioSession {
            _stream: stream,
            handle,
            sample_rate,
        }))
    }
}

/// A rodio output stream kept alive for one whoosh.
struct RodioSession {
    /// Dropping the stream stops output, so it lives as long as the session.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sample_rate: u32,
}

impl OutputSession for RodioSession {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn play(&mut self, samples: Vec<f32>) -> Result<(), AudioError> {
        let source = SamplesBuffer::new(1, self.sample_rate, samples);
        self.handle.play_raw(source)?;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), AudioError> {
        drop(self);
        Ok(())
    }
}

/// A backend with no output at all. Used by `--mute` and headless runs.
#[derive(Debug, Clone)]
pub struct NullBackend {
    reason: String,
}

impl NullBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new("audio output disabled")
    }
}

impl AudioBackend for NullBackend {
    fn probe(&self) -> Capability {
        Capability::Absent(self.reason.clone())
    }

    fn open(&self) -> Result<Box<dyn OutputSession>, AudioError> {
        Err(AudioError::CapabilityAbsent(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_backend_reports_absent() {
        let backend = NullBackend::new("muted");
        assert_eq!(backend.probe(), Capability::Absent("muted".to_string()));
        assert!(matches!(
            backend.open(),
            Err(AudioError::CapabilityAbsent(reason)) if reason == "muted"
        ));
    }
}
