//! Error types for the audio, navigation, and shop layers.
//!
//! The synthesizer and the sequencer never hand these to their callers;
//! they are produced internally and consumed by logging. The shop layer
//! returns them so the UI can show them on the status line.

use thiserror::Error;

/// Errors raised while building or playing a whoosh.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The host has no usable audio output.
    #[error("audio capability absent: {0}")]
    CapabilityAbsent(String),

    /// The output device could not be queried.
    #[error("audio device error: {0}")]
    Device(String),

    /// The output stream could not be opened.
    #[error("failed to open audio output: {0}")]
    Stream(#[from] rodio::StreamError),

    /// The rendered buffer could not be handed to the output stream.
    #[error("failed to start playback: {0}")]
    Play(#[from] rodio::PlayError),

    /// Exponential ramps are undefined at or through zero.
    #[error("exponential ramp requires a strictly positive value, got {value}")]
    NonPositiveRamp { value: f32 },

    /// Automation events must be scheduled in time order.
    #[error("automation event at {time}s is earlier than the previous event at {previous}s")]
    RampOutOfOrder { time: f64, previous: f64 },

    /// The sample rate is too low to carry the whoosh's frequencies.
    #[error("sample rate {rate} Hz is below the minimum of {min} Hz")]
    UnsupportedSampleRate { rate: u32, min: u32 },

    /// WAV encoding failed.
    #[error("WAV export failed: {0}")]
    Wav(#[from] hound::Error),
}

/// Errors reported by a navigation host.
///
/// A blocked navigation is not always observable; hosts that can tell
/// (for example, no browser is installed) report it here.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("navigation to {target} was blocked: {reason}")]
    Blocked { target: String, reason: String },
}

/// Errors from the simulated shop.
#[derive(Debug, Error)]
pub enum ShopError {
    #[error("Please login first.")]
    NotLoggedIn,

    #[error("You must follow @{admin} to buy.")]
    NotFollowing { admin: String },

    #[error("Only the admin can do that.")]
    NotAdmin,

    #[error("Enter a username to continue (simulation)")]
    EmptyUsername,

    #[error("Title and price are required")]
    MissingTitleOrPrice,

    #[error("Write a message")]
    EmptyMessage,

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Message not found: {0}")]
    MessageNotFound(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage data is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}
