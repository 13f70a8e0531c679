//! flameshop - a terminal fan-shop landing page.
//!
//! This library provides the transition sequencer, the procedural whoosh
//! synthesizer, the simulated shop and the TUI state that ties them
//! together.

pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod sequencer;
pub mod shop;
pub mod ui;

// Re-export commonly used types
pub use app::App;
pub use audio::{export_whoosh_wav, WhooshParams, WhooshPlayer};
pub use config::{Config, ShopConfig, Timings};
pub use error::{AudioError, NavigationError, ShopError};
pub use sequencer::{LinkInterceptor, OverlapPolicy, Scheduler, Sequencer};
pub use shop::Shop;
