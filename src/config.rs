//! Application configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes. Files are JSON.

use crate::audio::WhooshParams;
use crate::sequencer::{Link, OverlapPolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Delays of the overlay sequences, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Overlay shown → whoosh, for link transitions. Lands the sound's
    /// swell on the overlay animation's peak.
    pub transition_whoosh_delay_ms: u64,
    /// Overlay shown → whoosh, for deep links.
    pub deep_link_whoosh_delay_ms: u64,
    /// Overlay shown → navigation.
    pub navigation_delay_ms: u64,
    /// Navigation (or fallback check) → overlay hidden.
    pub hide_delay_ms: u64,
    /// Deep-link attempt → elapsed-time check.
    pub deep_link_check_delay_ms: u64,
    /// Below this elapsed time at the check, the web fallback opens.
    pub deep_link_threshold_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            transition_whoosh_delay_ms: 280,
            deep_link_whoosh_delay_ms: 220,
            navigation_delay_ms: 1800,
            hide_delay_ms: 900,
            deep_link_check_delay_ms: 900,
            deep_link_threshold_ms: 1500,
        }
    }
}

impl Timings {
    pub fn transition_whoosh_delay(&self) -> Duration {
        Duration::from_millis(self.transition_whoosh_delay_ms)
    }

    pub fn deep_link_whoosh_delay(&self) -> Duration {
        Duration::from_millis(self.deep_link_whoosh_delay_ms)
    }

    pub fn navigation_delay(&self) -> Duration {
        Duration::from_millis(self.navigation_delay_ms)
    }

    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    pub fn deep_link_check_delay(&self) -> Duration {
        Duration::from_millis(self.deep_link_check_delay_ms)
    }

    pub fn deep_link_threshold(&self) -> Duration {
        Duration::from_millis(self.deep_link_threshold_ms)
    }

    /// Upper bound on how long a link transition keeps the overlay up.
    pub fn transition_span(&self) -> Duration {
        self.navigation_delay() + self.hide_delay()
    }
}

/// Identity and storage of the simulated shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Username that gets admin controls (compared case-insensitively).
    pub admin_username: String,
    /// Instagram account used for follow and DM deep links.
    pub instagram_username: String,
    /// Web fallback for the follow button.
    pub follow_url: String,
    /// Web fallback for the DM button.
    pub dm_url: String,
    /// Where the key-value store lives.
    pub storage_path: PathBuf,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            admin_username: "itszflame".to_string(),
            instagram_username: "itszflame".to_string(),
            follow_url: "https://www.instagram.com/itszflame/".to_string(),
            dm_url: "https://ig.me/m/itszflame".to_string(),
            storage_path: PathBuf::from(".flameshop/storage.json"),
        }
    }
}

impl ShopConfig {
    /// The app URI that opens the Instagram profile.
    pub fn instagram_app_uri(&self) -> String {
        format!("instagram://user?username={}", self.instagram_username)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub timings: Timings,
    pub whoosh: WhooshParams,
    /// Overlay messages; one is picked at random per link click.
    pub messages: Vec<String>,
    /// Overlay message for deep links.
    pub deep_link_message: String,
    pub overlap_policy: OverlapPolicy,
    /// Links on the landing page.
    pub links: Vec<Link>,
    pub shop: ShopConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timings: Timings::default(),
            whoosh: WhooshParams::default(),
            messages: [
                "Mission Starting 🚀",
                "Equipping Gear 🔫",
                "Respawning... 💀",
                "Syncing Loadout ⚙️",
                "Booting Shaders ✨",
                "Spawning into match...",
                "Loading Highlights 🎮",
                "Charging Ultimate ⚡",
                "Preparing Stream 🔥",
                "Mission: Acquire Loot 🏆",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            deep_link_message: "Opening Instagram...".to_string(),
            overlap_policy: OverlapPolicy::default(),
            links: vec![
                Link::new("YouTube", "https://www.youtube.com/@itszflame").in_new_tab(),
                Link::new("Discord", "https://discord.gg/itszflame").in_new_tab(),
                Link::new("Twitch", "https://www.twitch.tv/itszflame"),
                Link::new("Shop", "#shop"),
            ],
            shop: ShopConfig::default(),
        }
    }
}

impl Config {
    /// Loads a config file, or the defaults when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not valid config JSON.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = Self::from_json(&json)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_transition_timeline() {
        let timings = Timings::default();
        assert_eq!(timings.transition_span(), Duration::from_millis(2700));
        assert!(timings.transition_whoosh_delay() < timings.navigation_delay());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_json(
            r#"{ "timings": { "navigation_delay_ms": 500 }, "overlap_policy": "supersede" }"#,
        )
        .unwrap();
        assert_eq!(config.timings.navigation_delay_ms, 500);
        assert_eq!(config.timings.hide_delay_ms, 900);
        assert_eq!(config.overlap_policy, OverlapPolicy::Supersede);
        assert_eq!(config.messages.len(), 10);
        assert_eq!(config.whoosh, WhooshParams::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flameshop.json");
        let mut config = Config::default();
        config.deep_link_message = "Opening app...".to_string();
        fs::write(&path, config.to_json().unwrap()).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.json"))).is_err());
    }

    #[test]
    fn test_instagram_app_uri() {
        assert_eq!(
            ShopConfig::default().instagram_app_uri(),
            "instagram://user?username=itszflame"
        );
    }
}
