//! Configuration file and polling constants.
//!
//! The config is a plain line-oriented `key = value` file. Unknown keys are
//! ignored, a missing file means defaults, and `#`/`;` start comment lines.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default archive location relative to the game directory.
pub const DEFAULT_ARCHIVE_PATH: &str = "sh2e/sound/adx/voice/voice.afs";

/// Archive entry holding the unused voice-over recording.
pub const DEFAULT_VOICE_INDEX: usize = 119;

/// Highest in-game master volume level.
pub const MAX_VOLUME_LEVEL: u8 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    /// In-game master volume level, 0-15.
    pub volume_level: u8,
    /// When false, segments always play at full volume.
    pub enable_master_volume: bool,
    /// Path to the voice archive.
    pub archive: PathBuf,
    /// Archive entry index to play segments from.
    pub voice_index: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            volume_level: MAX_VOLUME_LEVEL,
            enable_master_volume: true,
            archive: PathBuf::from(DEFAULT_ARCHIVE_PATH),
            voice_index: DEFAULT_VOICE_INDEX,
        }
    }
}

impl Config {
    /// Load config from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse config from string content.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "volume_level" => {
                    let level: u8 = value
                        .parse()
                        .map_err(|_| Error::ConfigParse(format!("invalid volume_level: {value}")))?;
                    config.volume_level = level.min(MAX_VOLUME_LEVEL);
                }
                "enable_master_volume" => {
                    config.enable_master_volume = parse_bool(key, value)?;
                }
                "archive" => {
                    config.archive = PathBuf::from(value);
                }
                "voice_index" => {
                    config.voice_index = value
                        .parse()
                        .map_err(|_| Error::ConfigParse(format!("invalid voice_index: {value}")))?;
                }
                _ => {}
            }
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::ConfigParse(format!("invalid {key}: {value}"))),
    }
}

/// Monitor loop cadence.
///
/// The game exposes no change notifications, so the loop polls: a coarse
/// delay while waiting for the target room and a fine tick while a cutscene
/// is being tracked.
pub mod timing {
    use std::time::Duration;

    /// Delay before the first tick, giving the game time to finish loading.
    pub const STARTUP_DELAY: Duration = Duration::from_secs(3);

    /// Poll interval while outside the target room.
    pub const IDLE_POLL: Duration = Duration::from_secs(5);

    /// Poll interval while armed or tracking a cutscene.
    pub const FINE_TICK: Duration = Duration::from_millis(20);

    /// Minimum elapsed cutscene time before activation is accepted.
    pub const MIN_CUTSCENE_SECS: f32 = 0.5;
}

/// Process-alive check retry configuration.
pub mod retry {
    /// Maximum number of retry attempts for the alive check.
    pub const MAX_READ_RETRIES: u32 = 3;

    /// Delay (in ms) for each retry attempt.
    pub const RETRY_DELAYS_MS: [u64; 3] = [50, 100, 200];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.volume_level, 15);
        assert!(config.enable_master_volume);
        assert_eq!(config.voice_index, 119);
        assert_eq!(config.archive, PathBuf::from(DEFAULT_ARCHIVE_PATH));
    }

    #[test]
    fn test_parse_full() {
        let content = r#"
# comment
volume_level = 8
enable_master_volume = false
archive = data/voice.afs
voice_index = 3
"#;
        let config = Config::parse(content).unwrap();
        assert_eq!(config.volume_level, 8);
        assert!(!config.enable_master_volume);
        assert_eq!(config.archive, PathBuf::from("data/voice.afs"));
        assert_eq!(config.voice_index, 3);
    }

    #[test]
    fn test_volume_level_clamped() {
        let config = Config::parse("volume_level = 200").unwrap();
        assert_eq!(config.volume_level, MAX_VOLUME_LEVEL);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = Config::parse("something_else = 42").unwrap();
        assert_eq!(config.voice_index, DEFAULT_VOICE_INDEX);
    }

    #[test]
    fn test_invalid_value_rejected() {
        assert!(Config::parse("volume_level = loud").is_err());
        assert!(Config::parse("enable_master_volume = maybe").is_err());
    }

    #[test]
    fn test_retry_constants() {
        assert_eq!(retry::MAX_READ_RETRIES as usize, retry::RETRY_DELAYS_MS.len());
    }
}
