use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::RadioError;
use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub stations: StationsConfig,
    #[serde(default)]
    pub bookmarks: BookmarksConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub mixer: MixerConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Gamepad timing and stick thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// evdev node to read, e.g. `/dev/input/event3`.  Auto-detected when unset.
    #[serde(default)]
    pub device: Option<PathBuf>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// How long after pressing Select an A/B press still counts as "save".
    #[serde(default = "default_bookmark_save_window_secs")]
    pub bookmark_save_window_secs: u64,
    #[serde(default = "default_axis_low")]
    pub axis_low_threshold: i32,
    #[serde(default = "default_axis_high")]
    pub axis_high_threshold: i32,
}

/// Station list sources.  The custom file, when it holds any station,
/// replaces the default file entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationsConfig {
    #[serde(default = "default_custom_stations")]
    pub custom_file: PathBuf,
    #[serde(default = "default_default_stations")]
    pub default_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarksConfig {
    #[serde(default = "default_bookmarks_file")]
    pub file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_binary")]
    pub binary: String,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: String,
    /// Maximum demux delay in microseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay: String,
    #[serde(default = "default_stop_timeout_secs")]
    pub stop_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixerConfig {
    #[serde(default = "default_mixer_binary")]
    pub binary: String,
    #[serde(default = "default_mixer_control")]
    pub control: String,
    #[serde(default = "default_volume_step")]
    pub step: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_speech_binary")]
    pub binary: String,
}

/// Select-held stick actions for appliance maintenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_update_script")]
    pub update_script: PathBuf,
    /// Pause between the reboot announcement and the reboot itself.
    #[serde(default = "default_reboot_delay_secs")]
    pub reboot_delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_true")]
    pub wait_on_startup: bool,
    #[serde(default = "default_check_url")]
    pub check_url: String,
    #[serde(default = "default_network_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl InputConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn bookmark_save_window(&self) -> Duration {
        Duration::from_secs(self.bookmark_save_window_secs)
    }
}

impl PlayerConfig {
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            device: None,
            debounce_ms: default_debounce_ms(),
            bookmark_save_window_secs: default_bookmark_save_window_secs(),
            axis_low_threshold: default_axis_low(),
            axis_high_threshold: default_axis_high(),
        }
    }
}

impl Default for StationsConfig {
    fn default() -> Self {
        Self {
            custom_file: default_custom_stations(),
            default_file: default_default_stations(),
        }
    }
}

impl Default for BookmarksConfig {
    fn default() -> Self {
        Self {
            file: default_bookmarks_file(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            binary: default_player_binary(),
            buffer_size: default_buffer_size(),
            max_delay: default_max_delay(),
            stop_timeout_secs: default_stop_timeout_secs(),
        }
    }
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            binary: default_mixer_binary(),
            control: default_mixer_control(),
            step: default_volume_step(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            binary: default_speech_binary(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            service_name: default_service_name(),
            update_script: default_update_script(),
            reboot_delay_secs: default_reboot_delay_secs(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wait_on_startup: true,
            check_url: default_check_url(),
            timeout_secs: default_network_timeout_secs(),
            retry_interval_secs: default_retry_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_bookmark_save_window_secs() -> u64 {
    10
}

fn default_axis_low() -> i32 {
    100
}

fn default_axis_high() -> i32 {
    150
}

fn default_custom_stations() -> PathBuf {
    platform::config_dir().join("custom_stations.json")
}

fn default_default_stations() -> PathBuf {
    platform::config_dir().join("default_stations.json")
}

fn default_bookmarks_file() -> PathBuf {
    platform::data_dir().join("bookmarks.json")
}

fn default_player_binary() -> String {
    "ffplay".to_string()
}

fn default_buffer_size() -> String {
    "1500M".to_string()
}

fn default_max_delay() -> String {
    "5000000".to_string()
}

fn default_stop_timeout_secs() -> u64 {
    5
}

fn default_mixer_binary() -> String {
    "amixer".to_string()
}

fn default_mixer_control() -> String {
    "Master".to_string()
}

fn default_volume_step() -> String {
    "5%".to_string()
}

fn default_speech_binary() -> String {
    "espeak".to_string()
}

fn default_service_name() -> String {
    "padradio".to_string()
}

fn default_update_script() -> PathBuf {
    platform::config_dir().join("update.sh")
}

fn default_reboot_delay_secs() -> u64 {
    3
}

fn default_check_url() -> String {
    "https://1.1.1.1".to_string()
}

fn default_network_timeout_secs() -> u64 {
    30
}

fn default_retry_interval_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    5
}

impl Config {
    /// Load the config at `config_path`, writing a default file on first run.
    pub fn load_from(config_path: &Path) -> Result<Self, RadioError> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)
            .map_err(|e| RadioError::io(config_path, e))?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), RadioError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RadioError::io(parent, e))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content).map_err(|e| RadioError::io(config_path, e))?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.debounce_window(), Duration::from_millis(300));
        assert_eq!(config.input.bookmark_save_window(), Duration::from_secs(10));
        assert_eq!(config.input.axis_low_threshold, 100);
        assert_eq!(config.input.axis_high_threshold, 150);
        assert_eq!(config.player.binary, "ffplay");
        assert_eq!(config.player.stop_timeout(), Duration::from_secs(5));
        assert_eq!(config.mixer.step, "5%");
        assert!(!config.admin.enabled);
        assert!(config
            .stations
            .custom_file
            .ends_with("padradio/custom_stations.json"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [admin]
            enabled = true

            [input]
            debounce_ms = 150
            "#,
        )
        .unwrap();
        assert!(config.admin.enabled);
        assert_eq!(config.admin.service_name, "padradio");
        assert_eq!(config.input.debounce_ms, 150);
        assert_eq!(config.input.bookmark_save_window_secs, 10);
        assert_eq!(config.network.check_url, "https://1.1.1.1");
    }

    #[test]
    fn test_load_writes_default_on_first_run() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.player.max_delay, "5000000");

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.player.buffer_size, config.player.buffer_size);
    }

    #[test]
    fn test_malformed_file_is_a_toml_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[input]\ndebounce_ms = \"soon\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, RadioError::Toml(_)));
    }

    #[test]
    fn test_unwritable_location_is_an_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let err = Config::load_from(&blocker.join("config.toml")).unwrap_err();
        assert!(matches!(err, RadioError::Io { .. }));
    }
}
