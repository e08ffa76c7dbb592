use anyhow::{bail, Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::wheel::SpinParams;

// Embedded default configuration that can be written next to the executable
// when an external config file is missing, so the picker still starts when
// launched from a directory without `config.toml`.
const DEFAULT_CONFIG: &str = include_str!("../../config.toml");

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub general: GeneralConfig,
    pub wheel: WheelConfig,
    pub dice: DiceConfig,
    pub chest: ChestConfig,
    #[serde(default)]
    pub questions: QuestionsConfig,
    pub ui: UiConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub app_name: String,
    pub frame_interval_ms: u64,
    pub preferences_file: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WheelConfig {
    pub size: f64,
    pub min_spin_ms: u64,
    pub max_spin_ms: u64,
    pub min_extra_turns: u32,
    pub max_extra_turns: u32,
    pub near_edge_chance: f64,
    pub highlight_period_ms: u64,
}

impl WheelConfig {
    /// Reject values the wheel cannot draw or spin with.
    pub fn validate(&self) -> Result<()> {
        if !(self.size.is_finite() && self.size > 0.0) {
            bail!("wheel.size must be a positive number, got {}", self.size);
        }
        if !(0.0..=1.0).contains(&self.near_edge_chance) {
            bail!(
                "wheel.near_edge_chance must be between 0 and 1, got {}",
                self.near_edge_chance
            );
        }
        Ok(())
    }

    pub fn spin_params(&self) -> SpinParams {
        SpinParams {
            min_duration: Duration::from_millis(self.min_spin_ms),
            max_duration: Duration::from_millis(self.max_spin_ms),
            min_extra_turns: self.min_extra_turns,
            max_extra_turns: self.max_extra_turns,
            near_edge_chance: self.near_edge_chance,
            highlight_period: Duration::from_millis(self.highlight_period_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiceConfig {
    pub min_roll_ms: u64,
    pub max_roll_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChestConfig {
    pub open_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuestionsConfig {
    pub path: String,
    pub preview_chars: usize,
}

impl Default for QuestionsConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            preview_chars: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    pub history_max_entries: usize,
    pub sound_cues: bool,
    pub flash_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThemeConfig {
    pub dark: Palette,
    pub light: Palette,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Palette {
    pub background: String,
    pub foreground: String,
    pub muted: String,
    pub accent: String,
    pub accent_2: String,
    pub danger: String,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;
        config.validate()?;

        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;

        Ok(())
    }

    pub fn bundled() -> Result<Self> {
        let config: Config =
            toml::from_str(DEFAULT_CONFIG).context("Failed to parse bundled default config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.wheel
            .validate()
            .context("Invalid [wheel] section")
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::load(path.as_ref()) {
            Ok(config) => Ok(config),
            Err(load_err) => {
                log::warn!(
                    "Falling back to bundled default config: {}. A new config will be written to {:?} if possible.",
                    load_err,
                    path.as_ref()
                );

                let default_config = Self::bundled()?;

                if let Err(save_err) = default_config.save(path.as_ref()) {
                    log::warn!("Failed to write default config: {}", save_err);
                }

                Ok(default_config)
            }
        }
    }

    pub fn frame_interval_ms(&self) -> u64 {
        self.general.frame_interval_ms.max(16)
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<Config>>,
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config: Config, config_path: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    pub fn get_config(&self) -> Arc<RwLock<Config>> {
        Arc::clone(&self.config)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn watch(self: Arc<Self>) -> Result<()> {
        use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
        use std::sync::mpsc::channel;

        let (tx, rx) = channel::<Result<Event, notify::Error>>();

        let mut watcher = RecommendedWatcher::new(tx, notify::Config::default())
            .context("Failed to create file watcher")?;

        watcher
            .watch(self.config_path.as_ref(), RecursiveMode::NonRecursive)
            .context("Failed to watch config file")?;

        let config = Arc::clone(&self.config);
        let config_path = self.config_path.clone();

        std::thread::spawn(move || {
            // Keep watcher alive
            let _watcher = watcher;

            loop {
                match rx.recv() {
                    Ok(Ok(event)) => {
                        use notify::EventKind;
                        if let EventKind::Modify(_) | EventKind::Create(_) = event.kind {
                            // Small delay to ensure file is fully written
                            std::thread::sleep(std::time::Duration::from_millis(100));

                            match Config::load(&config_path) {
                                Ok(new_config) => {
                                    *config.write() = new_config;
                                    log::info!("Configuration reloaded successfully");
                                }
                                Err(e) => {
                                    log::error!("Failed to reload config: {}", e);
                                }
                            }
                        }
                    }
                    Ok(Err(e)) => {
                        log::error!("Watch error: {:?}", e);
                    }
                    Err(e) => {
                        log::error!("Channel error: {:?}", e);
                        break;
                    }
                }
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_matches_wheel_defaults() {
        let config = Config::bundled().expect("bundled config parses");
        let params = config.wheel.spin_params();
        let defaults = SpinParams::default();
        assert_eq!(params.min_duration, defaults.min_duration);
        assert_eq!(params.max_duration, defaults.max_duration);
        assert_eq!(params.min_extra_turns, defaults.min_extra_turns);
        assert_eq!(params.max_extra_turns, defaults.max_extra_turns);
        assert_eq!(params.highlight_period, defaults.highlight_period);
        assert!((params.near_edge_chance - defaults.near_edge_chance).abs() < 1e-12);
    }

    #[test]
    fn missing_config_is_written_from_bundle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        let config = Config::load_or_default(&path).expect("fallback config");
        assert_eq!(config.general.app_name, "Random Picker");
        assert!(path.exists());

        let reloaded = Config::load(&path).expect("written config loads");
        assert_eq!(reloaded.ui.history_max_entries, config.ui.history_max_entries);
    }

    #[test]
    fn questions_section_is_optional() {
        let mut text = String::from(DEFAULT_CONFIG);
        let start = text.find("[questions]").expect("questions section");
        let end = text.find("[ui]").expect("ui section");
        text.replace_range(start..end, "");

        let config: Config = toml::from_str(&text).expect("parses without questions");
        assert!(config.questions.path.is_empty());
        assert_eq!(config.questions.preview_chars, 1000);
    }

    #[test]
    fn unusable_wheel_values_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        for (key, bad) in [
            ("size = 400.0", "size = 0.0"),
            ("size = 400.0", "size = -10.0"),
            ("size = 400.0", "size = nan"),
            ("near_edge_chance = 0.28", "near_edge_chance = nan"),
            ("near_edge_chance = 0.28", "near_edge_chance = 1.5"),
        ] {
            assert!(DEFAULT_CONFIG.contains(key), "bundled config lacks {key}");
            fs::write(&path, DEFAULT_CONFIG.replace(key, bad)).expect("write");
            let err = Config::load(&path).expect_err(bad);
            assert!(format!("{:#}", err).contains("[wheel]"), "{bad}: {err:#}");
        }
    }

    #[test]
    fn frame_interval_has_a_floor() {
        let mut config = Config::bundled().expect("bundled config parses");
        config.general.frame_interval_ms = 1;
        assert_eq!(config.frame_interval_ms(), 16);
    }
}
