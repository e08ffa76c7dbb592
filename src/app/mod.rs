pub mod config;
pub mod modes;
pub mod preferences;
pub mod reveal;
pub mod state;

pub use config::{Config, ConfigManager};
pub use modes::PickMode;
pub use preferences::PreferencesStore;
pub use state::AppState;

use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use std::env;

pub struct App {
    pub state: AppState,
    pub config_manager: Option<Arc<ConfigManager>>,
}

impl App {
    /// Build the app from the config next to the executable. `questions`
    /// overrides the question file named in the config.
    pub async fn new(questions: Option<PathBuf>) -> Result<Self> {
        let mut config_path = env::current_exe()?;
        config_path.set_file_name("config.toml");

        let config = Config::load_or_default(&config_path)?;

        let mut preferences_path = config_path.clone();
        preferences_path.set_file_name(&config.general.preferences_file);
        let questions = questions.or_else(|| {
            let configured = config.questions.path.trim();
            (!configured.is_empty()).then(|| PathBuf::from(configured))
        });

        // Create config manager with hot reload
        let config_manager = ConfigManager::new(config, config_path);

        // Start watching for config changes
        if let Err(e) = config_manager.clone().watch() {
            log::warn!("Failed to start config hot reload: {}", e);
        } else {
            log::info!("Config hot reload enabled for {:?}", config_manager.config_path());
        }

        let mut state = AppState::new(
            config_manager.get_config(),
            PreferencesStore::new(preferences_path),
            StdRng::from_os_rng(),
        );
        if let Some(path) = questions.as_deref() {
            state.load_questions(path);
        }

        Ok(Self {
            state,
            config_manager: Some(config_manager),
        })
    }

    pub fn handle_event(&mut self, event: CrosstermEvent) -> Result<bool> {
        self.state.handle_event(event)
    }

    pub fn tick(&mut self, now: Instant) {
        self.state.tick(now);
    }
}
