use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const NAMES_KEY: &str = "rsp:names";
const MODE_KEY: &str = "rsp:mode";
const THEME_KEY: &str = "rsp:theme";

/// The three flat values remembered between sessions. Empty means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub names: String,
    pub mode: String,
    pub theme: String,
}

/// Key-value file holding [`Preferences`] as a flat JSON object.
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Preferences> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read preferences: {:?}", self.path))?;
        let mut values: BTreeMap<String, String> =
            serde_json::from_str(&content).context("Failed to parse preferences")?;

        Ok(Preferences {
            names: values.remove(NAMES_KEY).unwrap_or_default(),
            mode: values.remove(MODE_KEY).unwrap_or_default(),
            theme: values.remove(THEME_KEY).unwrap_or_default(),
        })
    }

    pub fn save(&self, prefs: &Preferences) -> Result<()> {
        let values = BTreeMap::from([
            (NAMES_KEY, prefs.names.as_str()),
            (MODE_KEY, prefs.mode.as_str()),
            (THEME_KEY, prefs.theme.as_str()),
        ]);
        let content =
            serde_json::to_string_pretty(&values).context("Failed to serialize preferences")?;

        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write preferences: {:?}", self.path))?;

        Ok(())
    }

    /// Load, logging and swallowing failures.
    pub fn load_or_default(&self) -> Preferences {
        match self.load() {
            Ok(prefs) => prefs,
            Err(e) => {
                log::warn!("Ignoring unreadable preferences: {:#}", e);
                Preferences::default()
            }
        }
    }

    /// Save, logging and swallowing failures.
    pub fn save_quietly(&self, prefs: &Preferences) {
        if let Err(e) = self.save(prefs) {
            log::warn!("Failed to save preferences: {:#}", e);
        }
    }
}
