//! Locate and load validator settings.
//!
//! An explicit `--config` path must load. Otherwise the platform config
//! directory is tried:
//! - Linux: ~/.config/edc-next-appointment/settings.toml
//! - macOS: ~/Library/Application Support/org.edc.edc-next-appointment/settings.toml
//! - Windows: %APPDATA%/edc/edc-next-appointment/config/settings.toml
//!
//! and defaults are used if that file is missing or unusable.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use edc_validate::{SettingsError, ValidatorSettings};
use tracing::{info, warn};

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "edc";
const APP_NAME: &str = "edc-next-appointment";
const CONFIG_FILENAME: &str = "settings.toml";

/// Platform settings file, or `None` if no home directory can be determined.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

pub fn load_settings(explicit: Option<&Path>) -> Result<ValidatorSettings> {
    if let Some(path) = explicit {
        let settings = ValidatorSettings::load(path)
            .with_context(|| format!("load settings from {}", path.display()))?;
        info!(path = %path.display(), "loaded settings");
        return Ok(settings);
    }
    let Some(path) = settings_path() else {
        warn!("could not determine settings path, using defaults");
        return Ok(ValidatorSettings::default());
    };
    Ok(load_or_default(&path))
}

/// Load `path`, falling back to defaults when it is missing or invalid.
pub fn load_or_default(path: &Path) -> ValidatorSettings {
    match ValidatorSettings::load(path) {
        Ok(settings) => {
            info!(path = %path.display(), "loaded settings");
            settings
        }
        Err(SettingsError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no settings file, using defaults");
            ValidatorSettings::default()
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "ignoring settings file, using defaults");
            ValidatorSettings::default()
        }
    }
}
