//! Deployment settings consumed by the validator.

use std::fs;
use std::path::Path;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::format::ShortDateFormatter;

/// Settings file contents, e.g.
///
/// ```toml
/// short_date_format = "d/m/Y"
/// utc_offset_minutes = 120
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSettings {
    /// PHP/Django-style short date format used in messages.
    pub short_date_format: String,
    /// Offset of the deployment's local time zone from UTC.
    pub utc_offset_minutes: i32,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            short_date_format: "m/d/Y".to_string(),
            utc_offset_minutes: 0,
        }
    }
}

impl ValidatorSettings {
    pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            toml::from_str(contents).map_err(|source| SettingsError::Toml { source })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, SettingsError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(SettingsError::InvalidUtcOffset {
                minutes: self.utc_offset_minutes,
            })
    }

    /// Check the format string and offset without keeping the formatter.
    pub fn validate(&self) -> Result<(), SettingsError> {
        ShortDateFormatter::from_settings(self).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let settings = ValidatorSettings::from_toml_str("").unwrap();
        assert_eq!(settings, ValidatorSettings::default());
    }

    #[test]
    fn parses_format_and_offset() {
        let settings = ValidatorSettings::from_toml_str(
            "short_date_format = \"d/m/Y\"\nutc_offset_minutes = 120\n",
        )
        .unwrap();
        assert_eq!(settings.short_date_format, "d/m/Y");
        assert_eq!(settings.utc_offset().unwrap().local_minus_utc(), 7200);
    }

    #[test]
    fn rejects_out_of_range_offset() {
        let err = ValidatorSettings::from_toml_str("utc_offset_minutes = 1500").unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidUtcOffset { minutes: 1500 }
        ));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = ValidatorSettings::from_toml_str("short_date_format = ").unwrap_err();
        assert!(matches!(err, SettingsError::Toml { .. }));
    }

    #[test]
    fn settings_round_trip() {
        let settings = ValidatorSettings {
            short_date_format: "Y-m-d".to_string(),
            utc_offset_minutes: -300,
        };
        let text = toml::to_string_pretty(&settings).unwrap();
        assert_eq!(ValidatorSettings::from_toml_str(&text).unwrap(), settings);
    }
}
