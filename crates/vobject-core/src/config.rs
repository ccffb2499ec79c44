use anyhow::Result;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_LINE_LENGTH, ENV_PREFIX, SETTINGS_FILE, SYNTHESIS_END_YEAR, SYNTHESIS_START_YEAR,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub parse: ParseConfig,
    pub serialize: SerializeConfig,
    pub timezone: TimezoneConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParseConfig {
    /// Skip unreadable lines instead of failing the whole document.
    pub tolerant: bool,
    /// Validate every parsed root.
    pub validate: bool,
    /// Decode values into native form while parsing.
    pub transform: bool,
    pub compat: CompatConfig,
}

/// Producer quirks that can be tolerated one by one.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CompatConfig {
    /// Turn `\;` back into `;` in quoted-printable legacy text.
    pub legacy_escaped_semicolons: bool,
    /// Keep commas inside unquoted TZID parameter values.
    pub tzid_commas: bool,
    /// Accept `_` in names and rewrite it to `-`.
    pub underscore_names: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SerializeConfig {
    pub line_length: usize,
    pub validate: bool,
    pub prodid: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimezoneConfig {
    pub synthesis_start_year: i32,
    pub synthesis_end_year: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            tolerant: false,
            validate: false,
            transform: true,
            compat: CompatConfig::default(),
        }
    }
}

impl Default for SerializeConfig {
    fn default() -> Self {
        Self {
            line_length: DEFAULT_LINE_LENGTH,
            validate: true,
            prodid: None,
        }
    }
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            synthesis_start_year: SYNTHESIS_START_YEAR,
            synthesis_end_year: SYNTHESIS_END_YEAR,
        }
    }
}

impl Settings {
    /// ## Summary
    /// Returns a builder pre-populated with every default value.
    ///
    /// ## Errors
    /// Returns an error if a default cannot be set.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("parse.tolerant", false)?
            .set_default("parse.validate", false)?
            .set_default("parse.transform", true)?
            .set_default("parse.compat.legacy_escaped_semicolons", false)?
            .set_default("parse.compat.tzid_commas", false)?
            .set_default("parse.compat.underscore_names", false)?
            .set_default("serialize.line_length", i64::try_from(DEFAULT_LINE_LENGTH)?)?
            .set_default("serialize.validate", true)?
            .set_default("timezone.synthesis_start_year", i64::from(SYNTHESIS_START_YEAR))?
            .set_default("timezone.synthesis_end_year", i64::from(SYNTHESIS_END_YEAR))?
            .set_default("logging.level", "info")?)
    }

    /// ## Summary
    /// Builds settings from defaults only, ignoring the environment.
    ///
    /// ## Errors
    /// Returns an error if deserializing the defaults fails.
    pub fn defaults() -> Result<Self> {
        Ok(Self::builder()?.build()?.try_deserialize::<Self>()?)
    }

    /// ## Summary
    /// Loads configuration from `.env`-populated environment variables and an
    /// optional `vobject.toml`. Environment variables take precedence.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        let settings = Self::builder()?
            // TOML file
            .add_source(config::File::with_name(SETTINGS_FILE).required(false))
            // Env
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Self>()?;

        if settings.timezone.synthesis_start_year > settings.timezone.synthesis_end_year {
            anyhow::bail!(
                "timezone.synthesis_start_year ({}) is after timezone.synthesis_end_year ({})",
                settings.timezone.synthesis_start_year,
                settings.timezone.synthesis_end_year
            );
        }

        Ok(settings)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
