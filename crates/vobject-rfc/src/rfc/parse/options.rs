//! Parse options and producer compatibility flags.

use vobject_core::config::{CompatConfig, Settings};

use crate::rfc::behavior::Registry;

/// Workarounds for known non-conforming producers. All off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompatFlags {
    /// Quoted-printable legacy values only unescape `\;`.
    pub legacy_escaped_semicolons: bool,
    /// Unquoted TZID parameter values are not split on commas.
    pub tzid_commas: bool,
    /// `_` is accepted in names and rewritten to `-`.
    pub underscore_names: bool,
}

impl From<CompatConfig> for CompatFlags {
    fn from(config: CompatConfig) -> Self {
        Self {
            legacy_escaped_semicolons: config.legacy_escaped_semicolons,
            tzid_commas: config.tzid_commas,
            underscore_names: config.underscore_names,
        }
    }
}

/// Options controlling [`crate::rfc::parse_all`] and [`crate::rfc::parse_one`].
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Skip unreadable lines instead of failing.
    pub tolerant: bool,
    /// Validate each root after it is read, failing on the first problem.
    pub validate: bool,
    /// Decode values into native form while parsing.
    pub transform: bool,
    pub compat: CompatFlags,
    pub registry: &'static Registry,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            tolerant: false,
            validate: false,
            transform: true,
            compat: CompatFlags::default(),
            registry: Registry::standard(),
        }
    }
}

impl ParseOptions {
    /// Tolerant defaults.
    #[must_use]
    pub fn tolerant() -> Self {
        Self {
            tolerant: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            tolerant: settings.parse.tolerant,
            validate: settings.parse.validate,
            transform: settings.parse.transform,
            compat: settings.parse.compat.into(),
            registry: Registry::standard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_settings_defaults() {
        let settings = Settings::defaults().unwrap();
        let options = ParseOptions::from_settings(&settings);
        let plain = ParseOptions::default();
        assert_eq!(options.tolerant, plain.tolerant);
        assert_eq!(options.validate, plain.validate);
        assert_eq!(options.transform, plain.transform);
        assert_eq!(options.compat, CompatFlags::default());
    }

    #[test]
    fn compat_flags_carry_over() {
        let config = CompatConfig {
            tzid_commas: true,
            ..CompatConfig::default()
        };
        let flags = CompatFlags::from(config);
        assert!(flags.tzid_commas);
        assert!(!flags.underscore_names);
        assert!(!flags.legacy_escaped_semicolons);
    }
}
