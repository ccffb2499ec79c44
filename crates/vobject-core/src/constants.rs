/// Name and version advertised in generated PRODID lines.
pub const GENERATOR_NAME: &str = "vobject-rs";
pub const GENERATOR_VERSION: &str = "0.1";

/// Default PRODID for calendars that do not carry one.
pub const DEFAULT_PRODID: &str = const_str::concat!(
    "-//",
    GENERATOR_NAME,
    "//NONSGML ",
    GENERATOR_NAME,
    " ",
    GENERATOR_VERSION,
    "//EN"
);

/// Domain suffix used for generated UID values.
pub const UID_DOMAIN: &str = const_str::concat!("@", GENERATOR_NAME);

/// Charset assumed for quoted-printable values without a CHARSET parameter.
pub const DEFAULT_CHARSET: &str = "ISO-8859-1";

/// Maximum octets per physical line before folding (RFC 5545 §3.1).
pub const DEFAULT_LINE_LENGTH: usize = 75;

/// Version strings written by implicit VERSION generation.
pub const ICALENDAR_VERSION: &str = "2.0";
pub const VCARD_VERSION: &str = "3.0";

/// Year range scanned when synthesizing VTIMEZONE blocks from a zone database.
pub const SYNTHESIS_START_YEAR: i32 = 1970;
pub const SYNTHESIS_END_YEAR: i32 = 2037;

/// Environment variable prefix and optional settings file name.
pub const ENV_PREFIX: &str = "VOBJECT";
pub const SETTINGS_FILE: &str = "vobject.toml";
