/// Text format family a behavior belongs to.
///
/// The two families differ in their base64 marker and in whether
/// group prefixes are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    ICalendar,
    VCard,
}

impl Format {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ICalendar => "icalendar",
            Self::VCard => "vcard",
        }
    }

    /// Value of the ENCODING parameter that marks base64 content.
    #[must_use]
    pub const fn base64_marker(self) -> &'static str {
        match self {
            Self::ICalendar => "BASE64",
            Self::VCard => "B",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
