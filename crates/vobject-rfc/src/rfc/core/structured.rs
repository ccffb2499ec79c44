//! Structured vCard values (RFC 2426 §3.1.2, §3.2.1, §3.5.5).
//!
//! Each field is a list because every field of N and ADR may itself be a
//! comma-separated list on the wire.

use std::fmt;

/// Structured name (N property).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Name {
    /// Family names (surnames).
    pub family: Vec<String>,
    /// Given names (first names).
    pub given: Vec<String>,
    /// Additional names (middle names).
    pub additional: Vec<String>,
    /// Honorific prefixes (e.g., "Mr.", "Dr.").
    pub prefix: Vec<String>,
    /// Honorific suffixes (e.g., "Jr.", "M.D.").
    pub suffix: Vec<String>,
}

impl Name {
    /// Field count on the wire.
    pub const FIELDS: usize = 5;

    /// Creates a structured name with family and given names.
    #[must_use]
    pub fn simple(family: impl Into<String>, given: impl Into<String>) -> Self {
        Self {
            family: vec![family.into()],
            given: vec![given.into()],
            ..Self::default()
        }
    }

    /// Builds a name from wire fields in order; missing trailing fields are empty.
    #[must_use]
    pub fn from_fields(fields: Vec<Vec<String>>) -> Self {
        let mut fields = fields.into_iter();
        let mut next = || fields.next().unwrap_or_default();
        Self {
            family: next(),
            given: next(),
            additional: next(),
            prefix: next(),
            suffix: next(),
        }
    }

    /// Fields in wire order.
    #[must_use]
    pub fn fields(&self) -> [&[String]; Self::FIELDS] {
        [
            &self.family,
            &self.given,
            &self.additional,
            &self.prefix,
            &self.suffix,
        ]
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            &self.prefix,
            &self.given,
            &self.additional,
            &self.family,
            &self.suffix,
        ]
        .iter()
        .filter(|field| !field.is_empty())
        .map(|field| field.join(" "))
        .collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// Delivery address (ADR property).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    /// Post office box.
    pub po_box: Vec<String>,
    /// Extended address (e.g., apartment or suite number).
    pub extended: Vec<String>,
    pub street: Vec<String>,
    pub city: Vec<String>,
    /// State or province.
    pub region: Vec<String>,
    /// Postal code.
    pub code: Vec<String>,
    pub country: Vec<String>,
}

impl Address {
    /// Field count on the wire.
    pub const FIELDS: usize = 7;

    /// Builds an address from wire fields in order; missing trailing fields are empty.
    #[must_use]
    pub fn from_fields(fields: Vec<Vec<String>>) -> Self {
        let mut fields = fields.into_iter();
        let mut next = || fields.next().unwrap_or_default();
        Self {
            po_box: next(),
            extended: next(),
            street: next(),
            city: next(),
            region: next(),
            code: next(),
            country: next(),
        }
    }

    /// Fields in wire order.
    #[must_use]
    pub fn fields(&self) -> [&[String]; Self::FIELDS] {
        [
            &self.po_box,
            &self.extended,
            &self.street,
            &self.city,
            &self.region,
            &self.code,
            &self.country,
        ]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = [&self.po_box, &self.extended, &self.street]
            .iter()
            .filter(|field| !field.is_empty())
            .map(|field| field.join("\n"))
            .collect();

        let mut locality = self.city.join(" ");
        if !self.region.is_empty() {
            if !locality.is_empty() {
                locality.push_str(", ");
            }
            locality.push_str(&self.region.join(" "));
        }
        if !self.code.is_empty() {
            if !locality.is_empty() {
                locality.push(' ');
            }
            locality.push_str(&self.code.join(" "));
        }
        if !locality.is_empty() {
            lines.push(locality);
        }
        if !self.country.is_empty() {
            lines.push(self.country.join(" "));
        }
        write!(f, "{}", lines.join("\n"))
    }
}

/// Organization (ORG property): name followed by units of decreasing size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Organization {
    pub name: String,
    pub units: Vec<String>,
}

impl Organization {
    #[must_use]
    pub fn with_units(name: impl Into<String>, units: Vec<String>) -> Self {
        Self {
            name: name.into(),
            units,
        }
    }

    /// Builds from the semicolon-separated items of the wire value.
    #[must_use]
    pub fn from_items(items: Vec<String>) -> Self {
        let mut items = items.into_iter();
        Self {
            name: items.next().unwrap_or_default(),
            units: items.collect(),
        }
    }

    #[must_use]
    pub fn items(&self) -> Vec<&str> {
        std::iter::once(self.name.as_str())
            .chain(self.units.iter().map(String::as_str))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn name_display_order() {
        let name = Name {
            prefix: strings(&["Dr."]),
            given: strings(&["Jeffrey"]),
            family: strings(&["Harris"]),
            suffix: strings(&["Jr."]),
            ..Name::default()
        };
        assert_eq!(name.to_string(), "Dr. Jeffrey Harris Jr.");
    }

    #[test]
    fn short_field_list_pads() {
        let name = Name::from_fields(vec![strings(&["Doe"]), strings(&["John"])]);
        assert_eq!(name, Name::simple("Doe", "John"));
        assert!(name.fields()[4].is_empty());
    }

    #[test]
    fn address_display() {
        let address = Address::from_fields(vec![
            vec![],
            vec![],
            strings(&["Reeperbahn 116"]),
            strings(&["Hamburg"]),
            vec![],
            strings(&["20359"]),
        ]);
        assert_eq!(address.to_string(), "Reeperbahn 116\nHamburg 20359");
        assert!(address.country.is_empty());
    }

    #[test]
    fn organization_items() {
        let org = Organization::from_items(strings(&["ABC, Inc.", "North American Division", "Marketing"]));
        assert_eq!(org.name, "ABC, Inc.");
        assert_eq!(org.items().len(), 3);
    }
}
