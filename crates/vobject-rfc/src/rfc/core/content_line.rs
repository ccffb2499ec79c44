//! One property occurrence in the document tree.

use super::parameter::Parameter;
use super::value::Value;
use crate::rfc::behavior::BehaviorRef;
use crate::rfc::parse::LineTokens;

/// A parsed `name;params:value` line.
///
/// Parameter names are uppercased and repeated occurrences are merged, so
/// `TYPE=a;TYPE=b` and `TYPE=a,b` read back the same.
#[derive(Debug, Clone)]
pub struct ContentLine {
    /// Group label (vCard), case preserved.
    pub group: Option<String>,
    /// Uppercased property name.
    pub name: String,
    params: Vec<Parameter>,
    /// Value-less parameters such as `PREF`, uppercased.
    pub singletons: Vec<String>,
    pub value: Value,
    /// Assigned behavior; `None` until the line is attached and resolved.
    pub behavior: Option<BehaviorRef>,
    /// Logical line this came from, when parsed.
    pub line_number: Option<usize>,
}

impl PartialEq for ContentLine {
    fn eq(&self, other: &Self) -> bool {
        self.group == other.group
            && self.name == other.name
            && self.params == other.params
            && self.singletons == other.singletons
            && self.value == other.value
    }
}

impl ContentLine {
    /// Creates a line with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            group: None,
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            singletons: Vec::new(),
            value: value.into(),
            behavior: None,
            line_number: None,
        }
    }

    /// Creates a line holding a raw wire value.
    #[must_use]
    pub fn raw(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, Value::Raw(value.into()))
    }

    /// Builds a line from tokenizer output.
    #[must_use]
    pub fn from_tokens(tokens: LineTokens, line_number: usize) -> Self {
        let mut line = Self::raw(tokens.name, tokens.value);
        line.group = tokens.group;
        line.line_number = Some(line_number);
        for param in tokens.params {
            if param.is_singleton() {
                line.add_singleton(&param.name);
            } else {
                for value in param.values {
                    line.add_param_value(&param.name, value);
                }
            }
        }
        line
    }

    /// Sets the group, builder style.
    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// All parameters in first-seen order.
    #[must_use]
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// First value of a parameter.
    #[must_use]
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(Parameter::value)
    }

    /// All values of a parameter; empty when absent.
    #[must_use]
    pub fn param_values(&self, name: &str) -> &[String] {
        self.param(name).map_or(&[], |p| p.values.as_slice())
    }

    #[must_use]
    pub fn has_param(&self, name: &str) -> bool {
        self.param(name).is_some()
    }

    /// Whether `word` appears as a singleton or as a value of any parameter.
    ///
    /// vCard 2.1 writes `ENCODING=QUOTED-PRINTABLE` and bare
    /// `QUOTED-PRINTABLE` interchangeably.
    #[must_use]
    pub fn mentions(&self, word: &str) -> bool {
        self.singletons.iter().any(|s| s.eq_ignore_ascii_case(word))
            || self.params.iter().any(|p| p.has_value(word))
    }

    /// Appends a value, merging into an existing parameter of the same name.
    pub fn add_param_value(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(existing) = self
            .params
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(name))
        {
            existing.values.push(value);
        } else {
            self.params.push(Parameter::new(name, value));
        }
    }

    /// Replaces all values of a parameter.
    pub fn set_param(&mut self, name: &str, values: Vec<String>) {
        self.remove_param(name);
        self.params.push(Parameter::with_values(name, values));
    }

    /// Removes a parameter, returning its values.
    pub fn remove_param(&mut self, name: &str) -> Option<Vec<String>> {
        let idx = self
            .params
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))?;
        Some(self.params.remove(idx).values)
    }

    pub fn add_singleton(&mut self, name: &str) {
        let name = name.to_ascii_uppercase();
        if !self.singletons.contains(&name) {
            self.singletons.push(name);
        }
    }

    pub fn remove_singleton(&mut self, name: &str) -> bool {
        let before = self.singletons.len();
        self.singletons.retain(|s| !s.eq_ignore_ascii_case(name));
        before != self.singletons.len()
    }

    /// The raw wire value, if the line has not been decoded.
    #[must_use]
    pub fn raw_value(&self) -> Option<&str> {
        self.value.as_raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::parse::{CompatFlags, parse_line};

    fn tokens(line: &str) -> ContentLine {
        let tokens = parse_line(line, 3, CompatFlags::default()).unwrap();
        ContentLine::from_tokens(tokens, 3)
    }

    #[test]
    fn repeated_and_joined_params_normalize() {
        let repeated = tokens("TEL;TYPE=fax;TYPE=voice:+1");
        let joined = tokens("TEL;type=fax,voice:+1");
        assert_eq!(repeated.params(), joined.params());
        assert_eq!(repeated.param_values("type"), ["fax", "voice"]);
    }

    #[test]
    fn singletons_are_separate() {
        let line = tokens("EMAIL;PREF;internet:john@nowhere.com");
        assert_eq!(line.singletons, ["PREF", "INTERNET"]);
        assert!(line.params().is_empty());
        assert!(line.mentions("pref"));
        assert_eq!(line.line_number, Some(3));
    }

    #[test]
    fn param_editing() {
        let mut line = ContentLine::raw("dtstart", "20060216T100000");
        assert_eq!(line.name, "DTSTART");
        line.add_param_value("tzid", "US/Pacific");
        assert_eq!(line.param_value("TZID"), Some("US/Pacific"));
        line.set_param("TZID", vec!["Europe/Berlin".into()]);
        assert_eq!(line.param_values("TZID"), ["Europe/Berlin"]);
        assert_eq!(line.remove_param("tzid"), Some(vec!["Europe/Berlin".to_string()]));
        assert!(!line.has_param("TZID"));
    }

    #[test]
    fn equality_ignores_origin() {
        let parsed = tokens("SUMMARY:hello");
        let built = ContentLine::raw("SUMMARY", "hello");
        assert_eq!(parsed, built);
    }
}
