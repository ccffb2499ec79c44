//! Components: `BEGIN`/`END` blocks and the property lines they own.

use super::content_line::ContentLine;
use super::value::Value;
use crate::rfc::behavior::{BehaviorRef, Registry, engine};

/// A line skipped in tolerant mode, kept so nothing is silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableLine {
    pub number: usize,
    pub text: String,
    pub reason: String,
}

/// A freshly added child, see [`Component::add`].
#[derive(Debug)]
pub enum Added<'a> {
    Line(&'a mut ContentLine),
    Component(&'a mut Component),
}

/// A component in the document tree.
///
/// Children keep insertion order; lookups filter by uppercased name.
#[derive(Debug, Clone)]
pub struct Component {
    /// Uppercased name; empty for the unnamed root of a bare property list.
    pub name: String,
    /// Group label (vCard), case preserved.
    pub group: Option<String>,
    pub behavior: Option<BehaviorRef>,
    lines: Vec<ContentLine>,
    components: Vec<Component>,
    /// Lines skipped while parsing in tolerant mode.
    pub unreadable_lines: Vec<UnreadableLine>,
    /// Line of the `BEGIN`, when parsed.
    pub line_number: Option<usize>,
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.group == other.group
            && self.lines == other.lines
            && self.components == other.components
    }
}

impl Component {
    /// Creates an empty component without a behavior.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            group: None,
            behavior: None,
            lines: Vec::new(),
            components: Vec::new(),
            unreadable_lines: Vec::new(),
            line_number: None,
        }
    }

    /// Root for input that has properties but no `BEGIN`.
    #[must_use]
    pub fn unnamed() -> Self {
        Self::new("")
    }

    #[must_use]
    pub fn is_unnamed(&self) -> bool {
        self.name.is_empty()
    }

    /// First line with the given name.
    #[must_use]
    pub fn line(&self, name: &str) -> Option<&ContentLine> {
        self.lines.iter().find(|l| l.name.eq_ignore_ascii_case(name))
    }

    pub fn line_mut(&mut self, name: &str) -> Option<&mut ContentLine> {
        self.lines
            .iter_mut()
            .find(|l| l.name.eq_ignore_ascii_case(name))
    }

    /// All lines with the given name, in order.
    pub fn lines<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ContentLine> + 'a {
        self.lines
            .iter()
            .filter(move |l| l.name.eq_ignore_ascii_case(name))
    }

    /// First child component with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.components
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Self> {
        self.components
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// All child components with the given name, in order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.components
            .iter()
            .filter(move |c| c.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn all_lines(&self) -> &[ContentLine] {
        &self.lines
    }

    pub fn all_lines_mut(&mut self) -> &mut [ContentLine] {
        &mut self.lines
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.components
    }

    pub fn children_mut(&mut self) -> &mut [Self] {
        &mut self.components
    }

    /// Returns the decoded text of the first line named `name`, or its raw
    /// value if it was never decoded.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        let line = self.line(name)?;
        match &line.value {
            Value::Raw(raw) => Some(raw),
            value => value.as_text(),
        }
    }

    /// Appends a line as-is and returns it.
    pub fn push_line(&mut self, line: ContentLine) -> &mut ContentLine {
        let idx = self.lines.len();
        self.lines.push(line);
        &mut self.lines[idx]
    }

    /// Appends a component as-is and returns it.
    pub fn push_child(&mut self, child: Self) -> &mut Self {
        let idx = self.components.len();
        self.components.push(child);
        &mut self.components[idx]
    }

    /// Appends a line after resolving its behavior against this component.
    pub fn add_line(&mut self, mut line: ContentLine) -> &mut ContentLine {
        if line.behavior.is_none() {
            line.behavior = Some(engine::resolve_line(self, &line.name, Registry::standard()));
        }
        self.push_line(line)
    }

    /// Appends a component after resolving its behavior against this one.
    pub fn add_child(&mut self, mut child: Self) -> &mut Self {
        if child.behavior.is_none() {
            child.behavior = Some(engine::resolve_component(self, &child.name, Registry::standard()));
            engine::assign(&mut child, Registry::standard());
        }
        self.push_child(child)
    }

    /// Creates an empty child named `name` with the standard registry.
    ///
    /// Whether the child is a component or a property is decided by this
    /// component's known children first, then the registry.
    pub fn add(&mut self, name: &str) -> Added<'_> {
        self.add_with(name, Registry::standard())
    }

    /// Like [`Self::add`] with an explicit registry.
    pub fn add_with(&mut self, name: &str, registry: &'static Registry) -> Added<'_> {
        if engine::names_component(self, name, registry) {
            let mut child = Self::new(name);
            child.behavior = Some(engine::resolve_component(self, &child.name, registry));
            Added::Component(self.push_child(child))
        } else {
            let mut line = ContentLine::raw(name, String::new());
            line.behavior = Some(engine::resolve_line(self, &line.name, registry));
            Added::Line(self.push_line(line))
        }
    }

    /// Replaces the first line with the same name, or appends.
    pub fn set_line(&mut self, line: ContentLine) -> &mut ContentLine {
        if let Some(idx) = self
            .lines
            .iter()
            .position(|l| l.name.eq_ignore_ascii_case(&line.name))
        {
            self.lines[idx] = line;
            &mut self.lines[idx]
        } else {
            self.add_line(line)
        }
    }

    /// Removes every line named `name`, returning how many went.
    pub fn remove_lines(&mut self, name: &str) -> usize {
        let before = self.lines.len();
        self.lines.retain(|l| !l.name.eq_ignore_ascii_case(name));
        before - self.lines.len()
    }

    /// Removes every child component named `name`, returning how many went.
    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.components.len();
        self.components
            .retain(|c| !c.name.eq_ignore_ascii_case(name));
        before - self.components.len()
    }

    /// Walks this component and every descendant, parents first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Self)) {
        visit(self);
        for child in &self.components {
            child.walk(visit);
        }
    }
}
