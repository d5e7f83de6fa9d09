use crate::domain::{OcaError, OcaResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

/// Delimiter that introduces a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlaceholderSyntax {
    /// `$name` / `${name}`, used by ROOT and RAT macros.
    Dollar,
    /// `%name` / `%{name}`, used by shell scripts where `$` belongs to the shell.
    Percent,
}

impl PlaceholderSyntax {
    pub const fn delimiter(self) -> char {
        match self {
            Self::Dollar => '$',
            Self::Percent => '%',
        }
    }
}

/// Placeholder name to substitution text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        self.values.insert(name.into(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    syntax: PlaceholderSyntax,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(
        name: impl Into<String>,
        source: &str,
        syntax: PlaceholderSyntax,
    ) -> OcaResult<Self> {
        let name = name.into();
        let delimiter = syntax.delimiter();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((position, character)) = chars.next() {
            if character != delimiter {
                literal.push(character);
                continue;
            }

            let placeholder = match chars.peek().map(|(_, next)| *next) {
                Some(next) if next == delimiter => {
                    chars.next();
                    literal.push(delimiter);
                    continue;
                }
                Some('{') => {
                    chars.next();
                    let mut identifier = String::new();
                    let mut closed = false;
                    for (_, next) in chars.by_ref() {
                        if next == '}' {
                            closed = true;
                            break;
                        }
                        identifier.push(next);
                    }
                    if !closed || !is_identifier(&identifier) {
                        return Err(invalid_placeholder(&name, source, position));
                    }
                    identifier
                }
                Some(next) if is_identifier_start(next) => {
                    let mut identifier = String::new();
                    while let Some((_, next)) = chars.peek() {
                        if !is_identifier_char(*next) {
                            break;
                        }
                        identifier.push(*next);
                        chars.next();
                    }
                    identifier
                }
                _ => return Err(invalid_placeholder(&name, source, position)),
            };

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Placeholder(placeholder));
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            name,
            syntax,
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn syntax(&self) -> PlaceholderSyntax {
        self.syntax
    }

    /// Distinct placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(name) if seen.insert(name.as_str()) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Substitutes every placeholder; fails listing all names missing from `context`.
    pub fn render(&self, context: &TemplateContext) -> OcaResult<String> {
        let missing = self
            .placeholders()
            .into_iter()
            .filter(|name| context.get(name).is_none())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(OcaError::input_validation(
                "INPUT.TEMPLATE_UNRESOLVED",
                format!(
                    "template '{}' has no value for {}",
                    self.name,
                    missing
                        .iter()
                        .map(|name| format!("{}{}", self.syntax.delimiter(), name))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            ));
        }

        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Placeholder(name) => {
                    output.push_str(context.get(name).unwrap_or_default());
                }
            }
        }
        Ok(output)
    }
}

fn is_identifier_start(character: char) -> bool {
    character.is_ascii_alphabetic() || character == '_'
}

fn is_identifier_char(character: char) -> bool {
    character.is_ascii_alphanumeric() || character == '_'
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(is_identifier_start) && chars.all(is_identifier_char)
}

fn invalid_placeholder(name: &str, source: &str, position: usize) -> OcaError {
    let line = source[..position].matches('\n').count() + 1;
    let column = position - source[..position].rfind('\n').map_or(0, |index| index + 1) + 1;
    OcaError::input_validation(
        "INPUT.TEMPLATE_INVALID_PLACEHOLDER",
        format!("invalid placeholder in template '{name}' at line {line}, column {column}"),
    )
}
