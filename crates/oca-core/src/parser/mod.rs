//! Reader for the loosely structured `key: value` / `key: [v1, v2, ...]` tables
//! written by the fitter (`.ocadb`) and the simulation database (`.ratdb`).
//!
//! The format is close to JSON but is not JSON: keys are bare, lists may carry
//! trailing commas and span several lines, and the same key can appear in many
//! blocks of one file, distinguished only by a preceding `index: "..."` line.

use crate::domain::{OcaError, ParserResult};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Number of lines (header line included) searched after a section header.
pub const DEFAULT_SECTION_LOOKAHEAD: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEntry {
    Scalar(String),
    List(Vec<String>),
}

impl TableEntry {
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            Self::Scalar(value) if value.is_empty() => Vec::new(),
            Self::Scalar(value) => vec![value.as_str()],
            Self::List(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

/// An owned table source plus a label used in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDocument {
    label: String,
    source: String,
}

impl TableDocument {
    pub fn from_source(label: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
        }
    }

    pub fn read(path: &Path) -> ParserResult<Self> {
        let source = fs::read_to_string(path).map_err(|source| {
            OcaError::io_system(
                "IO.TABLE_READ",
                format!("failed to read table '{}': {}", path.display(), source),
            )
        })?;
        debug!(path = %path.display(), bytes = source.len(), "read table source");
        Ok(Self::from_source(path.display().to_string(), source))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn reader(&self) -> TableReader<'_> {
        TableReader::new(&self.label, &self.source)
    }
}

/// Key lookup over a table source, optionally restricted to a section window.
#[derive(Debug, Clone, Copy)]
pub struct TableReader<'a> {
    label: &'a str,
    source: &'a str,
    search_start: usize,
    search_end: usize,
}

impl<'a> TableReader<'a> {
    pub fn new(label: &'a str, source: &'a str) -> Self {
        Self {
            label,
            source,
            search_start: 0,
            search_end: source.len(),
        }
    }

    pub fn label(&self) -> &'a str {
        self.label
    }

    /// Restricts lookups to the window opened by the first line containing `header`.
    pub fn section(&self, header: &str) -> ParserResult<TableReader<'a>> {
        self.section_with_lookahead(header, DEFAULT_SECTION_LOOKAHEAD)
    }

    pub fn section_with_lookahead(
        &self,
        header: &str,
        lookahead_lines: usize,
    ) -> ParserResult<TableReader<'a>> {
        let window = &self.source[self.search_start..self.search_end];
        let offset = window.find(header).ok_or_else(|| {
            OcaError::input_validation(
                "INPUT.TABLE_MISSING_SECTION",
                format!("section '{}' not found in '{}'", header, self.label),
            )
        })?;

        let header_position = self.search_start + offset;
        let line_start = self.source[..header_position]
            .rfind('\n')
            .map(|index| index + 1)
            .unwrap_or(0);

        let mut window_end = line_start;
        for _ in 0..lookahead_lines.max(1) {
            match self.source[window_end..].find('\n') {
                Some(newline) => window_end += newline + 1,
                None => {
                    window_end = self.source.len();
                    break;
                }
            }
        }

        Ok(Self {
            label: self.label,
            source: self.source,
            search_start: line_start,
            search_end: window_end.min(self.search_end.max(line_start)),
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find_value_offset(key).is_some()
    }

    pub fn entry(&self, key: &str) -> ParserResult<Option<TableEntry>> {
        let Some(value_offset) = self.find_value_offset(key) else {
            return Ok(None);
        };
        parse_entry(&self.source[value_offset..], self.label, key).map(Some)
    }

    pub fn require_entry(&self, key: &str) -> ParserResult<TableEntry> {
        self.entry(key)?
            .ok_or_else(|| missing_field_error(self.label, key))
    }

    pub fn values(&self, key: &str) -> ParserResult<Vec<f64>> {
        let entry = self.require_entry(key)?;
        numeric_tokens(&entry, self.label, key)
    }

    pub fn optional_values(&self, key: &str) -> ParserResult<Option<Vec<f64>>> {
        match self.entry(key)? {
            Some(entry) => numeric_tokens(&entry, self.label, key).map(Some),
            None => Ok(None),
        }
    }

    pub fn scalar(&self, key: &str) -> ParserResult<f64> {
        let values = self.values(key)?;
        single_value(&values, self.label, key)
    }

    pub fn optional_scalar(&self, key: &str) -> ParserResult<Option<f64>> {
        match self.optional_values(key)? {
            Some(values) => single_value(&values, self.label, key).map(Some),
            None => Ok(None),
        }
    }

    pub fn text(&self, key: &str) -> ParserResult<String> {
        match self.require_entry(key)? {
            TableEntry::Scalar(value) => Ok(value),
            TableEntry::List(_) => Err(OcaError::input_validation(
                "INPUT.TABLE_VALUE",
                format!(
                    "field '{}' in '{}' is a list, expected a single value",
                    key, self.label
                ),
            )),
        }
    }

    pub fn strings(&self, key: &str) -> ParserResult<Vec<String>> {
        Ok(self
            .require_entry(key)?
            .tokens()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Byte offset just past the `:` of the first unquoted (or fully quoted)
    /// `key` starting inside the window. Text inside string values is skipped.
    fn find_value_offset(&self, key: &str) -> Option<usize> {
        if key.is_empty() {
            return None;
        }

        let before = &self.source[..self.search_start];
        let mut in_quotes = before.matches('"').count() % 2 == 1;
        let mut previous = before.chars().next_back();

        let window = &self.source[self.search_start..self.search_end];
        for (offset, character) in window.char_indices() {
            let position = self.search_start + offset;
            if character == '"' {
                if !in_quotes
                    && let Some(rest) = self.source[position + 1..].strip_prefix(key)
                    && let Some(rest) = rest.strip_prefix('"')
                    && let Some(value) = value_after_colon(rest)
                {
                    return Some(self.source.len() - value.len());
                }
                in_quotes = !in_quotes;
            } else if !in_quotes
                && !previous.is_some_and(is_key_char)
                && let Some(rest) = self.source[position..].strip_prefix(key)
                && let Some(value) = value_after_colon(rest)
            {
                return Some(self.source.len() - value.len());
            }
            previous = Some(character);
        }

        None
    }
}

fn value_after_colon(rest: &str) -> Option<&str> {
    rest.trim_start_matches([' ', '\t']).strip_prefix(':')
}

pub fn parse_number_token(token: &str) -> Option<f64> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn parse_entry(rest: &str, label: &str, key: &str) -> ParserResult<TableEntry> {
    let rest = rest.trim_start();

    if let Some(body) = rest.strip_prefix('[') {
        let close = matching_bracket(body).ok_or_else(|| {
            OcaError::input_validation(
                "INPUT.TABLE_UNTERMINATED_LIST",
                format!("list for field '{}' in '{}' is missing ']'", key, label),
            )
        })?;
        return Ok(TableEntry::List(split_list_tokens(&body[..close])));
    }

    if let Some(body) = rest.strip_prefix('"') {
        let close = body.find('"').ok_or_else(|| {
            OcaError::input_validation(
                "INPUT.TABLE_VALUE",
                format!("string for field '{}' in '{}' is missing '\"'", key, label),
            )
        })?;
        return Ok(TableEntry::Scalar(body[..close].to_string()));
    }

    let end = rest.find([',', '\n', '\r', '}']).unwrap_or(rest.len());
    Ok(TableEntry::Scalar(rest[..end].trim().to_string()))
}

fn matching_bracket(body: &str) -> Option<usize> {
    let mut depth = 1_usize;
    let mut in_quotes = false;
    for (index, character) in body.char_indices() {
        match character {
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => depth += 1,
            ']' if !in_quotes => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_list_tokens(body: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for character in body.chars() {
        if in_quotes {
            if character == '"' {
                in_quotes = false;
                tokens.push(std::mem::take(&mut current));
            } else {
                current.push(character);
            }
            continue;
        }

        match character {
            '"' => {
                flush_token(&mut tokens, &mut current);
                in_quotes = true;
            }
            ',' | '[' | ']' => flush_token(&mut tokens, &mut current),
            c if c.is_whitespace() => flush_token(&mut tokens, &mut current),
            c => current.push(c),
        }
    }
    flush_token(&mut tokens, &mut current);

    tokens
}

fn flush_token(tokens: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

fn numeric_tokens(entry: &TableEntry, label: &str, key: &str) -> ParserResult<Vec<f64>> {
    entry
        .tokens()
        .into_iter()
        .enumerate()
        .map(|(index, token)| {
            parse_number_token(token).ok_or_else(|| {
                OcaError::input_validation(
                    "INPUT.TABLE_VALUE",
                    format!(
                        "field '{}' in '{}' has non-numeric value '{}' at position {}",
                        key, label, token, index
                    ),
                )
            })
        })
        .collect()
}

fn single_value(values: &[f64], label: &str, key: &str) -> ParserResult<f64> {
    match values {
        [value] => Ok(*value),
        [] => Err(missing_field_error(label, key)),
        _ => Err(OcaError::input_validation(
            "INPUT.TABLE_VALUE",
            format!(
                "field '{}' in '{}' has {} values, expected one",
                key,
                label,
                values.len()
            ),
        )),
    }
}

fn missing_field_error(label: &str, key: &str) -> OcaError {
    OcaError::input_validation(
        "INPUT.TABLE_MISSING_FIELD",
        format!("field '{}' not found in '{}'", key, label),
    )
}

fn is_key_char(character: char) -> bool {
    character.is_ascii_alphanumeric() || character == '_'
}

#[cfg(test)]
mod tests {
    use super::{TableDocument, TableEntry, TableReader};
    use std::fmt::Write;

    const FIT_SOURCE: &str = "{\n\
        name: \"OCA_FIT\",\n\
        inner_av_extinction_length_error : 5.8e-07,\n\
        inner_av_extinction_length : 3.05327e-05,\n\
        pmt_angular_response : [ 1.0, 1.01, 1.02,\n   1.03, 1.04, ],\n\
        }\n";

    #[test]
    fn scalar_lookup_does_not_match_longer_keys() {
        let reader = TableReader::new("fit.ocadb", FIT_SOURCE);
        let value = reader
            .scalar("inner_av_extinction_length")
            .expect("value should parse");
        let error = reader
            .scalar("inner_av_extinction_length_error")
            .expect("error should parse");

        assert_eq!(value, 3.05327e-05);
        assert_eq!(error, 5.8e-07);
    }

    #[test]
    fn multi_line_list_with_trailing_comma_is_read_completely() {
        let reader = TableReader::new("fit.ocadb", FIT_SOURCE);
        let values = reader
            .values("pmt_angular_response")
            .expect("list should parse");
        assert_eq!(values, vec![1.0, 1.01, 1.02, 1.03, 1.04]);
    }

    #[test]
    fn missing_key_is_none_for_lookup_and_error_for_values() {
        let reader = TableReader::new("fit.ocadb", FIT_SOURCE);
        assert_eq!(reader.entry("water_extinction_length").unwrap(), None);
        assert_eq!(
            reader
                .optional_values("water_extinction_length")
                .expect("optional lookup should succeed"),
            None
        );

        let error = reader
            .values("water_extinction_length")
            .expect_err("missing key should fail");
        assert_eq!(error.placeholder(), "INPUT.TABLE_MISSING_FIELD");
        assert!(error.message().contains("fit.ocadb"));
    }

    #[test]
    fn non_numeric_token_is_reported() {
        let reader = TableReader::new("t", "values: [1.0, abc, 3.0]\n");
        let error = reader.values("values").expect_err("token should fail");
        assert_eq!(error.placeholder(), "INPUT.TABLE_VALUE");
        assert!(error.message().contains("'abc'"));
    }

    #[test]
    fn unterminated_list_is_reported() {
        let reader = TableReader::new("t", "values: [1.0, 2.0\n");
        let error = reader.values("values").expect_err("list should fail");
        assert_eq!(error.placeholder(), "INPUT.TABLE_UNTERMINATED_LIST");
    }

    #[test]
    fn quoted_strings_and_text_fields_are_unwrapped() {
        let reader = TableReader::new(
            "t",
            "type: \"OPTICS\",\nPROPERTY_LIST: [\"ABSLENGTH0\", \"ABSLENGTH_SCALING\"],\n",
        );
        assert_eq!(reader.text("type").unwrap(), "OPTICS");
        assert_eq!(
            reader.strings("PROPERTY_LIST").unwrap(),
            vec!["ABSLENGTH0".to_string(), "ABSLENGTH_SCALING".to_string()]
        );
        assert_eq!(
            reader.entry("type").unwrap(),
            Some(TableEntry::Scalar("OPTICS".to_string()))
        );
    }

    #[test]
    fn quoted_keys_are_accepted() {
        let reader = TableReader::new("t", "{ \"pass\": 3, }\n");
        assert_eq!(reader.scalar("pass").unwrap(), 3.0);
    }

    #[test]
    fn keys_inside_string_values_are_ignored() {
        let reader = TableReader::new(
            "greydisc.ratdb",
            "{\ntype: \"GREY_DISC_PARAMETERS\",\ncomment: \"reset pass: 7, index: old\",\npass: 0,\nindex: \"DiscOptics0_0\",\n}\n",
        );
        assert_eq!(reader.scalar("pass").unwrap(), 0.0);
        assert_eq!(reader.text("index").unwrap(), "DiscOptics0_0");
        assert_eq!(reader.text("comment").unwrap(), "reset pass: 7, index: old");
        assert!(!TableReader::new("t", "comment: \"only pass: 7\",\n").contains_key("pass"));
    }

    #[test]
    fn section_scopes_lookup_to_the_named_block() {
        let source = "{\nindex: \"heavywater\",\nRSLENGTH0_value1: [1.0, 2.0],\n}\n\
                      {\nindex: \"lightwater_sno\",\nRSLENGTH0_value1: [300.0, 400.0],\n}\n";
        let reader = TableReader::new("OPTICS.ratdb", source);

        assert_eq!(reader.values("RSLENGTH0_value1").unwrap(), vec![1.0, 2.0]);
        let section = reader
            .section("index: \"lightwater_sno\"")
            .expect("section should exist");
        assert_eq!(
            section.values("RSLENGTH0_value1").unwrap(),
            vec![300.0, 400.0]
        );
    }

    #[test]
    fn section_lookahead_is_limited_to_twenty_lines() {
        let mut source = String::from("index: \"lightwater_sno\",\n");
        for line in 0..19 {
            writeln!(source, "filler_{}: 0,", line).unwrap();
        }
        source.push_str("far_key: [1.0, 2.0],\n");

        let reader = TableReader::new("t", &source);
        let section = reader.section("index: \"lightwater_sno\"").unwrap();
        assert!(section.contains_key("filler_18"));
        assert!(!section.contains_key("far_key"));
        assert!(reader.contains_key("far_key"));
    }

    #[test]
    fn list_starting_inside_the_window_may_end_after_it() {
        let source = "index: \"x\",\nkey: [1.0,\n2.0,\n3.0]\n";
        let reader = TableReader::new("t", source);
        let section = reader.section_with_lookahead("index: \"x\"", 2).unwrap();
        assert_eq!(section.values("key").unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn missing_section_is_reported() {
        let reader = TableReader::new("t", "index: \"a\",\n");
        let error = reader.section("index: \"b\"").expect_err("section should fail");
        assert_eq!(error.placeholder(), "INPUT.TABLE_MISSING_SECTION");
    }

    #[test]
    fn document_reads_from_disk_and_reports_io_errors() {
        let temp = tempfile::TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("fit.ocadb");
        std::fs::write(&path, FIT_SOURCE).unwrap();

        let document = TableDocument::read(&path).expect("document should read");
        assert_eq!(
            document.reader().scalar("inner_av_extinction_length").unwrap(),
            3.05327e-05
        );

        let error = TableDocument::read(&temp.path().join("missing.ocadb"))
            .expect_err("missing file should fail");
        assert_eq!(error.placeholder(), "IO.TABLE_READ");
    }
}
