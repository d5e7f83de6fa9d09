//! Writer for the bracket-list table format read back by [`crate::parser`].

use crate::domain::{OcaError, OcaResult, OutputArtifact};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

/// How each number of a list field is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// Shortest round-trip form; whole numbers print without a decimal point.
    Plain,
    Fixed(usize),
    /// Mantissa with `n` decimals and a signed exponent of at least two digits.
    Scientific(usize),
}

impl ValueFormat {
    pub fn render(self, value: f64) -> String {
        match self {
            Self::Plain => format!("{value}"),
            Self::Fixed(precision) => format!("{value:.precision$}"),
            Self::Scientific(precision) => format_scientific(value, precision),
        }
    }
}

pub fn format_scientific(value: f64, precision: usize) -> String {
    let raw = format!("{value:.precision$e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Numbers { values: Vec<f64>, format: ValueFormat },
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableField {
    pub key: String,
    pub value: FieldValue,
}

/// Static metadata block at the top of every written table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHeader {
    pub table_type: String,
    pub version: u32,
    pub index: String,
    pub run_range: [i64; 2],
    pub pass: i64,
    pub comment: String,
    pub timestamp: String,
}

impl TableHeader {
    pub fn new(table_type: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            table_type: table_type.into(),
            version: 1,
            index: index.into(),
            run_range: [0, 0],
            pass: 0,
            comment: String::new(),
            timestamp: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRecord {
    header: TableHeader,
    fields: Vec<TableField>,
    property_list: Vec<String>,
}

impl TableRecord {
    pub fn new(header: TableHeader) -> Self {
        Self {
            header,
            fields: Vec::new(),
            property_list: Vec::new(),
        }
    }

    pub fn with_text(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.fields.push(TableField {
            key: key.into(),
            value: FieldValue::Text(text.into()),
        });
        self
    }

    pub fn with_numbers(
        mut self,
        key: impl Into<String>,
        values: Vec<f64>,
        format: ValueFormat,
    ) -> Self {
        self.fields.push(TableField {
            key: key.into(),
            value: FieldValue::Numbers { values, format },
        });
        self
    }

    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.property_list
            .extend(properties.into_iter().map(Into::into));
        self
    }

    pub fn header(&self) -> &TableHeader {
        &self.header
    }

    pub fn fields(&self) -> &[TableField] {
        &self.fields
    }

    pub fn render(&self) -> OcaResult<String> {
        let header = &self.header;
        let mut output = String::from("{\n");
        push_line(&mut output, "type", &quoted(&header.table_type)?);
        push_line(&mut output, "version", &header.version.to_string());
        push_line(&mut output, "index", &quoted(&header.index)?);
        push_line(
            &mut output,
            "run_range",
            &format!("[{}, {}]", header.run_range[0], header.run_range[1]),
        );
        push_line(&mut output, "pass", &header.pass.to_string());
        push_line(&mut output, "comment", &quoted(&header.comment)?);
        push_line(&mut output, "timestamp", &quoted(&header.timestamp)?);

        for field in &self.fields {
            let rendered = match &field.value {
                FieldValue::Text(text) => quoted(text)?,
                FieldValue::Numbers { values, format } => {
                    render_numbers(&field.key, values, *format)?
                }
            };
            push_line(&mut output, &field.key, &rendered);
        }

        if !self.property_list.is_empty() {
            let properties = self
                .property_list
                .iter()
                .map(|property| quoted(property))
                .collect::<OcaResult<Vec<_>>>()?;
            push_line(
                &mut output,
                "PROPERTY_LIST",
                &format!("[{}]", properties.join(", ")),
            );
        }

        output.push_str("}\n");
        Ok(output)
    }

    /// Renders the record and replaces any existing file at `path`.
    pub fn write(&self, path: &Path) -> OcaResult<OutputArtifact> {
        let content = self.render()?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| {
                OcaError::io_system(
                    "IO.OUTPUT_DIRECTORY",
                    format!(
                        "failed to create output directory '{}': {}",
                        parent.display(),
                        source
                    ),
                )
            })?;
        }
        write_text_artifact(path, &content).map_err(|source| {
            OcaError::io_system(
                "IO.OUTPUT_WRITE",
                format!("failed to write table '{}': {}", path.display(), source),
            )
        })?;
        info!(path = %path.display(), fields = self.fields.len(), "wrote table");
        Ok(OutputArtifact::new(path))
    }
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, normalize_text_artifact(content))
}

fn push_line(output: &mut String, key: &str, value: &str) {
    let _ = writeln!(output, "{key}: {value},");
}

fn quoted(text: &str) -> OcaResult<String> {
    if text.contains(['"', '\n', '\r']) {
        return Err(OcaError::input_validation(
            "INPUT.TABLE_TEXT",
            format!("text value {text:?} cannot contain quotes or line breaks"),
        ));
    }
    Ok(format!("\"{text}\""))
}

fn render_numbers(key: &str, values: &[f64], format: ValueFormat) -> OcaResult<String> {
    if let Some(index) = values.iter().position(|value| !value.is_finite()) {
        return Err(OcaError::computation(
            "RUN.TABLE_NON_FINITE",
            format!(
                "field '{}' has non-finite value {} at index {}",
                key, values[index], index
            ),
        ));
    }
    let rendered = values
        .iter()
        .map(|value| format.render(*value))
        .collect::<Vec<_>>();
    Ok(format!("[{}]", rendered.join(", ")))
}
