//! Output templates applied to field values when records are saved.
//!
//! A template is literal text with `{0}` placeholders standing for the value,
//! optionally with a format spec: `{0:%d.%m.%Y}` uses a chrono strftime spec
//! for date/time values and `{0:.2}` fixes the precision of numbers. `{{` and
//! `}}` produce literal braces.
use crate::convert::FieldValue;
use regex::Regex;
use std::fmt::Write;
use url::Url;

#[derive(Clone, Debug, PartialEq)]
enum Segment {
    Literal(String),
    Value(Option<String>),
}

/// A parsed output template.
#[derive(Clone, Debug, PartialEq)]
pub struct FormatTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl FormatTemplate {
    /// Parses a template string.
    pub fn new(template: &str) -> Self {
        let pattern = Regex::new(r"\{\{|\}\}|\{0(?::([^}]*))?\}").expect("Hardcode regex pattern");
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut position = 0;
        for captures in pattern.captures_iter(template) {
            let matcher = captures.get(0).expect("Whole match");
            literal.push_str(&template[position..matcher.start()]);
            position = matcher.end();
            match matcher.as_str() {
                "{{" => literal.push('{'),
                "}}" => literal.push('}'),
                _ => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let spec = captures
                        .get(1)
                        .map(|spec| spec.as_str().to_owned())
                        .filter(|spec| !spec.is_empty());
                    segments.push(Segment::Value(spec));
                }
            }
        }
        literal.push_str(&template[position..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Self {
            source: template.to_owned(),
            segments,
        }
    }

    /// Template producing a `=HYPERLINK` formula whose caption is the link itself.
    pub fn hyperlink() -> Self {
        Self::new("=HYPERLINK(\"{0}\";\"{0}\")")
    }

    /// Returns the template text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Renders a value through the template.
    pub fn render(&self, value: &FieldValue) -> String {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Value(spec) => output.push_str(&render_value(value, spec.as_deref())),
            }
        }
        output
    }
}

impl From<&str> for FormatTemplate {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

/// Renders one value with an optional spec, falling back to its plain display
/// when the spec does not apply.
fn render_value(value: &FieldValue, spec: Option<&str>) -> String {
    let Some(spec) = spec else {
        return value.to_string();
    };
    let mut output = String::new();
    let written = match value {
        FieldValue::DateTime(value) => write!(output, "{}", value.format(spec)),
        FieldValue::Date(value) => write!(output, "{}", value.format(spec)),
        FieldValue::Time(value) => write!(output, "{}", value.format(spec)),
        FieldValue::ZonedDateTime(value) => write!(output, "{}", value.format(spec)),
        _ => match (precision(spec), number(value)) {
            (Some(precision), Some(number)) => write!(output, "{:.*}", precision, number),
            _ => Err(std::fmt::Error),
        },
    };
    match written {
        Ok(()) => output,
        Err(_) => value.to_string(),
    }
}

/// Reads a `.N`, `FN` or `NN` precision spec.
fn precision(spec: &str) -> Option<usize> {
    let digits = spec
        .strip_prefix('.')
        .or_else(|| spec.strip_prefix(['F', 'f', 'N', 'n']))?;
    digits.parse::<usize>().ok()
}

fn number(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Byte(value) => Some(*value as f64),
        FieldValue::UShort(value) => Some(*value as f64),
        FieldValue::Integer(value) => Some(*value as f64),
        FieldValue::Long(value) => Some(*value as f64),
        FieldValue::Decimal(value) => Some(*value),
        _ => None,
    }
}

/// Builds a `=HYPERLINK("url";"caption")` formula; a blank caption shows the URL.
pub fn hyperlink(url: &Url, caption: Option<&str>) -> String {
    let caption = caption
        .filter(|caption| !caption.trim().is_empty())
        .unwrap_or(url.as_str());
    format!("=HYPERLINK(\"{}\";\"{}\")", url.as_str(), caption)
}
