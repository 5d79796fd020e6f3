//! Conversion of one crawler record into a `WebIndexItem`

use serde_json::{Map, Value};

use crate::types::{PageHeading, SearchableText, WebIndexItem};

use super::RecordError;

/// Parse a heading mapping key (`h1`..`h6`) into its level
pub fn parse_heading_level(key: &str) -> Option<u8> {
    match key.as_bytes() {
        [b'h', digit @ b'1'..=b'6'] => Some(*digit - b'0'),
        _ => None,
    }
}

impl WebIndexItem {
    /// Build an item from one parsed record.
    ///
    /// Scalars are coerced leniently (numbers and booleans become their textual
    /// form, `null` becomes an empty string, arrays of scalars are joined with
    /// spaces); structurally wrong values are rejected.
    pub fn from_json(value: &Value) -> Result<Self, RecordError> {
        let record = value.as_object().ok_or(RecordError::NotAnObject)?;

        let url = string_field(record, "final_url")?;
        let title = string_field(record, "title")?;
        let headings = parse_headings(required(record, "headings")?)?;
        let description = string_field(record, "description")?;
        let keywords = string_field(record, "keywords")?;
        let author = string_field(record, "author")?;
        let content_snippet = string_field(record, "content_snippet")?;
        let content_snippet_quality = float_field(record, "content_snippet_quality")?;
        let image_alts = string_field(record, "image_alts")?;
        let link_texts = string_field(record, "link_texts")?;

        Ok(Self {
            url_lc: SearchableText::new(&url),
            title_lc: SearchableText::new(&title),
            content_snippet_lc: SearchableText::new(&content_snippet),
            url,
            title,
            content_snippet,
            content_snippet_quality,
            headings,
            description: SearchableText::new(&description),
            keywords: SearchableText::new(&keywords),
            author: SearchableText::new(&author),
            image_alts: SearchableText::new(&image_alts),
            link_texts: SearchableText::new(&link_texts),
        })
    }

    /// Parse one line of the index file
    pub fn from_json_line(line: &str) -> Result<Self, RecordError> {
        let value: Value = serde_json::from_str(line)?;
        Self::from_json(&value)
    }
}

fn required<'a>(
    record: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a Value, RecordError> {
    record.get(key).ok_or(RecordError::MissingKey(key))
}

fn string_field(record: &Map<String, Value>, key: &'static str) -> Result<String, RecordError> {
    coerce_string(required(record, key)?).ok_or(RecordError::InvalidValue {
        key,
        expected: "a string",
    })
}

/// A finite number, given as a JSON number or a numeric string
fn float_field(record: &Map<String, Value>, key: &'static str) -> Result<f64, RecordError> {
    let parsed = match required(record, key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or(RecordError::InvalidValue {
            key,
            expected: "a finite number",
        })
}

fn coerce_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let parts = items
                .iter()
                .filter(|v| !v.is_null())
                .map(coerce_scalar)
                .collect::<Option<Vec<_>>>()?;
            Some(parts.join(" "))
        }
        other => coerce_scalar(other),
    }
}

/// Headings keep the mapping's iteration order (levels are not sorted)
fn parse_headings(value: &Value) -> Result<Vec<PageHeading>, RecordError> {
    let mapping = value.as_object().ok_or(RecordError::InvalidValue {
        key: "headings",
        expected: "a mapping of heading levels",
    })?;

    let mut headings = Vec::new();
    for (key, texts) in mapping {
        let level = parse_heading_level(key)
            .ok_or_else(|| RecordError::InvalidHeadingLevel(key.clone()))?;

        let invalid = || RecordError::InvalidValue {
            key: "headings",
            expected: "a list of heading texts",
        };
        match texts {
            Value::Array(items) => {
                for text in items {
                    let text = coerce_scalar(text).ok_or_else(invalid)?;
                    headings.push(PageHeading {
                        level,
                        text: SearchableText::new(&text),
                    });
                }
            }
            Value::String(text) => headings.push(PageHeading {
                level,
                text: SearchableText::new(text),
            }),
            _ => return Err(invalid()),
        }
    }

    Ok(headings)
}
