use serde_yaml::Value;

use crate::domain::apply::kind_table::{Kind, ResourceObject};
use crate::errors::DecodeError;

/// What one manifest document turned out to be.
#[derive(Debug, Clone)]
pub enum DecodedDocument {
    /// Whitespace, comments or an explicit YAML null.
    Empty,
    /// Well-formed, but not a kind this tool manages.
    Unhandled {
        api_version: String,
        kind: String,
        name: Option<String>,
    },
    Object(ResourceObject),
}

/// Turns one document's text into a tagged resource.
pub trait ManifestDecoder {
    fn decode(&self, document: &str) -> Result<DecodedDocument, DecodeError>;
}

/// Decodes YAML (and therefore JSON) documents against the kind table.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDecoder;

impl ManifestDecoder for YamlDecoder {
    fn decode(&self, document: &str) -> Result<DecodedDocument, DecodeError> {
        if is_blank(document) {
            return Ok(DecodedDocument::Empty);
        }

        let mut value: Value = serde_yaml::from_str(document)?;
        value.apply_merge()?;
        if value.is_null() {
            return Ok(DecodedDocument::Empty);
        }
        if !value.is_mapping() {
            return Err(DecodeError::NotAMapping);
        }

        let api_version = string_field(&value, "apiVersion")?;
        let kind_name = string_field(&value, "kind")?;

        match Kind::from_type_meta(&api_version, &kind_name) {
            Some(kind) => kind
                .decode(value)
                .map(DecodedDocument::Object)
                .map_err(|source| DecodeError::Shape { kind, source }),
            None => Ok(DecodedDocument::Unhandled {
                name: value
                    .get("metadata")
                    .and_then(|meta| meta.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                api_version,
                kind: kind_name,
            }),
        }
    }
}

fn is_blank(document: &str) -> bool {
    document
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

fn string_field(value: &Value, field: &'static str) -> Result<String, DecodeError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(DecodeError::MissingField(field))
}

/// Splits a manifest into its documents, in order.
///
/// A separator is a line starting with `---` followed by the end of the line
/// or whitespace. When anything other than a comment follows the dashes, the
/// marker line itself opens the next document and stays part of its text.
/// Separators inside block scalars are not detected.
pub fn split_documents(manifest: &str) -> Vec<&str> {
    let mut documents = Vec::new();
    let mut start = 0;
    let mut offset = 0;

    for line in manifest.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        match separator(content) {
            Some(Separator::Bare) => {
                documents.push(&manifest[start..offset]);
                start = offset + line.len();
            }
            Some(Separator::Inline) => {
                documents.push(&manifest[start..offset]);
                start = offset;
            }
            None => {}
        }
        offset += line.len();
    }
    documents.push(&manifest[start..]);

    documents
}

enum Separator {
    /// Nothing but whitespace or a comment after the marker.
    Bare,
    /// The next document starts on the marker line.
    Inline,
}

fn separator(line: &str) -> Option<Separator> {
    let rest = line.strip_prefix("---")?;
    if rest.is_empty() {
        return Some(Separator::Bare);
    }
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let trailing = rest.trim();
    if trailing.is_empty() || trailing.starts_with('#') {
        Some(Separator::Bare)
    } else {
        Some(Separator::Inline)
    }
}
