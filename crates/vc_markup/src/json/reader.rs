use alloc::borrow::ToOwned;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde_json::Value;

use super::{ARRAY_ATTRIBUTE, ITEM_NAME, TEXT_MEMBER};
use crate::{Flavor, MarkupError, MarkupReader, Position, Token, TokenBuffer};

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

pub(super) fn flatten_member(name: &str, value: &Value, out: &mut Vec<Token>) {
    if name == TEXT_MEMBER {
        if let Some(text) = scalar_text(value).filter(|text| !text.is_empty()) {
            out.push(Token::Text(text));
        }
        return;
    }
    flatten(name, value, out);
}

pub(super) fn flatten(name: &str, value: &Value, out: &mut Vec<Token>) {
    out.push(Token::Start(name.to_owned()));
    match value {
        Value::Null => {
            out.push(Token::Attribute {
                name: Flavor::Json.nil_attribute().to_owned(),
                value: String::from("true"),
            });
            out.push(Token::AttributesEnd);
        }
        Value::Object(members) => {
            let is_attribute =
                |key: &str, member: &Value| key.starts_with('$') && scalar_text(member).is_some();

            for (key, member) in members {
                if is_attribute(key, member) {
                    out.push(Token::Attribute {
                        name: key.clone(),
                        value: scalar_text(member).unwrap_or_default(),
                    });
                }
            }
            out.push(Token::AttributesEnd);
            if let Some(text) = members.get(TEXT_MEMBER) {
                flatten_member(TEXT_MEMBER, text, out);
            }
            for (key, member) in members {
                if key != TEXT_MEMBER && !is_attribute(key, member) {
                    flatten(key, member, out);
                }
            }
        }
        Value::Array(items) => {
            out.push(Token::Attribute {
                name: ARRAY_ATTRIBUTE.to_owned(),
                value: String::from("true"),
            });
            out.push(Token::AttributesEnd);
            for item in items {
                flatten(ITEM_NAME, item, out);
            }
        }
        scalar => {
            out.push(Token::AttributesEnd);
            if let Some(text) = scalar_text(scalar).filter(|text| !text.is_empty()) {
                out.push(Token::Text(text));
            }
        }
    }
    out.push(Token::End(name.to_owned()));
}

/// Reads a JSON document into [`Token`]s.
///
/// Reading is buffered, not streamed: [`JsonReader::new`] parses the whole
/// document into a [`Value`] and tokens are then replayed from memory. The
/// root element has an empty name, an array reads as an element marked with
/// [`ARRAY_ATTRIBUTE`] whose entries are named [`ITEM_NAME`], and `null`
/// reads as a nil element.
///
/// # Examples
///
/// ```
/// use vc_markup::{MarkupReader, Token};
/// use vc_markup::json::JsonReader;
///
/// let mut reader = JsonReader::new(r#"{"$type":"Dog","Name":"Rex"}"#).unwrap();
/// assert_eq!(reader.next_token().unwrap(), Some(Token::Start("".into())));
/// assert_eq!(
///     reader.next_token().unwrap(),
///     Some(Token::Attribute { name: "$type".into(), value: "Dog".into() }),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct JsonReader {
    buffer: TokenBuffer,
}

impl JsonReader {
    pub fn new(text: &str) -> Result<Self, MarkupError> {
        let value: Value = serde_json::from_str(text)?;
        let mut tokens = Vec::new();
        flatten("", &value, &mut tokens);
        Ok(Self {
            buffer: TokenBuffer::new(Flavor::Json, tokens),
        })
    }
}

impl MarkupReader for JsonReader {
    #[inline]
    fn flavor(&self) -> Flavor {
        Flavor::Json
    }

    #[inline]
    fn next_token(&mut self) -> Result<Option<Token>, MarkupError> {
        self.buffer.next_token()
    }

    #[inline]
    fn position(&self) -> Position {
        self.buffer.position()
    }
}
