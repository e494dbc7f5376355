//! JSON flavor, on top of `serde_json`.
//!
//! Elements map to values and child elements to object members. Attributes
//! become ordinary members, except the reserved `$type` and `$nil`. Text next
//! to members is stored under `#text`, and list items are array entries.
//!
//! Reading is buffered: a document or fragment is parsed whole into a
//! [`serde_json::Value`] and then replayed as tokens.

use alloc::vec::Vec;

use serde_json::Value;

use crate::{Flavor, MarkupError, TokenBuffer};

mod reader;
mod writer;

pub use reader::JsonReader;
pub use writer::JsonWriter;

/// Member holding the text of an element that also has members.
pub const TEXT_MEMBER: &str = "#text";

/// Element name given to array entries.
pub const ITEM_NAME: &str = "Item";

/// Reserved attribute marking an element read from an array.
pub const ARRAY_ATTRIBUTE: &str = "$array";

/// Tokenizes the members of an object, the entries of an array, or a string.
///
/// # Examples
///
/// ```
/// use vc_markup::{MarkupReader, Token, json};
///
/// let mut buffer = json::read_fragment(r#"{"Name":"a","Age":3}"#).unwrap();
/// assert_eq!(buffer.next_token().unwrap(), Some(Token::Start("Name".into())));
/// assert_eq!(buffer.remaining(), 7);
/// ```
pub fn read_fragment(text: &str) -> Result<TokenBuffer, MarkupError> {
    let value: Value = serde_json::from_str(text)?;
    let mut tokens = Vec::new();
    match &value {
        Value::Object(members) => {
            for (name, member) in members {
                reader::flatten_member(name, member, &mut tokens);
            }
        }
        Value::Array(items) => {
            for item in items {
                reader::flatten(ITEM_NAME, item, &mut tokens);
            }
        }
        Value::String(text) => {
            if !text.is_empty() {
                tokens.push(crate::Token::Text(text.clone()));
            }
        }
        _ => return Err(MarkupError::InvalidFragment),
    }
    Ok(TokenBuffer::new(Flavor::Json, tokens))
}
