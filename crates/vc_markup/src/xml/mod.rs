//! XML flavor, on top of the `xmlparser` tokenizer.

use alloc::vec::Vec;

use crate::{Flavor, MarkupError, MarkupReader, TokenBuffer};

mod escape;
mod reader;
mod writer;

pub use reader::XmlReader;
pub use writer::XmlWriter;

/// Namespace bound to the `xsi` prefix of type tags and nil markers.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Tokenizes a sequence of sibling XML nodes.
///
/// # Examples
///
/// ```
/// use vc_markup::{MarkupReader, Token, xml};
///
/// let mut buffer = xml::read_fragment("<a>1</a>tail").unwrap();
/// assert_eq!(buffer.remaining(), 5);
/// assert_eq!(buffer.next_token().unwrap(), Some(Token::Start("a".into())));
/// ```
pub fn read_fragment(text: &str) -> Result<TokenBuffer, MarkupError> {
    let mut reader = XmlReader::fragment(text);
    let mut tokens = Vec::new();
    while let Some(token) = reader.next_token()? {
        tokens.push(token);
    }
    Ok(TokenBuffer::new(Flavor::Xml, tokens))
}
