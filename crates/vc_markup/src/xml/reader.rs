use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;

use xmlparser::{ElementEnd, StrSpan, Tokenizer};

use super::escape::unescape;
use crate::{Flavor, MarkupError, MarkupReader, Position, Token};

/// Reads XML text into [`Token`]s.
///
/// Namespace declarations, comments and processing instructions are
/// skipped. Whitespace-only text is kept only as the sole content of a leaf
/// element, so `<a>  </a>` reads as `"  "` while indentation between
/// elements is dropped. Prefixed names are reported as `prefix:local`.
///
/// # Examples
///
/// ```
/// use vc_markup::{MarkupReader, Token};
/// use vc_markup::xml::XmlReader;
///
/// let mut reader = XmlReader::new(r#"<a k="v"/>"#);
/// assert_eq!(reader.next_token().unwrap(), Some(Token::Start("a".into())));
/// assert_eq!(
///     reader.next_token().unwrap(),
///     Some(Token::Attribute { name: "k".into(), value: "v".into() }),
/// );
/// assert_eq!(reader.next_token().unwrap(), Some(Token::AttributesEnd));
/// assert_eq!(reader.next_token().unwrap(), Some(Token::End("a".into())));
/// assert_eq!(reader.next_token().unwrap(), None);
/// ```
pub struct XmlReader<'a> {
    text: &'a str,
    tokenizer: Tokenizer<'a>,
    open: Vec<String>,
    queued: Option<Token>,
    /// Whitespace read since the last element was opened, nothing else yet.
    leaf: Option<String>,
    offset: usize,
}

fn qualified(prefix: StrSpan<'_>, local: StrSpan<'_>) -> String {
    if prefix.as_str().is_empty() {
        local.as_str().to_owned()
    } else {
        alloc::format!("{}:{}", prefix.as_str(), local.as_str())
    }
}

impl<'a> XmlReader<'a> {
    /// Reads a complete document.
    pub fn new(text: &'a str) -> Self {
        Self::with_tokenizer(text, Tokenizer::from(text))
    }

    /// Reads a sequence of sibling nodes, with no prolog and no single root.
    pub fn fragment(text: &'a str) -> Self {
        Self::with_tokenizer(text, Tokenizer::from_fragment(text, 0..text.len()))
    }

    fn with_tokenizer(text: &'a str, tokenizer: Tokenizer<'a>) -> Self {
        Self {
            text,
            tokenizer,
            open: Vec::new(),
            queued: None,
            leaf: None,
            offset: 0,
        }
    }

    fn unescape_at(&self, span: StrSpan<'_>) -> Result<String, MarkupError> {
        let text = self.text;
        let offset = span.start();
        unescape(span.as_str(), || Position::of_offset(text, offset)).map(|value| value.into_owned())
    }
}

impl MarkupReader for XmlReader<'_> {
    #[inline]
    fn flavor(&self) -> Flavor {
        Flavor::Xml
    }

    fn next_token(&mut self) -> Result<Option<Token>, MarkupError> {
        if let Some(token) = self.queued.take() {
            return Ok(Some(token));
        }

        loop {
            let Some(token) = self.tokenizer.next() else {
                return match self.open.last() {
                    Some(element) => Err(MarkupError::UnexpectedEof {
                        element: element.clone(),
                    }),
                    None => Ok(None),
                };
            };

            match token? {
                xmlparser::Token::ElementStart { prefix, local, span } => {
                    self.leaf = None;
                    self.offset = span.start();
                    let name = qualified(prefix, local);
                    self.open.push(name.clone());
                    return Ok(Some(Token::Start(name)));
                }
                xmlparser::Token::Attribute {
                    prefix,
                    local,
                    value,
                    span,
                } => {
                    self.offset = span.start();
                    let declaration = prefix.as_str() == "xmlns"
                        || (prefix.as_str().is_empty() && local.as_str() == "xmlns");
                    if declaration {
                        log::trace!("skipping namespace declaration `{}`", span.as_str());
                        continue;
                    }
                    return Ok(Some(Token::Attribute {
                        name: qualified(prefix, local),
                        value: self.unescape_at(value)?,
                    }));
                }
                xmlparser::Token::ElementEnd { end, span } => {
                    self.offset = span.start();
                    match end {
                        ElementEnd::Open => {
                            self.leaf = Some(String::new());
                            return Ok(Some(Token::AttributesEnd));
                        }
                        ElementEnd::Empty => {
                            let name = self.open.pop().ok_or(MarkupError::NoOpenElement)?;
                            self.queued = Some(Token::End(name));
                            return Ok(Some(Token::AttributesEnd));
                        }
                        ElementEnd::Close(prefix, local) => {
                            let found = qualified(prefix, local);
                            let Some(expected) = self.open.pop() else {
                                return Err(MarkupError::UnopenedEnd(found));
                            };
                            if expected != found {
                                return Err(MarkupError::MismatchedEnd {
                                    expected,
                                    found,
                                    position: self.position(),
                                });
                            }
                            return match self.leaf.take() {
                                Some(space) if !space.is_empty() => {
                                    self.queued = Some(Token::End(found));
                                    Ok(Some(Token::Text(space)))
                                }
                                _ => Ok(Some(Token::End(found))),
                            };
                        }
                    }
                }
                xmlparser::Token::Text { text } => {
                    if text.as_str().trim().is_empty() {
                        if let Some(space) = &mut self.leaf {
                            space.push_str(text.as_str());
                        }
                        continue;
                    }
                    self.leaf = None;
                    self.offset = text.start();
                    return Ok(Some(Token::Text(self.unescape_at(text)?)));
                }
                xmlparser::Token::Cdata { text, span } => {
                    self.leaf = None;
                    self.offset = span.start();
                    return Ok(Some(Token::Text(text.as_str().to_owned())));
                }
                other => {
                    log::trace!("skipping {other:?}");
                    continue;
                }
            }
        }
    }

    #[inline]
    fn position(&self) -> Position {
        Position::of_offset(self.text, self.offset)
    }
}
