use alloc::string::String;

use crate::{Flavor, MarkupError, Position, TextKind, Token, TokenBuffer};

// -----------------------------------------------------------------------------
// MarkupReader

/// A pull-based source of [`Token`]s.
pub trait MarkupReader {
    fn flavor(&self) -> Flavor;

    /// Returns the next token, `None` at the end of input.
    fn next_token(&mut self) -> Result<Option<Token>, MarkupError>;

    /// Position of the last returned token.
    fn position(&self) -> Position;

    /// Tokenizes `text` as a sequence of sibling nodes of this flavor.
    ///
    /// Used to splice a decrypted sub-document into the current stream.
    fn fragment(&self, text: &str) -> Result<TokenBuffer, MarkupError> {
        match self.flavor() {
            Flavor::Xml => crate::xml::read_fragment(text),
            Flavor::Json => crate::json::read_fragment(text),
        }
    }
}

// -----------------------------------------------------------------------------
// MarkupWriter

/// A push-based sink of markup.
///
/// Attributes must be written right after [`begin_element`](Self::begin_element),
/// before any content.
pub trait MarkupWriter {
    fn flavor(&self) -> Flavor;

    fn begin_element(&mut self, name: &str) -> Result<(), MarkupError>;

    fn attribute(&mut self, name: &str, value: &str, kind: TextKind) -> Result<(), MarkupError>;

    /// Writes the type tag of the current element.
    fn type_tag(&mut self, name: &str) -> Result<(), MarkupError> {
        self.attribute(self.flavor().type_attribute(), name, TextKind::String)
    }

    /// Marks the current element as nil.
    fn nil(&mut self) -> Result<(), MarkupError>;

    fn text(&mut self, value: &str, kind: TextKind) -> Result<(), MarkupError>;

    fn end_element(&mut self) -> Result<(), MarkupError>;

    /// Marks the content of the current element as a list of items.
    fn begin_list(&mut self) -> Result<(), MarkupError> {
        Ok(())
    }

    fn end_list(&mut self) -> Result<(), MarkupError> {
        Ok(())
    }

    /// Redirects everything written until [`end_capture`](Self::end_capture)
    /// into a separate buffer.
    fn begin_capture(&mut self) -> Result<(), MarkupError>;

    /// Returns what was written since the matching [`begin_capture`](Self::begin_capture).
    ///
    /// The result is empty when nothing was written, and can be read back
    /// with [`MarkupReader::fragment`].
    fn end_capture(&mut self) -> Result<String, MarkupError>;

    /// Completes the document.
    fn finish(&mut self) -> Result<String, MarkupError>;
}
