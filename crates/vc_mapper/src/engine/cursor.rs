use alloc::vec::Vec;

use vc_markup::{Flavor, MarkupError, MarkupReader, Position, Token, TokenBuffer};

/// What the cursor produced next.
#[derive(Debug)]
pub(crate) enum Step {
    Token(Token),
    /// A spliced fragment was fully consumed.
    FragmentEnd,
    Eof,
}

/// A token stream into which decrypted fragments can be spliced.
///
/// Fragments are read to their end before the stream they interrupt resumes.
pub(crate) struct Cursor<'r> {
    root: &'r mut dyn MarkupReader,
    fragments: Vec<TokenBuffer>,
}

impl<'r> Cursor<'r> {
    pub fn new(root: &'r mut dyn MarkupReader) -> Self {
        Self {
            root,
            fragments: Vec::new(),
        }
    }

    #[inline]
    pub fn flavor(&self) -> Flavor {
        self.root.flavor()
    }

    /// Number of fragments being read.
    #[inline]
    pub fn depth(&self) -> usize {
        self.fragments.len()
    }

    pub fn next(&mut self) -> Result<Step, MarkupError> {
        if let Some(fragment) = self.fragments.last_mut() {
            return Ok(match fragment.next_token()? {
                Some(token) => Step::Token(token),
                None => {
                    self.fragments.pop();
                    Step::FragmentEnd
                }
            });
        }
        Ok(match self.root.next_token()? {
            Some(token) => Step::Token(token),
            None => Step::Eof,
        })
    }

    pub fn position(&self) -> Position {
        match self.fragments.last() {
            Some(fragment) => fragment.position(),
            None => self.root.position(),
        }
    }

    /// Tokenizes `text` as a fragment of the root's flavor.
    #[inline]
    pub fn fragment(&self, text: &str) -> Result<TokenBuffer, MarkupError> {
        self.root.fragment(text)
    }

    /// Reads `fragment` before anything else.
    #[inline]
    pub fn splice(&mut self, fragment: TokenBuffer) {
        self.fragments.push(fragment);
    }
}
