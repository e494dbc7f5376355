use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::{Flavor, MarkupError, MarkupReader, Position, Token};

/// An owned, fully tokenized stream.
///
/// # Examples
///
/// ```
/// use vc_markup::{Flavor, MarkupReader, Token, TokenBuffer};
///
/// let mut buffer = TokenBuffer::new(Flavor::Xml, vec![Token::Text("hi".into())]);
/// assert_eq!(buffer.next_token().unwrap(), Some(Token::Text("hi".into())));
/// assert_eq!(buffer.next_token().unwrap(), None);
/// ```
#[derive(Debug, Clone)]
pub struct TokenBuffer {
    flavor: Flavor,
    tokens: VecDeque<Token>,
    consumed: usize,
}

impl TokenBuffer {
    #[inline]
    pub fn new(flavor: Flavor, tokens: Vec<Token>) -> Self {
        Self {
            flavor,
            tokens: tokens.into(),
            consumed: 0,
        }
    }

    /// Number of tokens not yet read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.tokens.len()
    }
}

impl MarkupReader for TokenBuffer {
    #[inline]
    fn flavor(&self) -> Flavor {
        self.flavor
    }

    fn next_token(&mut self) -> Result<Option<Token>, MarkupError> {
        let token = self.tokens.pop_front();
        if token.is_some() {
            self.consumed += 1;
        }
        Ok(token)
    }

    #[inline]
    fn position(&self) -> Position {
        Position::Ordinal(self.consumed)
    }
}
