use alloc::string::String;

use thiserror::Error;

use crate::Position;

/// Errors raised by markup readers and writers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MarkupError {
    #[error("xml: {0}")]
    Xml(#[from] xmlparser::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid entity `&{entity};` at {position}")]
    InvalidEntity { entity: String, position: Position },
    #[error("expected `</{expected}>`, found `</{found}>` at {position}")]
    MismatchedEnd {
        expected: String,
        found: String,
        position: Position,
    },
    #[error("`</{0}>` closes an element that was never opened")]
    UnopenedEnd(String),
    #[error("unexpected end of input inside `<{element}>`")]
    UnexpectedEof { element: String },
    #[error("attribute `{0}` written after element content")]
    AttributeAfterContent(String),
    #[error("no open element")]
    NoOpenElement,
    #[error("{0} element(s) left open")]
    UnclosedElements(usize),
    #[error("no capture in progress")]
    NoCapture,
    #[error("capture ended with {0} element(s) left open")]
    UnclosedCapture(usize),
    #[error("document has more than one root")]
    MultipleRoots,
    #[error("fragment must be an object, an array or a string")]
    InvalidFragment,
}
