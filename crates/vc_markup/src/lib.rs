#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod buffer;
mod error;
mod flavor;
mod token;
mod traits;

pub mod json;
pub mod xml;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use buffer::TokenBuffer;
pub use error::MarkupError;
pub use flavor::Flavor;
pub use token::{Position, TextKind, Token};
pub use traits::{MarkupReader, MarkupWriter};
